//! Description templates
//!
//! Templates reference fields as `{{Identifier}}`; the dotted form
//! `{{ .Identifier }}` is accepted too. A field without a value renders as
//! [`MISSING_VALUE`] and is reported back to the caller.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Rendered in place of a field that has no value
pub const MISSING_VALUE: &str = "<no value>";

re!(placeholder, r"\{\{\s*\.?(\w+)\s*\}\}");

/// Named values available to a template
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    fields: Vec<(&'static str, String)>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    /// Sets the field only when a value is present
    pub fn with_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Interpolate `template`; returns the text and one message per field
/// that had no value
pub fn apply(name: &str, template: &str, data: &TemplateData) -> (String, Vec<String>) {
    let mut errors = Vec::new();
    let text = placeholder().replace_all(template, |caps: &Captures<'_>| {
        let field = &caps[1];
        match data.get(field) {
            Some(value) => value.to_string(),
            None => {
                let message = format!("{} has no value for {}", name, field);
                if !errors.contains(&message) {
                    errors.push(message);
                }
                MISSING_VALUE.to_string()
            }
        }
    });
    (text.into_owned(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_placeholder_forms() {
        let data = TemplateData::new()
            .with("Identifier", "e-21-3")
            .with("Party", "Kai (p-01)");
        let (text, errors) = apply("t", "Refund of {{Party}} for {{ .Identifier }}", &data);
        assert_eq!(text, "Refund of Kai (p-01) for e-21-3");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_field_renders_marker() {
        let data = TemplateData::new().with_opt("Project", None::<String>);
        let (text, errors) = apply(
            "production expense occurrence description",
            "for {{Project}} and {{Project}}",
            &data,
        );
        assert_eq!(text, "for <no value> and <no value>");
        assert_eq!(
            errors,
            vec!["production expense occurrence description has no value for Project".to_string()]
        );
    }

    #[test]
    fn test_plain_text_passes_through() {
        let (text, errors) = apply("t", "no fields {here}", &TemplateData::new());
        assert_eq!(text, "no fields {here}");
        assert!(errors.is_empty());
    }
}
