//! Bank statement import
//!
//! Importers turn a bank export into [`ImportedTransaction`] values; the
//! [`ImportService`] assigns Ids and identifiers, drops doubles and appends
//! the rest to the statement. A CSV importer with a configurable column
//! mapping is bundled.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, StringRecord};

use crate::error::{AccError, AccResult};
use crate::events::{EngineEvent, EventSink};
use crate::models::ids::TRANSACTION_PREFIX;
use crate::models::{suggest_next_identifier, Currency, Money, Transaction, TransactionKind};
use crate::storage::{sha256_hex, Repository};

/// One movement as read from a bank export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTransaction {
    pub date: NaiveDate,
    /// Always positive, the kind carries the direction
    pub amount: Money,
    pub kind: TransactionKind,
    pub description: String,
    /// Bank reference or content hash, used to drop double imports
    pub external_ref: String,
}

/// Source of imported transactions
pub trait StatementImporter {
    fn transactions(&mut self) -> AccResult<Vec<ImportedTransaction>>;
}

/// Column mapping configuration for CSV import
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Index of the date column
    pub date_column: usize,
    /// Index of a signed amount column (positive is money received)
    pub amount_column: Option<usize>,
    /// Index of the debit column (if using separate columns)
    pub debit_column: Option<usize>,
    /// Index of the credit column (if using separate columns)
    pub credit_column: Option<usize>,
    /// Index of the booking text column
    pub description_column: Option<usize>,
    /// Index of the bank's own reference column
    pub reference_column: Option<usize>,
    /// Index of a per-row currency code column
    pub currency_column: Option<usize>,
    /// Date format string (e.g., "%Y-%m-%d", "%d.%m.%Y")
    pub date_format: String,
    /// Whether the first row is a header
    pub has_header: bool,
    /// Delimiter character
    pub delimiter: char,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date_column: 0,
            amount_column: Some(1),
            debit_column: None,
            credit_column: None,
            description_column: Some(2),
            reference_column: None,
            currency_column: None,
            date_format: "%Y-%m-%d".to_string(),
            has_header: true,
            delimiter: ',',
        }
    }
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swiss e-banking export: `Date;Text;Debit;Credit;Reference`, dates as
    /// `dd.mm.yyyy`
    pub fn swiss_bank() -> Self {
        Self {
            date_column: 0,
            amount_column: None,
            debit_column: Some(2),
            credit_column: Some(3),
            description_column: Some(1),
            reference_column: Some(4),
            currency_column: None,
            date_format: "%d.%m.%Y".to_string(),
            has_header: true,
            delimiter: ';',
        }
    }

    /// Set the date format
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Set whether first row is header
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Guess the mapping from a header row
    pub fn detect(headers: &StringRecord) -> Self {
        let mut mapping = Self {
            amount_column: None,
            description_column: None,
            ..Self::default()
        };

        for (idx, header) in headers.iter().enumerate() {
            let h = header.trim().to_lowercase();
            if h.contains("date") || h.contains("datum") || h.contains("valuta") {
                mapping.date_column = idx;
            } else if h.contains("amount") || h.contains("betrag") {
                mapping.amount_column.get_or_insert(idx);
            } else if h.contains("debit") || h.contains("belastung") {
                mapping.debit_column = Some(idx);
            } else if h.contains("credit") || h.contains("gutschrift") {
                mapping.credit_column = Some(idx);
            } else if h.contains("description") || h.contains("text") || h.contains("buchung") {
                mapping.description_column = Some(idx);
            } else if h.contains("reference") || h.contains("referenz") {
                mapping.reference_column = Some(idx);
            } else if h.contains("currency") || h.contains("währung") {
                mapping.currency_column = Some(idx);
            }
        }

        if mapping.debit_column.is_some() && mapping.credit_column.is_some() {
            mapping.amount_column = None;
        }
        mapping
    }
}

/// Reads transactions from a bank CSV export
pub struct CsvImporter<R: Read> {
    reader: Reader<R>,
    mapping: ColumnMapping,
    currency: Currency,
}

impl CsvImporter<File> {
    /// Open a CSV file; amounts are read in `currency` unless the mapping
    /// has a currency column
    pub fn from_path(path: &Path, mapping: ColumnMapping, currency: Currency) -> AccResult<Self> {
        let file = File::open(path)
            .map_err(|e| AccError::Import(format!("Failed to open {}: {}", path.display(), e)))?;
        Ok(Self::from_reader(file, mapping, currency))
    }
}

impl<R: Read> CsvImporter<R> {
    pub fn from_reader(input: R, mapping: ColumnMapping, currency: Currency) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(mapping.has_header)
            .delimiter(mapping.delimiter as u8)
            .flexible(true)
            .from_reader(input);
        Self {
            reader,
            mapping,
            currency,
        }
    }

    fn parse_record(&self, record: &StringRecord) -> Result<ImportedTransaction, String> {
        let mapping = &self.mapping;
        let date_str = record
            .get(mapping.date_column)
            .ok_or_else(|| "Missing date column".to_string())?
            .trim();
        let date = NaiveDate::parse_from_str(date_str, &mapping.date_format)
            .map_err(|_| format!("Could not parse date: '{}'", date_str))?;

        let currency = match mapping.currency_column.and_then(|col| record.get(col)) {
            Some(code) if !code.trim().is_empty() => Currency::parse(code.trim())
                .map_err(|e| format!("Could not parse currency '{}': {}", code, e))?,
            _ => self.currency,
        };

        let signed = self.signed_amount(record, currency)?;
        if signed.is_zero() {
            return Err("amount is zero".to_string());
        }
        let kind = if signed.is_negative() {
            TransactionKind::Debit
        } else {
            TransactionKind::Credit
        };
        let amount = signed.abs();

        let description = mapping
            .description_column
            .and_then(|col| record.get(col))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let external_ref = match mapping.reference_column.and_then(|col| record.get(col)) {
            Some(reference) if !reference.trim().is_empty() => reference.trim().to_string(),
            _ => String::new(),
        };

        Ok(ImportedTransaction {
            date,
            amount,
            kind,
            description,
            external_ref,
        })
    }

    /// Positive for money received
    fn signed_amount(&self, record: &StringRecord, currency: Currency) -> Result<Money, String> {
        let mapping = &self.mapping;
        if let Some(col) = mapping.amount_column {
            let raw = record
                .get(col)
                .ok_or_else(|| "Missing amount column".to_string())?;
            return parse_amount(raw, currency);
        }

        let debit_col = mapping
            .debit_column
            .ok_or_else(|| "Missing debit column configuration".to_string())?;
        let credit_col = mapping
            .credit_column
            .ok_or_else(|| "Missing credit column configuration".to_string())?;
        let debit = record.get(debit_col).map(str::trim).unwrap_or("");
        let credit = record.get(credit_col).map(str::trim).unwrap_or("");

        match (debit.is_empty(), credit.is_empty()) {
            (false, true) => Ok(-parse_amount(debit, currency)?.abs()),
            (true, false) => Ok(parse_amount(credit, currency)?.abs()),
            (true, true) => Err("neither debit nor credit is set".to_string()),
            (false, false) => Err("both debit and credit are set".to_string()),
        }
    }
}

impl<R: Read> StatementImporter for CsvImporter<R> {
    fn transactions(&mut self) -> AccResult<Vec<ImportedTransaction>> {
        let mut parsed = Vec::new();
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        let records: Vec<StringRecord> = self.reader.records().collect::<Result<_, _>>()?;
        for (idx, record) in records.iter().enumerate() {
            // Row numbers as seen in a spreadsheet
            let row = idx + if self.mapping.has_header { 2 } else { 1 };
            let mut trn = self
                .parse_record(record)
                .map_err(|e| AccError::Import(format!("row {}: {}", row, e)))?;
            if trn.external_ref.is_empty() {
                let content = row_content(&trn);
                let occurrence = occurrences.entry(content.clone()).or_default();
                *occurrence += 1;
                trn.external_ref = content_reference(&content, *occurrence);
            }
            parsed.push(trn);
        }
        Ok(parsed)
    }
}

/// Parse amounts like `-1'234.5`, `1,234.50` or `(12.00)`
fn parse_amount(raw: &str, currency: Currency) -> Result<Money, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '(' | ')'))
        .collect();

    // Parentheses are negative (accounting format)
    let (negative, value) = if cleaned.starts_with('(') && cleaned.ends_with(')') {
        (true, &cleaned[1..cleaned.len() - 1])
    } else if let Some(stripped) = cleaned.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, cleaned.as_str())
    };

    if !value.bytes().any(|b| b.is_ascii_digit()) {
        return Err(format!("Could not parse amount '{}'", raw.trim()));
    }

    let normalized = match value.split_once('.') {
        None => format!("{}.00", value),
        Some((units, fraction)) if fraction.len() == 1 => format!("{}.{}0", units, fraction),
        Some(_) => value.to_string(),
    };
    let units = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized
    };

    Money::parse_dot_notation(&units, currency)
        .map(|m| if negative { -m } else { m })
        .map_err(|e| format!("Could not parse amount '{}': {}", raw.trim(), e))
}

fn row_content(trn: &ImportedTransaction) -> String {
    let signed = match trn.kind {
        TransactionKind::Debit => -trn.amount,
        TransactionKind::Credit => trn.amount,
    };
    format!("{}|{}|{}", trn.date, signed, trn.description)
}

/// Stable reference for rows without a bank reference.
///
/// `occurrence` counts identical rows within one export, so two equal
/// purchases on one day stay two transactions while a second import of the
/// same export still matches.
fn content_reference(content: &str, occurrence: usize) -> String {
    let digest = if occurrence > 1 {
        sha256_hex(format!("{}|{}", content, occurrence).as_bytes())
    } else {
        sha256_hex(content.as_bytes())
    };
    format!("csv-{}", &digest[..16])
}

/// Result of a completed import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of transactions imported
    pub imported: usize,
    /// Number of doubles skipped
    pub duplicates_skipped: usize,
    /// Number of rows in a foreign currency
    pub currency_rejected: usize,
    /// Identifiers of imported transactions
    pub imported_identifiers: Vec<String>,
}

/// Service for statement import
pub struct ImportService<'s> {
    sink: &'s dyn EventSink,
}

impl<'s> ImportService<'s> {
    /// Create a new import service
    pub fn new(sink: &'s dyn EventSink) -> Self {
        Self { sink }
    }

    /// Append everything the importer yields that is not known yet
    pub fn import(
        &self,
        repo: &mut Repository,
        importer: &mut dyn StatementImporter,
    ) -> AccResult<ImportSummary> {
        let incoming = importer.transactions()?;
        let currency = repo.currency();
        let mut summary = ImportSummary::default();

        let mut known: HashSet<String> = repo
            .statement
            .transactions
            .iter()
            .filter(|t| !t.external_ref.is_empty())
            .map(|t| t.external_ref.clone())
            .collect();

        for imported in incoming {
            if imported.amount.currency() != currency {
                self.sink.emit(EngineEvent::warning(format!(
                    "skipped {} from {}: amount {} is not in {}",
                    imported.description, imported.date, imported.amount, currency
                )));
                summary.currency_rejected += 1;
                continue;
            }
            if !known.insert(imported.external_ref.clone()) {
                self.sink.emit(EngineEvent::info(format!(
                    "skipped {} from {}: reference {} is already imported",
                    imported.description, imported.date, imported.external_ref
                )));
                summary.duplicates_skipped += 1;
                continue;
            }

            let identifier =
                suggest_next_identifier(repo.statement.identifiers(), TRANSACTION_PREFIX);
            let mut trn = Transaction::new(
                identifier.clone(),
                imported.kind,
                imported.date,
                imported.amount,
            );
            trn.description = imported.description;
            trn.external_ref = imported.external_ref;
            repo.statement.transactions.push(trn);

            summary.imported += 1;
            summary.imported_identifiers.push(identifier);
        }

        self.sink.emit(EngineEvent::info(format!(
            "imported {} transaction(s), skipped {} double(s), rejected {} in a foreign currency",
            summary.imported, summary.duplicates_skipped, summary.currency_rejected
        )));
        Ok(summary)
    }
}
