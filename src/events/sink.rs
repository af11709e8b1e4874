//! Event sinks

use std::sync::Mutex;

use super::event::EngineEvent;

/// Receives events from the engine
pub trait EventSink {
    fn emit(&self, event: EngineEvent);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Forwards events to `tracing` with structured fields
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: EngineEvent) {
        match &event {
            EngineEvent::Info { message } => tracing::info!("{}", message),
            EngineEvent::Warning { message } => tracing::warn!("{}", message),
            EngineEvent::Error { message } => tracing::error!("{}", message),
            EngineEvent::DanglingReference {
                owner,
                field,
                target,
                id,
            } => tracing::warn!(%owner, %field, %target, %id, "dangling reference"),
            EngineEvent::MatchFound {
                transaction,
                document,
            } => tracing::info!(%transaction, %document, "match found"),
            EngineEvent::AmountMismatch {
                transaction,
                document,
                expected,
                actual,
            } => tracing::warn!(%transaction, %document, %expected, %actual, "amount mismatch"),
            EngineEvent::ManualCorrection { element } => {
                tracing::warn!(%element, "journal entry needs manual correction")
            }
        }
    }
}

/// Keeps every event in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<EngineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far
    pub fn events(&self) -> Vec<EngineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: EngineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit(EngineEvent::info("first"));
        sink.emit(EngineEvent::warning("second"));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], EngineEvent::info("first"));
        assert_eq!(events[1], EngineEvent::warning("second"));
    }

    #[test]
    fn test_sinks_as_trait_objects() {
        let sinks: Vec<Box<dyn EventSink>> = vec![Box::new(NullSink), Box::new(TracingSink)];
        for sink in &sinks {
            sink.emit(EngineEvent::info("ignored"));
        }
    }
}
