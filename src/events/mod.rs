//! Engine event reporting
//!
//! The core never logs on its own. It reports typed events to an injected
//! [`EventSink`]; the CLI forwards them to `tracing`, tests record them.
//!
//! # Example
//!
//! ```rust,ignore
//! use acc::events::{EngineEvent, MemorySink, EventSink};
//!
//! let sink = MemorySink::new();
//! sink.emit(EngineEvent::info("loaded 12 expenses"));
//! assert_eq!(sink.events().len(), 1);
//! ```

mod event;
mod sink;

pub use event::{EngineEvent, EventLevel};
pub use sink::{EventSink, MemorySink, NullSink, TracingSink};
