//! Embedded side of the live preview: the selection runtime, its markers and
//! the clean export of an edited document.

mod export;
mod frame;
pub mod markers;
mod outline;
mod runtime;

pub use export::clean_snapshot;
pub use export::sanitize_html;
pub use export::serialize_document;
pub use export::strip_instrumentation;
pub use frame::EmbeddedFrame;
pub use outline::OutlineEntry;
pub use outline::element_outline;
pub use runtime::ClickOutcome;
pub use runtime::SelectionRuntime;
pub use runtime::SelectionState;
