//! Session domain module.
//!
//! # Module Structure
//!
//! - `turn`: conversation log entries (`Turn`) and response options (`Choice`)
//! - `store`: the in-memory session aggregate (`SessionStore`) and its view
//! - `state`: controller lifecycle states (`ControllerState`)
//! - `summary`: session summary and its local reconstruction
//! - `record`: persisted result payload, the `ResultSink` trait, and the
//!   local `PendingResultStore` for failed saves

mod record;
mod state;
mod store;
mod summary;
mod turn;

// Re-export public API
pub use record::{PendingResult, PendingResultStore, PracticeRecord, ResultSink, SelectedChoice};
pub use state::ControllerState;
pub use store::{SessionStore, SessionView};
pub use summary::{FeedbackHistory, SessionSummary, SummarySource};
pub use turn::{Choice, Turn, reindex_choices};
