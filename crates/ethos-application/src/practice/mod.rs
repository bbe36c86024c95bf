//! Practice session use cases.
//!
//! - `controller`: the `ScenarioController` state machine
//! - `recorder`: result persistence with a local fallback cache
//! - `report`: direct feedback report and assistant handoff prompt

mod controller;
mod recorder;
mod report;

pub use controller::{FeedbackDelivery, ScenarioController, SubmitOutcome};
pub use recorder::{FlushReport, ResultRecorder};
pub use report::{ChoiceBreakdown, FeedbackReport, render_handoff_prompt};
