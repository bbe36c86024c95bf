pub mod practice;

pub use practice::{
    ChoiceBreakdown, FeedbackDelivery, FeedbackReport, FlushReport, ResultRecorder,
    ScenarioController, SubmitOutcome, render_handoff_prompt,
};
