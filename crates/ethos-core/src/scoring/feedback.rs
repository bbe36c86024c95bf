//! Per-choice feedback classification.

use serde::{Deserialize, Serialize};

use super::tactic::tactic_type;

/// Feedback tier selected from a raw per-choice EVS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    /// `evs >= 3`
    StrongPraise,
    /// `evs >= 2`
    Praise,
    /// `evs >= 1`
    MildApproval,
    /// `evs >= 0`
    Caution,
    /// `evs < 0`
    Warning,
}

impl FeedbackTier {
    /// Selects the tier for a raw score. Thresholds are inclusive lower bounds.
    pub fn for_evs(evs: f64) -> Self {
        if evs >= 3.0 {
            FeedbackTier::StrongPraise
        } else if evs >= 2.0 {
            FeedbackTier::Praise
        } else if evs >= 1.0 {
            FeedbackTier::MildApproval
        } else if evs >= 0.0 {
            FeedbackTier::Caution
        } else {
            FeedbackTier::Warning
        }
    }
}

/// Builds the human-readable message shown after a choice.
///
/// The message names the chosen category and its tactic family.
pub fn classify(evs: f64, category: &str) -> String {
    let family = tactic_type(category);
    match FeedbackTier::for_evs(evs) {
        FeedbackTier::StrongPraise => format!(
            "Excellent! Using {category} is a highly effective {family} approach. \
             You held your ethical ground while keeping the conversation constructive."
        ),
        FeedbackTier::Praise => format!(
            "Good choice. {category} is a solid {family} approach that pushes back on the \
             unethical request."
        ),
        FeedbackTier::MildApproval => format!(
            "A reasonable start. {category} shows some ethical awareness as a {family} approach, \
             but you could advocate more firmly."
        ),
        FeedbackTier::Caution => format!(
            "Be careful. {category} as a {family} approach does little to challenge the request \
             and may leave the ethical issue unaddressed."
        ),
        FeedbackTier::Warning => format!(
            "Warning: {category} as a {family} approach moves toward going along with the \
             unethical request. Consider how you could push back instead."
        ),
    }
}
