//! Session summary and its local reconstruction.

use super::turn::Turn;
use crate::scenario::SessionSummaryPayload;
use crate::scoring::{performance_rating, scale_session};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the summary's score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// Reported by the scenario service as-is.
    Service,
    /// Service summary with gaps filled from the local history.
    Merged,
    /// Computed entirely from the local feedback history.
    Local,
}

/// Per-choice data extracted from the conversation log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackHistory {
    pub evs: Vec<f64>,
    pub categories: Vec<String>,
    pub choices: Vec<String>,
}

impl FeedbackHistory {
    /// Collects scores and categories from `Feedback` turns and choice texts
    /// from `User` turns, in log order.
    pub fn from_conversation(conversation: &[Turn]) -> Self {
        let mut history = FeedbackHistory::default();
        for turn in conversation {
            match turn {
                Turn::Feedback { evs, category, .. } => {
                    history.evs.push(*evs);
                    history.categories.push(category.clone());
                }
                Turn::User { text, .. } => history.choices.push(text.clone()),
                Turn::Manager { .. } | Turn::FinalEvaluation { .. } => {}
            }
        }
        history
    }

    pub fn is_empty(&self) -> bool {
        self.evs.is_empty()
    }
}

/// Normalised result of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Scaled score in `[0, 10]`, one decimal
    pub final_score: f64,
    /// Sum of the per-choice EVS values
    pub raw_score: f64,
    pub choice_count: usize,
    pub rating: String,
    pub rating_description: String,
    pub tactic_counts: BTreeMap<String, u32>,
    pub category_history: Vec<String>,
    pub choice_history: Vec<String>,
    pub evs_history: Vec<f64>,
    pub source: SummarySource,
}

impl SessionSummary {
    /// Computes a summary purely from the client's own history.
    ///
    /// `last_category` stands in for the tactic counts when the history
    /// carries no categories.
    pub fn compute(history: &FeedbackHistory, last_category: Option<&str>) -> Self {
        let score = scale_session(&history.evs);
        let rating = performance_rating(score.final_score);

        SessionSummary {
            final_score: score.final_score,
            raw_score: score.raw_total,
            choice_count: history.evs.len(),
            rating: rating.rating,
            rating_description: rating.description,
            tactic_counts: count_tactics(&history.categories, last_category),
            category_history: history.categories.clone(),
            choice_history: history.choices.clone(),
            evs_history: history.evs.clone(),
            source: SummarySource::Local,
        }
    }

    /// Completes a service-reported summary with local data.
    ///
    /// A missing score is recomputed. A reported score of zero is only
    /// trusted when the local history also scales to zero.
    pub fn reconcile(
        payload: SessionSummaryPayload,
        history: &FeedbackHistory,
        last_category: Option<&str>,
    ) -> Self {
        let local = Self::compute(history, last_category);
        let mut merged = false;

        let evs_history = match payload.evs_history {
            Some(evs) if !evs.is_empty() => evs,
            _ => {
                merged = true;
                local.evs_history.clone()
            }
        };

        let service_score = payload
            .final_score
            .filter(|score| score.is_finite())
            .filter(|score| *score != 0.0 || local.final_score == 0.0 || history.is_empty());
        let (final_score, rating, rating_description) = match service_score {
            Some(score) => {
                let score = score.clamp(0.0, 10.0);
                let band = performance_rating(score);
                (
                    score,
                    payload.rating.unwrap_or(band.rating),
                    payload.rating_description.unwrap_or(band.description),
                )
            }
            None => {
                merged = true;
                (
                    local.final_score,
                    local.rating.clone(),
                    local.rating_description.clone(),
                )
            }
        };

        let category_history = match payload.category_history {
            Some(categories) if !categories.is_empty() => categories,
            _ => local.category_history.clone(),
        };

        let tactic_counts = match payload.tactic_counts {
            Some(counts) if !counts.is_empty() => counts,
            _ => {
                merged = true;
                count_tactics(&category_history, last_category)
            }
        };

        let choice_history = match payload.choice_history {
            Some(choices) if !choices.is_empty() => choices,
            _ => local.choice_history.clone(),
        };

        SessionSummary {
            final_score,
            raw_score: payload
                .raw_score
                .unwrap_or_else(|| evs_history.iter().sum()),
            choice_count: evs_history.len(),
            rating,
            rating_description,
            tactic_counts,
            category_history,
            choice_history,
            evs_history,
            source: if merged {
                SummarySource::Merged
            } else {
                SummarySource::Service
            },
        }
    }

    /// One-line headline, e.g. `8.3/10 - Excellent Ethical Advocate`.
    pub fn headline(&self) -> String {
        format!("{:.1}/10 - {}", self.final_score, self.rating)
    }
}

fn count_tactics(categories: &[String], last_category: Option<&str>) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for category in categories {
        *counts.entry(category.clone()).or_insert(0) += 1;
    }
    if counts.is_empty() {
        if let Some(category) = last_category.filter(|c| !c.is_empty()) {
            counts.insert(category.to_string(), 1);
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(step: u32, evs: f64, category: &str) -> Turn {
        Turn::Feedback {
            step,
            evs,
            category: category.to_string(),
            message: String::new(),
        }
    }

    fn user(step: u32, text: &str) -> Turn {
        Turn::User {
            step,
            choice_index: 0,
            text: text.to_string(),
        }
    }

    fn history(evs: &[f64]) -> FeedbackHistory {
        FeedbackHistory {
            evs: evs.to_vec(),
            categories: evs.iter().map(|_| "Escalation".to_string()).collect(),
            choices: Vec::new(),
        }
    }

    #[test]
    fn history_follows_conversation_order() {
        let conversation = vec![
            Turn::manager("Send the file.", Some("st-1".into())),
            user(1, "Let me check policy."),
            feedback(1, 2.0, "Policy Reference"),
            Turn::manager("Policy is fine.", Some("st-2".into())),
            user(2, "I'll escalate."),
            feedback(2, 3.0, "Escalation"),
        ];

        let history = FeedbackHistory::from_conversation(&conversation);
        assert_eq!(history.evs, vec![2.0, 3.0]);
        assert_eq!(history.categories, vec!["Policy Reference", "Escalation"]);
        assert_eq!(history.choices, vec!["Let me check policy.", "I'll escalate."]);
    }

    #[test]
    fn local_summary_matches_reference_examples() {
        let summary = SessionSummary::compute(&history(&[3.0, 2.0, 1.0]), None);
        assert_eq!(summary.final_score, 8.3);
        assert_eq!(summary.rating, "Excellent Ethical Advocate");
        assert_eq!(summary.raw_score, 6.0);
        assert_eq!(summary.tactic_counts.get("Escalation"), Some(&3));

        let summary = SessionSummary::compute(&history(&[-3.0, -3.0]), None);
        assert_eq!(summary.final_score, 0.0);
        assert_eq!(summary.rating, "Ethical Risk Zone");
    }

    #[test]
    fn local_summary_is_pure() {
        let input = history(&[1.0, -2.0, 3.0, 0.0]);
        assert_eq!(
            SessionSummary::compute(&input, Some("Humor")),
            SessionSummary::compute(&input, Some("Humor"))
        );
    }

    #[test]
    fn tactic_counts_fall_back_to_last_category() {
        let input = FeedbackHistory {
            evs: vec![2.0],
            ..Default::default()
        };
        let summary = SessionSummary::compute(&input, Some("Humor"));
        assert_eq!(summary.tactic_counts.len(), 1);
        assert_eq!(summary.tactic_counts.get("Humor"), Some(&1));
    }

    #[test]
    fn complete_service_summary_is_kept() {
        let payload = SessionSummaryPayload {
            final_score: Some(7.5),
            raw_score: Some(3.0),
            rating: Some("Good Ethical Awareness".to_string()),
            rating_description: Some("Service text".to_string()),
            tactic_counts: Some(BTreeMap::from([("Escalation".to_string(), 2)])),
            category_history: Some(vec!["Escalation".into(), "Escalation".into()]),
            choice_history: Some(vec!["a".into(), "b".into()]),
            evs_history: Some(vec![1.0, 2.0]),
        };
        let summary = SessionSummary::reconcile(payload, &history(&[1.0, 2.0]), None);
        assert_eq!(summary.source, SummarySource::Service);
        assert_eq!(summary.final_score, 7.5);
        assert_eq!(summary.rating_description, "Service text");
    }

    #[test]
    fn missing_score_is_recomputed_locally() {
        let payload = SessionSummaryPayload {
            tactic_counts: Some(BTreeMap::from([("Escalation".to_string(), 3)])),
            ..Default::default()
        };
        let summary = SessionSummary::reconcile(payload, &history(&[3.0, 2.0, 1.0]), None);
        assert_eq!(summary.source, SummarySource::Merged);
        assert_eq!(summary.final_score, 8.3);
        assert_eq!(summary.rating, "Excellent Ethical Advocate");
        assert_eq!(summary.evs_history, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn zero_score_is_replaced_when_history_disagrees() {
        let payload = SessionSummaryPayload {
            final_score: Some(0.0),
            ..Default::default()
        };
        let summary = SessionSummary::reconcile(payload, &history(&[3.0, 3.0]), None);
        assert_eq!(summary.final_score, 10.0);

        let payload = SessionSummaryPayload {
            final_score: Some(0.0),
            ..Default::default()
        };
        let summary = SessionSummary::reconcile(payload, &history(&[-3.0]), None);
        assert_eq!(summary.final_score, 0.0);
    }

    #[test]
    fn headline_formats_one_decimal() {
        let summary = SessionSummary::compute(&history(&[3.0, 3.0]), None);
        assert_eq!(summary.headline(), "10.0/10 - Excellent Ethical Advocate");
    }
}
