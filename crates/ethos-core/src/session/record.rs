//! Persisted practice result and the sink that stores it.

use super::summary::SessionSummary;
use super::turn::Turn;
use crate::error::Result;
use crate::scenario::{ManagerType, Scenario};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One choice as recorded in a saved result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedChoice {
    pub step: u32,
    pub text: String,
    pub category: String,
    pub evs: f64,
}

/// Payload sent to the persistence adapter's `save` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub user_id: String,
    pub manager_type: ManagerType,
    pub scenario_id: String,
    pub selected_choices: Vec<SelectedChoice>,
    /// RFC 3339
    pub timestamp: String,
    pub score: f64,
}

impl PracticeRecord {
    /// Builds the record from a summary and the conversation log.
    ///
    /// Choices are paired by step: each `User` turn with the `Feedback`
    /// turn carrying the same step.
    pub fn from_session(
        user_id: &str,
        scenario: &Scenario,
        summary: &SessionSummary,
        conversation: &[Turn],
    ) -> Self {
        let mut selected_choices = Vec::new();
        for turn in conversation {
            if let Turn::User { step, text, .. } = turn {
                let scored = conversation.iter().find_map(|candidate| match candidate {
                    Turn::Feedback {
                        step: fb_step,
                        evs,
                        category,
                        ..
                    } if fb_step == step => Some((*evs, category.clone())),
                    _ => None,
                });
                if let Some((evs, category)) = scored {
                    selected_choices.push(SelectedChoice {
                        step: *step,
                        text: text.clone(),
                        category,
                        evs,
                    });
                }
            }
        }

        PracticeRecord {
            user_id: user_id.to_string(),
            manager_type: scenario.manager_type,
            scenario_id: scenario.id.clone(),
            selected_choices,
            timestamp: chrono::Utc::now().to_rfc3339(),
            score: summary.final_score,
        }
    }
}

/// External store for completed practice results.
///
/// Callers are responsible for invoking `save` at most once per session.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Stores one completed session's result.
    async fn save(&self, record: &PracticeRecord) -> Result<()>;
}

/// A result whose save failed, kept locally for a later retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingResult {
    pub session_id: String,
    pub record: PracticeRecord,
    /// RFC 3339
    pub cached_at: String,
    /// Number of failed save attempts
    pub attempts: u32,
}

/// Local, best-effort holding area for results the sink rejected.
///
/// Not authoritative: entries may be lost with the local profile. At most
/// one entry is kept per session id.
#[async_trait]
pub trait PendingResultStore: Send + Sync {
    /// Stores or refreshes the entry for `session_id`, bumping its attempt count.
    async fn stash(&self, session_id: &str, record: &PracticeRecord) -> Result<()>;

    /// Lists all pending entries, oldest first.
    async fn pending(&self) -> Result<Vec<PendingResult>>;

    /// Drops the entry for `session_id` if present.
    async fn remove(&self, session_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::summary::FeedbackHistory;

    #[test]
    fn record_pairs_user_and_feedback_turns() {
        let scenario = Scenario {
            id: "privacy-01".to_string(),
            title: "Export".to_string(),
            description: String::new(),
            issue: "privacy".to_string(),
            manager_type: ManagerType::Diluter,
        };
        let conversation = vec![
            Turn::manager("Just export it.", None),
            Turn::User {
                step: 1,
                choice_index: 0,
                text: "Can we anonymise first?".to_string(),
            },
            Turn::Feedback {
                step: 1,
                evs: 2.0,
                category: "Propose Alternative".to_string(),
                message: String::new(),
            },
        ];
        let summary =
            SessionSummary::compute(&FeedbackHistory::from_conversation(&conversation), None);

        let record = PracticeRecord::from_session("user-9", &scenario, &summary, &conversation);

        assert_eq!(record.user_id, "user-9");
        assert_eq!(record.scenario_id, "privacy-01");
        assert_eq!(record.score, summary.final_score);
        assert_eq!(record.selected_choices.len(), 1);
        assert_eq!(record.selected_choices[0].category, "Propose Alternative");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["managerType"], "DILUTER");
        assert!(json["selectedChoices"].is_array());
    }
}
