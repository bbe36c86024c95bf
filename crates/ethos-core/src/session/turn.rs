//! Conversation log entries.

use serde::{Deserialize, Serialize};

/// A response option for the current manager statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// 0-based position, stable within a turn
    #[serde(default)]
    pub index: usize,
    pub text: String,
    /// Tactic category label
    pub category: String,
}

impl Choice {
    pub fn new(index: usize, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            category: category.into(),
        }
    }
}

/// Renumbers choices by position.
///
/// The service may omit indices; the position in the list is authoritative.
pub fn reindex_choices(mut choices: Vec<Choice>) -> Vec<Choice> {
    for (position, choice) in choices.iter_mut().enumerate() {
        choice.index = position;
    }
    choices
}

/// One atomic entry in the conversation log.
///
/// Feedback-specific data only exists on the `Feedback` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Turn {
    /// Manager prompt.
    Manager {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        statement_id: Option<String>,
    },
    /// The text of the option the user picked.
    User {
        step: u32,
        choice_index: usize,
        text: String,
    },
    /// Score for the user turn with the same step.
    Feedback {
        step: u32,
        evs: f64,
        category: String,
        message: String,
    },
    /// Closing evaluation, appended once at session end.
    FinalEvaluation { text: String },
}

impl Turn {
    pub fn manager(text: impl Into<String>, statement_id: Option<String>) -> Self {
        Turn::Manager {
            text: text.into(),
            statement_id,
        }
    }

    /// Displayable text of the entry.
    pub fn text(&self) -> &str {
        match self {
            Turn::Manager { text, .. } | Turn::User { text, .. } | Turn::FinalEvaluation { text } => {
                text
            }
            Turn::Feedback { message, .. } => message,
        }
    }

    pub fn is_feedback(&self) -> bool {
        matches!(self, Turn::Feedback { .. })
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Turn::User { .. })
    }
}
