use serde::Serialize;

use crate::session::{SessionSummary, Turn};

/// Events a practice controller publishes to its host.
///
/// The host (a REPL, a chat window) subscribes through a channel; this is
/// the only way practice results reach the surrounding conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PracticeEvent {
    SessionStarted {
        session_id: String,
        scenario_id: String,
    },
    /// A turn was appended to the conversation log.
    TurnAppended { session_id: String, turn: Turn },
    /// The manager is "typing"; stale choices are shown disabled.
    ManagerTyping { session_id: String },
    /// The next statement and its choices are in place.
    ChoicesReady { session_id: String, step: u32 },
    SessionCompleted {
        session_id: String,
        summary: SessionSummary,
    },
    /// Saving the result failed; the data is kept for a later retry.
    PersistenceFailed { session_id: String, message: String },
    /// Structured prompt for the hosting assistant conversation.
    AssistantHandoff { session_id: String, prompt: String },
}

impl PracticeEvent {
    pub fn session_id(&self) -> &str {
        match self {
            PracticeEvent::SessionStarted { session_id, .. }
            | PracticeEvent::TurnAppended { session_id, .. }
            | PracticeEvent::ManagerTyping { session_id }
            | PracticeEvent::ChoicesReady { session_id, .. }
            | PracticeEvent::SessionCompleted { session_id, .. }
            | PracticeEvent::PersistenceFailed { session_id, .. }
            | PracticeEvent::AssistantHandoff { session_id, .. } => session_id,
        }
    }
}
