//! Controller lifecycle states.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle state of a practice session controller.
///
/// ```text
/// Idle -> Starting -> AwaitingChoice <-> Processing <-> ManagerResponding
///                                    -> Complete -> FeedbackRequested | Restarting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Starting,
    AwaitingChoice,
    Processing,
    ManagerResponding,
    Complete,
    FeedbackRequested,
    Restarting,
}

impl ControllerState {
    /// States reachable from this one.
    pub fn allowed_transitions(self) -> &'static [ControllerState] {
        use ControllerState::*;
        match self {
            Idle => &[Starting],
            // A failed start falls back to wherever the controller was
            Starting => &[AwaitingChoice, Complete, Idle],
            AwaitingChoice => &[Processing, Starting, Restarting, Idle],
            Processing => &[ManagerResponding, Complete, AwaitingChoice, Starting, Idle],
            // The user/feedback pair is already appended, so the statement must land
            ManagerResponding => &[AwaitingChoice, Complete, Idle],
            Complete => &[FeedbackRequested, Restarting, Starting, Idle],
            FeedbackRequested => &[FeedbackRequested, Restarting, Starting, Idle],
            Restarting => &[Starting, Complete, Idle],
        }
    }

    pub fn can_transition_to(self, to: ControllerState) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Whether a choice submission is accepted in this state.
    pub fn accepts_choice(self) -> bool {
        self == ControllerState::AwaitingChoice
    }

    /// Whether the session has reached its terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ControllerState::Complete | ControllerState::FeedbackRequested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerState::*;

    #[test]
    fn turn_cycle_is_allowed() {
        assert!(Idle.can_transition_to(Starting));
        assert!(Starting.can_transition_to(AwaitingChoice));
        assert!(AwaitingChoice.can_transition_to(Processing));
        assert!(Processing.can_transition_to(ManagerResponding));
        assert!(ManagerResponding.can_transition_to(AwaitingChoice));
        assert!(Processing.can_transition_to(Complete));
        assert!(Complete.can_transition_to(FeedbackRequested));
        assert!(Complete.can_transition_to(Restarting));
    }

    #[test]
    fn shortcuts_are_rejected() {
        assert!(!Idle.can_transition_to(Processing));
        assert!(!AwaitingChoice.can_transition_to(Complete));
        assert!(!Complete.can_transition_to(Processing));
        assert!(!Idle.can_transition_to(FeedbackRequested));
        assert!(!ManagerResponding.can_transition_to(Starting));
        assert!(!ManagerResponding.can_transition_to(Restarting));
        assert!(!Processing.can_transition_to(Restarting));
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(ManagerResponding.to_string(), "manager_responding");
        assert!(AwaitingChoice.accepts_choice());
        assert!(!Processing.accepts_choice());
        assert!(FeedbackRequested.is_terminal());
    }
}
