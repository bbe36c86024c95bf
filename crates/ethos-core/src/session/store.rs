//! In-memory state of one practice session.

use super::state::ControllerState;
use super::summary::SessionSummary;
use super::turn::{Choice, Turn, reindex_choices};
use crate::error::{EthosError, Result};
use crate::scenario::{Scenario, StartResponse};
use serde::Serialize;

/// Mutable aggregate for one scenario attempt.
///
/// The conversation log is append-only. The current statement and choices
/// are replaced together, so a reader never sees the prompt of one turn
/// paired with the options of another.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStore {
    session_id: String,
    scenario: Scenario,
    conversation: Vec<Turn>,
    current_statement_id: String,
    current_statement: String,
    current_choices: Vec<Choice>,
    /// False while the previous turn's choices are shown during a round trip
    choices_enabled: bool,
    current_step: u32,
    is_complete: bool,
    session_summary: Option<SessionSummary>,
    /// Guards `submit_choice` against re-entry
    processing_choice: bool,
    /// Set once the result has been persisted
    session_saved: bool,
}

impl SessionStore {
    /// Creates the store from the service's start response.
    ///
    /// The first manager statement becomes the first turn of the log.
    pub fn from_start(session_id: impl Into<String>, response: StartResponse) -> Self {
        let scenario = response.scenario();
        let conversation = vec![Turn::manager(
            response.current_statement.clone(),
            Some(response.current_statement_id.clone()),
        )];

        Self {
            session_id: session_id.into(),
            scenario,
            conversation,
            current_statement_id: response.current_statement_id,
            current_statement: response.current_statement,
            current_choices: reindex_choices(response.choices),
            choices_enabled: !response.is_complete,
            current_step: response.current_step,
            is_complete: response.is_complete,
            session_summary: None,
            processing_choice: false,
            session_saved: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    pub fn current_statement_id(&self) -> &str {
        &self.current_statement_id
    }

    pub fn current_statement(&self) -> &str {
        &self.current_statement
    }

    pub fn current_choices(&self) -> &[Choice] {
        &self.current_choices
    }

    pub fn choices_enabled(&self) -> bool {
        self.choices_enabled
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn session_summary(&self) -> Option<&SessionSummary> {
        self.session_summary.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing_choice
    }

    pub fn is_saved(&self) -> bool {
        self.session_saved
    }

    /// Whether a response for `(session_id, statement_id)` still applies.
    pub fn matches(&self, session_id: &str, statement_id: &str) -> bool {
        self.session_id == session_id && self.current_statement_id == statement_id
    }

    /// Looks up a current choice, rejecting out-of-range indices.
    pub fn choice(&self, index: usize) -> Result<&Choice> {
        self.current_choices.get(index).ok_or_else(|| {
            EthosError::validation(format!(
                "choice index {index} is out of range (0..{})",
                self.current_choices.len()
            ))
        })
    }

    /// Takes the processing guard. Returns false if it is already held or
    /// the session is complete.
    pub fn try_begin_processing(&mut self) -> bool {
        if self.processing_choice || self.is_complete {
            return false;
        }
        self.processing_choice = true;
        self.choices_enabled = false;
        true
    }

    /// Releases the processing guard and re-enables the visible choices.
    pub fn finish_processing(&mut self) {
        self.processing_choice = false;
        self.choices_enabled = !self.is_complete && !self.current_choices.is_empty();
    }

    /// Appends the user's pick and its feedback as one pair.
    pub fn record_choice(
        &mut self,
        step: u32,
        choice: &Choice,
        evs: f64,
        category: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.conversation.push(Turn::User {
            step,
            choice_index: choice.index,
            text: choice.text.clone(),
        });
        self.conversation.push(Turn::Feedback {
            step,
            evs,
            category: category.into(),
            message: message.into(),
        });
        self.current_step = self.current_step.max(step);
    }

    /// Appends the next manager statement and swaps in its choices in the
    /// same step, then releases the processing guard.
    pub fn advance(
        &mut self,
        statement_id: impl Into<String>,
        statement: impl Into<String>,
        choices: Vec<Choice>,
    ) {
        let statement_id = statement_id.into();
        let statement = statement.into();
        self.conversation
            .push(Turn::manager(statement.clone(), Some(statement_id.clone())));
        self.current_statement_id = statement_id;
        self.current_statement = statement;
        self.current_choices = reindex_choices(choices);
        self.finish_processing();
    }

    /// Marks the session complete and appends the closing entries.
    ///
    /// The summary is only set if none was recorded before.
    pub fn complete(
        &mut self,
        summary: SessionSummary,
        closing_statement: impl Into<String>,
        final_evaluation: impl Into<String>,
    ) {
        if self.is_complete && self.session_summary.is_some() {
            return;
        }
        if self.session_summary.is_none() {
            self.session_summary = Some(summary);
        }
        self.is_complete = true;
        self.current_choices.clear();
        self.conversation
            .push(Turn::manager(closing_statement.into(), None));
        self.conversation.push(Turn::FinalEvaluation {
            text: final_evaluation.into(),
        });
        self.processing_choice = false;
        self.choices_enabled = false;
    }

    pub fn mark_saved(&mut self) {
        self.session_saved = true;
    }

    /// Snapshot for rendering.
    pub fn view(&self, state: ControllerState) -> SessionView {
        SessionView {
            session_id: self.session_id.clone(),
            scenario: self.scenario.clone(),
            conversation: self.conversation.clone(),
            current_statement_id: self.current_statement_id.clone(),
            current_statement: self.current_statement.clone(),
            current_choices: self.current_choices.clone(),
            choices_enabled: self.choices_enabled,
            current_step: self.current_step,
            is_complete: self.is_complete,
            session_summary: self.session_summary.clone(),
            state,
        }
    }
}

/// Read-only snapshot of a session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub scenario: Scenario,
    pub conversation: Vec<Turn>,
    pub current_statement_id: String,
    pub current_statement: String,
    pub current_choices: Vec<Choice>,
    pub choices_enabled: bool,
    pub current_step: u32,
    pub is_complete: bool,
    pub session_summary: Option<SessionSummary>,
    pub state: ControllerState,
}
