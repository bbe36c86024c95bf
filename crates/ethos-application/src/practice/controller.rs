//! Practice session state machine.

use super::recorder::ResultRecorder;
use super::report::{FeedbackReport, render_handoff_prompt};
use ethos_core::config::{FeedbackMode, PracticeConfig};
use ethos_core::error::{EthosError, Result};
use ethos_core::event::PracticeEvent;
use ethos_core::scenario::{
    NextRequest, NextResponse, ScenarioService, SessionSummaryPayload, StartTarget,
};
use ethos_core::scoring::classify;
use ethos_core::session::{
    Choice, ControllerState, FeedbackHistory, PracticeRecord, SessionStore, SessionSummary,
    SessionView, Turn,
};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

const CLOSING_STATEMENT: &str =
    "That's the end of this conversation. Let's look at how you handled it.";

/// Result of `submit_choice`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The next statement and its choices are in place.
    Advanced { step: u32 },
    /// The choice ended the session.
    Completed(SessionSummary),
    /// Refused without contacting the service.
    Ignored { state: ControllerState },
    /// The response arrived for a session or statement that is no longer current.
    Discarded,
}

/// Result of `request_feedback`.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackDelivery {
    Report(FeedbackReport),
    /// The prompt was sent to the host as `PracticeEvent::AssistantHandoff`.
    HandedOff { prompt: String },
}

struct ControllerInner {
    state: ControllerState,
    session: Option<SessionStore>,
}

/// Drives one practice session at a time against a scenario service.
///
/// All methods take `&self`. The session lock is never held across a
/// service call or the typing delay, so responses are checked for
/// correlation before they are applied.
pub struct ScenarioController {
    service: Arc<dyn ScenarioService>,
    recorder: ResultRecorder,
    config: PracticeConfig,
    inner: Mutex<ControllerInner>,
    /// Serializes saves so a session is never saved twice
    persisting: Mutex<()>,
    events: Option<mpsc::UnboundedSender<PracticeEvent>>,
}

impl ScenarioController {
    pub fn new(
        service: Arc<dyn ScenarioService>,
        recorder: ResultRecorder,
        config: PracticeConfig,
    ) -> Self {
        Self {
            service,
            recorder,
            config,
            inner: Mutex::new(ControllerInner {
                state: ControllerState::Idle,
                session: None,
            }),
            persisting: Mutex::new(()),
            events: None,
        }
    }

    /// Publishes practice events to `sender`.
    pub fn with_event_sender(mut self, sender: mpsc::UnboundedSender<PracticeEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Creates a controller together with the receiving end of its events.
    pub fn with_events(self) -> (Self, mpsc::UnboundedReceiver<PracticeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.with_event_sender(tx), rx)
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn recorder(&self) -> &ResultRecorder {
        &self.recorder
    }

    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    /// Snapshot of the current session, if any.
    pub async fn view(&self) -> Option<SessionView> {
        let inner = self.inner.lock().await;
        inner.session.as_ref().map(|s| s.view(inner.state))
    }

    /// Starts a new session, replacing the current one on success.
    ///
    /// A failed start leaves the current session untouched.
    pub async fn start(&self, target: StartTarget) -> Result<SessionView> {
        let previous = {
            let mut inner = self.inner.lock().await;
            let previous = inner.state;
            transition(&mut inner, ControllerState::Starting, "start")?;
            previous
        };

        let session_id = uuid::Uuid::new_v4().to_string();
        match self.open_session(&target, &session_id).await {
            Ok(store) => {
                let mut inner = self.inner.lock().await;
                inner.state = if store.is_complete() {
                    ControllerState::Complete
                } else {
                    ControllerState::AwaitingChoice
                };
                info!(
                    target: "ethos::controller",
                    session_id = %session_id,
                    scenario_id = %store.scenario().id,
                    manager_type = %store.scenario().manager_type,
                    "practice session started"
                );
                self.emit(PracticeEvent::SessionStarted {
                    session_id: session_id.clone(),
                    scenario_id: store.scenario().id.clone(),
                });
                for turn in store.conversation() {
                    self.emit_turn(&session_id, turn);
                }
                let view = store.view(inner.state);
                inner.session = Some(store);
                Ok(view)
            }
            Err(e) => {
                let mut inner = self.inner.lock().await;
                inner.state = settled_state(inner.session.as_ref(), previous);
                warn!(target: "ethos::controller", "starting session failed: {}", e);
                Err(e)
            }
        }
    }

    async fn open_session(&self, target: &StartTarget, session_id: &str) -> Result<SessionStore> {
        let scenario_id = match target {
            StartTarget::Scenario(id) => id.clone(),
            StartTarget::Query(query) => {
                let suggestion = self.service.suggest(query).await?;
                debug!(
                    target: "ethos::controller",
                    scenario_id = %suggestion.scenario_id,
                    issue = %suggestion.issue,
                    "scenario suggested"
                );
                suggestion.scenario_id
            }
        };

        let response = self.service.start(&scenario_id, session_id).await?;
        if response.session_id != session_id {
            warn!(
                target: "ethos::controller",
                expected = session_id,
                received = %response.session_id,
                "service echoed a different session id"
            );
        }
        Ok(SessionStore::from_start(session_id, response))
    }

    /// Submits the choice at `index` for the current statement.
    ///
    /// Refused while another submission is in flight or after completion.
    /// On a service error nothing is appended and the choice can be retried.
    pub async fn submit_choice(&self, index: usize) -> Result<SubmitOutcome> {
        let (request, choice) = {
            let mut inner = self.inner.lock().await;
            let state = inner.state;
            let Some(session) = inner.session.as_mut() else {
                return Err(EthosError::invalid_state("submit_choice", state));
            };
            if !state.accepts_choice() || session.is_processing() || session.is_complete() {
                debug!(target: "ethos::controller", %state, index, "choice ignored");
                return Ok(SubmitOutcome::Ignored { state });
            }
            let choice = session.choice(index)?.clone();
            session.try_begin_processing();
            let request = NextRequest {
                session_id: session.session_id().to_string(),
                choice_index: choice.index,
                current_statement_id: session.current_statement_id().to_string(),
            };
            transition(&mut inner, ControllerState::Processing, "submit_choice")?;
            (request, choice)
        };

        let result = self.service.next(&request).await;

        let mut inner = self.inner.lock().await;
        if !is_current(&inner, &request, ControllerState::Processing) {
            release_stale_guard(&mut inner, &request.session_id);
            debug!(
                target: "ethos::controller",
                session_id = %request.session_id,
                statement_id = %request.current_statement_id,
                "discarding late response"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if let Some(session) = inner.session.as_mut() {
                    session.finish_processing();
                }
                inner.state = ControllerState::AwaitingChoice;
                warn!(
                    target: "ethos::controller",
                    session_id = %request.session_id,
                    retryable = e.is_retryable(),
                    "submitting choice failed: {}",
                    e
                );
                return Err(e);
            }
        };

        let (step, complete) = self.apply_response(&mut inner, &choice, &response)?;

        if complete {
            drop(inner);
            return self.complete_session(&request, &response).await;
        }

        transition(&mut inner, ControllerState::ManagerResponding, "submit_choice")?;
        self.emit(PracticeEvent::ManagerTyping {
            session_id: request.session_id.clone(),
        });
        drop(inner);

        tokio::time::sleep(self.config.typing_delay()).await;

        let mut inner = self.inner.lock().await;
        if !is_current(&inner, &request, ControllerState::ManagerResponding) {
            release_stale_guard(&mut inner, &request.session_id);
            debug!(
                target: "ethos::controller",
                session_id = %request.session_id,
                "discarding next statement for abandoned session"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        let next_statement_id = response.next_statement_id.clone().unwrap_or_default();
        let next_statement = response.next_statement.clone().unwrap_or_default();
        let next_choices = response.next_choices.clone().unwrap_or_default();
        let Some(session) = inner.session.as_mut() else {
            return Ok(SubmitOutcome::Discarded);
        };
        session.advance(next_statement_id, next_statement, next_choices);
        if let Some(turn) = session.conversation().last() {
            self.emit_turn(&request.session_id, turn);
        }
        transition(&mut inner, ControllerState::AwaitingChoice, "submit_choice")?;
        self.emit(PracticeEvent::ChoicesReady {
            session_id: request.session_id.clone(),
            step,
        });

        Ok(SubmitOutcome::Advanced { step })
    }

    /// Appends the user/feedback pair and decides whether the session ends.
    fn apply_response(
        &self,
        inner: &mut ControllerInner,
        choice: &Choice,
        response: &NextResponse,
    ) -> Result<(u32, bool)> {
        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| EthosError::internal("session vanished while processing"))?;

        let step = (session.current_step() + 1).max(response.current_step);
        let message = classify(response.evs, &response.category);
        session.record_choice(step, choice, response.evs, &response.category, message);

        let appended = session.conversation().len();
        for turn in &session.conversation()[appended - 2..] {
            self.emit_turn(session.session_id(), turn);
        }

        let has_next = response.next_statement.is_some()
            && response.next_statement_id.is_some()
            && response.next_choices.as_ref().is_some_and(|c| !c.is_empty());
        let capped = appended >= self.config.max_conversation_entries;
        if capped && !response.is_complete {
            info!(
                target: "ethos::controller",
                session_id = %session.session_id(),
                entries = appended,
                "conversation cap reached, completing session"
            );
        }
        if !response.is_complete && !capped && !has_next {
            warn!(
                target: "ethos::controller",
                session_id = %session.session_id(),
                "service sent no next statement or choices, completing session"
            );
        }

        Ok((step, response.is_complete || capped || !has_next))
    }

    /// Resolves the summary, closes the session, and persists the result.
    ///
    /// The summary is fetched without holding the session lock, so the
    /// session is checked again before it is closed.
    async fn complete_session(
        &self,
        request: &NextRequest,
        response: &NextResponse,
    ) -> Result<SubmitOutcome> {
        let payload = match response.session_summary.clone() {
            Some(payload) => Some(payload),
            None => match self.service.feedback(&request.session_id).await {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!(
                        target: "ethos::controller",
                        session_id = %request.session_id,
                        "summary fetch failed, computing locally: {}",
                        e
                    );
                    None
                }
            },
        };

        let summary = {
            let mut inner = self.inner.lock().await;
            if !is_current(&inner, request, ControllerState::Processing) {
                release_stale_guard(&mut inner, &request.session_id);
                debug!(
                    target: "ethos::controller",
                    session_id = %request.session_id,
                    "discarding summary for abandoned session"
                );
                return Ok(SubmitOutcome::Discarded);
            }
            self.close_session(&mut inner, response, payload)?
        };

        self.persist_once().await;
        Ok(SubmitOutcome::Completed(summary))
    }

    fn close_session(
        &self,
        inner: &mut ControllerInner,
        response: &NextResponse,
        payload: Option<SessionSummaryPayload>,
    ) -> Result<SessionSummary> {
        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| EthosError::internal("session vanished while completing"))?;
        let history = FeedbackHistory::from_conversation(session.conversation());
        let last_category = Some(response.category.as_str());
        let summary = match payload {
            Some(payload) => SessionSummary::reconcile(payload, &history, last_category),
            None => SessionSummary::compute(&history, last_category),
        };

        let closing = if response.is_complete {
            response
                .next_statement
                .clone()
                .unwrap_or_else(|| CLOSING_STATEMENT.to_string())
        } else {
            CLOSING_STATEMENT.to_string()
        };
        let evaluation = format!(
            "Final Score: {}\n{}",
            summary.headline(),
            summary.rating_description
        );
        let before = session.conversation().len();
        session.complete(summary, closing, evaluation);
        let summary = session
            .session_summary()
            .cloned()
            .ok_or_else(|| EthosError::internal("completed session has no summary"))?;

        let session_id = session.session_id().to_string();
        for turn in &session.conversation()[before..] {
            self.emit_turn(&session_id, turn);
        }
        transition(inner, ControllerState::Complete, "submit_choice")?;
        info!(
            target: "ethos::controller",
            session_id = %session_id,
            score = summary.final_score,
            source = ?summary.source,
            "practice session complete"
        );
        self.emit(PracticeEvent::SessionCompleted {
            session_id,
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Saves the live session if it is complete and not yet saved.
    ///
    /// Failures are reported as `PersistenceFailed` events; the session
    /// stays unsaved so a later trigger retries.
    async fn persist_once(&self) {
        let _saving = self.persisting.lock().await;
        let (session_id, record) = {
            let inner = self.inner.lock().await;
            let Some(session) = inner.session.as_ref() else {
                return;
            };
            if session.is_saved() || !session.is_complete() {
                return;
            }
            let Some(summary) = session.session_summary() else {
                return;
            };
            let record = PracticeRecord::from_session(
                &self.config.user_id,
                session.scenario(),
                summary,
                session.conversation(),
            );
            (session.session_id().to_string(), record)
        };

        match self.recorder.record(&session_id, &record).await {
            Ok(()) => {
                let mut inner = self.inner.lock().await;
                if let Some(session) = inner
                    .session
                    .as_mut()
                    .filter(|s| s.session_id() == session_id)
                {
                    session.mark_saved();
                }
            }
            Err(e) => self.emit(PracticeEvent::PersistenceFailed {
                session_id,
                message: e.to_string(),
            }),
        }
    }

    /// Delivers end-of-session feedback. Only valid once the session is complete.
    pub async fn request_feedback(&self) -> Result<FeedbackDelivery> {
        let state = self.inner.lock().await.state;
        if !state.is_terminal() {
            return Err(EthosError::invalid_state("request_feedback", state));
        }

        self.persist_once().await;

        let mut inner = self.inner.lock().await;
        transition(&mut inner, ControllerState::FeedbackRequested, "request_feedback")?;

        let session = inner
            .session
            .as_ref()
            .ok_or_else(|| EthosError::invalid_state("request_feedback", "no session"))?;
        let summary = session.session_summary().cloned().unwrap_or_else(|| {
            SessionSummary::compute(&FeedbackHistory::from_conversation(session.conversation()), None)
        });
        let report = FeedbackReport::build(session.scenario(), &summary, session.conversation());

        match self.config.feedback_mode {
            FeedbackMode::Direct => Ok(FeedbackDelivery::Report(report)),
            FeedbackMode::Assistant => {
                let prompt = render_handoff_prompt(&report)?;
                info!(
                    target: "ethos::controller",
                    session_id = %session.session_id(),
                    "handing feedback off to assistant"
                );
                self.emit(PracticeEvent::AssistantHandoff {
                    session_id: session.session_id().to_string(),
                    prompt: prompt.clone(),
                });
                Ok(FeedbackDelivery::HandedOff { prompt })
            }
        }
    }

    /// Starts the current scenario over with a fresh session.
    ///
    /// A completed session that was never saved is saved first (best-effort).
    pub async fn restart(&self) -> Result<SessionView> {
        let scenario_id = {
            let mut inner = self.inner.lock().await;
            let scenario_id = inner
                .session
                .as_ref()
                .map(|s| s.scenario().id.clone())
                .ok_or_else(|| EthosError::invalid_state("restart", inner.state))?;
            transition(&mut inner, ControllerState::Restarting, "restart")?;
            scenario_id
        };

        self.persist_once().await;
        {
            let mut inner = self.inner.lock().await;
            if inner.state != ControllerState::Restarting {
                return Err(EthosError::invalid_state("restart", inner.state));
            }
            inner.session = None;
        }

        info!(target: "ethos::controller", scenario_id = %scenario_id, "restarting scenario");
        self.start(StartTarget::Scenario(scenario_id)).await
    }

    fn emit(&self, event: PracticeEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is listening
            let _ = events.send(event);
        }
    }

    fn emit_turn(&self, session_id: &str, turn: &Turn) {
        self.emit(PracticeEvent::TurnAppended {
            session_id: session_id.to_string(),
            turn: turn.clone(),
        });
    }
}

fn transition(
    inner: &mut ControllerInner,
    to: ControllerState,
    operation: &'static str,
) -> Result<()> {
    if !inner.state.can_transition_to(to) {
        return Err(EthosError::invalid_state(operation, inner.state));
    }
    debug!(target: "ethos::controller", from = %inner.state, %to, "state transition");
    inner.state = to;
    Ok(())
}

/// Whether a response to `request` still applies to the live session.
fn is_current(inner: &ControllerInner, request: &NextRequest, expected: ControllerState) -> bool {
    inner.state == expected
        && inner.session.as_ref().is_some_and(|s| {
            s.matches(&request.session_id, &request.current_statement_id) && s.is_processing()
        })
}

/// Frees the guard of a submission whose response was dropped.
fn release_stale_guard(inner: &mut ControllerInner, session_id: &str) {
    if let Some(session) = inner.session.as_mut() {
        if session.session_id() == session_id && session.is_processing() {
            session.finish_processing();
        }
    }
}

/// State to return to after a failed start.
fn settled_state(session: Option<&SessionStore>, previous: ControllerState) -> ControllerState {
    match session {
        None => ControllerState::Idle,
        Some(_) if previous.is_terminal() => previous,
        Some(s) if s.is_complete() => ControllerState::Complete,
        // A submission is still in flight and will settle the state itself
        Some(s) if s.is_processing() => previous,
        Some(_) => ControllerState::AwaitingChoice,
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
