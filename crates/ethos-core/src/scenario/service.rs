//! Scenario service boundary.
//!
//! The scenario service owns dialogue generation and scoring of individual
//! choices. The controller only sees the request/response shapes below,
//! which mirror the service's JSON payloads field for field.

use super::model::{ManagerType, Scenario};
use crate::error::Result;
use crate::session::Choice;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remote service that drives the manager side of a practice session.
#[async_trait]
pub trait ScenarioService: Send + Sync {
    /// Suggests a scenario for a free-text query.
    async fn suggest(&self, query: &str) -> Result<SuggestResponse>;

    /// Starts a scenario under a client-generated session id.
    async fn start(&self, scenario_id: &str, session_id: &str) -> Result<StartResponse>;

    /// Submits the user's choice for the current statement.
    async fn next(&self, request: &NextRequest) -> Result<NextResponse>;

    /// Fetches the session summary when `next` did not include one.
    async fn feedback(&self, session_id: &str) -> Result<SessionSummaryPayload>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub scenario_id: String,
    pub issue: String,
    pub manager_type: ManagerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub scenario_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session_id: String,
    pub scenario_id: String,
    pub scenario_title: String,
    pub scenario_description: String,
    pub issue: String,
    pub manager_type: ManagerType,
    pub current_statement_id: String,
    pub current_statement: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub is_complete: bool,
}

impl StartResponse {
    /// Extracts the immutable scenario descriptor.
    pub fn scenario(&self) -> Scenario {
        Scenario {
            id: self.scenario_id.clone(),
            title: self.scenario_title.clone(),
            description: self.scenario_description.clone(),
            issue: self.issue.clone(),
            manager_type: self.manager_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextRequest {
    pub session_id: String,
    pub choice_index: usize,
    pub current_statement_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_statement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub current_step: u32,
    pub evs: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_summary: Option<SessionSummaryPayload>,
}

/// Session summary as the service reports it.
///
/// Every field is optional on the wire; missing values are filled in from
/// the client's own feedback history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSummaryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tactic_counts: Option<BTreeMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_history: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_history: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evs_history: Option<Vec<f64>>,
}
