//! HttpScenarioService - REST client for the scenario service.

use crate::client::HttpClient;
use async_trait::async_trait;
use ethos_core::Result;
use ethos_core::config::PracticeConfig;
use ethos_core::scenario::{
    NextRequest, NextResponse, ScenarioService, SessionSummaryPayload, StartRequest,
    StartResponse, SuggestRequest, SuggestResponse,
};

const SUGGEST_PATH: &str = "scenarios/suggest";
const START_PATH: &str = "scenarios/start";
const NEXT_PATH: &str = "scenarios/next";

/// Scenario service reached over HTTP.
#[derive(Clone)]
pub struct HttpScenarioService {
    client: HttpClient,
}

impl HttpScenarioService {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &PracticeConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::for_service(config)?))
    }
}

#[async_trait]
impl ScenarioService for HttpScenarioService {
    async fn suggest(&self, query: &str) -> Result<SuggestResponse> {
        tracing::debug!(target: "ethos::service", query, "suggesting scenario");
        let body = SuggestRequest {
            query: query.to_string(),
        };
        self.client.post_json(SUGGEST_PATH, &body).await
    }

    async fn start(&self, scenario_id: &str, session_id: &str) -> Result<StartResponse> {
        tracing::debug!(target: "ethos::service", scenario_id, session_id, "starting scenario");
        let body = StartRequest {
            scenario_id: scenario_id.to_string(),
            session_id: session_id.to_string(),
        };
        self.client.post_json(START_PATH, &body).await
    }

    async fn next(&self, request: &NextRequest) -> Result<NextResponse> {
        tracing::debug!(
            target: "ethos::service",
            session_id = %request.session_id,
            choice_index = request.choice_index,
            "submitting choice"
        );
        self.client.post_json(NEXT_PATH, request).await
    }

    async fn feedback(&self, session_id: &str) -> Result<SessionSummaryPayload> {
        tracing::debug!(target: "ethos::service", session_id, "fetching session summary");
        self.client
            .get_json(&format!("scenarios/{session_id}/feedback"))
            .await
    }
}
