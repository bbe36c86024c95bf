//! Scenario domain module.
//!
//! - `model`: scenario descriptor and manager personas
//! - `service`: the scenario service trait and its wire payloads

mod model;
mod service;

pub use model::{ManagerType, Scenario, StartTarget};
pub use service::{
    NextRequest, NextResponse, ScenarioService, SessionSummaryPayload, StartRequest,
    StartResponse, SuggestRequest, SuggestResponse,
};
