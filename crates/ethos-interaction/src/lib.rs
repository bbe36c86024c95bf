//! Remote clients for the scenario service and result persistence.
//!
//! Both endpoints speak JSON over HTTP. `HttpClient` holds the shared
//! transport concerns (base URL, bearer token, timeout, error mapping);
//! the two adapters implement the domain traits from `ethos-core`.

mod client;
mod result_sink;
mod scenario_service;

pub use client::HttpClient;
pub use result_sink::HttpResultSink;
pub use scenario_service::HttpScenarioService;
