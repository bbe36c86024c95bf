//! HttpResultSink - persistence adapter that posts results to a REST store.

use crate::client::HttpClient;
use async_trait::async_trait;
use ethos_core::config::PracticeConfig;
use ethos_core::session::{PracticeRecord, ResultSink};
use ethos_core::{EthosError, Result};

const SAVE_PATH: &str = "practice-results";

/// Result store reached over HTTP.
#[derive(Clone)]
pub struct HttpResultSink {
    client: HttpClient,
}

impl HttpResultSink {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &PracticeConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::for_persistence(config)?))
    }
}

#[async_trait]
impl ResultSink for HttpResultSink {
    async fn save(&self, record: &PracticeRecord) -> Result<()> {
        self.client
            .post_json_ack(SAVE_PATH, record)
            .await
            .map_err(|err| EthosError::persistence(err.to_string()))
    }
}
