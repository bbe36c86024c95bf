//! Practice configuration model.

use crate::error::{EthosError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How `request_feedback` delivers the end-of-session feedback.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackMode {
    /// Return a structured report to the caller.
    #[default]
    Direct,
    /// Hand a prompt to the hosting assistant conversation.
    Assistant,
}

/// Settings for a practice client.
///
/// Every field has a default, so an empty `config.toml` is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PracticeConfig {
    /// Base URL of the scenario service
    pub service_base_url: String,
    /// Base URL for result persistence; the service URL when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_base_url: Option<String>,
    /// Bearer token sent to both services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub user_id: String,
    /// Completion cap on conversation entries when the service never
    /// signals completion
    pub max_conversation_entries: usize,
    /// Pause before the manager's next statement appears
    pub typing_delay_ms: u64,
    pub feedback_mode: FeedbackMode,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            service_base_url: "http://localhost:8000/api".to_string(),
            persistence_base_url: None,
            auth_token: None,
            user_id: "anonymous".to_string(),
            max_conversation_entries: 20,
            typing_delay_ms: 800,
            feedback_mode: FeedbackMode::Direct,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl PracticeConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn persistence_url(&self) -> &str {
        self.persistence_base_url
            .as_deref()
            .unwrap_or(&self.service_base_url)
    }

    /// Rejects settings the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_conversation_entries == 0 {
            return Err(EthosError::config(
                "max_conversation_entries must be greater than zero",
            ));
        }
        for (name, url) in [
            ("service_base_url", self.service_base_url.as_str()),
            ("persistence_base_url", self.persistence_url()),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EthosError::config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.user_id.trim().is_empty() {
            return Err(EthosError::config("user_id must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: PracticeConfig = toml::from_str("").unwrap();
        assert_eq!(config, PracticeConfig::default());
        assert_eq!(config.max_conversation_entries, 20);
        assert_eq!(config.typing_delay(), Duration::from_millis(800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config: PracticeConfig = toml::from_str(
            r#"
            service_base_url = "https://ethics.example.com/api"
            max_conversation_entries = 12
            feedback_mode = "assistant"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_conversation_entries, 12);
        assert_eq!(config.feedback_mode, FeedbackMode::Assistant);
        assert_eq!(config.persistence_url(), "https://ethics.example.com/api");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = PracticeConfig {
            max_conversation_entries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PracticeConfig {
            persistence_base_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
