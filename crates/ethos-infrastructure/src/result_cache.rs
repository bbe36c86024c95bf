//! TOML-backed holding area for results that could not be saved remotely.

use crate::paths::EthosPaths;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use ethos_core::Result;
use ethos_core::session::{PendingResult, PendingResultStore, PracticeRecord};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PendingResultsFile {
    #[serde(default)]
    pending: Vec<PendingResult>,
}

/// Pending results stored in `pending_results.toml`.
///
/// Best-effort only: the remote result store stays the source of truth.
pub struct TomlResultCache {
    file: AtomicTomlFile<PendingResultsFile>,
}

impl TomlResultCache {
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Uses `~/.local/share/ethos/pending_results.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(EthosPaths::pending_results_file()?))
    }
}

#[async_trait]
impl PendingResultStore for TomlResultCache {
    async fn stash(&self, session_id: &str, record: &PracticeRecord) -> Result<()> {
        let attempts = self.file.update(PendingResultsFile::default(), |data| {
            let now = chrono::Utc::now().to_rfc3339();
            match data.pending.iter_mut().find(|p| p.session_id == session_id) {
                Some(existing) => {
                    existing.record = record.clone();
                    existing.attempts += 1;
                    existing.attempts
                }
                None => {
                    data.pending.push(PendingResult {
                        session_id: session_id.to_string(),
                        record: record.clone(),
                        cached_at: now,
                        attempts: 1,
                    });
                    1
                }
            }
        })?;
        tracing::debug!(target: "ethos::persistence", session_id, attempts, "cached pending result");
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<PendingResult>> {
        Ok(self.file.load()?.map(|data| data.pending).unwrap_or_default())
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.file.update(PendingResultsFile::default(), |data| {
            data.pending.retain(|p| p.session_id != session_id);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethos_core::scenario::ManagerType;
    use ethos_core::session::SelectedChoice;
    use tempfile::TempDir;

    fn record(score: f64) -> PracticeRecord {
        PracticeRecord {
            user_id: "user-1".to_string(),
            manager_type: ManagerType::Puppeteer,
            scenario_id: "privacy-01".to_string(),
            selected_choices: vec![SelectedChoice {
                step: 1,
                text: "Let me check with compliance.".to_string(),
                category: "Involve Compliance".to_string(),
                evs: 2.0,
            }],
            timestamp: "2026-03-01T10:00:00Z".to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn stash_is_keyed_by_session() {
        let temp_dir = TempDir::new().unwrap();
        let cache = TomlResultCache::with_path(temp_dir.path().join("pending_results.toml"));

        cache.stash("s-1", &record(6.0)).await.unwrap();
        cache.stash("s-2", &record(4.0)).await.unwrap();
        cache.stash("s-1", &record(6.5)).await.unwrap();

        let pending = cache.pending().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].session_id, "s-1");
        assert_eq!(pending[0].attempts, 2);
        assert_eq!(pending[0].record.score, 6.5);
        assert_eq!(pending[0].record.selected_choices[0].category, "Involve Compliance");
        assert_eq!(pending[1].attempts, 1);
    }

    #[tokio::test]
    async fn remove_drops_only_matching_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = TomlResultCache::with_path(temp_dir.path().join("pending_results.toml"));

        cache.stash("s-1", &record(6.0)).await.unwrap();
        cache.stash("s-2", &record(4.0)).await.unwrap();
        cache.remove("s-1").await.unwrap();
        cache.remove("unknown").await.unwrap();

        let pending = cache.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].session_id, "s-2");
    }

    #[tokio::test]
    async fn empty_cache_lists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = TomlResultCache::with_path(temp_dir.path().join("pending_results.toml"));
        assert!(cache.pending().await.unwrap().is_empty());
    }
}
