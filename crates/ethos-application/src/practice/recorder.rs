use ethos_core::error::{EthosError, Result};
use ethos_core::session::{PendingResultStore, PracticeRecord, ResultSink};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of retrying cached results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    pub remaining: usize,
}

/// Saves completed results, keeping failed ones in a local cache.
///
/// The cache is best-effort: losing it loses nothing the remote store
/// already has, and a cached entry is not a saved result.
pub struct ResultRecorder {
    sink: Arc<dyn ResultSink>,
    pending: Option<Arc<dyn PendingResultStore>>,
}

impl ResultRecorder {
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        Self {
            sink,
            pending: None,
        }
    }

    pub fn with_pending_store(mut self, store: Arc<dyn PendingResultStore>) -> Self {
        self.pending = Some(store);
        self
    }

    /// Saves one session's result.
    ///
    /// On failure the record is stashed (if a cache is configured) and the
    /// sink's error is returned. On success any stale cache entry for the
    /// session is dropped.
    pub async fn record(&self, session_id: &str, record: &PracticeRecord) -> Result<()> {
        match self.sink.save(record).await {
            Ok(()) => {
                info!(
                    target: "ethos::persistence",
                    session_id,
                    score = record.score,
                    "practice result saved"
                );
                if let Some(pending) = &self.pending {
                    if let Err(e) = pending.remove(session_id).await {
                        warn!(target: "ethos::persistence", session_id, "failed to clear cached result: {}", e);
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(target: "ethos::persistence", session_id, "saving practice result failed: {}", e);
                if let Some(pending) = &self.pending {
                    if let Err(cache_err) = pending.stash(session_id, record).await {
                        warn!(
                            target: "ethos::persistence",
                            session_id,
                            "caching practice result failed: {}",
                            cache_err
                        );
                    }
                }
                Err(match e {
                    EthosError::Persistence(_) => e,
                    other => EthosError::persistence(other.to_string()),
                })
            }
        }
    }

    /// Retries every cached result once.
    pub async fn flush_pending(&self) -> Result<FlushReport> {
        let Some(pending) = &self.pending else {
            return Ok(FlushReport::default());
        };

        let mut report = FlushReport::default();
        for entry in pending.pending().await? {
            match self.sink.save(&entry.record).await {
                Ok(()) => {
                    pending.remove(&entry.session_id).await?;
                    report.saved += 1;
                }
                Err(e) => {
                    warn!(
                        target: "ethos::persistence",
                        session_id = %entry.session_id,
                        attempts = entry.attempts,
                        "retrying cached result failed: {}",
                        e
                    );
                    pending.stash(&entry.session_id, &entry.record).await?;
                    report.remaining += 1;
                }
            }
        }

        if report.saved > 0 {
            info!(target: "ethos::persistence", saved = report.saved, remaining = report.remaining, "flushed cached results");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethos_core::scenario::ManagerType;
    use ethos_core::session::PendingResult;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlakySink {
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakySink {
        fn new(fail: bool) -> Self {
            Self {
                fail: AtomicBool::new(fail),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResultSink for FlakySink {
        async fn save(&self, _record: &PracticeRecord) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(EthosError::service(Some(503), "unavailable", true))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct MemoryPending {
        entries: Mutex<Vec<PendingResult>>,
    }

    #[async_trait]
    impl PendingResultStore for MemoryPending {
        async fn stash(&self, session_id: &str, record: &PracticeRecord) -> Result<()> {
            let mut entries = self.entries.lock().unwrap();
            match entries.iter_mut().find(|e| e.session_id == session_id) {
                Some(entry) => entry.attempts += 1,
                None => entries.push(PendingResult {
                    session_id: session_id.to_string(),
                    record: record.clone(),
                    cached_at: "2026-03-01T10:00:00Z".to_string(),
                    attempts: 1,
                }),
            }
            Ok(())
        }

        async fn pending(&self) -> Result<Vec<PendingResult>> {
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn remove(&self, session_id: &str) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .retain(|e| e.session_id != session_id);
            Ok(())
        }
    }

    fn record() -> PracticeRecord {
        PracticeRecord {
            user_id: "user-1".to_string(),
            manager_type: ManagerType::Camouflager,
            scenario_id: "bias-02".to_string(),
            selected_choices: Vec::new(),
            timestamp: "2026-03-01T10:00:00Z".to_string(),
            score: 5.0,
        }
    }

    #[tokio::test]
    async fn failed_save_is_cached_and_reported_as_persistence_error() {
        let sink = Arc::new(FlakySink::new(true));
        let pending = Arc::new(MemoryPending::default());
        let recorder = ResultRecorder::new(sink.clone()).with_pending_store(pending.clone());

        let err = recorder.record("s-1", &record()).await.unwrap_err();
        assert!(matches!(err, EthosError::Persistence(_)));
        assert_eq!(pending.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn flush_saves_and_clears_cached_results() {
        let sink = Arc::new(FlakySink::new(true));
        let pending = Arc::new(MemoryPending::default());
        let recorder = ResultRecorder::new(sink.clone()).with_pending_store(pending.clone());
        let _ = recorder.record("s-1", &record()).await;

        let report = recorder.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { saved: 0, remaining: 1 });
        assert_eq!(pending.pending().await.unwrap()[0].attempts, 2);

        sink.fail.store(false, Ordering::SeqCst);
        let report = recorder.flush_pending().await.unwrap();
        assert_eq!(report, FlushReport { saved: 1, remaining: 0 });
        assert!(pending.pending().await.unwrap().is_empty());
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn flush_without_cache_is_a_no_op() {
        let recorder = ResultRecorder::new(Arc::new(FlakySink::new(false)));
        assert_eq!(recorder.flush_pending().await.unwrap(), FlushReport::default());
    }
}
