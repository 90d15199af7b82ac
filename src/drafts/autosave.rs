use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::RoofdeskError;
use super::{DraftStore, ReportDraft};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(3);

/// Where autosaved drafts end up.
#[async_trait]
pub trait DraftSink: Send + Sync {
    async fn save(&self, draft: &ReportDraft) -> Result<(), RoofdeskError>;
}

#[async_trait]
impl DraftSink for DraftStore {
    async fn save(&self, draft: &ReportDraft) -> Result<(), RoofdeskError> {
        DraftStore::save(self, draft).await
    }
}

/// Debounced draft persistence for one user.
///
/// Every [`schedule`](Self::schedule) restarts the quiet-period timer; only
/// the last draft scheduled before the timer fires is written. A single
/// in-flight flag keeps two saves from overlapping: a save that finds the
/// flag set is skipped, not queued. A save whose timer has fired is never
/// aborted by later keystrokes.
pub struct Autosaver {
    sink: Arc<dyn DraftSink>,
    delay: Duration,
    tasks: Mutex<Tasks>,
    saving: Arc<AtomicBool>,
    saves: Arc<AtomicU64>,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Tasks {
    /// Most recently scheduled save.
    pending: Option<Scheduled>,
    /// An earlier save whose timer already fired.
    running: Option<JoinHandle<()>>,
}

struct Scheduled {
    handle: JoinHandle<()>,
    /// True until the timer fires.
    waiting: Arc<AtomicBool>,
}

impl Tasks {
    /// Abort `pending` if it is still waiting; otherwise keep it as `running`.
    fn disarm(&mut self) {
        if let Some(scheduled) = self.pending.take() {
            if scheduled.waiting.load(Ordering::Acquire) {
                scheduled.handle.abort();
            } else {
                self.running = Some(scheduled.handle);
            }
        }
    }

    fn abort_all(&mut self) {
        if let Some(scheduled) = self.pending.take() {
            scheduled.handle.abort();
        }
        if let Some(handle) = self.running.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for Autosaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autosaver")
            .field("delay", &self.delay)
            .field("saving", &self.saving.load(Ordering::Relaxed))
            .field("saves", &self.saves.load(Ordering::Relaxed))
            .finish()
    }
}

/// Clears the in-flight flag even if the save task is aborted mid-write.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Autosaver {
    pub fn new(sink: Arc<dyn DraftSink>, delay: Duration, shutdown: &CancellationToken) -> Self {
        Self {
            sink,
            delay,
            tasks: Mutex::new(Tasks::default()),
            saving: Arc::new(AtomicBool::new(false)),
            saves: Arc::new(AtomicU64::new(0)),
            cancel: shutdown.child_token(),
        }
    }

    /// Schedule `draft` to be written once the user has been quiet for the delay.
    pub fn schedule(&self, draft: ReportDraft) {
        let sink = self.sink.clone();
        let saving = self.saving.clone();
        let saves = self.saves.clone();
        let cancel = self.cancel.clone();
        let delay = self.delay;
        let waiting = Arc::new(AtomicBool::new(true));
        let fired = waiting.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(user_id = %draft.user_id, "Autosave cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    fired.store(false, Ordering::Release);
                    if let Err(e) = persist(sink.as_ref(), &saving, &saves, &draft).await {
                        warn!(user_id = %draft.user_id, error = %e, "Autosave failed");
                    }
                }
            }
        });

        let mut tasks = self.lock_tasks();
        tasks.disarm();
        tasks.pending = Some(Scheduled { handle, waiting });
    }

    /// Write `draft` now, dropping any debounced save still waiting.
    /// Returns `Ok(false)` if another save was already in flight.
    pub async fn flush(&self, draft: &ReportDraft) -> Result<bool, RoofdeskError> {
        self.cancel_pending();
        persist(self.sink.as_ref(), &self.saving, &self.saves, draft).await
    }

    /// Drop a debounced save that is still waiting for its timer.
    pub fn cancel_pending(&self) {
        self.lock_tasks().disarm();
    }

    /// Drop a waiting save and wait for one already writing to finish, so
    /// nothing lands on disk after this returns.
    pub async fn settle(&self) {
        let (pending, running) = {
            let mut tasks = self.lock_tasks();
            tasks.disarm();
            (tasks.pending.take(), tasks.running.take())
        };
        for handle in pending.map(|p| p.handle).into_iter().chain(running) {
            // A cancelled or panicked save has nothing left to write
            let _ = handle.await;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_tasks()
            .pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Number of completed writes since creation.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Acquire)
    }

    /// Stop the timer for good; later schedules return immediately.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.lock_tasks().abort_all();
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.lock_tasks().abort_all();
    }
}

async fn persist(
    sink: &dyn DraftSink,
    saving: &Arc<AtomicBool>,
    saves: &AtomicU64,
    draft: &ReportDraft,
) -> Result<bool, RoofdeskError> {
    if saving.swap(true, Ordering::AcqRel) {
        debug!(user_id = %draft.user_id, "Save already in flight, skipping");
        return Ok(false);
    }
    let _guard = InFlight(saving.clone());
    sink.save(draft).await?;
    saves.fetch_add(1, Ordering::AcqRel);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportFormData;
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct MemorySink {
        saved: Mutex<Vec<ReportDraft>>,
    }

    #[async_trait]
    impl DraftSink for MemorySink {
        async fn save(&self, draft: &ReportDraft) -> Result<(), RoofdeskError> {
            self.saved.lock().unwrap().push(draft.clone());
            Ok(())
        }
    }

    /// Blocks every save until a permit is added.
    struct GatedSink {
        gate: Semaphore,
        saved: Mutex<Vec<ReportDraft>>,
    }

    #[async_trait]
    impl DraftSink for GatedSink {
        async fn save(&self, draft: &ReportDraft) -> Result<(), RoofdeskError> {
            let permit = self.gate.acquire().await.map_err(|e| RoofdeskError::Internal(e.to_string()))?;
            permit.forget();
            self.saved.lock().unwrap().push(draft.clone());
            Ok(())
        }
    }

    fn draft(name: &str) -> ReportDraft {
        ReportDraft::new("u-1", 1, ReportFormData { customer_name: name.into(), ..Default::default() })
    }

    fn saved_names(sink: &MemorySink) -> Vec<String> {
        sink.saved.lock().unwrap().iter().map(|d| d.data.customer_name.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_writes_last_draft_once() {
        let sink = Arc::new(MemorySink::default());
        let saver = Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &CancellationToken::new());

        saver.schedule(draft("A"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        saver.schedule(draft("AB"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        // 4s after the first keystroke but only 2s after the last
        assert!(saved_names(&sink).is_empty());
        assert!(saver.is_pending());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(saved_names(&sink), vec!["AB".to_string()]);
        assert_eq!(saver.save_count(), 1);
        assert!(!saver.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_each_save() {
        let sink = Arc::new(MemorySink::default());
        let saver = Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &CancellationToken::new());

        saver.schedule(draft("one"));
        tokio::time::sleep(Duration::from_secs(4)).await;
        saver.schedule(draft("two"));
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(saved_names(&sink), vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_cancels_pending() {
        let sink = Arc::new(MemorySink::default());
        let saver = Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &CancellationToken::new());

        saver.schedule(draft("typed"));
        assert!(saver.flush(&draft("flushed")).await.unwrap());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(saved_names(&sink), vec!["flushed".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_save() {
        let sink = Arc::new(MemorySink::default());
        let token = CancellationToken::new();
        let saver = Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &token);

        saver.schedule(draft("lost"));
        token.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(saved_names(&sink).is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_save_suppresses_overlap() {
        let sink = Arc::new(GatedSink { gate: Semaphore::new(0), saved: Mutex::new(Vec::new()) });
        let saver = Arc::new(Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &CancellationToken::new()));

        let first = {
            let saver = saver.clone();
            tokio::spawn(async move { saver.flush(&draft("first")).await })
        };
        while !saver.is_saving() {
            tokio::task::yield_now().await;
        }

        assert!(!saver.flush(&draft("second")).await.unwrap());

        sink.gate.add_permits(1);
        assert!(first.await.unwrap().unwrap());
        assert!(!saver.is_saving());
        assert_eq!(sink.saved.lock().unwrap().len(), 1);
        assert_eq!(saver.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystroke_does_not_abort_started_save() {
        let sink = Arc::new(GatedSink { gate: Semaphore::new(0), saved: Mutex::new(Vec::new()) });
        let saver = Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &CancellationToken::new());

        saver.schedule(draft("first"));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(saver.is_saving());

        saver.schedule(draft("second"));
        sink.gate.add_permits(1);
        while saver.save_count() < 1 {
            tokio::task::yield_now().await;
        }
        assert_eq!(sink.saved.lock().unwrap()[0].data.customer_name, "first");

        sink.gate.add_permits(1);
        tokio::time::sleep(Duration::from_secs(4)).await;
        let names: Vec<String> = sink.saved.lock().unwrap().iter().map(|d| d.data.customer_name.clone()).collect();
        assert_eq!(names, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_started_save() {
        let sink = Arc::new(GatedSink { gate: Semaphore::new(0), saved: Mutex::new(Vec::new()) });
        let saver = Arc::new(Autosaver::new(sink.clone(), DEFAULT_AUTOSAVE_DELAY, &CancellationToken::new()));

        saver.schedule(draft("started"));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        saver.schedule(draft("waiting"));

        let settled = {
            let saver = saver.clone();
            tokio::spawn(async move { saver.settle().await })
        };
        tokio::task::yield_now().await;
        assert!(!settled.is_finished());

        sink.gate.add_permits(2);
        settled.await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let names: Vec<String> = sink.saved.lock().unwrap().iter().map(|d| d.data.customer_name.clone()).collect();
        assert_eq!(names, vec!["started".to_string()]);
        assert!(!saver.is_pending());
    }
}
