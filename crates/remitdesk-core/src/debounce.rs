//! Keyed cancel-and-reschedule debouncer

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;

struct Slot {
    generation: u64,
    abort: AbortHandle,
}

/// Runs a task once its key has been quiet for `delay`.
///
/// Scheduling under a key aborts whatever was scheduled there before, whether
/// it is still waiting out the delay or already running. The caller of the
/// aborted task gets `None`.
pub struct Debouncer {
    delay: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Schedule `task` under `key` and wait for it.
    ///
    /// Returns `None` when a later call under the same key (or [`cancel`])
    /// superseded this one.
    ///
    /// [`cancel`]: Debouncer::cancel
    pub async fn schedule<F, T>(&self, key: &str, task: F) -> Option<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await
        });

        let generation = {
            let mut slots = self.slots();
            let generation = slots.get(key).map(|s| s.generation + 1).unwrap_or(1);
            let slot = Slot { generation, abort: handle.abort_handle() };
            if let Some(previous) = slots.insert(key.to_string(), slot) {
                previous.abort.abort();
            }
            generation
        };

        let result = handle.await;

        {
            let mut slots = self.slots();
            if slots.get(key).map(|s| s.generation) == Some(generation) {
                slots.remove(key);
            }
        }

        match result {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => {
                log::debug!("debounced task '{}' superseded", key);
                None
            }
            Err(e) => {
                log::error!("debounced task '{}' failed: {}", key, e);
                None
            }
        }
    }

    /// Abort whatever is scheduled under `key`
    pub fn cancel(&self, key: &str) -> bool {
        match self.slots().remove(key) {
            Some(slot) => {
                slot.abort.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.slots().contains_key(key)
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.slots().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_delay() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        let value = debouncer.schedule("vendor", async { 7 }).await;

        assert_eq!(value, Some(7));
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(!debouncer.is_pending("vendor"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_call_supersedes_earlier() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));
        let runs = Arc::new(AtomicUsize::new(0));

        let first = {
            let debouncer = Arc::clone(&debouncer);
            let runs = Arc::clone(&runs);
            tokio::spawn(async move {
                debouncer
                    .schedule("vendor", async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        "ya"
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert!(debouncer.is_pending("vendor"));

        let counter = Arc::clone(&runs);
        let second = debouncer
            .schedule("vendor", async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "yamada"
            })
            .await;

        assert_eq!(second, Some("yamada"));
        assert_eq!(first.await.unwrap(), None);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));

        let vendor = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move { debouncer.schedule("vendor", async { 1 }).await })
        };
        tokio::task::yield_now().await;

        let company = debouncer.schedule("company", async { 2 }).await;

        assert_eq!(company, Some(2));
        assert_eq!(vendor.await.unwrap(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));

        let pending = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move { debouncer.schedule("company", async { 1 }).await })
        };
        tokio::task::yield_now().await;

        assert!(debouncer.cancel("company"));
        assert_eq!(pending.await.unwrap(), None);
        assert!(!debouncer.cancel("company"));
    }
}
