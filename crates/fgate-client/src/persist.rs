//! Debounced preference persistence
//!
//! Writes go to an external [`PreferenceStore`] after a quiescence window.
//! A later write for the same key within the window replaces the pending one;
//! different keys debounce independently. Failures are logged and dropped.

use crate::error::{PreferenceError, SyncError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// External per-user key/value preference store
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Persist `value` (0 or 1) under `key`
    async fn set_option(&self, key: &str, value: u8) -> Result<(), PreferenceError>;
}

#[derive(Debug, Clone, Copy)]
struct PendingWrite {
    ticket: u64,
    value: u8,
}

/// Coalesces rapid writes per key into one deferred store call
pub struct DebouncedWriter {
    store: Arc<dyn PreferenceStore>,
    window: Duration,
    runtime: Handle,
    pending: Arc<DashMap<String, PendingWrite>>,
    next_ticket: AtomicU64,
}

impl DebouncedWriter {
    /// Create writer bound to the current tokio runtime
    ///
    /// # Errors
    /// - `SyncError::NoRuntime` if called outside a tokio runtime
    pub fn new(store: Arc<dyn PreferenceStore>, window: Duration) -> Result<Self, SyncError> {
        let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        Ok(Self::with_handle(store, window, runtime))
    }

    /// Create writer spawning onto an explicit runtime
    #[must_use]
    pub fn with_handle(store: Arc<dyn PreferenceStore>, window: Duration, runtime: Handle) -> Self {
        Self {
            store,
            window,
            runtime,
            pending: Arc::new(DashMap::new()),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Schedule a write; supersedes any pending write for `key`
    pub fn schedule(&self, key: String, value: bool) {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let value = u8::from(value);
        self.pending
            .insert(key.clone(), PendingWrite { ticket, value });

        let pending = Arc::clone(&self.pending);
        let store = Arc::clone(&self.store);
        let window = self.window;
        self.runtime.spawn(async move {
            tokio::time::sleep(window).await;

            let Some((key, write)) = pending.remove_if(&key, |_, w| w.ticket == ticket) else {
                tracing::trace!(%key, ticket, "preference write superseded");
                return;
            };

            match store.set_option(&key, write.value).await {
                Ok(()) => tracing::info!(%key, value = write.value, "preference saved"),
                Err(e) => tracing::warn!(%key, error = %e, "preference write failed"),
            }
        });
    }

    /// Number of writes waiting for their window to elapse
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Debounce window
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl std::fmt::Debug for DebouncedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedWriter")
            .field("window", &self.window)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        writes: Mutex<Vec<(String, u8)>>,
    }

    #[async_trait::async_trait]
    impl PreferenceStore for Recorder {
        async fn set_option(&self, key: &str, value: u8) -> Result<(), PreferenceError> {
            self.writes.lock().unwrap().push((key.to_string(), value));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_writes_collapse_to_last() {
        let store = Arc::new(Recorder::default());
        let writer = DebouncedWriter::new(store.clone(), Duration::from_millis(500)).unwrap();

        writer.schedule("vector-foo".to_string(), true);
        writer.schedule("vector-foo".to_string(), false);
        writer.schedule("vector-foo".to_string(), true);
        assert_eq!(writer.pending_count(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*store.writes.lock().unwrap(), vec![("vector-foo".to_string(), 1)]);
        assert_eq!(writer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_debounce_independently() {
        let store = Arc::new(Recorder::default());
        let writer = DebouncedWriter::new(store.clone(), Duration::from_millis(500)).unwrap();

        writer.schedule("vector-a".to_string(), true);
        writer.schedule("vector-b".to_string(), false);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let mut writes = store.writes.lock().unwrap().clone();
        writes.sort();
        assert_eq!(
            writes,
            vec![("vector-a".to_string(), 1), ("vector-b".to_string(), 0)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_written_before_window() {
        let store = Arc::new(Recorder::default());
        let writer = DebouncedWriter::new(store.clone(), Duration::from_millis(500)).unwrap();

        writer.schedule("vector-a".to_string(), true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn new_outside_runtime_fails() {
        let store = Arc::new(Recorder::default());
        let err = DebouncedWriter::new(store, Duration::from_millis(1)).unwrap_err();
        assert_eq!(err, SyncError::NoRuntime);
    }
}
