//! Testing utilities for fgate workspace
//!
//! Shared test helpers, fixtures, and preference store doubles.

#![allow(missing_docs)]

use fgate_client::{Document, PreferenceError, PreferenceStore, Session, StateSynchronizer, SyncConfig};
use fgate_registry::{FeatureRegistry, MarkerNames};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_PREFIX: &str = "x";

/// Store that records every write it receives
#[derive(Debug, Default)]
pub struct RecordingStore {
    writes: Mutex<Vec<(String, u8)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> Vec<(String, u8)> {
        self.writes.lock().clone()
    }

    pub fn writes_for(&self, key: &str) -> Vec<u8> {
        self.writes
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .collect()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for RecordingStore {
    async fn set_option(&self, key: &str, value: u8) -> Result<(), PreferenceError> {
        self.writes.lock().push((key.to_string(), value));
        Ok(())
    }
}

/// Store that rejects every write, counting attempts
#[derive(Debug, Default)]
pub struct FailingStore {
    attempts: Mutex<usize>,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for FailingStore {
    async fn set_option(&self, key: &str, _value: u8) -> Result<(), PreferenceError> {
        *self.attempts.lock() += 1;
        Err(PreferenceError::rejected(key, "store offline"))
    }
}

pub fn test_config() -> SyncConfig {
    SyncConfig::new().with_marker_prefix(TEST_PREFIX)
}

pub fn test_markers() -> MarkerNames {
    MarkerNames::new(TEST_PREFIX)
}

/// Registry for the `modernToolbar` scenario
pub fn toolbar_registry(logged_in: bool, latest_skin: bool) -> FeatureRegistry<'static> {
    let mut registry = FeatureRegistry::new();
    registry.register_simple_requirement("loggedIn", logged_in).unwrap();
    registry.register_simple_requirement("latestSkin", latest_skin).unwrap();
    registry
        .register_feature("modernToolbar", ["loggedIn", "latestSkin"])
        .unwrap();
    registry
}

/// Document as a fresh render of `registry` would produce it
pub fn rendered_document(registry: &FeatureRegistry<'_>) -> Document {
    let markers = registry.render_markers(&test_markers()).unwrap();
    Document::from_markers(markers.as_slice())
}

/// Identified synchronizer writing to `store`; call inside a tokio runtime
pub fn identified_sync(
    doc: Document,
    store: Arc<dyn PreferenceStore>,
) -> StateSynchronizer {
    StateSynchronizer::new(test_config(), doc, Session::identified("Alice"), store).unwrap()
}

pub fn anonymous_sync(doc: Document) -> StateSynchronizer {
    StateSynchronizer::anonymous(test_config(), doc)
}

/// Sleep comfortably past the default debounce window
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(fgate_client::DEFAULT_DEBOUNCE_MS + 100)).await;
}
