//! Synchronizer configuration
//!
//! Loaded from JSON or YAML; every field has a default so partial files work.

use crate::error::ConfigError;
use fgate_registry::{MarkerNames, DEFAULT_MARKER_PREFIX};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default preference key namespace
pub const DEFAULT_PREFERENCE_NAMESPACE: &str = "vector";

/// Default quiescence window before a preference write fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Client synchronizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Class prefix for feature markers
    pub marker_prefix: String,
    /// Prefix for persisted preference keys
    pub preference_namespace: String,
    /// Debounce window in milliseconds
    pub debounce_ms: u64,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With marker prefix
    #[inline]
    #[must_use]
    pub fn with_marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.marker_prefix = prefix.into();
        self
    }

    /// With preference namespace
    #[inline]
    #[must_use]
    pub fn with_preference_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.preference_namespace = namespace.into();
        self
    }

    /// With debounce window
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or a value is unusable
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or a value is unusable
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.marker_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "markerPrefix",
                reason: "must not be empty".to_string(),
            });
        }
        if self.preference_namespace.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "preferenceNamespace",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(self)
    }

    /// Marker naming for this prefix
    #[inline]
    #[must_use]
    pub fn marker_names(&self) -> MarkerNames {
        MarkerNames::new(self.marker_prefix.clone())
    }

    /// Debounce window
    #[inline]
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// `<namespace>-<feature>`
    #[inline]
    #[must_use]
    pub fn preference_key(&self, feature: &str) -> String {
        format!("{}-{feature}", self.preference_namespace)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            preference_namespace: DEFAULT_PREFERENCE_NAMESPACE.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::new();
        assert_eq!(config.marker_prefix, "vector-feature");
        assert_eq!(config.preference_key("limited-width"), "vector-limited-width");
        assert_eq!(config.debounce_window(), Duration::from_millis(500));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SyncConfig::from_json(r#"{"debounceMs": 50}"#).unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.preference_namespace, "vector");
    }

    #[test]
    fn yaml_config() {
        let config = SyncConfig::from_yaml("markerPrefix: x\npreferenceNamespace: skin\n").unwrap();
        assert_eq!(config.marker_names().enabled_class("foo"), "x-foo-enabled");
        assert_eq!(config.preference_key("foo"), "skin-foo");
    }

    #[test]
    fn empty_prefix_rejected() {
        let err = SyncConfig::from_json(r#"{"markerPrefix": ""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "markerPrefix", .. }));
    }

    #[test]
    fn builder() {
        let config = SyncConfig::new().with_marker_prefix("x").with_debounce_ms(10);
        assert_eq!(config.marker_prefix, "x");
        assert_eq!(config.debounce_ms, 10);
    }
}
