//! Error types for the client state synchronizer

/// Errors surfaced by synchronizer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Toggle requested for a feature with no marker on either root
    #[error("attempt to toggle unknown feature: {0}")]
    UnknownFeatureToggle(String),

    /// Identified sessions need a tokio runtime for deferred writes
    #[error("no tokio runtime available for preference persistence")]
    NoRuntime,
}

/// Failure reported by a preference store
///
/// Never surfaced to callers of `toggle`; deferred writes log and drop it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceError {
    /// Transport-level failure
    #[error("preference transport failed: {0}")]
    Transport(String),

    /// Store refused the write
    #[error("preference '{key}' rejected: {reason}")]
    Rejected {
        /// Preference key
        key: String,
        /// Store-provided reason
        reason: String,
    },
}

impl PreferenceError {
    /// Create rejected error
    pub fn rejected(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors while loading synchronizer configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid JSON
    #[error("invalid JSON config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid YAML
    #[error("invalid YAML config: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Structurally valid but unusable value
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type alias for synchronizer operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_toggle_display() {
        let err = SyncError::UnknownFeatureToggle("foo".to_string());
        assert_eq!(err.to_string(), "attempt to toggle unknown feature: foo");
    }

    #[test]
    fn rejected_display() {
        let err = PreferenceError::rejected("vector-foo", "readonly");
        assert_eq!(err.to_string(), "preference 'vector-foo' rejected: readonly");
    }
}
