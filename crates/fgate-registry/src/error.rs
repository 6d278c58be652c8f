//! Error types for the requirement registry
//!
//! Provides error handling for:
//! - Registration misuse (duplicate names)
//! - Evaluation-time misconfiguration (unknown names)
//! - Malformed experiment enrollment configuration

/// Errors raised while registering or evaluating features
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A requirement with this name is already registered
    #[error("requirement already registered: '{0}'")]
    DuplicateRequirement(String),

    /// A feature with this name is already registered
    #[error("feature already registered: '{0}'")]
    DuplicateFeature(String),

    /// Feature was never registered in this context
    #[error("unknown feature: '{0}'")]
    UnknownFeature(String),

    /// Feature references a requirement that was never registered
    #[error("feature '{feature}' references unknown requirement '{requirement}'")]
    UnknownRequirement {
        /// Feature being evaluated
        feature: String,
        /// Missing requirement name
        requirement: String,
    },

    /// Experiment requirement targets a bucket the experiment does not define
    #[error("experiment '{experiment}' has no bucket '{bucket}'")]
    UnknownBucket {
        /// Experiment name
        experiment: String,
        /// Requested bucket
        bucket: String,
    },
}

impl RegistryError {
    /// Create unknown requirement error
    pub fn unknown_requirement(feature: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self::UnknownRequirement {
            feature: feature.into(),
            requirement: requirement.into(),
        }
    }

    /// Check if error was raised at registration time
    #[inline]
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRequirement(_) | Self::DuplicateFeature(_) | Self::UnknownBucket { .. }
        )
    }
}

/// Errors raised while validating an experiment enrollment definition
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    /// Enrollment value is not a map
    #[error("experiment definition must be an object")]
    NotAnObject,

    /// A required top-level field is absent or has the wrong type
    #[error("experiment is missing required field '{0}'")]
    MissingField(&'static str),

    /// No `buckets` map was provided
    #[error("experiment '{0}' must define buckets")]
    MissingBuckets(String),

    /// The mandatory `unsampled` bucket is absent
    #[error("experiment '{0}' must define an 'unsampled' bucket")]
    MissingUnsampledBucket(String),

    /// A bucket entry is not a map
    #[error("bucket '{bucket}' of experiment '{experiment}' must be an object")]
    InvalidBucket {
        /// Experiment name
        experiment: String,
        /// Bucket name
        bucket: String,
    },

    /// Bucket `samplingRate` is absent or not a number
    #[error("bucket '{bucket}' of experiment '{experiment}' must have a numeric samplingRate")]
    NonNumericSamplingRate {
        /// Experiment name
        experiment: String,
        /// Bucket name
        bucket: String,
    },

    /// Source text is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Source text is not valid YAML
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

impl ExperimentError {
    /// Create invalid bucket error
    pub fn invalid_bucket(experiment: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self::InvalidBucket {
            experiment: experiment.into(),
            bucket: bucket.into(),
        }
    }

    /// Create non-numeric sampling rate error
    pub fn non_numeric_rate(experiment: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self::NonNumericSamplingRate {
            experiment: experiment.into(),
            bucket: bucket.into(),
        }
    }
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
