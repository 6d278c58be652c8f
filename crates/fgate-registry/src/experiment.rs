//! Experiment enrollment definitions
//!
//! Enrollment configuration arrives as loosely-typed JSON/YAML:
//!
//! ```text
//! { "name": "...", "enabled": true,
//!   "buckets": { "unsampled": { "samplingRate": 1 }, "control": { "samplingRate": 0 } } }
//! ```
//!
//! [`Experiment::from_value`] is the boundary check. Nothing malformed gets
//! past it into requirement registration.

use crate::error::ExperimentError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

/// Bucket every experiment must define; also the fallback assignment
pub const UNSAMPLED_BUCKET: &str = "unsampled";

/// A single enrollment bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Fraction of subjects assigned to this bucket
    pub sampling_rate: f64,
}

/// Validated experiment enrollment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    name: String,
    enabled: bool,
    buckets: IndexMap<String, Bucket>,
}

impl Experiment {
    /// Validate an enrollment value
    ///
    /// An empty object means no experiment is configured and yields `None`.
    ///
    /// # Errors
    /// Returns [`ExperimentError`] naming the first violated structural rule.
    pub fn from_value(value: &JsonValue) -> Result<Option<Self>, ExperimentError> {
        let obj = match value {
            JsonValue::Object(obj) => obj,
            // PHP-style configs serialize an empty map as []
            JsonValue::Array(items) if items.is_empty() => return Ok(None),
            _ => return Err(ExperimentError::NotAnObject),
        };
        if obj.is_empty() {
            return Ok(None);
        }

        let name = obj
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or(ExperimentError::MissingField("name"))?
            .to_string();
        let enabled = obj
            .get("enabled")
            .and_then(JsonValue::as_bool)
            .ok_or(ExperimentError::MissingField("enabled"))?;

        let raw_buckets = obj
            .get("buckets")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| ExperimentError::MissingBuckets(name.clone()))?;

        if !raw_buckets.contains_key(UNSAMPLED_BUCKET) {
            return Err(ExperimentError::MissingUnsampledBucket(name));
        }

        let mut buckets = IndexMap::with_capacity(raw_buckets.len());
        for (bucket_name, raw) in raw_buckets {
            let bucket = raw
                .as_object()
                .ok_or_else(|| ExperimentError::invalid_bucket(&name, bucket_name))?;
            let sampling_rate = bucket
                .get("samplingRate")
                .filter(|v| v.is_number())
                .and_then(JsonValue::as_f64)
                .ok_or_else(|| ExperimentError::non_numeric_rate(&name, bucket_name))?;
            buckets.insert(bucket_name.clone(), Bucket { sampling_rate });
        }

        Ok(Some(Self {
            name,
            enabled,
            buckets,
        }))
    }

    /// Parse and validate from JSON text
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the definition is malformed
    pub fn from_json(json: &str) -> Result<Option<Self>, ExperimentError> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse and validate from YAML text
    ///
    /// # Errors
    /// Returns error if YAML is invalid or the definition is malformed
    pub fn from_yaml(yaml: &str) -> Result<Option<Self>, ExperimentError> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Experiment name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether enrollment is active
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Buckets in declaration order
    #[inline]
    #[must_use]
    pub fn buckets(&self) -> &IndexMap<String, Bucket> {
        &self.buckets
    }

    /// Check if bucket is defined
    #[inline]
    #[must_use]
    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    /// Deterministically assign a subject to a bucket
    ///
    /// The subject hashes to a point in `[0, 1)`, which is matched against the
    /// cumulative sampling rates in declaration order. Points past the last
    /// bucket, and every subject of a disabled experiment, are unsampled.
    #[must_use]
    pub fn assign(&self, subject: &str) -> &str {
        if !self.enabled {
            return UNSAMPLED_BUCKET;
        }

        let point = self.sample_point(subject);
        let mut cumulative = 0.0;
        for (name, bucket) in &self.buckets {
            cumulative += bucket.sampling_rate;
            if point < cumulative {
                return name;
            }
        }
        UNSAMPLED_BUCKET
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample_point(&self, subject: &str) -> f64 {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0]);
        hasher.update(subject.as_bytes());
        let digest = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        // 53 bits keep the conversion exact
        (u64::from_be_bytes(head) >> 11) as f64 / (1u64 << 53) as f64
    }
}
