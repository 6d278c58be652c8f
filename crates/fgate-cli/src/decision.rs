//! Decision files
//!
//! A decision file describes one decision context on disk:
//!
//! ```yaml
//! markerPrefix: vector-feature
//! requirements:
//!   loggedIn: true
//!   latestSkin: false
//! experiments:
//!   inStickyHeaderTreatment:
//!     subject: user-42
//!     bucket: stickyHeaderEnabled
//!     enrollment:
//!       name: vector.sticky_header
//!       enabled: true
//!       buckets:
//!         unsampled: { samplingRate: 0.5 }
//!         stickyHeaderEnabled: { samplingRate: 0.5 }
//! features:
//!   modernToolbar: [loggedIn, latestSkin]
//! ```

use fgate_registry::{
    Experiment, ExperimentError, FeatureRegistry, MarkerNames, RegistryError, DEFAULT_MARKER_PREFIX,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Errors while loading a decision file
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid YAML
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Experiment enrollment rejected at the boundary
    #[error("experiment requirement '{requirement}': {source}")]
    Experiment {
        /// Requirement being registered
        requirement: String,
        /// Validation failure
        #[source]
        source: ExperimentError,
    },

    /// Standalone enrollment file violates a structural rule
    #[error("invalid enrollment in {path}: {source}")]
    InvalidEnrollment {
        /// File path
        path: String,
        /// Violated rule
        #[source]
        source: ExperimentError,
    },

    /// Experiment requirement with an empty enrollment
    #[error("experiment requirement '{0}' has no enrollment")]
    NoEnrollment(String),

    /// Registration failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Requirement sourced from an experiment bucket assignment
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentRequirement {
    /// Subject being bucketed (user id or session token)
    pub subject: String,
    /// Bucket that satisfies the requirement
    pub bucket: String,
    /// Raw enrollment definition, validated on load
    pub enrollment: JsonValue,
}

/// One decision context as stored on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionFile {
    /// Marker class prefix
    #[serde(default = "default_prefix")]
    pub marker_prefix: String,
    /// Precomputed boolean requirements
    #[serde(default)]
    pub requirements: IndexMap<String, bool>,
    /// Experiment-backed requirements
    #[serde(default)]
    pub experiments: IndexMap<String, ExperimentRequirement>,
    /// Features and their requirement names
    #[serde(default)]
    pub features: IndexMap<String, Vec<String>>,
}

fn default_prefix() -> String {
    DEFAULT_MARKER_PREFIX.to_string()
}

impl DecisionFile {
    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid
    pub fn from_json(json: &str) -> Result<Self, DecisionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid
    pub fn from_yaml(yaml: &str) -> Result<Self, DecisionError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from disk; `.json` files parse as JSON, anything else as YAML
    ///
    /// # Errors
    /// Returns error if the file is unreadable or malformed
    pub fn load(path: &Path) -> Result<Self, DecisionError> {
        let text = read_file(path)?;
        if is_json(path) {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Marker naming for this file
    #[must_use]
    pub fn marker_names(&self) -> MarkerNames {
        MarkerNames::new(self.marker_prefix.clone())
    }

    /// Build a registry for this context
    ///
    /// # Errors
    /// Returns the first registration or experiment validation failure
    pub fn build_registry(&self) -> Result<FeatureRegistry<'static>, DecisionError> {
        let mut registry = FeatureRegistry::new();

        for (name, value) in &self.requirements {
            registry.register_simple_requirement(name.clone(), *value)?;
        }

        for (name, entry) in &self.experiments {
            let experiment = Experiment::from_value(&entry.enrollment)
                .map_err(|source| DecisionError::Experiment {
                    requirement: name.clone(),
                    source,
                })?
                .ok_or_else(|| DecisionError::NoEnrollment(name.clone()))?;
            registry.register_experiment_requirement(
                name.clone(),
                &experiment,
                &entry.subject,
                &entry.bucket,
            )?;
        }

        for (name, requirements) in &self.features {
            registry.register_feature(name.clone(), requirements.iter().cloned())?;
        }

        tracing::debug!(
            requirements = registry.requirement_count(),
            features = registry.feature_count(),
            "built registry from decision file"
        );
        Ok(registry)
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, DecisionError> {
    std::fs::read_to_string(path).map_err(|source| DecisionError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
