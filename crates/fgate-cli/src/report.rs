//! Command reports
//!
//! Each subcommand produces a report value that renders as text or JSON,
//! so the binary stays a thin argument parser.

use crate::decision::{is_json, read_file, DecisionError, DecisionFile};
use fgate_registry::{Experiment, ExperimentError, FeatureState, MarkerNames};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Outcome of evaluating every feature in a decision file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    /// Marker prefix used for rendering
    pub prefix: String,
    /// Feature decisions in registration order
    pub features: IndexMap<String, FeatureState>,
    /// Marker classes a page render would emit
    pub markers: Vec<String>,
}

impl EvaluationReport {
    /// Evaluate a decision file, optionally overriding its marker prefix
    ///
    /// # Errors
    /// Returns error if the file fails to load or any feature fails to evaluate
    pub fn from_path(path: &Path, prefix: Option<&str>) -> Result<Self, DecisionError> {
        Self::from_decision(&DecisionFile::load(path)?, prefix)
    }

    /// Evaluate an already parsed decision file
    ///
    /// # Errors
    /// Returns error if registration or evaluation fails
    pub fn from_decision(file: &DecisionFile, prefix: Option<&str>) -> Result<Self, DecisionError> {
        let names = prefix.map_or_else(|| file.marker_names(), MarkerNames::new);
        let registry = file.build_registry()?;
        let decisions = registry.evaluate_all()?;

        let markers = decisions
            .iter()
            .map(|(feature, enabled)| names.class_for(feature, *enabled))
            .collect();
        let features = decisions
            .into_iter()
            .map(|(feature, enabled)| (feature, FeatureState::from_enabled(enabled)))
            .collect();

        Ok(Self {
            prefix: names.prefix().to_string(),
            features,
            markers,
        })
    }

    /// Human readable listing
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let width = self.features.keys().map(String::len).max().unwrap_or(0);
        for (feature, state) in &self.features {
            let _ = writeln!(out, "{feature:<width$}  {state}");
        }
        if !self.markers.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "class=\"{}\"", self.markers.join(" "));
        }
        out
    }

    /// JSON document
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Validated enrollment and optional subject assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    /// Experiment definition, `None` when the config is empty
    pub experiment: Option<Experiment>,
    /// Subject and the bucket it landed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<(String, String)>,
}

impl ExperimentReport {
    /// Validate an enrollment file; `.json` parses as JSON, anything else as YAML
    ///
    /// # Errors
    /// Returns error if the file is unreadable or the enrollment is malformed
    pub fn from_path(path: &Path, subject: Option<&str>) -> Result<Self, DecisionError> {
        let text = read_file(path)?;
        let experiment = if is_json(path) {
            Experiment::from_json(&text)
        } else {
            Experiment::from_yaml(&text)
        }
        .map_err(|source| match source {
            ExperimentError::InvalidJson(e) => DecisionError::InvalidJson(e),
            ExperimentError::InvalidYaml(e) => DecisionError::InvalidYaml(e),
            source => DecisionError::InvalidEnrollment {
                path: path.display().to_string(),
                source,
            },
        })?;
        Ok(Self::new(experiment, subject))
    }

    /// Build a report from a validated experiment
    #[must_use]
    pub fn new(experiment: Option<Experiment>, subject: Option<&str>) -> Self {
        let assignment = match (&experiment, subject) {
            (Some(experiment), Some(subject)) => {
                Some((subject.to_string(), experiment.assign(subject).to_string()))
            }
            _ => None,
        };
        Self {
            experiment,
            assignment,
        }
    }

    /// Human readable bucket layout
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let Some(experiment) = &self.experiment else {
            let _ = writeln!(out, "no experiment configured");
            return out;
        };

        let status = if experiment.is_enabled() { "enabled" } else { "disabled" };
        let _ = writeln!(out, "{} ({status})", experiment.name());
        for (name, bucket) in experiment.buckets() {
            let _ = writeln!(out, "  {name:<24} {:>6.2}%", bucket.sampling_rate * 100.0);
        }
        if let Some((subject, bucket)) = &self.assignment {
            let _ = writeln!(out);
            let _ = writeln!(out, "{subject} -> {bucket}");
        }
        out
    }

    /// JSON document
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Unwrap the structural rule violation from a decision error, if any
///
/// Syntax errors in the source text are not rule violations and yield `None`.
#[must_use]
pub fn experiment_error(err: &DecisionError) -> Option<&ExperimentError> {
    match err {
        DecisionError::Experiment { source, .. } | DecisionError::InvalidEnrollment { source, .. } => {
            Some(source)
        }
        _ => None,
    }
}
