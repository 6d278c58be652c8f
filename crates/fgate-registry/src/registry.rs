//! Feature registry for one decision context
//!
//! Provides [`FeatureRegistry`] for registering requirements and features and
//! answering "is feature F enabled?".
//!
//! A registry is built fresh for each decision context (one page render, one
//! test scenario) and dropped with it. There is no process-wide table.

use crate::error::{RegistryError, RegistryResult};
use crate::experiment::Experiment;
use crate::marker::MarkerNames;
use crate::requirement::{DeferredRequirement, Requirement, SimpleRequirement};
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Requirement and feature tables for a single decision context
///
/// Requirements may borrow from the context for `'a`, so deferred predicates
/// can read request data without cloning it.
#[derive(Default)]
pub struct FeatureRegistry<'a> {
    requirements: IndexMap<String, Box<dyn Requirement + 'a>>,
    features: IndexMap<String, IndexSet<String>>,
}

impl<'a> FeatureRegistry<'a> {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            requirements: IndexMap::new(),
            features: IndexMap::new(),
        }
    }

    /// Register a precomputed boolean requirement
    ///
    /// # Errors
    /// - `RegistryError::DuplicateRequirement` if `name` is taken
    pub fn register_simple_requirement(
        &mut self,
        name: impl Into<String>,
        value: bool,
    ) -> RegistryResult<()> {
        self.insert_requirement(name.into(), Box::new(SimpleRequirement::new(value)))
    }

    /// Register a requirement evaluated lazily at decision time
    ///
    /// # Errors
    /// - `RegistryError::DuplicateRequirement` if `name` is taken
    pub fn register_requirement<F>(&mut self, name: impl Into<String>, predicate: F) -> RegistryResult<()>
    where
        F: Fn() -> bool + 'a,
    {
        self.insert_requirement(name.into(), Box::new(DeferredRequirement::new(predicate)))
    }

    /// Register any [`Requirement`] implementation
    ///
    /// # Errors
    /// - `RegistryError::DuplicateRequirement` if `name` is taken
    pub fn register_boxed(
        &mut self,
        name: impl Into<String>,
        requirement: Box<dyn Requirement + 'a>,
    ) -> RegistryResult<()> {
        self.insert_requirement(name.into(), requirement)
    }

    /// Register a requirement that holds when `subject` lands in `bucket`
    ///
    /// The assignment is computed once, at registration.
    ///
    /// # Errors
    /// - `RegistryError::UnknownBucket` if the experiment has no such bucket
    /// - `RegistryError::DuplicateRequirement` if `name` is taken
    pub fn register_experiment_requirement(
        &mut self,
        name: impl Into<String>,
        experiment: &Experiment,
        subject: &str,
        bucket: &str,
    ) -> RegistryResult<()> {
        if !experiment.has_bucket(bucket) {
            return Err(RegistryError::UnknownBucket {
                experiment: experiment.name().to_string(),
                bucket: bucket.to_string(),
            });
        }
        let assigned = experiment.assign(subject);
        tracing::debug!(
            experiment = experiment.name(),
            assigned,
            bucket,
            "experiment bucket assigned"
        );
        self.register_simple_requirement(name, assigned == bucket)
    }

    fn insert_requirement(
        &mut self,
        name: String,
        requirement: Box<dyn Requirement + 'a>,
    ) -> RegistryResult<()> {
        if self.requirements.contains_key(&name) {
            return Err(RegistryError::DuplicateRequirement(name));
        }
        tracing::trace!(requirement = %name, kind = requirement.kind(), "registered requirement");
        self.requirements.insert(name, requirement);
        Ok(())
    }

    /// Register a feature backed by requirement names
    ///
    /// Requirement names are not checked here; unknown names surface when the
    /// feature is evaluated, so registration order is unconstrained.
    /// Repeated names keep their first position.
    ///
    /// # Errors
    /// - `RegistryError::DuplicateFeature` if `name` is taken
    pub fn register_feature<I, S>(&mut self, name: impl Into<String>, requirements: I) -> RegistryResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.features.contains_key(&name) {
            return Err(RegistryError::DuplicateFeature(name));
        }
        let requirements: IndexSet<String> = requirements.into_iter().map(Into::into).collect();
        tracing::trace!(feature = %name, requirements = requirements.len(), "registered feature");
        self.features.insert(name, requirements);
        Ok(())
    }

    /// Evaluate a feature
    ///
    /// Requirements run in registration order and stop at the first `false`.
    /// A feature with no requirements is disabled.
    ///
    /// # Errors
    /// - `RegistryError::UnknownFeature` if `name` was never registered
    /// - `RegistryError::UnknownRequirement` if any referenced requirement is
    ///   missing, regardless of what the other requirements evaluate to
    pub fn is_feature_enabled(&self, name: &str) -> RegistryResult<bool> {
        let requirement_names = self
            .features
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFeature(name.to_string()))?;

        let resolved = requirement_names
            .iter()
            .map(|req| {
                self.requirements
                    .get(req)
                    .ok_or_else(|| RegistryError::unknown_requirement(name, req))
            })
            .collect::<RegistryResult<Vec<_>>>()?;

        if resolved.is_empty() {
            tracing::debug!(feature = name, "feature has no requirements; disabled");
            return Ok(false);
        }

        let enabled = resolved.iter().all(|req| req.evaluate());
        tracing::debug!(feature = name, enabled, "evaluated feature");
        Ok(enabled)
    }

    /// Evaluate every registered feature, in registration order
    ///
    /// # Errors
    /// Propagates the first evaluation error
    pub fn evaluate_all(&self) -> RegistryResult<IndexMap<String, bool>> {
        self.features
            .keys()
            .map(|name| Ok((name.clone(), self.is_feature_enabled(name)?)))
            .collect()
    }

    /// Marker classes for the initial render, one per feature
    ///
    /// # Errors
    /// Propagates the first evaluation error
    pub fn render_markers(&self, names: &MarkerNames) -> RegistryResult<Vec<String>> {
        Ok(self
            .evaluate_all()?
            .into_iter()
            .map(|(feature, enabled)| names.class_for(&feature, enabled))
            .collect())
    }

    /// Check if requirement exists
    #[inline]
    #[must_use]
    pub fn has_requirement(&self, name: &str) -> bool {
        self.requirements.contains_key(name)
    }

    /// Check if feature exists
    #[inline]
    #[must_use]
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Requirement names referenced by a feature
    #[must_use]
    pub fn feature_requirements(&self, name: &str) -> Option<Vec<&str>> {
        self.features
            .get(name)
            .map(|reqs| reqs.iter().map(String::as_str).collect())
    }

    /// Registered feature names, in registration order
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Get number of registered features
    #[inline]
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Get number of registered requirements
    #[inline]
    #[must_use]
    pub fn requirement_count(&self) -> usize {
        self.requirements.len()
    }
}

impl fmt::Debug for FeatureRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("requirements", &self.requirements.keys().collect::<Vec<_>>())
            .field("features", &self.features)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn toolbar_registry(latest_skin: bool) -> FeatureRegistry<'static> {
        let mut registry = FeatureRegistry::new();
        registry.register_simple_requirement("loggedIn", true).unwrap();
        registry.register_simple_requirement("latestSkin", latest_skin).unwrap();
        registry
            .register_feature("modernToolbar", ["loggedIn", "latestSkin"])
            .unwrap();
        registry
    }

    #[test]
    fn registry_new_empty() {
        let registry = FeatureRegistry::new();
        assert_eq!(registry.feature_count(), 0);
        assert_eq!(registry.requirement_count(), 0);
    }

    #[test]
    fn modern_toolbar_scenario() {
        assert!(!toolbar_registry(false).is_feature_enabled("modernToolbar").unwrap());
        assert!(toolbar_registry(true).is_feature_enabled("modernToolbar").unwrap());
    }

    #[test]
    fn empty_requirement_set_is_disabled() {
        let mut registry = FeatureRegistry::new();
        registry.register_feature("bare", Vec::<String>::new()).unwrap();
        assert!(!registry.is_feature_enabled("bare").unwrap());
    }

    #[test]
    fn unknown_feature_fails() {
        let registry = FeatureRegistry::new();
        assert_eq!(
            registry.is_feature_enabled("missing"),
            Err(RegistryError::UnknownFeature("missing".to_string()))
        );
    }

    #[test]
    fn unknown_requirement_fails_even_after_false() {
        let mut registry = FeatureRegistry::new();
        registry.register_simple_requirement("off", false).unwrap();
        registry.register_feature("f", ["off", "ghost"]).unwrap();
        assert_eq!(
            registry.is_feature_enabled("f"),
            Err(RegistryError::unknown_requirement("f", "ghost"))
        );
    }

    #[test]
    fn features_may_be_registered_before_requirements() {
        let mut registry = FeatureRegistry::new();
        registry.register_feature("f", ["later"]).unwrap();
        registry.register_simple_requirement("later", true).unwrap();
        assert!(registry.is_feature_enabled("f").unwrap());
    }

    #[test]
    fn duplicate_requirement_keeps_first() {
        let mut registry = FeatureRegistry::new();
        registry.register_simple_requirement("r", true).unwrap();
        let err = registry.register_requirement("r", || false).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRequirement("r".to_string()));

        registry.register_feature("f", ["r"]).unwrap();
        assert!(registry.is_feature_enabled("f").unwrap());
    }

    #[test]
    fn duplicate_feature_keeps_first() {
        let mut registry = FeatureRegistry::new();
        registry.register_simple_requirement("r", true).unwrap();
        registry.register_feature("f", ["r"]).unwrap();
        let err = registry.register_feature("f", Vec::<String>::new()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateFeature("f".to_string()));
        assert_eq!(registry.feature_requirements("f"), Some(vec!["r"]));
    }

    #[test]
    fn evaluation_short_circuits() {
        let calls = Cell::new(0);
        let mut registry = FeatureRegistry::new();
        registry.register_simple_requirement("off", false).unwrap();
        registry
            .register_requirement("counted", || {
                calls.set(calls.get() + 1);
                true
            })
            .unwrap();
        registry.register_feature("f", ["off", "counted"]).unwrap();

        assert!(!registry.is_feature_enabled("f").unwrap());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn deferred_requirements_are_not_cached() {
        let flag = Cell::new(false);
        let mut registry = FeatureRegistry::new();
        registry.register_requirement("flag", || flag.get()).unwrap();
        registry.register_feature("f", ["flag"]).unwrap();

        assert!(!registry.is_feature_enabled("f").unwrap());
        flag.set(true);
        assert!(registry.is_feature_enabled("f").unwrap());
    }

    #[test]
    fn render_markers_in_registration_order() {
        let mut registry = toolbar_registry(false);
        registry.register_feature("account", ["loggedIn"]).unwrap();

        let classes = registry.render_markers(&MarkerNames::new("x")).unwrap();
        assert_eq!(classes, vec!["x-modernToolbar-disabled", "x-account-enabled"]);
    }

    #[test]
    fn render_markers_propagates_errors() {
        let mut registry = FeatureRegistry::new();
        registry.register_feature("f", ["ghost"]).unwrap();
        assert!(registry.render_markers(&MarkerNames::default()).is_err());
    }

    #[test]
    fn repeated_requirement_names_collapse() {
        let mut registry = FeatureRegistry::new();
        registry.register_feature("f", ["a", "b", "a"]).unwrap();
        assert_eq!(registry.feature_requirements("f"), Some(vec!["a", "b"]));
    }
}
