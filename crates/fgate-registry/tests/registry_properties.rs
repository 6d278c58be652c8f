//! Property tests for feature evaluation.
//!
//! A feature is the AND of its requirements: enabled exactly when every
//! requirement holds, and never enabled when it has none.

use fgate_registry::{Experiment, FeatureRegistry, RegistryError};
use proptest::prelude::*;
use serde_json::json;

fn registry_for(values: &[bool]) -> FeatureRegistry<'static> {
    let mut registry = FeatureRegistry::new();
    for (i, value) in values.iter().enumerate() {
        registry
            .register_simple_requirement(format!("r{i}"), *value)
            .unwrap();
    }
    registry
        .register_feature("f", (0..values.len()).map(|i| format!("r{i}")))
        .unwrap();
    registry
}

proptest! {
    #[test]
    fn prop_enabled_iff_all_requirements_hold(values in proptest::collection::vec(any::<bool>(), 0..12)) {
        let registry = registry_for(&values);
        let expected = !values.is_empty() && values.iter().all(|v| *v);
        prop_assert_eq!(registry.is_feature_enabled("f").unwrap(), expected);
    }

    #[test]
    fn prop_single_false_disables(len in 1..12usize, idx in 0..12usize) {
        let idx = idx % len;
        let mut values = vec![true; len];
        prop_assert!(registry_for(&values).is_feature_enabled("f").unwrap());

        values[idx] = false;
        prop_assert!(!registry_for(&values).is_feature_enabled("f").unwrap());
    }

    #[test]
    fn prop_unknown_requirement_always_fails(values in proptest::collection::vec(any::<bool>(), 0..8)) {
        let mut registry = FeatureRegistry::new();
        let mut names = Vec::new();
        for (i, value) in values.iter().enumerate() {
            registry.register_simple_requirement(format!("r{i}"), *value).unwrap();
            names.push(format!("r{i}"));
        }
        names.push("ghost".to_string());
        registry.register_feature("f", names).unwrap();

        prop_assert_eq!(
            registry.is_feature_enabled("f"),
            Err(RegistryError::unknown_requirement("f", "ghost"))
        );
    }

    #[test]
    fn prop_unregistered_feature_always_fails(name in "[a-zA-Z]{1,16}") {
        let registry = registry_for(&[true]);
        prop_assume!(name != "f");
        prop_assert_eq!(
            registry.is_feature_enabled(&name),
            Err(RegistryError::UnknownFeature(name.clone()))
        );
    }
}

#[test]
fn experiment_requirement_gates_feature() {
    let experiment = Experiment::from_value(&json!({
        "name": "vector.sticky_header",
        "enabled": true,
        "buckets": {
            "unsampled": { "samplingRate": 0 },
            "stickyHeaderEnabled": { "samplingRate": 1 },
        }
    }))
    .unwrap()
    .unwrap();

    let mut registry = FeatureRegistry::new();
    registry
        .register_experiment_requirement("inTreatment", &experiment, "user-1", "stickyHeaderEnabled")
        .unwrap();
    registry
        .register_experiment_requirement("inControl", &experiment, "user-1", "unsampled")
        .unwrap();
    registry.register_feature("stickyHeader", ["inTreatment"]).unwrap();
    registry.register_feature("stickyHeaderControl", ["inControl"]).unwrap();

    assert!(registry.is_feature_enabled("stickyHeader").unwrap());
    assert!(!registry.is_feature_enabled("stickyHeaderControl").unwrap());
}

#[test]
fn experiment_requirement_rejects_unknown_bucket() {
    let experiment = Experiment::from_json(
        r#"{"name":"e","enabled":true,"buckets":{"unsampled":{"samplingRate":1}}}"#,
    )
    .unwrap()
    .unwrap();

    let mut registry = FeatureRegistry::new();
    let err = registry
        .register_experiment_requirement("r", &experiment, "u", "treatment")
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownBucket { .. }));
    assert!(!registry.has_requirement("r"));
}
