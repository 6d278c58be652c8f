//! fgate Registry
//!
//! Server-side decision engine: composes named requirements into feature
//! enablement decisions and renders them as class markers for the client.
//!
//! # Core Concepts
//!
//! - [`Requirement`]: Boolean condition, precomputed or deferred
//! - [`FeatureRegistry`]: Per-context requirement and feature tables
//! - [`MarkerNames`] / [`FeatureState`]: The class-token contract shared with the client
//! - [`Experiment`]: Validated A/B-test enrollment usable as a requirement source
//!
//! # Example
//!
//! ```rust
//! use fgate_registry::{FeatureRegistry, MarkerNames};
//!
//! let mut registry = FeatureRegistry::new();
//! registry.register_simple_requirement("loggedIn", true).unwrap();
//! registry.register_simple_requirement("latestSkin", false).unwrap();
//! registry.register_feature("modernToolbar", ["loggedIn", "latestSkin"]).unwrap();
//!
//! assert!(!registry.is_feature_enabled("modernToolbar").unwrap());
//!
//! let classes = registry.render_markers(&MarkerNames::new("x")).unwrap();
//! assert_eq!(classes, vec!["x-modernToolbar-disabled"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod experiment;
pub mod marker;
pub mod registry;
pub mod requirement;

// Re-exports
pub use error::{ExperimentError, RegistryError, RegistryResult};
pub use experiment::{Bucket, Experiment, UNSAMPLED_BUCKET};
pub use marker::{FeatureState, MarkerNames, DEFAULT_MARKER_PREFIX};
pub use registry::FeatureRegistry;
pub use requirement::{DeferredRequirement, Requirement, SimpleRequirement};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building decision contexts
    pub use crate::{
        Experiment, FeatureRegistry, FeatureState, MarkerNames, RegistryError, Requirement,
    };
}
