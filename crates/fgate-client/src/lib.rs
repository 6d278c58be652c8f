//! fgate Client
//!
//! Runtime side of the feature contract: reads the class markers baked in at
//! render time, toggles them, and persists the user's choice.
//!
//! # Architecture
//!
//! ```text
//! FeatureRegistry ──render_markers──▶ Document { current, legacy }
//!                                          │
//!                          StateSynchronizer::toggle
//!                                          │
//!                     DebouncedWriter ──(window)──▶ PreferenceStore
//! ```
//!
//! # Example
//!
//! ```rust
//! use fgate_client::{Document, StateSynchronizer, SyncConfig};
//!
//! let doc = Document::from_markers(&["x-foo-disabled"]);
//! let mut sync = StateSynchronizer::anonymous(SyncConfig::new().with_marker_prefix("x"), doc);
//!
//! assert!(sync.toggle("foo", None).unwrap());
//! assert!(sync.is_enabled("foo"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod dom;
pub mod error;
pub mod persist;
pub mod synchronizer;

// Re-exports for convenience
pub use config::{SyncConfig, DEFAULT_DEBOUNCE_MS, DEFAULT_PREFERENCE_NAMESPACE};
pub use dom::{ClassList, Document, ElementClasses, Root};
pub use error::{ConfigError, PreferenceError, SyncError, SyncResult};
pub use persist::{DebouncedWriter, PreferenceStore};
pub use synchronizer::{Session, StateSynchronizer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for client-side feature code
    pub use crate::{
        ClassList, Document, PreferenceStore, Root, Session, StateSynchronizer, SyncConfig,
        SyncError,
    };
    pub use fgate_registry::FeatureState;
}
