//! Client state synchronizer
//!
//! Reads and flips feature markers on the loaded document and persists the
//! result for identified users.
//!
//! # Lookup order
//!
//! ```text
//! read:   current root ──(unset)──▶ legacy root
//! toggle: current root ──(unset)──▶ legacy root ──▶ copy result to current root
//!                                         └─(unset)──▶ UnknownFeatureToggle
//! ```
//!
//! The legacy tier exists only for markup cached before the marker root moved.
//! Freshly rendered documents never reach it.

use crate::config::SyncConfig;
use crate::dom::{read_state, write_state, ClassList, Document, ElementClasses, Root};
use crate::error::{SyncError, SyncResult};
use crate::persist::{DebouncedWriter, PreferenceStore};
use fgate_registry::{FeatureState, MarkerNames};
use std::sync::Arc;

/// Who is viewing the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Not logged in; state lives only in the document
    Anonymous,
    /// Logged-in user whose preferences are persisted
    Identified {
        /// User name or id
        user: String,
    },
}

impl Session {
    /// Create identified session
    #[inline]
    #[must_use]
    pub fn identified(user: impl Into<String>) -> Self {
        Self::Identified { user: user.into() }
    }

    /// Check if anonymous
    #[inline]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Feature state synchronizer for one loaded document
#[derive(Debug)]
pub struct StateSynchronizer<L: ClassList = ElementClasses> {
    config: SyncConfig,
    names: MarkerNames,
    document: Document<L>,
    session: Session,
    writer: Option<DebouncedWriter>,
}

impl<L: ClassList> StateSynchronizer<L> {
    /// Create synchronizer for a document
    ///
    /// Anonymous sessions never persist, so they need no runtime.
    ///
    /// # Errors
    /// - `SyncError::NoRuntime` for identified sessions outside a tokio runtime
    pub fn new(
        config: SyncConfig,
        document: Document<L>,
        session: Session,
        store: Arc<dyn PreferenceStore>,
    ) -> SyncResult<Self> {
        let writer = if session.is_anonymous() {
            None
        } else {
            Some(DebouncedWriter::new(store, config.debounce_window())?)
        };
        Ok(Self::from_parts(config, document, session, writer))
    }

    /// Create synchronizer that never persists
    #[must_use]
    pub fn anonymous(config: SyncConfig, document: Document<L>) -> Self {
        Self::from_parts(config, document, Session::Anonymous, None)
    }

    fn from_parts(
        config: SyncConfig,
        document: Document<L>,
        session: Session,
        writer: Option<DebouncedWriter>,
    ) -> Self {
        Self {
            names: config.marker_names(),
            config,
            document,
            session,
            writer,
        }
    }

    /// Check if a feature is enabled
    ///
    /// True when either root carries the enabled marker. The legacy root is
    /// only ever read here, never written.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        let enabled = self.names.enabled_class(name);
        self.document.root(Root::Current).contains(&enabled)
            || self.document.root(Root::Legacy).contains(&enabled)
    }

    /// Effective marker state: the current root, then the legacy root
    #[must_use]
    pub fn state(&self, name: &str) -> FeatureState {
        match self.root_state(Root::Current, name) {
            FeatureState::Unset => self.root_state(Root::Legacy, name),
            state => state,
        }
    }

    /// Marker state on a single root
    #[must_use]
    pub fn root_state(&self, root: Root, name: &str) -> FeatureState {
        read_state(self.document.root(root), &self.names, name)
    }

    /// Apply the toggle transition to one root
    ///
    /// Returns the new state, or `None` (root untouched) when the root has no
    /// marker for `name` and no override was given.
    pub fn toggle_root(&mut self, root: Root, name: &str, force: Option<bool>) -> Option<bool> {
        let enabled = match (self.root_state(root, name), force) {
            (_, Some(forced)) => forced,
            (FeatureState::Disabled, None) => true,
            (FeatureState::Enabled, None) => false,
            (FeatureState::Unset, None) => return None,
        };
        write_state(
            self.document.root_mut(root),
            &self.names,
            name,
            FeatureState::from_enabled(enabled),
        );
        Some(enabled)
    }

    /// Toggle a feature and persist the new state
    ///
    /// `force` pins the outcome instead of flipping. The current root decides
    /// the transition when it carries a marker. Otherwise a marker found on
    /// the legacy root is transitioned and moved to the current root, so the
    /// legacy root no longer holds a marker for `name`. With neither marker,
    /// an override is still written to the current root.
    ///
    /// # Errors
    /// - `SyncError::UnknownFeatureToggle` if neither root has a marker and no
    ///   override is given; no root is modified
    pub fn toggle(&mut self, name: &str, force: Option<bool>) -> SyncResult<bool> {
        let root = if !self.root_state(Root::Current, name).is_set()
            && self.root_state(Root::Legacy, name).is_set()
        {
            Root::Legacy
        } else {
            Root::Current
        };

        let enabled = self
            .toggle_root(root, name, force)
            .ok_or_else(|| SyncError::UnknownFeatureToggle(name.to_string()))?;

        if root == Root::Legacy {
            tracing::warn!(feature = name, "migrated feature marker from legacy root");
            write_state(
                self.document.root_mut(Root::Legacy),
                &self.names,
                name,
                FeatureState::Unset,
            );
            write_state(
                self.document.root_mut(Root::Current),
                &self.names,
                name,
                FeatureState::from_enabled(enabled),
            );
        }

        tracing::debug!(feature = name, enabled, "toggled feature");
        self.save(name, enabled);
        Ok(enabled)
    }

    /// Persist a feature state for identified users
    ///
    /// Anonymous sessions are a no-op. Identified sessions schedule a
    /// debounced write of 0/1 under `<namespace>-<name>`.
    pub fn save(&self, name: &str, enabled: bool) {
        if self.session.is_anonymous() {
            return;
        }
        if let Some(writer) = &self.writer {
            writer.schedule(self.config.preference_key(name), enabled);
        }
    }

    /// Number of preference writes still waiting on the debounce window
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writer.as_ref().map_or(0, DebouncedWriter::pending_count)
    }

    /// Borrow the document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document<L> {
        &self.document
    }

    /// Release the document
    #[inline]
    #[must_use]
    pub fn into_document(self) -> Document<L> {
        self.document
    }

    /// Current session
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Marker naming in use
    #[inline]
    #[must_use]
    pub fn marker_names(&self) -> &MarkerNames {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_for(doc: Document) -> StateSynchronizer {
        StateSynchronizer::anonymous(SyncConfig::new().with_marker_prefix("x"), doc)
    }

    #[test]
    fn toggle_disabled_to_enabled() {
        let mut sync = sync_for(Document::from_markers(&["x-foo-disabled"]));

        assert!(sync.toggle("foo", None).unwrap());
        let current = sync.document().root(Root::Current);
        assert!(current.contains("x-foo-enabled"));
        assert!(!current.contains("x-foo-disabled"));
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut sync = sync_for(Document::from_markers(&["x-foo-enabled"]));
        assert!(!sync.toggle("foo", None).unwrap());
        assert!(sync.toggle("foo", None).unwrap());
        assert!(sync.is_enabled("foo"));
    }

    #[test]
    fn override_pins_state() {
        let mut sync = sync_for(Document::from_markers(&["x-foo-enabled"]));
        assert!(sync.toggle("foo", Some(true)).unwrap());
        assert!(sync.is_enabled("foo"));
        assert!(!sync.toggle("foo", Some(false)).unwrap());
        assert!(!sync.toggle("foo", Some(false)).unwrap());
        assert!(!sync.is_enabled("foo"));
    }

    #[test]
    fn unknown_feature_toggle_leaves_document_untouched() {
        let doc = Document::from_markers(&["x-bar-enabled"]);
        let mut sync = sync_for(doc.clone());

        let err = sync.toggle("foo", None).unwrap_err();
        assert_eq!(err, SyncError::UnknownFeatureToggle("foo".to_string()));
        assert_eq!(sync.document(), &doc);
    }

    #[test]
    fn legacy_marker_is_migrated() {
        let mut sync = sync_for(Document::legacy_only(&["x-foo-disabled"]));
        assert!(!sync.is_enabled("foo"));
        assert_eq!(sync.root_state(Root::Current, "foo"), FeatureState::Unset);

        assert!(sync.toggle("foo", None).unwrap());
        assert_eq!(sync.root_state(Root::Current, "foo"), FeatureState::Enabled);
        assert_eq!(sync.root_state(Root::Legacy, "foo"), FeatureState::Unset);

        assert!(!sync.toggle("foo", None).unwrap());
        assert_eq!(sync.root_state(Root::Current, "foo"), FeatureState::Disabled);
        assert!(!sync.is_enabled("foo"));
    }

    #[test]
    fn is_enabled_falls_back_to_legacy() {
        let sync = sync_for(Document::legacy_only(&["x-foo-enabled"]));
        assert!(sync.is_enabled("foo"));
    }

    #[test]
    fn legacy_enabled_marker_is_read_through() {
        let doc = Document::new(
            ElementClasses::from_attr("x-foo-disabled"),
            ElementClasses::from_attr("x-foo-enabled"),
        );
        let mut sync = sync_for(doc);
        assert!(sync.is_enabled("foo"));
        assert_eq!(sync.state("foo"), FeatureState::Disabled);

        // the transition is still decided by the current root
        assert!(sync.toggle("foo", None).unwrap());
        assert_eq!(sync.root_state(Root::Legacy, "foo"), FeatureState::Enabled);
    }

    #[test]
    fn toggle_root_without_marker_is_none() {
        let mut sync = sync_for(Document::default());
        assert_eq!(sync.toggle_root(Root::Legacy, "foo", None), None);
        assert_eq!(sync.toggle_root(Root::Legacy, "foo", Some(true)), Some(true));
    }

    #[test]
    fn forced_toggle_migrates_legacy_marker() {
        let mut sync = sync_for(Document::legacy_only(&["x-foo-enabled"]));

        assert!(!sync.toggle("foo", Some(false)).unwrap());
        assert!(!sync.is_enabled("foo"));
        assert_eq!(sync.root_state(Root::Current, "foo"), FeatureState::Disabled);
        assert_eq!(sync.root_state(Root::Legacy, "foo"), FeatureState::Unset);
    }

    #[test]
    fn forced_toggle_without_markers_writes_current_root() {
        let mut sync = sync_for(Document::default());

        assert!(sync.toggle("ghost", Some(true)).unwrap());
        assert!(sync.is_enabled("ghost"));
        assert_eq!(sync.root_state(Root::Current, "ghost"), FeatureState::Enabled);
        assert_eq!(sync.root_state(Root::Legacy, "ghost"), FeatureState::Unset);
    }

    #[test]
    fn anonymous_save_is_noop() {
        let sync = sync_for(Document::from_markers(&["x-foo-enabled"]));
        sync.save("foo", true);
        assert_eq!(sync.pending_writes(), 0);
    }
}
