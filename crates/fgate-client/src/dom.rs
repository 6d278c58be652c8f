//! Document roots and their class lists
//!
//! The synchronizer never touches markup directly. It sees two roots, each
//! exposing a [`ClassList`], and reads/writes marker tokens through that
//! interface only.

use fgate_registry::{FeatureState, MarkerNames};
use indexmap::IndexSet;
use std::fmt;

/// Mutable set of class tokens on one element
pub trait ClassList {
    /// Check if token is present
    fn contains(&self, class: &str) -> bool;

    /// Add token (no-op if present)
    fn add(&mut self, class: &str);

    /// Remove token (no-op if absent)
    fn remove(&mut self, class: &str);
}

/// Marker anchor consulted by the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    /// Present markup anchor
    Current,
    /// Superseded anchor kept for cached markup
    Legacy,
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("current"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// In-memory class list preserving insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementClasses {
    classes: IndexSet<String>,
}

impl ElementClasses {
    /// Create empty class list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace-separated `class` attribute
    #[must_use]
    pub fn from_attr(attr: &str) -> Self {
        attr.split_whitespace().collect()
    }

    /// Render as a `class` attribute value
    #[must_use]
    pub fn to_attr(&self) -> String {
        self.classes
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Iterate tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Get number of tokens
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassList for ElementClasses {
    fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn add(&mut self, class: &str) {
        if !self.classes.contains(class) {
            self.classes.insert(class.to_string());
        }
    }

    fn remove(&mut self, class: &str) {
        self.classes.shift_remove(class);
    }
}

impl<'s> FromIterator<&'s str> for ElementClasses {
    fn from_iter<I: IntoIterator<Item = &'s str>>(iter: I) -> Self {
        Self {
            classes: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Read one feature's marker state from a class list
///
/// `-disabled` wins if both tokens are present.
pub fn read_state<L: ClassList + ?Sized>(list: &L, names: &MarkerNames, feature: &str) -> FeatureState {
    if list.contains(&names.disabled_class(feature)) {
        FeatureState::Disabled
    } else if list.contains(&names.enabled_class(feature)) {
        FeatureState::Enabled
    } else {
        FeatureState::Unset
    }
}

/// Write one feature's marker state, keeping the pair mutually exclusive
pub fn write_state<L: ClassList + ?Sized>(
    list: &mut L,
    names: &MarkerNames,
    feature: &str,
    state: FeatureState,
) {
    let enabled = names.enabled_class(feature);
    let disabled = names.disabled_class(feature);
    match state {
        FeatureState::Enabled => {
            list.remove(&disabled);
            list.add(&enabled);
        }
        FeatureState::Disabled => {
            list.remove(&enabled);
            list.add(&disabled);
        }
        FeatureState::Unset => {
            list.remove(&enabled);
            list.remove(&disabled);
        }
    }
}

/// The two marker roots of a loaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document<L = ElementClasses> {
    current: L,
    legacy: L,
}

impl<L: ClassList> Document<L> {
    /// Create from existing roots
    #[inline]
    #[must_use]
    pub fn new(current: L, legacy: L) -> Self {
        Self { current, legacy }
    }

    /// Borrow a root
    #[inline]
    #[must_use]
    pub fn root(&self, root: Root) -> &L {
        match root {
            Root::Current => &self.current,
            Root::Legacy => &self.legacy,
        }
    }

    /// Mutably borrow a root
    #[inline]
    pub fn root_mut(&mut self, root: Root) -> &mut L {
        match root {
            Root::Current => &mut self.current,
            Root::Legacy => &mut self.legacy,
        }
    }

    /// Decompose into `(current, legacy)`
    #[inline]
    #[must_use]
    pub fn into_roots(self) -> (L, L) {
        (self.current, self.legacy)
    }
}

impl Document<ElementClasses> {
    /// Document as rendered fresh: markers on the current root only
    #[must_use]
    pub fn from_markers<S: AsRef<str>>(markers: &[S]) -> Self {
        Self::new(
            markers.iter().map(AsRef::as_ref).collect(),
            ElementClasses::new(),
        )
    }

    /// Document served from a cache that predates the current root
    #[must_use]
    pub fn legacy_only<S: AsRef<str>>(markers: &[S]) -> Self {
        Self::new(
            ElementClasses::new(),
            markers.iter().map(AsRef::as_ref).collect(),
        )
    }
}
