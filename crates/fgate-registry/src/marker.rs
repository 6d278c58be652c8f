//! Feature state markers
//!
//! The enabled/disabled decision crosses from render time to the client as a
//! pair of mutually exclusive class tokens:
//!
//! ```text
//! <prefix>-<feature>-enabled
//! <prefix>-<feature>-disabled
//! ```
//!
//! Internally the pair is a tri-state [`FeatureState`]; tokens exist only at
//! the markup boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default class prefix for feature markers
pub const DEFAULT_MARKER_PREFIX: &str = "vector-feature";

const ENABLED_SUFFIX: &str = "enabled";
const DISABLED_SUFFIX: &str = "disabled";

/// Tri-state feature marker value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureState {
    /// `-enabled` marker present
    Enabled,
    /// `-disabled` marker present
    Disabled,
    /// No marker for this feature
    #[default]
    Unset,
}

impl FeatureState {
    /// State for a boolean decision
    #[inline]
    #[must_use]
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    /// Boolean decision, if any marker is set
    #[inline]
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Enabled => Some(true),
            Self::Disabled => Some(false),
            Self::Unset => None,
        }
    }

    /// Check if a marker is set
    #[inline]
    #[must_use]
    pub fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for FeatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enabled => ENABLED_SUFFIX,
            Self::Disabled => DISABLED_SUFFIX,
            Self::Unset => "unset",
        };
        f.write_str(s)
    }
}

/// Class token naming for one marker prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerNames {
    prefix: String,
}

impl MarkerNames {
    /// Create naming for a prefix
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Get prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>-<feature>-enabled`
    #[must_use]
    pub fn enabled_class(&self, feature: &str) -> String {
        format!("{}-{feature}-{ENABLED_SUFFIX}", self.prefix)
    }

    /// `<prefix>-<feature>-disabled`
    #[must_use]
    pub fn disabled_class(&self, feature: &str) -> String {
        format!("{}-{feature}-{DISABLED_SUFFIX}", self.prefix)
    }

    /// Class token carrying a boolean decision
    #[must_use]
    pub fn class_for(&self, feature: &str, enabled: bool) -> String {
        if enabled {
            self.enabled_class(feature)
        } else {
            self.disabled_class(feature)
        }
    }

    /// Read a feature's state from a set of class tokens
    ///
    /// A `-disabled` token wins if both are somehow present, matching the
    /// precedence used when toggling.
    #[must_use]
    pub fn state_in<'c, I>(&self, feature: &str, classes: I) -> FeatureState
    where
        I: IntoIterator<Item = &'c str>,
    {
        let enabled = self.enabled_class(feature);
        let disabled = self.disabled_class(feature);
        let mut state = FeatureState::Unset;
        for class in classes {
            if class == disabled {
                return FeatureState::Disabled;
            }
            if class == enabled {
                state = FeatureState::Enabled;
            }
        }
        state
    }

    /// Extract the feature name from a marker token with this prefix
    #[must_use]
    pub fn parse<'c>(&self, class: &'c str) -> Option<(&'c str, FeatureState)> {
        let rest = class.strip_prefix(self.prefix.as_str())?.strip_prefix('-')?;
        if let Some(name) = rest.strip_suffix(ENABLED_SUFFIX).and_then(|r| r.strip_suffix('-')) {
            return (!name.is_empty()).then_some((name, FeatureState::Enabled));
        }
        if let Some(name) = rest.strip_suffix(DISABLED_SUFFIX).and_then(|r| r.strip_suffix('-')) {
            return (!name.is_empty()).then_some((name, FeatureState::Disabled));
        }
        None
    }
}

impl Default for MarkerNames {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_PREFIX)
    }
}
