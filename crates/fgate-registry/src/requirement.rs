//! Requirement capability
//!
//! A requirement is a named, side-effect-free condition evaluated with no
//! arguments. Constants and closures share one interface so the evaluator
//! treats every kind the same way.

use std::fmt;

/// Boolean condition evaluated at decision time
pub trait Requirement {
    /// Evaluate the condition
    fn evaluate(&self) -> bool;

    /// Short kind label (for debugging)
    fn kind(&self) -> &'static str;
}

/// Precomputed boolean requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleRequirement(bool);

impl SimpleRequirement {
    /// Create from a precomputed value
    #[inline]
    #[must_use]
    pub fn new(value: bool) -> Self {
        Self(value)
    }

    /// Get the stored value
    #[inline]
    #[must_use]
    pub fn value(&self) -> bool {
        self.0
    }
}

impl Requirement for SimpleRequirement {
    #[inline]
    fn evaluate(&self) -> bool {
        self.0
    }

    fn kind(&self) -> &'static str {
        "simple"
    }
}

/// Requirement evaluated lazily when a feature is checked
pub struct DeferredRequirement<F> {
    predicate: F,
}

impl<F> DeferredRequirement<F>
where
    F: Fn() -> bool,
{
    /// Wrap a predicate
    #[inline]
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Requirement for DeferredRequirement<F>
where
    F: Fn() -> bool,
{
    #[inline]
    fn evaluate(&self) -> bool {
        (self.predicate)()
    }

    fn kind(&self) -> &'static str {
        "deferred"
    }
}

impl<F> fmt::Debug for DeferredRequirement<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRequirement").finish_non_exhaustive()
    }
}
