//! # fgate-cli
//!
//! Offline evaluation of feature decisions.
//!
//! The `fgate` binary loads a decision file (requirements, experiment
//! enrollments and features), evaluates every feature the way a page render
//! would, and prints the decisions or the marker classes. It also validates
//! standalone experiment enrollment configs.

pub mod decision;
pub mod report;

pub use decision::{DecisionError, DecisionFile, ExperimentRequirement};
pub use report::{EvaluationReport, ExperimentReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
