//! Crate error type.
//!
//! Construction-time failures only. Placement failures during search are
//! not errors: operators revert and the scheduler carries on.

use thiserror::Error;

use crate::constraints::ConstraintKind;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Errors raised while building timetabling inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimetableError {
    /// Constraint weight outside 0..=100.
    #[error("constraint weight {0} is outside 0..=100")]
    InvalidWeight(u32),
    /// A constraint was built with parameters that make no sense for its target.
    #[error("invalid {kind} constraint: {reason}")]
    InvalidConstraint {
        kind: ConstraintKind,
        reason: String,
    },
    /// Scheduler configuration is inconsistent.
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(String),
    /// A teacher or student set carries inconsistent data.
    #[error("invalid entity '{id}': {reason}")]
    InvalidEntity { id: String, reason: String },
}

impl TimetableError {
    pub(crate) fn constraint(kind: ConstraintKind, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn entity(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
