//! Violation diagnostics.
//!
//! Tallies unsatisfied constraints by kind for tooling. The search never
//! reads it.

use serde::Serialize;
use std::collections::BTreeMap;

use super::engine::Scheduler;
use crate::constraints::ConstraintKind;
use crate::models::Assignment;

/// Unsatisfied constraints per kind, plus activities left without a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    /// Number of unsatisfied constraints of each kind. Kinds with no
    /// violation are absent.
    pub counts: BTreeMap<ConstraintKind, usize>,
    /// Registered activities missing from the assignment.
    pub unplaced: Vec<String>,
}

impl ViolationReport {
    /// Violations of one kind.
    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Violations across all kinds.
    pub fn total_violations(&self) -> usize {
        self.counts.values().sum()
    }

    /// No violations and nothing unplaced.
    pub fn is_clean(&self) -> bool {
        self.counts.is_empty() && self.unplaced.is_empty()
    }
}

impl Scheduler {
    /// Counts unsatisfied constraints by kind and lists unplaced activities.
    ///
    /// Disabled constraints are skipped. An activity blocked by a hard
    /// constraint shows up in `unplaced` rather than in `counts`, since the
    /// constraint holds for the assignment without it.
    pub fn analyze_violations(&mut self, assignment: &Assignment) -> ViolationReport {
        let mut counts = BTreeMap::new();
        for constraint in self.constraints_iter_mut() {
            if constraint.is_active() && !constraint.is_satisfied(assignment) {
                *counts.entry(constraint.kind()).or_insert(0) += 1;
            }
        }
        ViolationReport {
            counts,
            unplaced: self.unplaced_in(assignment),
        }
    }
}
