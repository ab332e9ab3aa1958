//! Timetable construction and search.
//!
//! A [`Scheduler`] owns activities, rooms, subjects and constraints. It
//! builds a starting [`Assignment`](crate::models::Assignment) greedily,
//! gating every placement on the hard constraints, then improves it with
//! simulated annealing over three neighborhood moves.
//!
//! # Modules
//!
//! - `config`: grid shape, annealing parameters, conflict and scope switches
//! - `rng`: the seeded LCG behind every random decision
//! - `engine`: state, gated placement, greedy construction, scoring
//! - `neighborhood`: swap, relocate and change-room moves
//! - `annealing`: the search loop and parallel best-of-N driver
//! - `report`: violation diagnostics
//!
//! # Reproducibility
//!
//! Given the same problem and seed, a run makes the same random draws and
//! returns the same assignment. A wall-clock limit breaks this.

mod annealing;
mod config;
mod engine;
mod neighborhood;
mod report;
mod rng;

pub use annealing::{derive_seeds, SearchResult};
pub use config::{SchedulerConfig, ScopeDiscovery};
pub use engine::{Scheduler, PERFECT_SCORE};
pub use neighborhood::NeighborhoodMove;
pub use report::ViolationReport;
pub use rng::{Lcg, LCG_MODULUS};
