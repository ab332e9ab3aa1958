//! Constraint contract and catalog.
//!
//! Every scheduling rule implements [`Constraint`]: a weight (0-100), an
//! on/off switch, a growable scope of activities it has seen, and a pure
//! `check` over an [`Assignment`].
//!
//! # Hard vs. soft
//!
//! Weight 100 is **hard**: it gates placement in the scheduler. Anything
//! below is **soft** and only feeds the score. A disabled constraint always
//! reports satisfied.
//!
//! # Scope
//!
//! A constraint does not know up front which activities it concerns. Its
//! `applies_to` set grows each time [`Constraint::is_satisfied`] sees a
//! placed activity that [`Constraint::concerns`] accepts, or eagerly through
//! [`Constraint::seed`]. Only activities in scope are gated by a hard
//! constraint.
//!
//! # Catalog
//!
//! - [`time`]: participant availability, daily load, continuity, spans, gaps,
//!   overlap freedom, fixed start times
//! - [`space`]: room availability, preferred rooms, room capacity
//!
//! Concrete policies share the interval helpers in [`algorithms`].

pub mod algorithms;
pub mod space;
pub mod time;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TimetableError};
use crate::models::{Activity, Assignment, Booking};

pub use space::{ActivityPreferredRooms, RoomCapacity, RoomNotAvailable};
pub use time::{
    ActivitiesNotOverlapping, ActivityPreferredStartingTime, MaxContinuousHours, MaxHoursDaily,
    MaxSpanPerDay, MinGapBetweenActivities, MinHoursDaily, NoDoubleBooking, NotAvailable,
};

/// Weight at which a constraint becomes hard.
pub const HARD_WEIGHT: u32 = 100;

/// Constraint type tag, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    NoDoubleBooking,
    ActivitiesNotOverlapping,
    TeacherNotAvailable,
    StudentsNotAvailable,
    TeacherMaxHoursDaily,
    StudentsMaxHoursDaily,
    TeacherMinHoursDaily,
    StudentsMinHoursDaily,
    TeacherMaxContinuousHours,
    StudentsMaxContinuousHours,
    TeacherMaxSpanPerDay,
    StudentsMaxSpanPerDay,
    MinGapBetweenActivities,
    ActivityPreferredStartingTime,
    RoomNotAvailable,
    ActivityPreferredRooms,
    RoomCapacity,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// State every constraint carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintHeader {
    weight: u32,
    active: bool,
    applies_to: BTreeSet<String>,
}

impl ConstraintHeader {
    /// Creates an active header with an empty scope.
    ///
    /// # Errors
    /// [`TimetableError::InvalidWeight`] if `weight > 100`.
    pub fn new(weight: u32) -> Result<Self> {
        check_weight(weight)?;
        Ok(Self {
            weight,
            active: true,
            applies_to: BTreeSet::new(),
        })
    }

    /// Weight (0-100).
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Changes the weight between runs.
    pub fn set_weight(&mut self, weight: u32) -> Result<()> {
        check_weight(weight)?;
        self.weight = weight;
        Ok(())
    }

    /// Whether the constraint is evaluated at all.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enables or disables the constraint between runs.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Activity IDs observed so far.
    pub fn applies_to(&self) -> &BTreeSet<String> {
        &self.applies_to
    }

    /// Adds an activity to the scope.
    pub fn observe(&mut self, activity_id: &str) {
        if !self.applies_to.contains(activity_id) {
            self.applies_to.insert(activity_id.to_string());
        }
    }
}

fn check_weight(weight: u32) -> Result<()> {
    if weight > HARD_WEIGHT {
        return Err(TimetableError::InvalidWeight(weight));
    }
    Ok(())
}

/// A scheduling rule evaluated against an assignment.
///
/// Implementors provide the header accessors, [`concerns`](Self::concerns)
/// and the pure [`check`](Self::check); scope tracking and the active switch
/// are handled by the provided methods.
pub trait Constraint: fmt::Debug + Send + Sync + ConstraintClone {
    /// Type tag.
    fn kind(&self) -> ConstraintKind;

    /// Shared state.
    fn header(&self) -> &ConstraintHeader;

    /// Shared state, mutably.
    fn header_mut(&mut self) -> &mut ConstraintHeader;

    /// Whether this rule is about `activity`.
    fn concerns(&self, activity: &Activity) -> bool;

    /// Evaluates the rule. Must not depend on the scope.
    fn check(&self, assignment: &Assignment) -> bool;

    /// Weight (0-100).
    fn weight(&self) -> u32 {
        self.header().weight()
    }

    /// Whether this is a hard (weight 100) constraint.
    fn is_hard(&self) -> bool {
        self.weight() == HARD_WEIGHT
    }

    /// Whether the constraint is enabled.
    fn is_active(&self) -> bool {
        self.header().is_active()
    }

    /// Whether an activity is in scope.
    fn applies_to(&self, activity_id: &str) -> bool {
        self.header().applies_to().contains(activity_id)
    }

    /// Evaluates the rule, recording every concerned placed activity in scope.
    ///
    /// Disabled constraints report `true` without looking.
    fn is_satisfied(&mut self, assignment: &Assignment) -> bool {
        if !self.is_active() {
            return true;
        }
        let observed: Vec<String> = assignment
            .all_placed()
            .iter()
            .filter(|b| !self.applies_to(&b.activity.id) && self.concerns(b.activity))
            .map(|b| b.activity.id.clone())
            .collect();
        for id in &observed {
            self.header_mut().observe(id);
        }
        self.check(assignment)
    }

    /// Scopes the constraint up front instead of waiting for observation.
    fn seed(&mut self, activities: &[Arc<Activity>]) {
        let ids: Vec<&str> = activities
            .iter()
            .filter(|a| self.concerns(a))
            .map(|a| a.id.as_str())
            .collect();
        for id in ids {
            self.header_mut().observe(id);
        }
    }
}

/// Object-safe cloning for boxed constraints.
pub trait ConstraintClone {
    /// Clones into a new box.
    fn clone_box(&self) -> Box<dyn Constraint>;
}

impl<T> ConstraintClone for T
where
    T: Constraint + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Constraint> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Constraint> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Whose timetable a per-participant constraint looks at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A teacher ID.
    Teacher(String),
    /// A student set ID.
    StudentSet(String),
}

impl Actor {
    /// Participant ID.
    pub fn id(&self) -> &str {
        match self {
            Actor::Teacher(id) | Actor::StudentSet(id) => id,
        }
    }

    /// Whether the participant attends `activity`.
    pub fn attends(&self, activity: &Activity) -> bool {
        match self {
            Actor::Teacher(id) => activity.has_teacher(id),
            Actor::StudentSet(id) => activity.has_student_group(id),
        }
    }

    /// The participant's placed activities.
    pub fn bookings<'a>(&self, assignment: &'a Assignment) -> Vec<Booking<'a>> {
        match self {
            Actor::Teacher(id) => assignment.activities_of_teacher(id),
            Actor::StudentSet(id) => assignment.activities_of_group(id),
        }
    }

    /// Picks the teacher or student flavour of a constraint kind.
    pub(crate) fn kind(&self, teacher: ConstraintKind, students: ConstraintKind) -> ConstraintKind {
        match self {
            Actor::Teacher(_) => teacher,
            Actor::StudentSet(_) => students,
        }
    }

    pub(crate) fn require_id(&self, kind: ConstraintKind) -> Result<()> {
        if self.id().is_empty() {
            return Err(TimetableError::constraint(kind, "participant ID is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    #[test]
    fn test_header_weight_bounds() {
        assert!(ConstraintHeader::new(0).is_ok());
        assert!(ConstraintHeader::new(100).is_ok());
        assert_eq!(
            ConstraintHeader::new(101).unwrap_err(),
            TimetableError::InvalidWeight(101)
        );

        let mut h = ConstraintHeader::new(50).unwrap();
        assert!(h.set_weight(150).is_err());
        assert_eq!(h.weight(), 50);
    }

    #[test]
    fn test_lazy_scope_grows_on_evaluation() {
        let mut c = NoDoubleBooking::new(100).unwrap();
        let a = Arc::new(Activity::new("A1", 60).with_teacher("T1"));
        assert!(!c.applies_to("A1"));

        let mut asg = Assignment::default();
        assert!(c.is_satisfied(&asg));
        assert!(!c.applies_to("A1"));

        asg.place(&a, Period::new(0, 9, 0), "R1");
        assert!(c.is_satisfied(&asg));
        assert!(c.applies_to("A1"));
    }

    #[test]
    fn test_seed_scopes_eagerly() {
        let mut c = NotAvailable::new(
            Actor::Teacher("T1".into()),
            vec![crate::models::TimeSpan::hour(Period::new(0, 8, 0))],
            100,
        )
        .unwrap();
        let acts = vec![
            Arc::new(Activity::new("A1", 60).with_teacher("T1")),
            Arc::new(Activity::new("A2", 60).with_teacher("T2")),
        ];
        c.seed(&acts);
        assert!(c.applies_to("A1"));
        assert!(!c.applies_to("A2"));
    }

    #[test]
    fn test_disabled_constraint_is_satisfied() {
        let mut c = NoDoubleBooking::new(100).unwrap();
        let a1 = Arc::new(Activity::new("A1", 60).with_teacher("T1"));
        let a2 = Arc::new(Activity::new("A2", 60).with_teacher("T1"));
        let mut asg = Assignment::default();
        asg.place(&a1, Period::new(0, 9, 0), "R1");
        asg.place(&a2, Period::new(0, 9, 0), "R2");

        assert!(!c.is_satisfied(&asg));
        c.header_mut().set_active(false);
        assert!(c.is_satisfied(&asg));
    }

    #[test]
    fn test_boxed_clone_keeps_state() {
        let mut c = NoDoubleBooking::new(80).unwrap();
        c.header_mut().observe("A1");
        let boxed: Box<dyn Constraint> = Box::new(c);
        let copy = boxed.clone();
        assert_eq!(copy.weight(), 80);
        assert!(copy.applies_to("A1"));
        assert!(!copy.is_hard());
    }

    #[test]
    fn test_actor_helpers() {
        let act = Activity::new("A1", 60).with_teacher("T1").with_student_group("G1");
        assert!(Actor::Teacher("T1".into()).attends(&act));
        assert!(!Actor::Teacher("G1".into()).attends(&act));
        assert!(Actor::StudentSet("G1".into()).attends(&act));
        assert_eq!(Actor::StudentSet("G1".into()).id(), "G1");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ConstraintKind::RoomCapacity.to_string(), "RoomCapacity");
    }
}
