//! Scheduler state, gated placement, greedy construction and scoring.
//!
//! # Construction
//!
//! 1. Sort activities by [`Activity::complexity`], descending, so the most
//!    constrained ones see the emptiest grid.
//! 2. For each activity try its preferred start times in order, then every
//!    grid period in shuffled order.
//! 3. At each period pick a room with [`Scheduler::find_room`]; the first
//!    `(period, room)` accepted by [`Scheduler::can_place`] wins.
//! 4. Activities with no legal slot stay unplaced (logged, not an error).
//!
//! # Score
//!
//! `Σ weight_i · (100 if satisfied_i else 0) / Σ weight_i` over every
//! registered constraint. Disabled constraints count as satisfied and keep
//! their weight in the denominator. With zero total weight the score is 0.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::config::{SchedulerConfig, ScopeDiscovery};
use super::rng::Lcg;
use crate::constraints::Constraint;
use crate::error::Result;
use crate::models::{Activity, Assignment, Period, Placement, Room, Subject};

/// Best possible score.
pub const PERFECT_SCORE: f64 = 100.0;

/// Timetabling scheduler.
///
/// Owns the problem (activities, rooms, subjects, constraints), the period
/// grid and the PRNG. Constraints are registered before a run and only
/// reconfigured between runs.
///
/// # Example
///
/// ```
/// use u_timetable::constraints::NoDoubleBooking;
/// use u_timetable::models::{Activity, Room};
/// use u_timetable::scheduler::{Scheduler, SchedulerConfig};
///
/// let config = SchedulerConfig::default().with_max_iterations(200);
/// let mut scheduler = Scheduler::new(config).unwrap();
/// scheduler.add_room(Room::new("R1", 30));
/// scheduler.add_activity(Activity::new("A1", 60).with_teacher("T1"));
/// scheduler.add_activity(Activity::new("A2", 60).with_teacher("T1"));
/// scheduler.add_time_constraint(NoDoubleBooking::new(100).unwrap());
///
/// let result = scheduler.generate_schedule();
/// assert_eq!(result.assignment.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    pub(super) activities: Vec<Arc<Activity>>,
    pub(super) rooms: Vec<Room>,
    pub(super) subjects: HashMap<String, Subject>,
    pub(super) time_constraints: Vec<Box<dyn Constraint>>,
    pub(super) space_constraints: Vec<Box<dyn Constraint>>,
    pub(super) grid: Vec<Period>,
    pub(super) rng: Lcg,
}

impl Scheduler {
    /// Creates a scheduler with no problem data.
    ///
    /// # Errors
    /// The configuration fails [`SchedulerConfig::validate`].
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid: config.grid(),
            rng: Lcg::new(config.seed),
            config,
            activities: Vec::new(),
            rooms: Vec::new(),
            subjects: HashMap::new(),
            time_constraints: Vec::new(),
            space_constraints: Vec::new(),
        })
    }

    /// Registers an activity.
    pub fn add_activity(&mut self, activity: Activity) {
        self.activities.push(Arc::new(activity));
    }

    /// Registers a room.
    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    /// Registers a subject (used for room fallback).
    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.insert(subject.id.clone(), subject);
    }

    /// Registers a time constraint.
    pub fn add_time_constraint<C: Constraint + 'static>(&mut self, constraint: C) {
        self.time_constraints.push(Box::new(constraint));
    }

    /// Registers a space constraint.
    pub fn add_space_constraint<C: Constraint + 'static>(&mut self, constraint: C) {
        self.space_constraints.push(Box::new(constraint));
    }

    /// Restarts the PRNG from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = Lcg::new(seed);
    }

    /// Configuration in force.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Registered activities, in registration order.
    pub fn activities(&self) -> &[Arc<Activity>] {
        &self.activities
    }

    /// Registered rooms.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Every legal start period.
    pub fn grid(&self) -> &[Period] {
        &self.grid
    }

    /// Registered time constraints, for reconfiguration between runs.
    pub fn time_constraints_mut(&mut self) -> &mut [Box<dyn Constraint>] {
        &mut self.time_constraints
    }

    /// Registered space constraints, for reconfiguration between runs.
    pub fn space_constraints_mut(&mut self) -> &mut [Box<dyn Constraint>] {
        &mut self.space_constraints
    }

    /// All constraints, time first.
    pub fn constraints(&self) -> impl Iterator<Item = &dyn Constraint> + '_ {
        self.time_constraints
            .iter()
            .chain(&self.space_constraints)
            .map(|c| &**c)
    }

    pub(super) fn constraints_iter_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Box<dyn Constraint>> + '_ {
        self.time_constraints
            .iter_mut()
            .chain(self.space_constraints.iter_mut())
    }

    /// Seeds every constraint's scope with the registered activities.
    pub fn seed_constraint_scopes(&mut self) {
        let activities = self.activities.clone();
        for constraint in self.constraints_iter_mut() {
            constraint.seed(&activities);
        }
    }

    /// Whether `activity` may go to `(period, room)` right now.
    ///
    /// Rejects slots that leave the teaching day, conflict in the store, or
    /// break a hard constraint that has the activity in scope. The
    /// assignment is left exactly as it was.
    pub fn can_place(
        &mut self,
        activity: &Arc<Activity>,
        period: Period,
        room: &str,
        assignment: &mut Assignment,
    ) -> bool {
        if assignment.is_placed(&activity.id) || !self.config.fits(period, activity.duration_minutes)
        {
            return false;
        }
        if !assignment.place(activity, period, room) {
            return false;
        }
        let allowed = self.hard_constraints_hold(&activity.id, assignment);
        assignment.unplace(&activity.id);
        allowed
    }

    /// [`can_place`](Self::can_place), then commits the placement.
    pub(super) fn try_place(
        &mut self,
        activity: &Arc<Activity>,
        period: Period,
        room: &str,
        assignment: &mut Assignment,
    ) -> bool {
        self.can_place(activity, period, room, assignment)
            && assignment.place(activity, period, room)
    }

    /// Puts a removed placement back where it was.
    pub(super) fn restore(assignment: &mut Assignment, placement: &Placement) {
        let restored = assignment.place(&placement.activity, placement.period, &placement.room);
        debug_assert!(restored, "original slot of {} was taken", placement.activity.id);
    }

    fn hard_constraints_hold(&mut self, activity_id: &str, assignment: &Assignment) -> bool {
        self.constraints_iter_mut()
            .filter(|c| c.is_hard() && c.applies_to(activity_id))
            .all(|c| c.is_satisfied(assignment))
    }

    /// First room accepting `activity` at `period`.
    ///
    /// Candidates come in tiers, each shuffled: the activity's preferred
    /// rooms, its subject's preferred rooms, then every other room.
    pub fn find_room(
        &mut self,
        activity: &Arc<Activity>,
        period: Period,
        assignment: &mut Assignment,
    ) -> Option<String> {
        for room in self.room_candidates(activity) {
            if self.can_place(activity, period, &room, assignment) {
                return Some(room);
            }
        }
        None
    }

    fn room_candidates(&mut self, activity: &Activity) -> Vec<String> {
        let known = |id: &String| self.rooms.iter().any(|r| &r.id == id);
        let mut preferred: Vec<String> = activity
            .preferred_rooms
            .iter()
            .filter(|id| known(id))
            .cloned()
            .collect();
        let mut by_subject: Vec<String> = activity
            .subject
            .as_ref()
            .and_then(|s| self.subjects.get(s))
            .map(|s| {
                s.preferred_rooms
                    .iter()
                    .filter(|id| known(id) && !preferred.contains(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let mut rest: Vec<String> = self
            .rooms
            .iter()
            .map(|r| r.id.clone())
            .filter(|id| !preferred.contains(id) && !by_subject.contains(id))
            .collect();

        self.rng.shuffle(&mut preferred);
        self.rng.shuffle(&mut by_subject);
        self.rng.shuffle(&mut rest);
        preferred.extend(by_subject);
        preferred.extend(rest);
        preferred
    }

    /// Greedy construction of a starting assignment.
    pub fn build_initial(&mut self) -> Assignment {
        let mut assignment = Assignment::new(self.config.exclusivity);
        let mut order = self.activities.clone();
        order.sort_by(|a, b| b.complexity().cmp(&a.complexity()));

        for activity in &order {
            if !self.place_greedily(activity, &mut assignment) {
                warn!(
                    "activity '{}' ({} min) could not be placed",
                    activity.id, activity.duration_minutes
                );
            }
        }
        debug!(
            "initial construction placed {}/{} activities",
            assignment.len(),
            self.activities.len()
        );
        assignment
    }

    fn place_greedily(&mut self, activity: &Arc<Activity>, assignment: &mut Assignment) -> bool {
        let preferred: Vec<Period> = activity.preferred_starts().collect();
        let mut shuffled = self.grid.clone();
        self.rng.shuffle(&mut shuffled);

        for period in preferred.into_iter().chain(shuffled) {
            if let Some(room) = self.find_room(activity, period, assignment) {
                return assignment.place(activity, period, &room);
            }
        }
        false
    }

    /// Weighted satisfaction score in `0..=100`.
    pub fn score(&mut self, assignment: &Assignment) -> f64 {
        let mut total_weight: u64 = 0;
        let mut earned: u64 = 0;
        for constraint in self.constraints_iter_mut() {
            let weight = u64::from(constraint.weight());
            total_weight += weight;
            if constraint.is_satisfied(assignment) {
                earned += weight * PERFECT_SCORE as u64;
            }
        }
        if total_weight == 0 {
            return 0.0;
        }
        earned as f64 / total_weight as f64
    }

    pub(super) fn prepare_scopes(&mut self) {
        if self.config.scope_discovery == ScopeDiscovery::Eager {
            self.seed_constraint_scopes();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{
        Actor, ActivityPreferredRooms, NoDoubleBooking, NotAvailable,
    };
    use crate::models::TimeSpan;

    fn scheduler() -> Scheduler {
        let mut s = Scheduler::new(SchedulerConfig::default().with_max_iterations(100)).unwrap();
        s.add_room(Room::new("R1", 30));
        s.add_room(Room::new("R2", 30));
        s
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Scheduler::new(SchedulerConfig::default().with_days(0)).is_err());
    }

    #[test]
    fn test_can_place_is_pure() {
        let mut s = scheduler();
        let a = Arc::new(Activity::new("A1", 60).with_teacher("T1"));
        let mut asg = Assignment::default();
        for _ in 0..5 {
            assert!(s.can_place(&a, Period::new(0, 9, 0), "R1", &mut asg));
        }
        assert!(asg.is_empty());
        assert_eq!(asg, Assignment::default());
    }

    #[test]
    fn test_can_place_rejects_out_of_day() {
        let mut s = scheduler();
        let a = Arc::new(Activity::new("A1", 120));
        let mut asg = Assignment::default();
        assert!(!s.can_place(&a, Period::new(0, 15, 0), "R1", &mut asg));
        assert!(!s.can_place(&a, Period::new(0, 7, 0), "R1", &mut asg));
        assert!(s.can_place(&a, Period::new(0, 14, 0), "R1", &mut asg));
    }

    #[test]
    fn test_can_place_rejects_already_placed() {
        let mut s = scheduler();
        let a = Arc::new(Activity::new("A1", 60));
        let mut asg = Assignment::default();
        assert!(asg.place(&a, Period::new(0, 9, 0), "R1"));
        assert!(!s.can_place(&a, Period::new(1, 9, 0), "R2", &mut asg));
        assert_eq!(asg.period_of("A1"), Some(Period::new(0, 9, 0)));
    }

    #[test]
    fn test_hard_constraint_gates_only_scoped_activities() {
        let mut s = scheduler();
        s.add_time_constraint(
            NotAvailable::new(
                Actor::Teacher("T1".into()),
                vec![TimeSpan::hour(Period::new(0, 8, 0))],
                100,
            )
            .unwrap(),
        );
        let a = Arc::new(Activity::new("A1", 60).with_teacher("T1"));
        let mut asg = Assignment::default();

        // never observed: not gated
        assert!(s.can_place(&a, Period::new(0, 8, 0), "R1", &mut asg));

        s.add_activity(Activity::new("A1", 60).with_teacher("T1"));
        s.seed_constraint_scopes();
        assert!(!s.can_place(&a, Period::new(0, 8, 0), "R1", &mut asg));
        assert!(s.can_place(&a, Period::new(0, 9, 0), "R1", &mut asg));
    }

    #[test]
    fn test_soft_constraint_never_gates() {
        let mut s = scheduler();
        s.add_activity(Activity::new("A1", 60).with_teacher("T1"));
        s.add_time_constraint(
            NotAvailable::new(
                Actor::Teacher("T1".into()),
                vec![TimeSpan::hour(Period::new(0, 8, 0))],
                99,
            )
            .unwrap(),
        );
        s.seed_constraint_scopes();
        let a = Arc::clone(&s.activities()[0]);
        let mut asg = Assignment::default();
        assert!(s.can_place(&a, Period::new(0, 8, 0), "R1", &mut asg));
    }

    #[test]
    fn test_score_weighted_average() {
        let mut s = scheduler();
        s.add_time_constraint(NoDoubleBooking::new(60).unwrap());
        s.add_space_constraint(
            ActivityPreferredRooms::new("A1", vec!["R2".into()], 40).unwrap(),
        );
        let a = Arc::new(Activity::new("A1", 60).with_teacher("T1"));
        let mut asg = Assignment::default();
        asg.place(&a, Period::new(0, 9, 0), "R1");

        // 60 * 100 / (60 + 40)
        assert!((s.score(&asg) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_disabled_counts_as_satisfied() {
        let mut s = scheduler();
        s.add_space_constraint(
            ActivityPreferredRooms::new("A1", vec!["R2".into()], 50).unwrap(),
        );
        s.add_time_constraint(NoDoubleBooking::new(50).unwrap());
        let a = Arc::new(Activity::new("A1", 60));
        let mut asg = Assignment::default();
        asg.place(&a, Period::new(0, 9, 0), "R1");
        assert!((s.score(&asg) - 50.0).abs() < 1e-9);

        s.space_constraints_mut()[0].header_mut().set_active(false);
        assert!((s.score(&asg) - PERFECT_SCORE).abs() < 1e-9);
    }

    #[test]
    fn test_score_without_constraints_is_zero() {
        let mut s = scheduler();
        assert_eq!(s.score(&Assignment::default()), 0.0);

        s.add_time_constraint(NoDoubleBooking::new(0).unwrap());
        assert_eq!(s.score(&Assignment::default()), 0.0);
    }

    #[test]
    fn test_find_room_prefers_activity_rooms() {
        let mut s = scheduler();
        let a = Arc::new(Activity::new("A1", 60).with_preferred_room("R2"));
        let mut asg = Assignment::default();
        assert_eq!(
            s.find_room(&a, Period::new(0, 9, 0), &mut asg).as_deref(),
            Some("R2")
        );

        // preferred room busy: falls back to any other room
        let blocker = Arc::new(Activity::new("B", 60));
        asg.place(&blocker, Period::new(0, 9, 0), "R2");
        assert_eq!(
            s.find_room(&a, Period::new(0, 9, 0), &mut asg).as_deref(),
            Some("R1")
        );
    }

    #[test]
    fn test_find_room_uses_subject_rooms() {
        let mut s = scheduler();
        s.add_room(Room::new("LAB", 20));
        s.add_subject(Subject::new("chem").with_preferred_room("LAB"));
        let a = Arc::new(Activity::new("A1", 60).with_subject("chem"));
        let mut asg = Assignment::default();
        assert_eq!(
            s.find_room(&a, Period::new(0, 9, 0), &mut asg).as_deref(),
            Some("LAB")
        );
    }

    #[test]
    fn test_build_initial_honours_preferred_start() {
        let mut s = scheduler();
        s.add_activity(
            Activity::new("A1", 60).with_preferred_start_time(Period::new(0, 9, 0)),
        );
        let asg = s.build_initial();
        assert_eq!(asg.period_of("A1"), Some(Period::new(0, 9, 0)));
    }

    #[test]
    fn test_build_initial_leaves_oversized_unplaced() {
        let mut s = scheduler();
        s.add_activity(Activity::new("HUGE", 9 * 60));
        s.add_activity(Activity::new("A1", 60));
        let asg = s.build_initial();
        assert!(!asg.is_placed("HUGE"));
        assert!(asg.is_placed("A1"));
    }

    #[test]
    fn test_build_initial_without_rooms() {
        let mut s = Scheduler::new(SchedulerConfig::default()).unwrap();
        s.add_activity(Activity::new("A1", 60));
        assert!(s.build_initial().is_empty());
    }

    #[test]
    fn test_build_initial_places_complex_activities_first() {
        // one room, 08:00-12:00: the 3h block fits only at 08:00 or 09:00
        let config = SchedulerConfig::default().with_days(1).with_hours(8, 12);
        let mut s = Scheduler::new(config).unwrap();
        s.add_room(Room::new("R1", 30));
        s.add_activity(
            Activity::new("SHORT", 60).with_preferred_start_time(Period::new(0, 9, 0)),
        );
        s.add_activity(
            Activity::new("LONG", 180)
                .with_teacher("T1")
                .with_teacher("T2")
                .with_student_group("G1"),
        );

        // in registration order SHORT would take 09:00 and leave no room for LONG
        let asg = s.build_initial();
        assert!(asg.is_placed("LONG"));
        assert!(asg.is_placed("SHORT"));
        let long_start = asg.period_of("LONG").unwrap();
        assert!(long_start == Period::new(0, 8, 0) || long_start == Period::new(0, 9, 0));
    }

    #[test]
    fn test_extreme_inputs_stay_unplaced() {
        let mut s = scheduler();
        s.add_activity(Activity::new("ENDLESS", u32::MAX));
        s.add_activity(
            Activity::new("FAR", 60).with_preferred_start_time(Period::new(0, u32::MAX / 10, 0)),
        );
        s.add_activity(Activity::new("A1", 60));

        let asg = s.build_initial();
        assert!(!asg.is_placed("ENDLESS"));
        assert!(asg.is_placed("FAR"));
        assert_ne!(asg.period_of("FAR"), Some(Period::new(0, u32::MAX / 10, 0)));
        assert!(asg.is_placed("A1"));
    }
}
