//! Time constraints.
//!
//! Rules about *when* activities run: participant double booking,
//! availability, daily load, continuity, span, gaps and fixed start times.
//! Per-participant rules take an [`Actor`] and report the teacher or
//! student-set flavour of their [`ConstraintKind`].
//!
//! Lower-bound rules ([`MinHoursDaily`]) are violated by partial schedules,
//! so they are best registered as soft: as hard constraints they gate every
//! placement of the participant's activities.

use std::collections::BTreeSet;

use super::algorithms::{
    booking_gap, bookings_overlap, busy_minutes, continuous_blocks, group_by_day, span,
};
use super::{Actor, Constraint, ConstraintHeader, ConstraintKind};
use crate::error::{Result, TimetableError};
use crate::models::{Activity, Assignment, Period, TimeSpan};

macro_rules! header_accessors {
    () => {
        fn header(&self) -> &ConstraintHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut ConstraintHeader {
            &mut self.header
        }
    };
}

/// No teacher and no student set attends two overlapping activities.
#[derive(Debug, Clone)]
pub struct NoDoubleBooking {
    header: ConstraintHeader,
}

impl NoDoubleBooking {
    /// Creates the rule.
    pub fn new(weight: u32) -> Result<Self> {
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
        })
    }
}

impl Constraint for NoDoubleBooking {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::NoDoubleBooking
    }

    fn concerns(&self, activity: &Activity) -> bool {
        !activity.teachers.is_empty() || !activity.student_groups.is_empty()
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let placed = assignment.all_placed();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let shares_teacher = a.activity.teachers.iter().any(|t| b.activity.has_teacher(t));
                let shares_group = a
                    .activity
                    .student_groups
                    .iter()
                    .any(|g| b.activity.has_student_group(g));
                if (shares_teacher || shares_group) && bookings_overlap(a, b) {
                    return false;
                }
            }
        }
        true
    }
}

/// No two of the listed activities overlap in time, whatever their rooms.
#[derive(Debug, Clone)]
pub struct ActivitiesNotOverlapping {
    header: ConstraintHeader,
    activity_ids: BTreeSet<String>,
}

impl ActivitiesNotOverlapping {
    /// Creates the rule over at least two activities.
    pub fn new(activity_ids: Vec<String>, weight: u32) -> Result<Self> {
        let activity_ids: BTreeSet<String> = activity_ids.into_iter().collect();
        if activity_ids.len() < 2 {
            return Err(TimetableError::constraint(
                ConstraintKind::ActivitiesNotOverlapping,
                "needs at least two distinct activities",
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            activity_ids,
        })
    }
}

impl Constraint for ActivitiesNotOverlapping {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::ActivitiesNotOverlapping
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.activity_ids.contains(&activity.id)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let listed: Vec<_> = assignment
            .all_placed()
            .into_iter()
            .filter(|b| self.activity_ids.contains(&b.activity.id))
            .collect();
        listed
            .iter()
            .enumerate()
            .all(|(i, a)| listed[i + 1..].iter().all(|b| !bookings_overlap(a, b)))
    }
}

/// A participant has none of their activities during blackout spans.
#[derive(Debug, Clone)]
pub struct NotAvailable {
    header: ConstraintHeader,
    actor: Actor,
    spans: Vec<TimeSpan>,
}

impl NotAvailable {
    /// Creates the rule.
    ///
    /// # Errors
    /// Empty participant ID or no spans.
    pub fn new(actor: Actor, spans: Vec<TimeSpan>, weight: u32) -> Result<Self> {
        let kind = actor.kind(
            ConstraintKind::TeacherNotAvailable,
            ConstraintKind::StudentsNotAvailable,
        );
        actor.require_id(kind)?;
        if spans.is_empty() {
            return Err(TimetableError::constraint(kind, "no unavailable spans given"));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            actor,
            spans,
        })
    }
}

impl Constraint for NotAvailable {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        self.actor.kind(
            ConstraintKind::TeacherNotAvailable,
            ConstraintKind::StudentsNotAvailable,
        )
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.actor.attends(activity)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        self.actor.bookings(assignment).iter().all(|b| {
            self.spans
                .iter()
                .all(|s| !(b.start() < s.end_minute() && s.start_minute() < b.end()))
        })
    }
}

/// A participant works at most `max_hours` on any day.
#[derive(Debug, Clone)]
pub struct MaxHoursDaily {
    header: ConstraintHeader,
    actor: Actor,
    max_minutes: i64,
}

impl MaxHoursDaily {
    /// Creates the rule.
    pub fn new(actor: Actor, max_hours: u32, weight: u32) -> Result<Self> {
        let kind = actor.kind(
            ConstraintKind::TeacherMaxHoursDaily,
            ConstraintKind::StudentsMaxHoursDaily,
        );
        actor.require_id(kind)?;
        if max_hours == 0 || max_hours > 24 {
            return Err(TimetableError::constraint(
                kind,
                format!("max_hours {max_hours} must be in 1..=24"),
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            actor,
            max_minutes: max_hours as i64 * 60,
        })
    }
}

impl Constraint for MaxHoursDaily {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        self.actor.kind(
            ConstraintKind::TeacherMaxHoursDaily,
            ConstraintKind::StudentsMaxHoursDaily,
        )
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.actor.attends(activity)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        group_by_day(&self.actor.bookings(assignment))
            .values()
            .all(|day| busy_minutes(day) <= self.max_minutes)
    }
}

/// A participant works at least `min_hours` on every day they work at all.
#[derive(Debug, Clone)]
pub struct MinHoursDaily {
    header: ConstraintHeader,
    actor: Actor,
    min_minutes: i64,
}

impl MinHoursDaily {
    /// Creates the rule.
    pub fn new(actor: Actor, min_hours: u32, weight: u32) -> Result<Self> {
        let kind = actor.kind(
            ConstraintKind::TeacherMinHoursDaily,
            ConstraintKind::StudentsMinHoursDaily,
        );
        actor.require_id(kind)?;
        if min_hours == 0 || min_hours > 24 {
            return Err(TimetableError::constraint(
                kind,
                format!("min_hours {min_hours} must be in 1..=24"),
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            actor,
            min_minutes: min_hours as i64 * 60,
        })
    }
}

impl Constraint for MinHoursDaily {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        self.actor.kind(
            ConstraintKind::TeacherMinHoursDaily,
            ConstraintKind::StudentsMinHoursDaily,
        )
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.actor.attends(activity)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        group_by_day(&self.actor.bookings(assignment))
            .values()
            .all(|day| busy_minutes(day) >= self.min_minutes)
    }
}

/// A participant never works longer than `max_hours` without a break.
///
/// Breaks of up to `gap_tolerance` minutes do not end a block. With a tag,
/// only activities carrying it are considered.
#[derive(Debug, Clone)]
pub struct MaxContinuousHours {
    header: ConstraintHeader,
    actor: Actor,
    tag: Option<String>,
    max_minutes: i64,
    gap_tolerance: i64,
}

impl MaxContinuousHours {
    /// Creates the rule over all of the participant's activities.
    pub fn new(actor: Actor, max_hours: u32, weight: u32) -> Result<Self> {
        let kind = actor.kind(
            ConstraintKind::TeacherMaxContinuousHours,
            ConstraintKind::StudentsMaxContinuousHours,
        );
        actor.require_id(kind)?;
        if max_hours == 0 {
            return Err(TimetableError::constraint(kind, "max_hours must be positive"));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            actor,
            tag: None,
            max_minutes: max_hours as i64 * 60,
            gap_tolerance: 0,
        })
    }

    /// Restricts the rule to activities with `tag`.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(TimetableError::constraint(self.kind(), "activity tag is empty"));
        }
        self.tag = Some(tag);
        Ok(self)
    }

    /// Breaks up to this many minutes keep a block continuous.
    pub fn with_gap_tolerance(mut self, minutes: u32) -> Self {
        self.gap_tolerance = minutes as i64;
        self
    }

    fn tagged(&self, activity: &Activity) -> bool {
        self.tag.as_deref().map_or(true, |t| activity.has_tag(t))
    }
}

impl Constraint for MaxContinuousHours {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        self.actor.kind(
            ConstraintKind::TeacherMaxContinuousHours,
            ConstraintKind::StudentsMaxContinuousHours,
        )
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.actor.attends(activity) && self.tagged(activity)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let mut bookings = self.actor.bookings(assignment);
        bookings.retain(|b| self.tagged(b.activity));
        group_by_day(&bookings).values().all(|day| {
            continuous_blocks(day, self.gap_tolerance)
                .into_iter()
                .all(|block| block <= self.max_minutes)
        })
    }
}

/// First start to last end of a participant's day stays within `max_hours`.
#[derive(Debug, Clone)]
pub struct MaxSpanPerDay {
    header: ConstraintHeader,
    actor: Actor,
    max_minutes: i64,
}

impl MaxSpanPerDay {
    /// Creates the rule.
    pub fn new(actor: Actor, max_hours: u32, weight: u32) -> Result<Self> {
        let kind = actor.kind(
            ConstraintKind::TeacherMaxSpanPerDay,
            ConstraintKind::StudentsMaxSpanPerDay,
        );
        actor.require_id(kind)?;
        if max_hours == 0 || max_hours > 24 {
            return Err(TimetableError::constraint(
                kind,
                format!("max_hours {max_hours} must be in 1..=24"),
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            actor,
            max_minutes: max_hours as i64 * 60,
        })
    }
}

impl Constraint for MaxSpanPerDay {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        self.actor.kind(
            ConstraintKind::TeacherMaxSpanPerDay,
            ConstraintKind::StudentsMaxSpanPerDay,
        )
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.actor.attends(activity)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        group_by_day(&self.actor.bookings(assignment))
            .values()
            .all(|day| span(day) <= self.max_minutes)
    }
}

/// Listed activities on the same day are at least `min_gap` minutes apart.
#[derive(Debug, Clone)]
pub struct MinGapBetweenActivities {
    header: ConstraintHeader,
    activity_ids: BTreeSet<String>,
    min_gap: i64,
}

impl MinGapBetweenActivities {
    /// Creates the rule over at least two activities.
    pub fn new(activity_ids: Vec<String>, min_gap_minutes: u32, weight: u32) -> Result<Self> {
        let activity_ids: BTreeSet<String> = activity_ids.into_iter().collect();
        if activity_ids.len() < 2 {
            return Err(TimetableError::constraint(
                ConstraintKind::MinGapBetweenActivities,
                "needs at least two distinct activities",
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            activity_ids,
            min_gap: min_gap_minutes as i64,
        })
    }
}

impl Constraint for MinGapBetweenActivities {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::MinGapBetweenActivities
    }

    fn concerns(&self, activity: &Activity) -> bool {
        self.activity_ids.contains(&activity.id)
    }

    fn check(&self, assignment: &Assignment) -> bool {
        let listed: Vec<_> = assignment
            .all_placed()
            .into_iter()
            .filter(|b| self.activity_ids.contains(&b.activity.id))
            .collect();
        group_by_day(&listed).values().all(|day| {
            day.windows(2)
                .all(|pair| booking_gap(&pair[0], &pair[1]) >= self.min_gap)
        })
    }
}

/// An activity starts exactly at a given period.
///
/// Unplaced activities do not violate it.
#[derive(Debug, Clone)]
pub struct ActivityPreferredStartingTime {
    header: ConstraintHeader,
    activity_id: String,
    period: Period,
}

impl ActivityPreferredStartingTime {
    /// Creates the rule.
    pub fn new(activity_id: impl Into<String>, period: Period, weight: u32) -> Result<Self> {
        let activity_id = activity_id.into();
        if activity_id.is_empty() {
            return Err(TimetableError::constraint(
                ConstraintKind::ActivityPreferredStartingTime,
                "activity ID is empty",
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            activity_id,
            period,
        })
    }
}

impl Constraint for ActivityPreferredStartingTime {
    header_accessors!();

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::ActivityPreferredStartingTime
    }

    fn concerns(&self, activity: &Activity) -> bool {
        activity.id == self.activity_id
    }

    fn check(&self, assignment: &Assignment) -> bool {
        assignment
            .period_of(&self.activity_id)
            .map_or(true, |p| p == self.period)
    }
}
