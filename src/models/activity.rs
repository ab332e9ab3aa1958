//! Activity model.
//!
//! An activity is the smallest schedulable teaching unit: a fixed number of
//! minutes that needs its teachers and student groups together in one room.
//! Activities are built once by the caller and only read by the scheduler.
//!
//! # Placement preferences
//!
//! Construction tries start times in this order:
//! 1. `preferred_start_time`
//! 2. `preferred_start_times`, first to last
//! 3. `preferred_time_slots`, first to last
//! 4. every legal grid period, shuffled

use serde::{Deserialize, Serialize};

use super::Period;

/// A timetabled activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Subject identifier, used for the subject's preferred rooms.
    pub subject: Option<String>,
    /// Length of the activity in minutes.
    pub duration_minutes: u32,
    /// Teacher IDs; all of them attend.
    pub teachers: Vec<String>,
    /// Student set IDs; all of them attend.
    pub student_groups: Vec<String>,
    /// Free-form tags (e.g. "lab", "lecture").
    pub tags: Vec<String>,
    /// Rooms to try first.
    pub preferred_rooms: Vec<String>,
    /// Single start time tried before anything else.
    pub preferred_start_time: Option<Period>,
    /// Start times to try, in order.
    pub preferred_start_times: Vec<Period>,
    /// Time slots to try after the start times.
    pub preferred_time_slots: Vec<Period>,
}

impl Activity {
    /// Creates an activity with the given duration and no participants.
    pub fn new(id: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subject: None,
            duration_minutes,
            teachers: Vec::new(),
            student_groups: Vec::new(),
            tags: Vec::new(),
            preferred_rooms: Vec::new(),
            preferred_start_time: None,
            preferred_start_times: Vec::new(),
            preferred_time_slots: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teachers.push(teacher_id.into());
        self
    }

    /// Adds a student set.
    pub fn with_student_group(mut self, group_id: impl Into<String>) -> Self {
        self.student_groups.push(group_id.into());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds a preferred room.
    pub fn with_preferred_room(mut self, room_id: impl Into<String>) -> Self {
        self.preferred_rooms.push(room_id.into());
        self
    }

    /// Sets the single preferred start time.
    pub fn with_preferred_start_time(mut self, period: Period) -> Self {
        self.preferred_start_time = Some(period);
        self
    }

    /// Appends a preferred start time.
    pub fn with_preferred_start_times(mut self, periods: Vec<Period>) -> Self {
        self.preferred_start_times.extend(periods);
        self
    }

    /// Appends preferred time slots.
    pub fn with_preferred_time_slots(mut self, periods: Vec<Period>) -> Self {
        self.preferred_time_slots.extend(periods);
        self
    }

    /// Whether a teacher attends.
    pub fn has_teacher(&self, teacher_id: &str) -> bool {
        self.teachers.iter().any(|t| t == teacher_id)
    }

    /// Whether a student set attends.
    pub fn has_student_group(&self, group_id: &str) -> bool {
        self.student_groups.iter().any(|g| g == group_id)
    }

    /// Whether the activity carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether any start-time preference is set.
    pub fn has_time_preferences(&self) -> bool {
        self.preferred_start_time.is_some()
            || !self.preferred_start_times.is_empty()
            || !self.preferred_time_slots.is_empty()
    }

    /// Placement difficulty used to order greedy construction.
    ///
    /// `teachers + student_groups + duration_minutes + (1 if time preferences)`.
    pub fn complexity(&self) -> u64 {
        self.teachers.len() as u64
            + self.student_groups.len() as u64
            + self.duration_minutes as u64
            + u64::from(self.has_time_preferences())
    }

    /// Start times to try before the shuffled grid, in preference order.
    pub fn preferred_starts(&self) -> impl Iterator<Item = Period> + '_ {
        self.preferred_start_time
            .iter()
            .chain(&self.preferred_start_times)
            .chain(&self.preferred_time_slots)
            .copied()
    }
}
