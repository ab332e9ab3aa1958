//! Per-participant and per-room views of an assignment.
//!
//! Resolves IDs to display names through the entity catalogs and groups
//! placements by teacher, student set and room. Every list is ordered by
//! day, then start time, then activity ID. Names fall back to IDs when an
//! entity is unknown or unnamed.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Assignment, Booking, Period, Room, StudentSet, Subject, Teacher};

/// One placed activity as seen in a timetable view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub activity_id: String,
    pub activity_name: String,
    pub subject: Option<String>,
    pub day: u32,
    pub start: Period,
    pub end: Period,
    pub room_id: String,
    pub room_name: String,
    pub teachers: Vec<String>,
    pub student_groups: Vec<String>,
}

/// Timetables keyed by teacher, student set and room ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimetableExport {
    pub teachers: BTreeMap<String, Vec<ScheduleEntry>>,
    pub student_groups: BTreeMap<String, Vec<ScheduleEntry>>,
    pub rooms: BTreeMap<String, Vec<ScheduleEntry>>,
}

impl TimetableExport {
    /// Number of distinct placed activities in the export.
    pub fn activity_count(&self) -> usize {
        self.rooms.values().map(Vec::len).sum()
    }
}

/// Builds [`TimetableExport`]s against fixed entity catalogs.
#[derive(Debug, Clone, Default)]
pub struct TimetableExporter {
    room_names: HashMap<String, String>,
    teacher_names: HashMap<String, String>,
    set_names: HashMap<String, String>,
    subject_names: HashMap<String, String>,
}

fn names<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> HashMap<String, String> {
    pairs
        .filter(|(_, name)| !name.is_empty())
        .map(|(id, name)| (id.clone(), name.clone()))
        .collect()
}

impl TimetableExporter {
    /// Creates an exporter over the given catalogs.
    pub fn new(
        rooms: &[Room],
        teachers: &[Teacher],
        student_sets: &[StudentSet],
        subjects: &[Subject],
    ) -> Self {
        Self {
            room_names: names(rooms.iter().map(|r| (&r.id, &r.name))),
            teacher_names: names(teachers.iter().map(|t| (&t.id, &t.name))),
            set_names: names(student_sets.iter().map(|s| (&s.id, &s.name))),
            subject_names: names(subjects.iter().map(|s| (&s.id, &s.name))),
        }
    }

    fn display(map: &HashMap<String, String>, id: &str) -> String {
        map.get(id).cloned().unwrap_or_else(|| id.to_string())
    }

    fn entry(&self, booking: &Booking<'_>) -> ScheduleEntry {
        let activity = booking.activity;
        ScheduleEntry {
            activity_id: activity.id.clone(),
            activity_name: if activity.name.is_empty() {
                activity.id.clone()
            } else {
                activity.name.clone()
            },
            subject: activity
                .subject
                .as_deref()
                .map(|s| Self::display(&self.subject_names, s)),
            day: booking.period.day,
            start: booking.period,
            end: booking.period.plus_minutes(activity.duration_minutes),
            room_id: booking.room.to_string(),
            room_name: Self::display(&self.room_names, booking.room),
            teachers: activity
                .teachers
                .iter()
                .map(|t| Self::display(&self.teacher_names, t))
                .collect(),
            student_groups: activity
                .student_groups
                .iter()
                .map(|g| Self::display(&self.set_names, g))
                .collect(),
        }
    }

    /// Groups every placement of `assignment` into the three views.
    pub fn export(&self, assignment: &Assignment) -> TimetableExport {
        let mut export = TimetableExport::default();
        for booking in assignment.all_placed() {
            let entry = self.entry(&booking);
            for teacher in &booking.activity.teachers {
                export
                    .teachers
                    .entry(teacher.clone())
                    .or_default()
                    .push(entry.clone());
            }
            for group in &booking.activity.student_groups {
                export
                    .student_groups
                    .entry(group.clone())
                    .or_default()
                    .push(entry.clone());
            }
            export
                .rooms
                .entry(booking.room.to_string())
                .or_default()
                .push(entry);
        }

        for entries in export
            .teachers
            .values_mut()
            .chain(export.student_groups.values_mut())
            .chain(export.rooms.values_mut())
        {
            entries.sort_by(|a, b| {
                (a.start, &a.activity_id).cmp(&(b.start, &b.activity_id))
            });
        }
        export
    }
}
