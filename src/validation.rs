//! Input validation for timetabling problems.
//!
//! Checks structural integrity of activities and the entity catalogs before
//! scheduling. Detects:
//! - Duplicate IDs (per entity type)
//! - Unknown teacher, student set, room and subject references
//! - Zero-length activities and activities longer than a day
//! - Invalid daily hour bounds on teachers and student sets
//!
//! All issues are collected; nothing stops at the first error.

use crate::models::{Activity, Room, StudentSet, Subject, Teacher, MINUTES_PER_DAY};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same type share an ID.
    DuplicateId,
    /// An activity names a teacher that doesn't exist.
    UnknownTeacher,
    /// An activity names a student set that doesn't exist.
    UnknownStudentSet,
    /// An activity or subject names a room that doesn't exist.
    UnknownRoom,
    /// An activity names a subject that doesn't exist.
    UnknownSubject,
    /// An activity lasts zero minutes.
    ZeroDuration,
    /// An activity lasts longer than one day.
    ExcessiveDuration,
    /// A participant's daily hour bounds are inconsistent.
    InvalidHours,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn collect_ids<'a>(
    label: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {label} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates the input data for a timetabling problem.
///
/// Checks:
/// 1. No duplicate activity, room, subject, teacher or student set IDs
/// 2. Every activity lasts at least one minute and at most one day
/// 3. Teachers, student sets, preferred rooms and subjects named by
///    activities exist
/// 4. Rooms preferred by subjects exist
/// 5. Teacher and student set hour bounds pass their own `validate`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    activities: &[Activity],
    rooms: &[Room],
    subjects: &[Subject],
    teachers: &[Teacher],
    student_sets: &[StudentSet],
) -> ValidationResult {
    let mut errors = Vec::new();

    collect_ids("activity", activities.iter().map(|a| a.id.as_str()), &mut errors);
    let room_ids = collect_ids("room", rooms.iter().map(|r| r.id.as_str()), &mut errors);
    let subject_ids = collect_ids("subject", subjects.iter().map(|s| s.id.as_str()), &mut errors);
    let teacher_ids = collect_ids("teacher", teachers.iter().map(|t| t.id.as_str()), &mut errors);
    let set_ids = collect_ids(
        "student set",
        student_sets.iter().map(|s| s.id.as_str()),
        &mut errors,
    );

    for act in activities {
        if act.duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("Activity '{}' has zero duration", act.id),
            ));
        } else if i64::from(act.duration_minutes) > MINUTES_PER_DAY {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExcessiveDuration,
                format!(
                    "Activity '{}' lasts {} minutes, more than one day",
                    act.id, act.duration_minutes
                ),
            ));
        }
        for t in &act.teachers {
            if !teacher_ids.contains(t.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!("Activity '{}' references unknown teacher '{t}'", act.id),
                ));
            }
        }
        for g in &act.student_groups {
            if !set_ids.contains(g.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownStudentSet,
                    format!("Activity '{}' references unknown student set '{g}'", act.id),
                ));
            }
        }
        for r in &act.preferred_rooms {
            if !room_ids.contains(r.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRoom,
                    format!("Activity '{}' prefers unknown room '{r}'", act.id),
                ));
            }
        }
        if let Some(subject) = &act.subject {
            if !subject_ids.contains(subject.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Activity '{}' references unknown subject '{subject}'", act.id),
                ));
            }
        }
    }

    for subject in subjects {
        for r in &subject.preferred_rooms {
            if !room_ids.contains(r.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRoom,
                    format!("Subject '{}' prefers unknown room '{r}'", subject.id),
                ));
            }
        }
    }

    let hour_checks = teachers
        .iter()
        .map(Teacher::validate)
        .chain(student_sets.iter().map(StudentSet::validate));
    for check in hour_checks {
        if let Err(e) = check {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidHours,
                e.to_string(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
