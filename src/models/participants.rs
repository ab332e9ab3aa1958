//! Teacher and student set models.
//!
//! Participants are the exclusivity domains of the timetable: a teacher or a
//! student set can attend only one activity at a time. Daily hour bounds are
//! sanity-checked by `validate`; the matching constraints enforce them.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// A teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Minimum teaching hours on any working day.
    pub min_hours_daily: Option<u32>,
    /// Maximum teaching hours on any day.
    pub max_hours_daily: Option<u32>,
}

impl Teacher {
    /// Creates a teacher.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            min_hours_daily: None,
            max_hours_daily: None,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets daily hour bounds.
    pub fn with_daily_hours(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_hours_daily = min;
        self.max_hours_daily = max;
        self
    }

    /// Checks the hour bounds.
    pub fn validate(&self) -> Result<()> {
        check_daily_hours(&self.id, self.min_hours_daily, self.max_hours_daily)
    }
}

/// A student set (class, group or subgroup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSet {
    /// Unique student set identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of students.
    pub size: u32,
    /// Minimum hours on any working day.
    pub min_hours_daily: Option<u32>,
    /// Maximum hours on any day.
    pub max_hours_daily: Option<u32>,
}

impl StudentSet {
    /// Creates a student set.
    pub fn new(id: impl Into<String>, size: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            size,
            min_hours_daily: None,
            max_hours_daily: None,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets daily hour bounds.
    pub fn with_daily_hours(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_hours_daily = min;
        self.max_hours_daily = max;
        self
    }

    /// Checks the hour bounds.
    pub fn validate(&self) -> Result<()> {
        check_daily_hours(&self.id, self.min_hours_daily, self.max_hours_daily)
    }
}

fn check_daily_hours(id: &str, min: Option<u32>, max: Option<u32>) -> Result<()> {
    if let Some(max) = max {
        if max > 24 {
            return Err(TimetableError::entity(
                id,
                format!("max_hours_daily {max} exceeds 24"),
            ));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(TimetableError::entity(
                id,
                format!("min_hours_daily {min} is greater than max_hours_daily {max}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_valid_bounds() {
        let t = Teacher::new("T1")
            .with_name("Ada")
            .with_daily_hours(Some(2), Some(6));
        assert!(t.validate().is_ok());
        assert!(Teacher::new("T2").validate().is_ok());
    }

    #[test]
    fn test_teacher_min_above_max() {
        let t = Teacher::new("T1").with_daily_hours(Some(7), Some(6));
        let err = t.validate().unwrap_err();
        assert!(matches!(err, TimetableError::InvalidEntity { ref id, .. } if id == "T1"));
    }

    #[test]
    fn test_student_set_max_over_day() {
        let s = StudentSet::new("G1", 25).with_daily_hours(None, Some(25));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_student_set_builder() {
        let s = StudentSet::new("G1", 25).with_name("Year 1");
        assert_eq!(s.size, 25);
        assert_eq!(s.name, "Year 1");
        assert!(s.validate().is_ok());
    }
}
