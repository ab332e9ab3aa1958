//! Room and subject models.
//!
//! Rooms are the spatial resource activities are placed into. A room has a
//! capacity, an optional building and a blackout list of spans during which
//! nothing may be scheduled there.

use serde::{Deserialize, Serialize};

use super::TimeSpan;

/// A room that activities can be placed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seats available.
    pub capacity: u32,
    /// Building the room belongs to.
    pub building: Option<String>,
    /// Spans when the room cannot be used.
    pub unavailable_periods: Vec<TimeSpan>,
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            building: None,
            unavailable_periods: Vec::new(),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the building.
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    /// Adds a blackout span.
    pub fn with_unavailable(mut self, span: TimeSpan) -> Self {
        self.unavailable_periods.push(span);
        self
    }

    /// Whether `[start, end)` (absolute minutes) touches a blackout span.
    pub fn is_blocked(&self, start: i64, end: i64) -> bool {
        self.unavailable_periods
            .iter()
            .any(|s| start < s.end_minute() && s.start_minute() < end)
    }
}

/// A subject; its preferred rooms are the fallback when an activity has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Rooms suited to this subject.
    pub preferred_rooms: Vec<String>,
}

impl Subject {
    /// Creates a subject.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            preferred_rooms: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a preferred room.
    pub fn with_preferred_room(mut self, room_id: impl Into<String>) -> Self {
        self.preferred_rooms.push(room_id.into());
        self
    }
}
