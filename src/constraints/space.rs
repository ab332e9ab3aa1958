//! Space constraints.
//!
//! Rules about *where* activities run: room blackouts, preferred rooms and
//! seat counts.

use std::collections::{BTreeSet, HashMap};

use super::{Constraint, ConstraintHeader, ConstraintKind};
use crate::error::{Result, TimetableError};
use crate::models::{Activity, Assignment, Room, StudentSet, TimeSpan};

/// Nothing is scheduled in a room during its blackout spans.
#[derive(Debug, Clone)]
pub struct RoomNotAvailable {
    header: ConstraintHeader,
    room_id: String,
    spans: Vec<TimeSpan>,
}

impl RoomNotAvailable {
    /// Creates the rule for explicit spans.
    pub fn new(room_id: impl Into<String>, spans: Vec<TimeSpan>, weight: u32) -> Result<Self> {
        let room_id = room_id.into();
        if room_id.is_empty() {
            return Err(TimetableError::constraint(
                ConstraintKind::RoomNotAvailable,
                "room ID is empty",
            ));
        }
        if spans.is_empty() {
            return Err(TimetableError::constraint(
                ConstraintKind::RoomNotAvailable,
                format!("room '{room_id}' has no unavailable spans"),
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            room_id,
            spans,
        })
    }

    /// Creates the rule from a room's own `unavailable_periods`.
    ///
    /// # Errors
    /// The room has no blackout spans.
    pub fn for_room(room: &Room, weight: u32) -> Result<Self> {
        Self::new(room.id.clone(), room.unavailable_periods.clone(), weight)
    }
}

impl Constraint for RoomNotAvailable {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::RoomNotAvailable
    }

    fn header(&self) -> &ConstraintHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ConstraintHeader {
        &mut self.header
    }

    // Any activity may land in the room.
    fn concerns(&self, _activity: &Activity) -> bool {
        true
    }

    fn check(&self, assignment: &Assignment) -> bool {
        assignment.activities_in_room(&self.room_id).iter().all(|b| {
            self.spans
                .iter()
                .all(|s| !(b.start() < s.end_minute() && s.start_minute() < b.end()))
        })
    }
}

/// An activity is held in one of a set of rooms.
///
/// Unplaced activities do not violate it.
#[derive(Debug, Clone)]
pub struct ActivityPreferredRooms {
    header: ConstraintHeader,
    activity_id: String,
    rooms: BTreeSet<String>,
}

impl ActivityPreferredRooms {
    /// Creates the rule.
    pub fn new(activity_id: impl Into<String>, rooms: Vec<String>, weight: u32) -> Result<Self> {
        let activity_id = activity_id.into();
        if rooms.is_empty() {
            return Err(TimetableError::constraint(
                ConstraintKind::ActivityPreferredRooms,
                format!("activity '{activity_id}' has no preferred rooms"),
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            activity_id,
            rooms: rooms.into_iter().collect(),
        })
    }

    /// Creates the rule from an activity's own `preferred_rooms`.
    pub fn for_activity(activity: &Activity, weight: u32) -> Result<Self> {
        Self::new(activity.id.clone(), activity.preferred_rooms.clone(), weight)
    }
}

impl Constraint for ActivityPreferredRooms {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::ActivityPreferredRooms
    }

    fn header(&self) -> &ConstraintHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ConstraintHeader {
        &mut self.header
    }

    fn concerns(&self, activity: &Activity) -> bool {
        activity.id == self.activity_id
    }

    fn check(&self, assignment: &Assignment) -> bool {
        assignment
            .room_of(&self.activity_id)
            .map_or(true, |room| self.rooms.contains(room))
    }
}

/// Every room seats all student sets of the activities placed in it.
///
/// Rooms or student sets unknown to the constraint are ignored.
#[derive(Debug, Clone)]
pub struct RoomCapacity {
    header: ConstraintHeader,
    capacities: HashMap<String, u32>,
    set_sizes: HashMap<String, u32>,
}

impl RoomCapacity {
    /// Creates the rule from the room and student set catalogs.
    pub fn new(rooms: &[Room], student_sets: &[StudentSet], weight: u32) -> Result<Self> {
        if rooms.is_empty() {
            return Err(TimetableError::constraint(
                ConstraintKind::RoomCapacity,
                "no rooms given",
            ));
        }
        Ok(Self {
            header: ConstraintHeader::new(weight)?,
            capacities: rooms.iter().map(|r| (r.id.clone(), r.capacity)).collect(),
            set_sizes: student_sets
                .iter()
                .map(|s| (s.id.clone(), s.size))
                .collect(),
        })
    }

    /// Students attending an activity.
    pub fn attendance(&self, activity: &Activity) -> u32 {
        activity
            .student_groups
            .iter()
            .filter_map(|g| self.set_sizes.get(g))
            .sum()
    }
}

impl Constraint for RoomCapacity {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::RoomCapacity
    }

    fn header(&self) -> &ConstraintHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ConstraintHeader {
        &mut self.header
    }

    fn concerns(&self, activity: &Activity) -> bool {
        !activity.student_groups.is_empty()
    }

    fn check(&self, assignment: &Assignment) -> bool {
        assignment.all_placed().iter().all(|b| {
            self.capacities
                .get(b.room)
                .map_or(true, |&cap| self.attendance(b.activity) <= cap)
        })
    }
}
