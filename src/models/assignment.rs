//! Assignment store: the mutable schedule state.
//!
//! Records which activity occupies which period and room, and answers the
//! conflict and lookup queries constraints and the scheduler need.
//!
//! # Indices
//!
//! Besides the placement map, two occupied-minute indices are kept so that
//! conflict checks cost O(duration) instead of O(placed activities):
//!
//! - **global index**, keyed by [`global_key`] (the minute alone): every
//!   activity running at that minute, anywhere;
//! - **room index**, keyed by [`room_key`] (room and minute): the single
//!   activity holding that room at that minute.
//!
//! A room can never hold two activities at once. Whether two *rooms* may be
//! busy at the same minute depends on [`Exclusivity`]: `PerRoom` allows it,
//! `Global` treats the whole site as one resource.
//!
//! # Invariant
//! An activity has a placement iff it occupies exactly `duration_minutes`
//! contiguous entries in both indices.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::{Activity, Period};

/// How far the no-conflict rule reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exclusivity {
    /// One activity per room per minute; different rooms run in parallel.
    #[default]
    PerRoom,
    /// One activity per minute across all rooms.
    Global,
}

/// Key of the global occupied-minute index.
#[inline]
pub fn global_key(minute: i64) -> i64 {
    minute
}

/// Key of the room-scoped occupied-minute index.
#[inline]
pub fn room_key(room: &str, minute: i64) -> (&str, i64) {
    (room, minute)
}

/// Where and when an activity sits.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// The placed activity.
    pub activity: Arc<Activity>,
    /// Start period.
    pub period: Period,
    /// Room ID.
    pub room: String,
}

impl Placement {
    /// Borrowed view of this placement.
    pub fn booking(&self) -> Booking<'_> {
        Booking {
            activity: &self.activity,
            period: self.period,
            room: &self.room,
        }
    }
}

/// Borrowed view of a placed activity, handed to constraint algorithms.
#[derive(Debug, Clone, Copy)]
pub struct Booking<'a> {
    /// The placed activity.
    pub activity: &'a Activity,
    /// Start period.
    pub period: Period,
    /// Room ID.
    pub room: &'a str,
}

impl Booking<'_> {
    /// Absolute start minute (inclusive).
    #[inline]
    pub fn start(&self) -> i64 {
        self.period.absolute_minutes()
    }

    /// Absolute end minute (exclusive).
    #[inline]
    pub fn end(&self) -> i64 {
        self.start() + self.activity.duration_minutes as i64
    }
}

/// The schedule under construction or search.
///
/// Cloned whole for every search neighbor. Placements are kept in a
/// `BTreeMap` so iteration order, and therefore every random pick made from
/// it, is reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    exclusivity: Exclusivity,
    placements: BTreeMap<String, Placement>,
    global_index: HashMap<i64, BTreeSet<String>>,
    room_index: HashMap<String, HashMap<i64, String>>,
}

impl Assignment {
    /// Creates an empty assignment.
    pub fn new(exclusivity: Exclusivity) -> Self {
        Self {
            exclusivity,
            ..Default::default()
        }
    }

    /// The conflict semantics in force.
    pub fn exclusivity(&self) -> Exclusivity {
        self.exclusivity
    }

    /// Whether `duration` minutes from `period` are free in `room`.
    ///
    /// Under `Global` exclusivity the minutes must also be free everywhere.
    pub fn is_free(&self, period: Period, duration_minutes: u32, room: &str) -> bool {
        let start = period.absolute_minutes();
        let room_minutes = self.room_index.get(room);
        (start..start + duration_minutes as i64).all(|minute| {
            let (_, room_minute) = room_key(room, minute);
            let room_free = room_minutes.map_or(true, |m| !m.contains_key(&room_minute));
            let global_free = match self.exclusivity {
                Exclusivity::PerRoom => true,
                Exclusivity::Global => !self.global_index.contains_key(&global_key(minute)),
            };
            room_free && global_free
        })
    }

    /// Places an activity, all or nothing.
    ///
    /// Returns `false` and changes nothing if the activity is already placed
    /// or any of its minutes conflicts.
    pub fn place(&mut self, activity: &Arc<Activity>, period: Period, room: &str) -> bool {
        if self.placements.contains_key(&activity.id)
            || !self.is_free(period, activity.duration_minutes, room)
        {
            return false;
        }

        let start = period.absolute_minutes();
        let room_minutes = self.room_index.entry(room.to_string()).or_default();
        for minute in start..start + activity.duration_minutes as i64 {
            let (_, room_minute) = room_key(room, minute);
            room_minutes.insert(room_minute, activity.id.clone());
            self.global_index
                .entry(global_key(minute))
                .or_default()
                .insert(activity.id.clone());
        }
        self.placements.insert(
            activity.id.clone(),
            Placement {
                activity: Arc::clone(activity),
                period,
                room: room.to_string(),
            },
        );
        true
    }

    /// Removes an activity and its index entries.
    ///
    /// Returns the removed placement; `None` (no-op) if it was not placed.
    pub fn unplace(&mut self, activity_id: &str) -> Option<Placement> {
        let placement = self.placements.remove(activity_id)?;
        let start = placement.period.absolute_minutes();
        let end = start + placement.activity.duration_minutes as i64;

        if let Some(room_minutes) = self.room_index.get_mut(&placement.room) {
            for minute in start..end {
                let (_, room_minute) = room_key(&placement.room, minute);
                room_minutes.remove(&room_minute);
            }
            if room_minutes.is_empty() {
                self.room_index.remove(&placement.room);
            }
        }
        for minute in start..end {
            let key = global_key(minute);
            if let Some(ids) = self.global_index.get_mut(&key) {
                ids.remove(activity_id);
                if ids.is_empty() {
                    self.global_index.remove(&key);
                }
            }
        }
        Some(placement)
    }

    /// Start period of a placed activity.
    pub fn period_of(&self, activity_id: &str) -> Option<Period> {
        self.placements.get(activity_id).map(|p| p.period)
    }

    /// Room of a placed activity.
    pub fn room_of(&self, activity_id: &str) -> Option<&str> {
        self.placements.get(activity_id).map(|p| p.room.as_str())
    }

    /// Full placement record of an activity.
    pub fn placement(&self, activity_id: &str) -> Option<&Placement> {
        self.placements.get(activity_id)
    }

    /// Whether an activity is placed.
    pub fn is_placed(&self, activity_id: &str) -> bool {
        self.placements.contains_key(activity_id)
    }

    /// An activity running at `period` in any room (lowest ID if several).
    pub fn activity_at(&self, period: Period) -> Option<&str> {
        self.global_index
            .get(&global_key(period.absolute_minutes()))
            .and_then(|ids| ids.first())
            .map(String::as_str)
    }

    /// Every activity running at `period`, in any room, ordered by ID.
    pub fn activities_at(&self, period: Period) -> Vec<&str> {
        self.global_index
            .get(&global_key(period.absolute_minutes()))
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Activity holding `room` at `period`.
    pub fn activity_in_room_at(&self, room: &str, period: Period) -> Option<&str> {
        let (room, minute) = room_key(room, period.absolute_minutes());
        self.room_index
            .get(room)
            .and_then(|m| m.get(&minute))
            .map(String::as_str)
    }

    /// Placed activities taught by a teacher.
    pub fn activities_of_teacher(&self, teacher_id: &str) -> Vec<Booking<'_>> {
        self.filter_placed(|a| a.has_teacher(teacher_id))
    }

    /// Placed activities attended by a student set.
    pub fn activities_of_group(&self, group_id: &str) -> Vec<Booking<'_>> {
        self.filter_placed(|a| a.has_student_group(group_id))
    }

    /// Placed activities in a room.
    pub fn activities_in_room(&self, room_id: &str) -> Vec<Booking<'_>> {
        self.placements
            .values()
            .filter(|p| p.room == room_id)
            .map(Placement::booking)
            .collect()
    }

    /// Every placed activity, ordered by activity ID.
    pub fn all_placed(&self) -> Vec<Booking<'_>> {
        self.placements.values().map(Placement::booking).collect()
    }

    /// IDs of placed activities, ordered.
    pub fn placed_ids(&self) -> Vec<&str> {
        self.placements.keys().map(String::as_str).collect()
    }

    /// Number of placed activities.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    fn filter_placed<F>(&self, keep: F) -> Vec<Booking<'_>>
    where
        F: Fn(&Activity) -> bool,
    {
        self.placements
            .values()
            .filter(|p| keep(&p.activity))
            .map(Placement::booking)
            .collect()
    }
}
