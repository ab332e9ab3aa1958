//! Local perturbations used by the annealing loop.
//!
//! Every move either lands completely or leaves the assignment exactly as
//! it found it. Placements go through [`Scheduler::try_place`], so hard
//! constraints gate neighbors the same way they gate construction.

use std::sync::Arc;

use super::engine::Scheduler;
use crate::models::{Activity, Assignment, Period, Placement};

/// Neighborhood operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborhoodMove {
    /// Exchange the slots of two placed activities.
    Swap,
    /// Move one activity to another period, trying its room first.
    Relocate,
    /// Keep the period, change the room.
    ChangeRoom,
}

impl NeighborhoodMove {
    /// All operators, in draw order.
    pub const ALL: [NeighborhoodMove; 3] = [
        NeighborhoodMove::Swap,
        NeighborhoodMove::Relocate,
        NeighborhoodMove::ChangeRoom,
    ];
}

impl Scheduler {
    /// Draws an operator uniformly.
    pub(super) fn pick_move(&mut self) -> NeighborhoodMove {
        NeighborhoodMove::ALL[self.rng.index(NeighborhoodMove::ALL.len())]
    }

    /// Applies `op` to `assignment`. Returns whether anything changed.
    pub fn apply_move(&mut self, op: NeighborhoodMove, assignment: &mut Assignment) -> bool {
        match op {
            NeighborhoodMove::Swap => self.swap(assignment),
            NeighborhoodMove::Relocate => self.relocate(assignment),
            NeighborhoodMove::ChangeRoom => self.change_room(assignment),
        }
    }

    fn pick_placed(&mut self, assignment: &Assignment) -> Option<String> {
        let ids = assignment.placed_ids();
        if ids.is_empty() {
            return None;
        }
        let i = self.rng.index(ids.len());
        Some(ids[i].to_string())
    }

    fn swap(&mut self, assignment: &mut Assignment) -> bool {
        let ids = assignment.placed_ids();
        if ids.len() < 2 {
            return false;
        }
        let i = self.rng.index(ids.len());
        let mut j = self.rng.index(ids.len() - 1);
        if j >= i {
            j += 1;
        }
        let (first_id, second_id) = (ids[i].to_string(), ids[j].to_string());

        let (Some(first), Some(second)) = (
            assignment.unplace(&first_id),
            assignment.unplace(&second_id),
        ) else {
            return false;
        };

        if self.try_place(&first.activity, second.period, &second.room, assignment) {
            if self.try_place(&second.activity, first.period, &first.room, assignment) {
                return true;
            }
            assignment.unplace(&first_id);
        }
        Self::restore(assignment, &first);
        Self::restore(assignment, &second);
        false
    }

    fn relocate(&mut self, assignment: &mut Assignment) -> bool {
        let Some(id) = self.pick_placed(assignment) else {
            return false;
        };
        let Some(original) = assignment.unplace(&id) else {
            return false;
        };

        let mut periods = self.grid.clone();
        self.rng.shuffle(&mut periods);
        let other_rooms: Vec<String> = self
            .rooms
            .iter()
            .map(|r| r.id.clone())
            .filter(|r| *r != original.room)
            .collect();

        for period in periods {
            if self.try_place(&original.activity, period, &original.room, assignment) {
                return !is_same_slot(&original, period, &original.room);
            }
            for room in &other_rooms {
                if self.try_place(&original.activity, period, room, assignment) {
                    return true;
                }
            }
        }
        Self::restore(assignment, &original);
        false
    }

    fn change_room(&mut self, assignment: &mut Assignment) -> bool {
        let Some(id) = self.pick_placed(assignment) else {
            return false;
        };
        let Some(original) = assignment.unplace(&id) else {
            return false;
        };

        let mut candidates = self.other_rooms_for(&original.activity, &original.room);
        self.rng.shuffle(&mut candidates);
        for room in &candidates {
            if self.try_place(&original.activity, original.period, room, assignment) {
                return true;
            }
        }
        Self::restore(assignment, &original);
        false
    }

    /// Preferred rooms other than `current` if any exist, else every other room.
    fn other_rooms_for(&self, activity: &Arc<Activity>, current: &str) -> Vec<String> {
        let preferred: Vec<String> = activity
            .preferred_rooms
            .iter()
            .filter(|r| r.as_str() != current && self.rooms.iter().any(|room| &room.id == *r))
            .cloned()
            .collect();
        if !preferred.is_empty() {
            return preferred;
        }
        self.rooms
            .iter()
            .map(|r| r.id.clone())
            .filter(|r| r != current)
            .collect()
    }
}

fn is_same_slot(placement: &Placement, period: Period, room: &str) -> bool {
    placement.period == period && placement.room == room
}
