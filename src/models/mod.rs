//! Timetabling domain models.
//!
//! Value types describing the problem (periods, activities, rooms,
//! participants) and the mutable [`Assignment`] store describing a solution.
//!
//! # Domain Mappings
//!
//! | u-timetable | Job scheduling | Meaning |
//! |-------------|----------------|---------|
//! | Activity | Job | Fixed-length unit to place |
//! | Room | Machine | Spatial resource |
//! | Teacher / StudentSet | Exclusivity domain | Attends one activity at a time |
//! | Assignment | Schedule | Activity → (period, room) |

mod activity;
mod assignment;
mod participants;
mod period;
mod room;

pub use activity::Activity;
pub use assignment::{global_key, room_key, Assignment, Booking, Exclusivity, Placement};
pub use participants::{StudentSet, Teacher};
pub use period::{Period, TimeSpan, MINUTES_PER_DAY};
pub use room::{Room, Subject};
