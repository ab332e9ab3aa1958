//! Weighted-constraint timetabling.
//!
//! Places activities (lessons, lectures, labs) into a weekly grid of periods
//! and rooms so that teachers, student sets and rooms are never
//! double-booked, hard constraints hold and as much soft-constraint weight
//! as possible is satisfied.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Period`, `TimeSpan`, `Activity`, `Room`,
//!   `Subject`, `Teacher`, `StudentSet`, and the `Assignment` store with its
//!   conflict indexes
//! - **`constraints`**: The `Constraint` contract, shared interval
//!   algorithms, and the time and space constraint catalog
//! - **`scheduler`**: Gated greedy construction, simulated annealing,
//!   violation reports
//! - **`export`**: Per-teacher, per-student-set and per-room timetables
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   references, hour bounds)
//!
//! # Quick start
//!
//! ```
//! use u_timetable::constraints::NoDoubleBooking;
//! use u_timetable::models::{Activity, Room};
//! use u_timetable::scheduler::{Scheduler, SchedulerConfig};
//!
//! let mut scheduler = Scheduler::new(SchedulerConfig::default()).unwrap();
//! scheduler.add_room(Room::new("R1", 30));
//! scheduler.add_activity(Activity::new("MATH-1", 60).with_teacher("T1"));
//! scheduler.add_activity(Activity::new("MATH-2", 60).with_teacher("T1"));
//! scheduler.add_time_constraint(NoDoubleBooking::new(100).unwrap());
//!
//! let result = scheduler.generate_schedule();
//! assert!(result.is_complete());
//! assert_eq!(result.score, 100.0);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

pub mod constraints;
pub mod error;
pub mod export;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, TimetableError};
