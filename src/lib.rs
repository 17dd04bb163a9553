//! Substitute-teacher planning: covers the lessons of absent teachers with
//! free colleagues, preferring subject matches and lightly loaded staff.

pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod server;
pub mod solver;
pub mod timetable;

pub use config::{Config, PlanningRules};
pub use data::{AssignmentRecord, Day, Lesson, ReplacementPlan, ReplacementRequest, RequiredSlot};
pub use error::{ConfigError, PlanError, TimetableError};
pub use solver::{AssignmentState, assign, extract_slots, generate_plan};
pub use timetable::Timetable;
