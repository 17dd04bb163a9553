use thiserror::Error;

use crate::data::{Day, Period};

/// Errors raised while loading or indexing a timetable.
#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: missing value for '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: unknown day '{label}'")]
    UnknownDay { row: usize, label: String },

    #[error("row {row}: invalid period '{value}'")]
    InvalidPeriod { row: usize, value: String },

    #[error("{teacher} has more than one lesson on {day} period {period}")]
    DuplicateLesson {
        teacher: String,
        day: Day,
        period: Period,
    },
}

/// Errors raised for a malformed planning request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("at least one absent teacher is required")]
    NoAbsentTeachers,

    #[error("unknown teacher '{teacher}'")]
    UnknownTeacher { teacher: String },

    #[error("unknown absent teacher '{teacher}' on {day}")]
    UnknownAbsentTeacher { teacher: String, day: Day },

    #[error("unknown day '{0}'")]
    UnknownDay(String),
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
