use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;

// Type aliases for clarity
pub type TeacherId = String;
pub type Period = u32;

/// A teaching day. The school week runs Monday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Day::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| PlanError::UnknownDay(s.to_string()))
    }
}

impl TryFrom<String> for Day {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One scheduled lesson in the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub teacher: TeacherId,
    pub day: Day,
    pub period: Period,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: String,
}

/// A lesson vacated by an absent teacher that needs covering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSlot {
    pub absent_teacher: TeacherId,
    pub period: Period,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: String,
}

/// Evaluation of one prospective substitute for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub teacher: TeacherId,
    pub score: i32,
    pub is_same_subject: bool,
    pub daily_load: u32,
    pub substitutions_today: u32,
    pub reason: String,
}

/// The outcome for one required slot. `substitute_teacher` is `None`
/// when nobody could cover it, and the numeric fields are then absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub absent_teacher: TeacherId,
    pub day: Day,
    pub period: Period,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: String,
    pub substitute_teacher: Option<TeacherId>,
    pub is_same_subject: bool,
    pub daily_load: Option<u32>,
    pub substitutions_today: Option<u32>,
    pub score: Option<i32>,
    pub reason: String,
}

impl AssignmentRecord {
    pub fn is_filled(&self) -> bool {
        self.substitute_teacher.is_some()
    }
}

/// Request to cover the lessons of one or more absent teachers. Names and
/// the day label are taken as typed and checked by the planner.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementRequest {
    pub absent_teachers: Vec<TeacherId>,
    pub day: String,
}

impl ReplacementRequest {
    pub fn new<I, S>(absent_teachers: I, day: Day) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TeacherId>,
    {
        Self {
            absent_teachers: absent_teachers.into_iter().map(Into::into).collect(),
            day: day.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub required_slots: usize,
    pub filled: usize,
    pub unfilled: usize,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} slot(s): {} covered, {} uncovered",
            self.required_slots, self.filled, self.unfilled
        )
    }
}

/// The final output of the planner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementPlan {
    pub day: Day,
    pub absent_teachers: Vec<TeacherId>,
    pub assignments: Vec<AssignmentRecord>,
    pub summary: PlanSummary,
}
