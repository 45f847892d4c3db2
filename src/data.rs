use serde::{Deserialize, Serialize};
use std::fmt;

/// A course to be scheduled. `faculty`, `class` and `room` are plain grouping
/// keys compared by exact string equality; unknown values simply form their
/// own singleton conflict groups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    pub course: String,
    pub faculty: String,
    pub class: String,
    pub room: String,
}

/// One row of the Timeslots table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlotRecord {
    pub slot: String,
}

/// One row of the Rooms table. Accepted for well-formedness only; constraint
/// generation reads the `Room` field embedded in Course rows instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoomRecord {
    pub room: String,
}

/// The complete input for one timetable generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    pub courses: Vec<Course>,
    pub slots: Vec<String>,
}

/// A single scheduled course. Serialized field names double as the columns of
/// the downloadable assignment CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Assignment {
    pub course: String,
    pub faculty: String,
    pub class: String,
    pub room: String,
    pub slot: String,
}

/// Terminal solver outcomes. Anything other than `Optimal` means no timetable
/// is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    NotSolved,
    Undefined,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::NotSolved => "NotSolved",
            SolveStatus::Undefined => "Undefined",
        };
        f.write_str(name)
    }
}

/// The final output of a solve: rebuilt from scratch on every generation, no
/// back-reference to the model it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub status: SolveStatus,
    pub assignments: Vec<Assignment>,
}
