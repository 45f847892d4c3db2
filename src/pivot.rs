use crate::data::Assignment;
use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};

/// Pivoting a flat `Time, Day, Subject` table into a Day x Time grid for
/// display. This schema is separately sourced and is not the assignment
/// output schema; `assignments_to_pivot_rows` is the explicit adaptation
/// between the two.

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PivotRow {
    pub time: String,
    pub day: String,
    pub subject: String,
}

/// Day columns by time rows; `cells[t][d]` holds the subject scheduled at
/// `times[t]` on `days[d]`, or an empty string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableGrid {
    pub days: Vec<String>,
    pub times: Vec<String>,
    pub cells: Vec<Vec<String>>,
}

/// Parses the separately-sourced `Time,Day,Subject` table.
pub fn parse_pivot_rows(data: &str) -> Result<Vec<PivotRow>, ScheduleError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(data.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| ScheduleError::malformed("timetable", e.to_string()))?;
    for col in ["Time", "Day", "Subject"] {
        if !headers.iter().any(|h| h == col) {
            return Err(ScheduleError::malformed(
                "timetable",
                format!("required column '{}' is absent", col),
            ));
        }
    }
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let row: PivotRow =
            record.map_err(|e| ScheduleError::malformed("timetable", e.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Pivots flat rows into a Time x Day grid. Row and column order is
/// first-seen; a duplicate (Time, Day) pair is rejected rather than silently
/// overwritten.
pub fn pivot(rows: &[PivotRow]) -> Result<TimetableGrid, ScheduleError> {
    let mut days: Vec<String> = Vec::new();
    let mut times: Vec<String> = Vec::new();
    for row in rows {
        if !days.contains(&row.day) {
            days.push(row.day.clone());
        }
        if !times.contains(&row.time) {
            times.push(row.time.clone());
        }
    }

    let mut cells = vec![vec![String::new(); days.len()]; times.len()];
    for row in rows {
        // both axis lists were built from these same rows above
        let t = times.iter().position(|x| x == &row.time).unwrap();
        let d = days.iter().position(|x| x == &row.day).unwrap();
        if !cells[t][d].is_empty() {
            return Err(ScheduleError::malformed(
                "timetable",
                format!("duplicate entry for time '{}' on day '{}'", row.time, row.day),
            ));
        }
        cells[t][d] = row.subject.clone();
    }

    Ok(TimetableGrid { days, times, cells })
}

/// Adapts assignment records to the pivot schema. Slot labels must follow the
/// `"<Day> <Time>"` convention (split at the first whitespace); anything else
/// is an error rather than a guess.
pub fn assignments_to_pivot_rows(
    assignments: &[Assignment],
) -> Result<Vec<PivotRow>, ScheduleError> {
    assignments
        .iter()
        .map(|a| {
            let (day, time) = a.slot.split_once(char::is_whitespace).ok_or_else(|| {
                ScheduleError::malformed(
                    "assignments",
                    format!("slot label '{}' has no day/time separator", a.slot),
                )
            })?;
            Ok(PivotRow {
                time: time.trim_start().to_string(),
                day: day.to_string(),
                subject: a.course.clone(),
            })
        })
        .collect()
}
