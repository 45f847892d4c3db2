use crate::data::SolveStatus;
use thiserror::Error;

/// Everything that can go wrong between upload and download. All failures
/// surface synchronously at the generate action; none are retried.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("missing input: the {0} table was not provided")]
    MissingInput(&'static str),
    #[error("malformed {table} table: {reason}")]
    MalformedSchema {
        table: &'static str,
        reason: String,
    },
    #[error("model too large: {variables} decision variables exceeds the limit of {limit}")]
    ModelTooLarge { variables: usize, limit: usize },
    #[error("no valid timetable exists for these inputs (solver status: {0})")]
    Infeasible(SolveStatus),
    #[error("internal invariant violation: extracted {got} assignments for {expected} courses under an optimal solve")]
    ExtractionMismatch { expected: usize, got: usize },
}

impl ScheduleError {
    pub fn malformed(table: &'static str, reason: impl Into<String>) -> Self {
        ScheduleError::MalformedSchema {
            table,
            reason: reason.into(),
        }
    }
}
