use crate::data::{TimetableInput, TimetableOutput};
use crate::error::ScheduleError;
use crate::pivot::{self, TimetableGrid};
use crate::{loader, solver};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing::post};
use log::{error, warn};
use serde::Deserialize;

/// The three uploaded tables, as raw CSV payloads. Absent fields are reported
/// as missing inputs before any computation is attempted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub courses_csv: Option<String>,
    pub rooms_csv: Option<String>,
    pub slots_csv: Option<String>,
}

/// One generate action: load, validate, build, solve, extract. No state is
/// kept between invocations.
fn generate(req: &GenerateRequest) -> Result<TimetableOutput, ScheduleError> {
    let courses_csv = req
        .courses_csv
        .as_deref()
        .ok_or(ScheduleError::MissingInput("courses"))?;
    let rooms_csv = req
        .rooms_csv
        .as_deref()
        .ok_or(ScheduleError::MissingInput("rooms"))?;
    let slots_csv = req
        .slots_csv
        .as_deref()
        .ok_or(ScheduleError::MissingInput("timeslots"))?;

    let courses = loader::parse_courses(courses_csv)?;
    // the rooms upload is checked for well-formedness only; room conflicts
    // come from the Room field on the course rows
    loader::parse_rooms(rooms_csv)?;
    let slots = loader::parse_slots(slots_csv)?;

    solver::solve(&TimetableInput { courses, slots })
}

/// Generate action followed by the explicit assignment-to-pivot adaptation,
/// for callers that want the Day x Time grid directly. Requires slot labels
/// in the `"<Day> <Time>"` form.
fn generate_grid(req: &GenerateRequest) -> Result<TimetableGrid, ScheduleError> {
    let output = generate(req)?;
    let rows = pivot::assignments_to_pivot_rows(&output.assignments)?;
    pivot::pivot(&rows)
}

fn error_response(e: ScheduleError) -> (StatusCode, String) {
    let status = match &e {
        ScheduleError::MissingInput(_)
        | ScheduleError::MalformedSchema { .. }
        | ScheduleError::ModelTooLarge { .. } => StatusCode::BAD_REQUEST,
        ScheduleError::Infeasible(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScheduleError::ExtractionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{}", e);
    } else {
        warn!("{}", e);
    }
    (status, e.to_string())
}

async fn generate_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<TimetableOutput>, (StatusCode, String)> {
    generate(&req).map(Json).map_err(error_response)
}

async fn generate_csv_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let output = generate(&req).map_err(error_response)?;
    let body = loader::assignments_to_csv(&output.assignments).map_err(error_response)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"generated_timetable.csv\"",
            ),
        ],
        body,
    ))
}

async fn generate_grid_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<TimetableGrid>, (StatusCode, String)> {
    generate_grid(&req).map(Json).map_err(error_response)
}

async fn pivot_handler(body: String) -> Result<Json<TimetableGrid>, (StatusCode, String)> {
    let rows = pivot::parse_pivot_rows(&body).map_err(error_response)?;
    pivot::pivot(&rows).map(Json).map_err(error_response)
}

pub async fn run_server() {
    let app = Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/generate/csv", post(generate_csv_handler))
        .route("/v1/timetable/generate/grid", post(generate_grid_handler))
        .route("/v1/timetable/pivot", post(pivot_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
