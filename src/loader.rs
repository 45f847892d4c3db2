use crate::data::{Assignment, Course, RoomRecord, SlotRecord};
use crate::error::ScheduleError;
use log::debug;
use std::collections::HashSet;

/// CSV ingestion for the three uploaded tables. Every check here runs before
/// model assembly so schema problems never surface mid-constraint-generation.

const COURSE_COLUMNS: [&str; 4] = ["Course", "Faculty", "Class", "Room"];

fn reader(data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(data.as_bytes())
}

fn check_headers(
    rdr: &mut csv::Reader<&[u8]>,
    table: &'static str,
    required: &[&str],
) -> Result<(), ScheduleError> {
    let headers = rdr
        .headers()
        .map_err(|e| ScheduleError::malformed(table, e.to_string()))?;
    for col in required {
        if !headers.iter().any(|h| h == *col) {
            return Err(ScheduleError::malformed(
                table,
                format!("required column '{}' is absent", col),
            ));
        }
    }
    Ok(())
}

/// Parses the Courses table. All four fields are required non-empty because
/// they act as grouping keys for the non-overlap constraints.
pub fn parse_courses(data: &str) -> Result<Vec<Course>, ScheduleError> {
    let mut rdr = reader(data);
    check_headers(&mut rdr, "courses", &COURSE_COLUMNS)?;

    let mut courses = Vec::new();
    for (row, record) in rdr.deserialize().enumerate() {
        let course: Course = record.map_err(|e| ScheduleError::malformed("courses", e.to_string()))?;
        for (name, value) in [
            ("Course", &course.course),
            ("Faculty", &course.faculty),
            ("Class", &course.class),
            ("Room", &course.room),
        ] {
            if value.is_empty() {
                return Err(ScheduleError::malformed(
                    "courses",
                    format!("empty '{}' field in data row {}", name, row + 1),
                ));
            }
        }
        courses.push(course);
    }
    debug!("Loaded {} course rows.", courses.len());
    Ok(courses)
}

/// Parses the Timeslots table into the ordered slot label list.
pub fn parse_slots(data: &str) -> Result<Vec<String>, ScheduleError> {
    let mut rdr = reader(data);
    check_headers(&mut rdr, "timeslots", &["Slot"])?;

    let mut slots = Vec::new();
    let mut seen = HashSet::new();
    for (row, record) in rdr.deserialize().enumerate() {
        let slot: SlotRecord =
            record.map_err(|e| ScheduleError::malformed("timeslots", e.to_string()))?;
        if slot.slot.is_empty() {
            return Err(ScheduleError::malformed(
                "timeslots",
                format!("empty 'Slot' field in data row {}", row + 1),
            ));
        }
        // the slot set is a finite ordered set; a repeated label would give
        // the builder two distinct variable indices for what the non-overlap
        // constraints must treat as one slot
        if !seen.insert(slot.slot.clone()) {
            return Err(ScheduleError::malformed(
                "timeslots",
                format!("duplicate 'Slot' value '{}' in data row {}", slot.slot, row + 1),
            ));
        }
        slots.push(slot.slot);
    }
    debug!("Loaded {} timeslots.", slots.len());
    Ok(slots)
}

/// Parses the Rooms table. The result is discarded by the engine: room
/// conflicts are derived from the `Room` field on Course rows, so this table
/// is only checked for well-formedness.
pub fn parse_rooms(data: &str) -> Result<Vec<RoomRecord>, ScheduleError> {
    let mut rdr = reader(data);
    check_headers(&mut rdr, "rooms", &["Room"])?;

    let mut rooms = Vec::new();
    for record in rdr.deserialize() {
        let room: RoomRecord = record.map_err(|e| ScheduleError::malformed("rooms", e.to_string()))?;
        rooms.push(room);
    }
    Ok(rooms)
}

/// Renders the assignment list as the downloadable CSV
/// (`Course,Faculty,Class,Room,Slot`).
pub fn assignments_to_csv(assignments: &[Assignment]) -> Result<String, ScheduleError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    // written explicitly so an empty result set still carries the schema
    wtr.write_record(["Course", "Faculty", "Class", "Room", "Slot"])
        .map_err(|e| ScheduleError::malformed("assignments", e.to_string()))?;
    for assignment in assignments {
        wtr.serialize(assignment)
            .map_err(|e| ScheduleError::malformed("assignments", e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ScheduleError::malformed("assignments", e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ScheduleError::malformed("assignments", e.to_string()))
}
