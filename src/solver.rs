use crate::data::{Assignment, Course, SolveStatus, TimetableInput, TimetableOutput};
use crate::error::ScheduleError;
use good_lp::variable;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver,
};
use itertools::Itertools;
use log::{info, trace};
use std::time::Instant;

/// Upper bound on the C x S decision variable matrix. Inputs past this are
/// rejected up front instead of letting the solver fail opaquely.
pub const MAX_DECISION_VARS: usize = 100_000;

/// Solves the timetable assignment problem with the HiGHS ILP solver.
pub fn solve(input: &TimetableInput) -> Result<TimetableOutput, ScheduleError> {
    solve_with_limit(input, MAX_DECISION_VARS)
}

pub fn solve_with_limit(
    input: &TimetableInput,
    max_vars: usize,
) -> Result<TimetableOutput, ScheduleError> {
    let start_time = Instant::now();
    let courses = &input.courses;
    let slots = &input.slots;

    if courses.is_empty() {
        info!("No courses to schedule; returning an empty timetable.");
        return Ok(TimetableOutput {
            status: SolveStatus::Optimal,
            assignments: Vec::new(),
        });
    }
    // a course list with zero available slots is infeasible by construction;
    // reject it here rather than via solver failure
    if slots.is_empty() {
        return Err(ScheduleError::malformed(
            "timeslots",
            "no timeslots available for the given courses",
        ));
    }
    let variables = courses.len() * slots.len();
    if variables > max_vars {
        return Err(ScheduleError::ModelTooLarge {
            variables,
            limit: max_vars,
        });
    }

    // model setup
    info!(
        "Setting up ILP model with {} courses and {} timeslots ({} binary variables)...",
        courses.len(),
        slots.len(),
        variables
    );
    let mut problem = ProblemVariables::new();

    // x[i][s] = 1 if course i is in slot s
    //           0 otherwise
    // stored flat and indexed by position so constraint order tracks input order
    let flat = problem.add_vector(variable().binary(), variables);
    let vars: Vec<&[Variable]> = flat.chunks(slots.len()).collect();

    // Placeholder objective: constraint family 2 forces every feasible
    // assignment to cost exactly one unit per course, so minimising the sum
    // carries no scheduling preference. It only gives the solver a well-formed
    // minimisation target.
    let objective: Expression = flat.iter().copied().sum();

    let mut model = problem
        .minimise(objective)
        .using(default_solver)
        .set_option("threads", 1) // limit to 1 thread for reproducibility
        .set_option("random_seed", 1234) //set seed for reproducibility
        .set_option("log_to_console", "false");

    // each course must be assigned exactly one slot
    info!("Adding 'exactly one slot per course' constraints...");
    for row in &vars {
        let scheduled_once: Expression = row.iter().copied().sum();
        model.add_constraint(constraint!(scheduled_once == 1));
    }

    // no double-booking within any conflict group
    info!("Adding 'no faculty overlap' constraints...");
    add_no_overlap(&mut model, courses, &vars, slots.len(), |c| &c.faculty, "faculty");
    info!("Adding 'no class overlap' constraints...");
    add_no_overlap(&mut model, courses, &vars, slots.len(), |c| &c.class, "class");
    info!("Adding 'no room overlap' constraints...");
    add_no_overlap(&mut model, courses, &vars, slots.len(), |c| &c.room, "room");

    //solve
    info!("Starting ILP solver...");
    let solution = match model.solve() {
        Ok(s) => s,
        Err(e) => {
            let status = resolution_status(&e);
            info!("Solver finished without an optimal solution: {}", e);
            return Err(ScheduleError::Infeasible(status));
        }
    };
    info!("Solution found in {:.2?}", start_time.elapsed());

    // get assignments from solution
    let assignments = extract_assignments(&solution, courses, slots, &vars);
    if assignments.len() != courses.len() {
        // constraint family 2 guarantees one unit per course under an optimal
        // solve, so a count mismatch is a defect, not a scheduling outcome
        return Err(ScheduleError::ExtractionMismatch {
            expected: courses.len(),
            got: assignments.len(),
        });
    }

    Ok(TimetableOutput {
        status: SolveStatus::Optimal,
        assignments,
    })
}

/// Adds one <=1 constraint per (conflict group, slot). Groups are derived from
/// the course list in first-seen order with exact key equality; unknown values
/// just form singleton groups.
fn add_no_overlap<M: SolverModel>(
    model: &mut M,
    courses: &[Course],
    vars: &[&[Variable]],
    slot_count: usize,
    key: fn(&Course) -> &str,
    what: &str,
) {
    let groups: Vec<&str> = courses.iter().map(|c| key(c)).unique().collect();
    trace!("{} distinct {} conflict groups.", groups.len(), what);
    for group in groups {
        for s in 0..slot_count {
            let busy: Expression = courses
                .iter()
                .enumerate()
                .filter(|(_, c)| key(c) == group)
                .map(|(i, _)| vars[i][s])
                .sum();
            model.add_constraint(constraint!(busy <= 1));
        }
    }
}

fn resolution_status(err: &ResolutionError) -> SolveStatus {
    match err {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        ResolutionError::Unbounded => SolveStatus::Unbounded,
        ResolutionError::Other(_) => SolveStatus::NotSolved,
        ResolutionError::Str(_) => SolveStatus::Undefined,
    }
}

fn extract_assignments(
    solution: &impl Solution,
    courses: &[Course],
    slots: &[String],
    vars: &[&[Variable]],
) -> Vec<Assignment> {
    let mut assignments = Vec::with_capacity(courses.len());
    for (i, course) in courses.iter().enumerate() {
        for (s, slot) in slots.iter().enumerate() {
            // binary values come back as floats; anything not rounding to 1
            // means the course is not in this slot
            if solution.value(vars[i][s]) > 0.9 {
                assignments.push(Assignment {
                    course: course.course.clone(),
                    faculty: course.faculty.clone(),
                    class: course.class.clone(),
                    room: course.room.clone(),
                    slot: slot.clone(),
                });
            }
        }
    }
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(course: &str, faculty: &str, class: &str, room: &str) -> Course {
        Course {
            course: course.into(),
            faculty: faculty.into(),
            class: class.into(),
            room: room.into(),
        }
    }

    fn input(courses: Vec<Course>, slots: &[&str]) -> TimetableInput {
        TimetableInput {
            courses,
            slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// No two assignments may share a slot together with a faculty, class or
    /// room value. Checked exhaustively over the output.
    fn assert_conflict_free(assignments: &[Assignment]) {
        for (i, a) in assignments.iter().enumerate() {
            for b in &assignments[i + 1..] {
                if a.slot == b.slot {
                    assert_ne!(a.faculty, b.faculty, "faculty double-booked in {}", a.slot);
                    assert_ne!(a.class, b.class, "class double-booked in {}", a.slot);
                    assert_ne!(a.room, b.room, "room double-booked in {}", a.slot);
                }
            }
        }
    }

    #[test]
    fn conflict_free_input_schedules_every_course_once() {
        let input = input(
            vec![
                course("Math", "Dr.A", "C1", "R1"),
                course("Phys", "Dr.B", "C2", "R2"),
                course("Chem", "Dr.C", "C3", "R3"),
            ],
            &["Mon9", "Mon10", "Mon11"],
        );
        let output = solve(&input).unwrap();
        assert_eq!(output.status, SolveStatus::Optimal);
        assert_eq!(output.assignments.len(), 3);
        for c in &input.courses {
            let scheduled: Vec<_> = output
                .assignments
                .iter()
                .filter(|a| a.course == c.course)
                .collect();
            assert_eq!(scheduled.len(), 1, "course {} scheduled once", c.course);
        }
        assert_conflict_free(&output.assignments);
    }

    #[test]
    fn shared_class_courses_never_share_a_slot() {
        // Dr.A and Dr.B in different rooms, but both teach class C1: the class
        // non-overlap constraint must force distinct slots
        let input = input(
            vec![
                course("Math", "Dr.A", "C1", "R1"),
                course("Phys", "Dr.B", "C1", "R2"),
            ],
            &["Mon9", "Mon10"],
        );
        let output = solve(&input).unwrap();
        assert_eq!(output.assignments.len(), 2);
        assert_ne!(output.assignments[0].slot, output.assignments[1].slot);
    }

    #[test]
    fn single_slot_for_two_clashing_courses_is_infeasible() {
        let input = input(
            vec![
                course("A", "FacX", "ClsX", "R1"),
                course("B", "FacX", "ClsX", "R1"),
            ],
            &["OnlySlot"],
        );
        match solve(&input) {
            Err(ScheduleError::Infeasible(_)) => {}
            other => panic!("expected infeasible, got {:?}", other.map(|o| o.assignments)),
        }
    }

    #[test]
    fn overloaded_faculty_is_infeasible() {
        // three courses, one teacher, two slots
        let input = input(
            vec![
                course("A", "FacX", "C1", "R1"),
                course("B", "FacX", "C2", "R2"),
                course("C", "FacX", "C3", "R3"),
            ],
            &["Mon9", "Mon10"],
        );
        assert!(matches!(solve(&input), Err(ScheduleError::Infeasible(_))));
    }

    #[test]
    fn zero_courses_is_trivially_optimal() {
        let output = solve(&input(vec![], &[])).unwrap();
        assert_eq!(output.status, SolveStatus::Optimal);
        assert!(output.assignments.is_empty());
    }

    #[test]
    fn courses_without_slots_are_rejected_before_assembly() {
        let input = input(vec![course("Math", "Dr.A", "C1", "R1")], &[]);
        assert!(matches!(
            solve(&input),
            Err(ScheduleError::MalformedSchema { table: "timeslots", .. })
        ));
    }

    #[test]
    fn oversized_models_are_rejected() {
        let input = input(
            vec![
                course("Math", "Dr.A", "C1", "R1"),
                course("Phys", "Dr.B", "C2", "R2"),
            ],
            &["Mon9", "Mon10"],
        );
        assert!(matches!(
            solve_with_limit(&input, 3),
            Err(ScheduleError::ModelTooLarge { variables: 4, limit: 3 })
        ));
    }

    #[test]
    fn repeated_solves_stay_conflict_free() {
        let input = input(
            vec![
                course("Math", "Dr.A", "C1", "R1"),
                course("Phys", "Dr.A", "C2", "R1"),
                course("Chem", "Dr.B", "C1", "R2"),
            ],
            &["Mon9", "Mon10", "Mon11"],
        );
        for _ in 0..2 {
            let output = solve(&input).unwrap();
            assert_eq!(output.assignments.len(), 3);
            assert_conflict_free(&output.assignments);
        }
    }
}
