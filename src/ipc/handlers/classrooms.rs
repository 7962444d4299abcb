use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{backend, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Classroom;
use crate::roster;
use serde_json::json;
use tracing::debug;

fn classroom_summary(c: &Classroom) -> serde_json::Value {
    // Counts let the dashboard flag incomplete rosters without opening each one.
    let assigned = c.assignments.iter().filter(|a| a.is_assigned()).count();
    json!({
        "id": c.id,
        "name": c.name,
        "gradeLevel": c.grade_level,
        "section": c.section,
        "shift": c.shift,
        "period": c.period,
        "studentCount": c.students.len(),
        "subjectCount": c.assignments.len(),
        "assignedCount": assigned
    })
}

fn classrooms_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let classrooms = backend(state)?.list_classrooms()?;
    debug!(count = classrooms.len(), "classrooms loaded");
    let rows: Vec<serde_json::Value> = classrooms.iter().map(classroom_summary).collect();
    state.classrooms = classrooms;
    Ok(json!({ "classrooms": rows }))
}

/// Fetches one classroom by id and heals its roster against the curriculum.
fn classrooms_open(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let classroom_id = required_str(params, "classroomId")?;
    let backend = backend(state)?;
    let original = backend.get_classroom(&classroom_id)?;

    match roster::reconcile(backend, &state.curriculum, &original) {
        Ok(reconciled) => {
            let notice = reconciled.wrote().then(|| {
                format!(
                    "Added {} missing subjects to the roster",
                    reconciled.added.len()
                )
            });
            let healed: Vec<&str> = reconciled
                .added
                .iter()
                .map(|s| s.code.as_str())
                .collect();
            let result = json!({
                "classroom": reconciled.classroom,
                "healed": healed,
                "notice": notice
            });
            state.remember_classroom(&reconciled.classroom);
            Ok(result)
        }
        Err(e) => {
            state.remember_classroom(&original);
            Err(HandlerErr::from(e).with_details(json!({ "classroom": original })))
        }
    }
}

fn classrooms_check_roster(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let classroom_id = required_str(params, "classroomId")?;
    let classroom = backend(state)?.get_classroom(&classroom_id)?;
    let check = roster::check_roster(&state.curriculum, &classroom)?;
    state.remember_classroom(&classroom);
    Ok(json!({ "check": check }))
}

fn curriculum_get(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let grade = params
        .get("gradeLevel")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| HandlerErr::new("bad_params", "missing gradeLevel"))?;
    let subjects = u8::try_from(grade)
        .ok()
        .and_then(|g| state.curriculum.for_grade(g))
        .ok_or_else(|| {
            HandlerErr::new("not_found", format!("no curriculum for grade level {grade}"))
        })?;
    Ok(json!({ "gradeLevel": grade, "subjects": subjects }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classrooms.list" => classrooms_list(state),
        "classrooms.open" => classrooms_open(state, &req.params),
        "classrooms.checkRoster" => classrooms_check_roster(state, &req.params),
        "curriculum.get" => curriculum_get(state, &req.params),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
