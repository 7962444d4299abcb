use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{backend, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::TeacherAssignment;
use crate::roster::{self, AssignmentChange};
use serde_json::json;
use tracing::debug;

fn assignment_rows(assignments: &[TeacherAssignment]) -> Vec<serde_json::Value> {
    assignments
        .iter()
        .map(|a| {
            json!({
                "subject": a.subject,
                "teacher": a.teacher,
                "teacherName": a.teacher.as_ref().map(|t| t.display_name()),
                "assigned": a.is_assigned()
            })
        })
        .collect()
}

fn teachers_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let teachers = backend(state)?.list_teachers()?;
    debug!(count = teachers.len(), "teachers loaded");
    let result = json!({ "teachers": teachers });
    state.teachers = teachers;
    Ok(result)
}

fn subjects_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let subjects = backend(state)?.list_subjects()?;
    debug!(count = subjects.len(), "subjects loaded");
    let result = json!({ "subjects": subjects });
    state.subjects = subjects;
    Ok(result)
}

fn assignments_list(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let classroom_id = required_str(params, "classroomId")?;
    let classroom = backend(state)?.get_classroom(&classroom_id)?;
    let rows = assignment_rows(&classroom.assignments);
    state.remember_classroom(&classroom);
    Ok(json!({ "classroomId": classroom_id, "assignments": rows }))
}

fn assignments_set_teacher(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let change = AssignmentChange {
        subject_id: optional_str(params, "subjectId").unwrap_or_default(),
        teacher_id: optional_str(params, "teacherId").unwrap_or_default(),
        subject_name: optional_str(params, "subjectName").unwrap_or_default(),
    };
    let classroom_id = optional_str(params, "classroomId").unwrap_or_default();
    roster::validate_change(&change, &classroom_id)?;

    // The teacher picker loads this list with the view; load it here if the
    // dashboard skipped that step.
    if state.teachers.is_empty() {
        state.teachers = backend(state)?.list_teachers()?;
    }

    let classroom = state
        .classrooms
        .iter()
        .find(|c| c.id == classroom_id)
        .ok_or_else(|| HandlerErr::new("not_found", "classroom not loaded"))?;
    let reload =
        roster::assign_teacher(backend(state)?, &state.teachers, Some(classroom), &change)?;

    let rows = assignment_rows(&reload.assignments);
    state.classrooms = reload.classrooms;
    Ok(json!({
        "classroomId": classroom_id,
        "assignments": rows,
        "classroomCount": state.classrooms.len(),
        "notice": "Teacher assigned"
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "teachers.list" => teachers_list(state),
        "subjects.list" => subjects_list(state),
        "assignments.list" => assignments_list(state, &req.params),
        "assignments.setTeacher" => assignments_set_teacher(state, &req.params),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
