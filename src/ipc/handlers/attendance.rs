use crate::attendance::{AttendanceSession, SetStatusOutcome};
use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{backend, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use serde_json::json;

fn session_mut(state: &mut AppState) -> Result<&mut AttendanceSession, HandlerErr> {
    state
        .attendance
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_session", "open attendance for a classroom first"))
}

fn session_json(session: &AttendanceSession) -> serde_json::Value {
    json!({
        "classroomId": session.classroom_id,
        "date": session.date.format("%Y-%m-%d").to_string(),
        "subject": session.subject,
        "entries": session.sheet.entries(),
        "pending": session.sheet.pending(),
        "count": session.sheet.len(),
        "canSubmit": session.can_submit()
    })
}

fn attendance_open(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let classroom_id = optional_str(params, "classroomId").unwrap_or_default();
    let date = optional_str(params, "date").unwrap_or_default();
    let subject = optional_str(params, "subject");
    let session = AttendanceSession::open(&classroom_id, &date, subject.as_deref())?;
    let result = session_json(&session);
    state.attendance = Some(session);
    Ok(json!({ "session": result }))
}

fn attendance_set_status(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = required_str(params, "studentId")?;
    let raw = required_str(params, "status")?;
    let status = AttendanceStatus::parse(&raw).ok_or_else(|| {
        HandlerErr::new("bad_params", "status must be one of: present, absent, late")
            .with_details(json!({ "status": raw }))
    })?;
    let session = session_mut(state)?;
    let outcome = session.sheet.set_status(&student_id, status);
    Ok(json!({
        "recorded": outcome == SetStatusOutcome::Recorded,
        "reasonRequired": outcome == SetStatusOutcome::ReasonRequired,
        "pending": session.sheet.pending(),
        "count": session.sheet.len(),
        "canSubmit": session.can_submit()
    }))
}

fn attendance_confirm_reason(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let text = params
        .get("reason")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let session = session_mut(state)?;
    let committed = session.sheet.confirm_reason(text);
    Ok(json!({
        "committed": committed,
        "pending": session.sheet.pending(),
        "count": session.sheet.len(),
        "canSubmit": session.can_submit()
    }))
}

fn attendance_cancel_reason(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    session_mut(state)?.sheet.cancel_reason();
    Ok(json!({ "ok": true }))
}

fn attendance_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let session = session_mut(state)?;
    Ok(json!({ "session": session_json(session) }))
}

fn attendance_submit(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let session = state
        .attendance
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_session", "open attendance for a classroom first"))?;
    if !session.can_submit() {
        return Err(HandlerErr::new(
            "bad_params",
            "mark at least one student and choose a subject before submitting",
        ));
    }
    let receipt = session.submit(backend(state)?)?;
    state.attendance = None;
    Ok(json!({
        "submitted": receipt.submitted,
        "notice": receipt.notice
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.open" => attendance_open(state, &req.params),
        "attendance.setStatus" => attendance_set_status(state, &req.params),
        "attendance.confirmReason" => attendance_confirm_reason(state, &req.params),
        "attendance.cancelReason" => attendance_cancel_reason(state),
        "attendance.get" => attendance_get(state),
        "attendance.submit" => attendance_submit(state),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
