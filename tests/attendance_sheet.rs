mod common;

use common::FakeBackend;
use schoold::attendance::{submit, AttendanceSession, AttendanceSheet, SetStatusOutcome};
use schoold::error::ActionError;
use schoold::model::{AttendanceMark, AttendanceStatus};

#[test]
fn present_is_recorded_immediately() {
    let mut sheet = AttendanceSheet::new();

    let outcome = sheet.set_status("s1", AttendanceStatus::Present);

    assert_eq!(outcome, SetStatusOutcome::Recorded);
    assert_eq!(sheet.get("s1"), Some(&AttendanceMark::present()));
    assert!(sheet.pending().is_none());
}

#[test]
fn absence_waits_for_a_non_blank_reason() {
    let mut sheet = AttendanceSheet::new();

    assert_eq!(
        sheet.set_status("s1", AttendanceStatus::Absent),
        SetStatusOutcome::ReasonRequired
    );
    assert!(sheet.get("s1").is_none());

    assert!(!sheet.confirm_reason("   "));
    assert!(sheet.get("s1").is_none());
    assert!(sheet.pending().is_some(), "blank confirm keeps the prompt open");

    assert!(sheet.confirm_reason("Doctor visit"));
    assert_eq!(
        sheet.get("s1"),
        Some(&AttendanceMark {
            status: AttendanceStatus::Absent,
            reason: Some("Doctor visit".to_string()),
        })
    );
    assert!(sheet.pending().is_none());
}

#[test]
fn cancelling_the_prompt_keeps_the_previous_mark() {
    let mut sheet = AttendanceSheet::new();
    sheet.set_status("s1", AttendanceStatus::Present);

    sheet.set_status("s1", AttendanceStatus::Late);
    sheet.cancel_reason();

    assert_eq!(sheet.get("s1"), Some(&AttendanceMark::present()));
    assert!(!sheet.confirm_reason("Bus was late"), "nothing left to confirm");
}

#[test]
fn late_with_reason_overwrites_present() {
    let mut sheet = AttendanceSheet::new();
    sheet.set_status("s1", AttendanceStatus::Present);
    sheet.set_status("s1", AttendanceStatus::Late);
    assert!(sheet.confirm_reason("  Bus was late "));

    let mark = sheet.get("s1").expect("mark");
    assert_eq!(mark.status, AttendanceStatus::Late);
    assert_eq!(mark.reason.as_deref(), Some("Bus was late"));
    assert_eq!(sheet.len(), 1);
}

#[test]
fn submit_sends_one_batch_for_the_whole_sheet() {
    let fake = FakeBackend::default();
    let mut sheet = AttendanceSheet::new();
    sheet.set_status("s1", AttendanceStatus::Present);
    sheet.set_status("s2", AttendanceStatus::Absent);
    sheet.confirm_reason("Flu");
    sheet.set_status("s3", AttendanceStatus::Present);

    let receipt = submit(&fake, "c1", "2024-03-11", Some("MA-1"), &sheet).expect("submit");

    assert_eq!(receipt.submitted, 3);
    assert_eq!(receipt.notice, "Attendance recorded for 3 students");
    assert_eq!(fake.writes(), 1);
    let sent = fake.submitted();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].classroom_id, "c1");
    assert_eq!(sent[0].date.to_string(), "2024-03-11");
    assert_eq!(sent[0].subject.as_deref(), Some("MA-1"));
    assert_eq!(sent[0].entries.len(), 3);
    assert_eq!(sent[0].entries["s2"].reason.as_deref(), Some("Flu"));
}

#[test]
fn submit_validates_before_calling_the_backend() {
    let fake = FakeBackend::default();
    let mut sheet = AttendanceSheet::new();

    let empty = submit(&fake, "c1", "2024-03-11", Some("MA-1"), &sheet);
    assert_eq!(empty.unwrap_err(), ActionError::validation("no attendance marked"));

    sheet.set_status("s1", AttendanceStatus::Present);
    let no_subject = submit(&fake, "c1", "2024-03-11", Some(" "), &sheet);
    assert_eq!(no_subject.unwrap_err(), ActionError::validation("select a subject"));

    let no_date = submit(&fake, "c1", "", Some("MA-1"), &sheet);
    assert_eq!(no_date.unwrap_err(), ActionError::validation("select a date"));

    let bad_date = submit(&fake, "c1", "11/03/2024", Some("MA-1"), &sheet);
    assert_eq!(bad_date.unwrap_err().code(), "bad_params");

    let no_classroom = submit(&fake, "", "2024-03-11", Some("MA-1"), &sheet);
    assert_eq!(
        no_classroom.unwrap_err(),
        ActionError::validation("select a classroom")
    );

    assert!(fake.calls().is_empty());
}

#[test]
fn failed_submit_keeps_the_session_marks() {
    let fake = FakeBackend::default();
    fake.fail_writes("Attendance already recorded");
    let mut session = AttendanceSession::open("c1", "2024-03-11", Some("MA-1")).expect("open");
    session.sheet.set_status("s1", AttendanceStatus::Present);

    let err = session.submit(&fake).expect_err("backend rejects");

    assert_eq!(err.to_string(), "Attendance already recorded");
    assert_eq!(session.sheet.len(), 1);
    assert!(fake.submitted().is_empty());
}

#[test]
fn session_needs_a_subject_and_a_mark_to_submit() {
    let mut session = AttendanceSession::open("c1", "2024-03-11", None).expect("open");
    assert!(!session.can_submit());

    session.sheet.set_status("s1", AttendanceStatus::Present);
    assert!(!session.can_submit(), "subject still missing");

    session.subject = Some("MA-1".to_string());
    assert!(session.can_submit());

    assert!(AttendanceSession::open(" ", "2024-03-11", None).is_err());
    assert!(AttendanceSession::open("c1", "March 11", None).is_err());
}

#[test]
fn present_after_an_open_prompt_discards_the_prompt() {
    let mut sheet = AttendanceSheet::new();
    sheet.set_status("s1", AttendanceStatus::Absent);

    assert_eq!(
        sheet.set_status("s1", AttendanceStatus::Present),
        SetStatusOutcome::Recorded
    );
    assert!(sheet.pending().is_none());

    assert!(!sheet.confirm_reason("Flu"), "no prompt left to confirm");
    assert_eq!(sheet.get("s1"), Some(&AttendanceMark::present()));
}

#[test]
fn marking_another_student_present_also_closes_the_prompt() {
    let mut sheet = AttendanceSheet::new();
    sheet.set_status("s1", AttendanceStatus::Late);
    sheet.set_status("s2", AttendanceStatus::Present);

    assert!(!sheet.confirm_reason("Bus"));
    assert!(sheet.get("s1").is_none());
    assert_eq!(sheet.len(), 1);
}
