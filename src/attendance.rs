use crate::backend::Backend;
use crate::error::ActionError;
use crate::model::{AttendanceMark, AttendanceRecord, AttendanceStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMark {
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatusOutcome {
    Recorded,
    ReasonRequired,
}

/// Per-student marks collected during one "take attendance" session.
///
/// Absent and late marks are only committed once a non-blank reason has been
/// confirmed, so every stored entry satisfies the reason rule.
#[derive(Debug, Clone, Default)]
pub struct AttendanceSheet {
    entries: BTreeMap<String, AttendanceMark>,
    pending: Option<PendingMark>,
}

impl AttendanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, student_id: &str, status: AttendanceStatus) -> SetStatusOutcome {
        if status.requires_reason() {
            self.pending = Some(PendingMark {
                student_id: student_id.to_string(),
                status,
            });
            return SetStatusOutcome::ReasonRequired;
        }
        // A newer choice supersedes any reason prompt still open.
        self.pending = None;
        self.entries
            .insert(student_id.to_string(), AttendanceMark::present());
        SetStatusOutcome::Recorded
    }

    /// Commits the pending mark. Blank text (or nothing pending) is a no-op.
    pub fn confirm_reason(&mut self, text: &str) -> bool {
        let reason = text.trim();
        if reason.is_empty() {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        self.entries.insert(
            pending.student_id,
            AttendanceMark {
                status: pending.status,
                reason: Some(reason.to_string()),
            },
        );
        true
    }

    pub fn cancel_reason(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&PendingMark> {
        self.pending.as_ref()
    }

    pub fn entries(&self) -> &BTreeMap<String, AttendanceMark> {
        &self.entries
    }

    pub fn get(&self, student_id: &str) -> Option<&AttendanceMark> {
        self.entries.get(student_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_submit(&self, subject: Option<&str>) -> bool {
        !self.is_empty() && subject.is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReceipt {
    pub submitted: usize,
    pub notice: String,
}

pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, ActionError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ActionError::validation("date must be YYYY-MM-DD"))
}

/// Sends the whole sheet as one batch write. Success or failure applies to
/// the batch as a whole; the sheet itself is never modified here.
pub fn submit(
    backend: &dyn Backend,
    classroom_id: &str,
    date: &str,
    subject: Option<&str>,
    sheet: &AttendanceSheet,
) -> Result<AttendanceReceipt, ActionError> {
    if classroom_id.trim().is_empty() {
        return Err(ActionError::validation("select a classroom"));
    }
    if date.trim().is_empty() {
        return Err(ActionError::validation("select a date"));
    }
    let date = parse_iso_date(date)?;
    let Some(subject) = subject.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(ActionError::validation("select a subject"));
    };
    if sheet.is_empty() {
        return Err(ActionError::validation("no attendance marked"));
    }

    let record = AttendanceRecord {
        classroom_id: classroom_id.trim().to_string(),
        date,
        subject: Some(subject.to_string()),
        entries: sheet.entries().clone(),
    };
    backend.submit_attendance(&record).map_err(|e| {
        warn!(classroom = %record.classroom_id, error = %e, "attendance submit failed");
        e
    })?;
    let submitted = record.entries.len();
    info!(classroom = %record.classroom_id, %date, submitted, "attendance recorded");
    Ok(AttendanceReceipt {
        submitted,
        notice: format!("Attendance recorded for {submitted} students"),
    })
}

/// One open "take attendance" screen: the chosen classroom, date and subject
/// plus the marks collected so far. Dropped after a successful submit or when
/// another session is opened.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    pub classroom_id: String,
    pub date: NaiveDate,
    pub subject: Option<String>,
    pub sheet: AttendanceSheet,
}

impl AttendanceSession {
    pub fn open(
        classroom_id: &str,
        date: &str,
        subject: Option<&str>,
    ) -> Result<Self, ActionError> {
        if classroom_id.trim().is_empty() {
            return Err(ActionError::validation("select a classroom"));
        }
        Ok(Self {
            classroom_id: classroom_id.trim().to_string(),
            date: parse_iso_date(date)?,
            subject: subject
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            sheet: AttendanceSheet::new(),
        })
    }

    pub fn can_submit(&self) -> bool {
        self.sheet.can_submit(self.subject.as_deref())
    }

    pub fn submit(&self, backend: &dyn Backend) -> Result<AttendanceReceipt, ActionError> {
        submit(
            backend,
            &self.classroom_id,
            &self.date.format("%Y-%m-%d").to_string(),
            self.subject.as_deref(),
            &self.sheet,
        )
    }
}
