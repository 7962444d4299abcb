#![allow(dead_code)]

use schoold::backend::Backend;
use schoold::error::ActionError;
use schoold::model::{
    AttendanceRecord, AttendanceReportEntry, Classroom, ReportQuery, Subject, Teacher,
    TeacherAssignment, TeacherName,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
pub struct FakeState {
    pub classrooms: Vec<Classroom>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub reports: Vec<AttendanceReportEntry>,
    pub submitted: Vec<AttendanceRecord>,
    pub written: Vec<(String, Vec<TeacherAssignment>)>,
    pub report_queries: Vec<ReportQuery>,
    pub calls: Vec<String>,
    pub fail_writes: Option<String>,
}

/// In-memory backend that records every call. Cloning shares the state, so a
/// test can keep a handle after boxing one into `AppState`.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeBackend {
    pub fn with_classrooms(classrooms: Vec<Classroom>) -> Self {
        let fake = Self::default();
        fake.state.borrow_mut().classrooms = classrooms;
        fake
    }

    pub fn set_teachers(&self, teachers: Vec<Teacher>) {
        self.state.borrow_mut().teachers = teachers;
    }

    pub fn set_reports(&self, reports: Vec<AttendanceReportEntry>) {
        self.state.borrow_mut().reports = reports;
    }

    pub fn fail_writes(&self, message: &str) {
        self.state.borrow_mut().fail_writes = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn writes(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with("PUT ") || c.starts_with("POST "))
            .count()
    }

    pub fn written(&self) -> Vec<(String, Vec<TeacherAssignment>)> {
        self.state.borrow().written.clone()
    }

    pub fn submitted(&self) -> Vec<AttendanceRecord> {
        self.state.borrow().submitted.clone()
    }

    pub fn stored(&self, classroom_id: &str) -> Classroom {
        self.state
            .borrow()
            .classrooms
            .iter()
            .find(|c| c.id == classroom_id)
            .cloned()
            .expect("stored classroom")
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    fn write_failure(&self) -> Option<ActionError> {
        self.state
            .borrow()
            .fail_writes
            .clone()
            .map(ActionError::remote)
    }
}

impl Backend for FakeBackend {
    fn list_classrooms(&self) -> Result<Vec<Classroom>, ActionError> {
        self.record("GET classrooms".to_string());
        Ok(self.state.borrow().classrooms.clone())
    }

    fn get_classroom(&self, classroom_id: &str) -> Result<Classroom, ActionError> {
        self.record(format!("GET classrooms/{classroom_id}"));
        self.state
            .borrow()
            .classrooms
            .iter()
            .find(|c| c.id == classroom_id)
            .cloned()
            .ok_or_else(|| ActionError::remote("Classroom not found"))
    }

    fn update_assignments(
        &self,
        classroom_id: &str,
        assignments: &[TeacherAssignment],
    ) -> Result<Classroom, ActionError> {
        self.record(format!("PUT classrooms/{classroom_id}"));
        if let Some(e) = self.write_failure() {
            return Err(e);
        }
        let mut state = self.state.borrow_mut();
        state
            .written
            .push((classroom_id.to_string(), assignments.to_vec()));
        let stored = state
            .classrooms
            .iter_mut()
            .find(|c| c.id == classroom_id)
            .ok_or_else(|| ActionError::remote("Classroom not found"))?;
        stored.assignments = assignments.to_vec();
        Ok(stored.clone())
    }

    fn list_teachers(&self) -> Result<Vec<Teacher>, ActionError> {
        self.record("GET teachers".to_string());
        Ok(self.state.borrow().teachers.clone())
    }

    fn list_subjects(&self) -> Result<Vec<Subject>, ActionError> {
        self.record("GET subjects".to_string());
        Ok(self.state.borrow().subjects.clone())
    }

    fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<Value>, ActionError> {
        self.record("POST attendance".to_string());
        if let Some(e) = self.write_failure() {
            return Err(e);
        }
        self.state.borrow_mut().submitted.push(record.clone());
        Ok(None)
    }

    fn attendance_report(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<AttendanceReportEntry>, ActionError> {
        self.record("GET attendance".to_string());
        let mut state = self.state.borrow_mut();
        state.report_queries.push(query.clone());
        Ok(state.reports.clone())
    }
}

pub fn subject(code: &str, name: &str) -> Subject {
    Subject::new(code, name, code)
}

pub fn assigned(code: &str, first: &str, last: &str) -> TeacherAssignment {
    TeacherAssignment::new(
        subject(code, code),
        Some(TeacherName::new(first, last)),
    )
}

pub fn classroom(id: &str, grade_level: u8, assignments: Vec<TeacherAssignment>) -> Classroom {
    Classroom {
        id: id.to_string(),
        name: format!("{grade_level}° A"),
        grade_level,
        section: "A".to_string(),
        shift: "Morning".to_string(),
        assignments,
        ..Classroom::default()
    }
}

pub fn teacher(id: &str, first: &str, last: &str) -> Teacher {
    Teacher {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}
