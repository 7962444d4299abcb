use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::attendance::AttendanceSession;
use crate::backend::Backend;
use crate::curriculum::Curriculum;
use crate::model::{Classroom, Subject, Teacher};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything one dashboard session holds. Reference lists are snapshots:
/// loaded by the `*.list` methods, read by the mutations, and replaced after
/// a successful write.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub backend: Option<Box<dyn Backend>>,
    pub curriculum: Curriculum,
    pub classrooms: Vec<Classroom>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub attendance: Option<AttendanceSession>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            backend: None,
            curriculum: Curriculum::standard(),
            classrooms: Vec::new(),
            teachers: Vec::new(),
            subjects: Vec::new(),
            attendance: None,
        }
    }

    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        let mut state = Self::new();
        state.backend = Some(backend);
        state
    }

    /// Drops every snapshot tied to the current backend.
    pub fn reset_session(&mut self) {
        self.classrooms.clear();
        self.teachers.clear();
        self.subjects.clear();
        self.attendance = None;
    }

    /// Replaces (or adds) one classroom in the snapshot.
    pub fn remember_classroom(&mut self, classroom: &Classroom) {
        match self.classrooms.iter_mut().find(|c| c.id == classroom.id) {
            Some(slot) => *slot = classroom.clone(),
            None => self.classrooms.push(classroom.clone()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
