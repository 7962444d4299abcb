//! Keeps a classroom's subject → teacher roster consistent with the
//! curriculum of its grade level, and applies explicit teacher changes.

use crate::backend::Backend;
use crate::curriculum::Curriculum;
use crate::error::ActionError;
use crate::model::{Classroom, Subject, Teacher, TeacherAssignment};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Curriculum subjects that no assignment covers, in curriculum order.
pub fn missing_subjects<'a>(
    expected: &'a [Subject],
    assignments: &[TeacherAssignment],
) -> Vec<&'a Subject> {
    expected
        .iter()
        .filter(|subject| !assignments.iter().any(|a| a.subject.matches(subject)))
        .collect()
}

/// Working copy of `assignments` with a placeholder appended for every
/// missing subject, or `None` when the roster is already complete.
pub fn heal_assignments(
    expected: &[Subject],
    assignments: &[TeacherAssignment],
) -> Option<Vec<TeacherAssignment>> {
    let missing = missing_subjects(expected, assignments);
    if missing.is_empty() {
        return None;
    }
    let mut healed = assignments.to_vec();
    healed.extend(
        missing
            .into_iter()
            .map(|s| TeacherAssignment::placeholder(s.clone())),
    );
    Some(healed)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterCheck {
    pub grade_level: u8,
    pub expected: usize,
    pub missing: Vec<Subject>,
    pub unassigned: Vec<Subject>,
    pub complete: bool,
}

fn expected_for<'a>(
    curriculum: &'a Curriculum,
    classroom: &Classroom,
) -> Result<&'a [Subject], ActionError> {
    curriculum.for_grade(classroom.grade_level).ok_or_else(|| {
        ActionError::not_found(format!(
            "no curriculum for grade level {}",
            classroom.grade_level
        ))
    })
}

/// Read-only completeness check; never writes.
pub fn check_roster(
    curriculum: &Curriculum,
    classroom: &Classroom,
) -> Result<RosterCheck, ActionError> {
    let expected = expected_for(curriculum, classroom)?;
    let missing: Vec<Subject> = missing_subjects(expected, &classroom.assignments)
        .into_iter()
        .cloned()
        .collect();
    let unassigned = classroom
        .assignments
        .iter()
        .filter(|a| !a.is_assigned())
        .map(|a| a.subject.clone())
        .collect();
    Ok(RosterCheck {
        grade_level: classroom.grade_level,
        expected: expected.len(),
        complete: missing.is_empty(),
        missing,
        unassigned,
    })
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub classroom: Classroom,
    pub added: Vec<Subject>,
}

impl Reconciled {
    pub fn wrote(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Heals missing curriculum subjects with placeholder assignments.
///
/// A complete roster returns the classroom as-is with no backend call. When
/// healing is needed the merged list is written once and the echoed classroom
/// is returned. On failure the caller still owns the untouched original.
#[instrument(skip_all, fields(classroom = %classroom.id, grade = classroom.grade_level))]
pub fn reconcile(
    backend: &dyn Backend,
    curriculum: &Curriculum,
    classroom: &Classroom,
) -> Result<Reconciled, ActionError> {
    let expected = expected_for(curriculum, classroom)?;
    let Some(healed) = heal_assignments(expected, &classroom.assignments) else {
        debug!("roster complete");
        return Ok(Reconciled {
            classroom: classroom.clone(),
            added: Vec::new(),
        });
    };
    let added: Vec<Subject> = healed[classroom.assignments.len()..]
        .iter()
        .map(|a| a.subject.clone())
        .collect();

    let updated = backend
        .update_assignments(&classroom.id, &healed)
        .map_err(|e| {
            warn!(error = %e, "roster heal write failed");
            e
        })?;
    info!(added = added.len(), "healed classroom roster");
    Ok(Reconciled {
        classroom: updated,
        added,
    })
}

/// Replace the first entry matching `subject_key` in place, or append.
pub fn apply_assignment(
    assignments: &[TeacherAssignment],
    subject_key: &str,
    entry: TeacherAssignment,
) -> Vec<TeacherAssignment> {
    let mut next = assignments.to_vec();
    match next.iter().position(|a| a.subject.matches_key(subject_key)) {
        Some(idx) => next[idx] = entry,
        None => next.push(entry),
    }
    next
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentChange {
    pub subject_id: String,
    pub teacher_id: String,
    pub subject_name: String,
}

/// Canonical state read back after an assignment write.
#[derive(Debug, Clone)]
pub struct AssignmentReload {
    pub assignments: Vec<TeacherAssignment>,
    pub classrooms: Vec<Classroom>,
}

/// Required-field checks, in the order the dashboard reports them. Runs
/// before any backend call.
pub fn validate_change(change: &AssignmentChange, classroom_id: &str) -> Result<(), ActionError> {
    if change.teacher_id.trim().is_empty() {
        return Err(ActionError::validation("select a teacher"));
    }
    if change.subject_id.trim().is_empty() {
        return Err(ActionError::validation("select a subject"));
    }
    if classroom_id.trim().is_empty() {
        return Err(ActionError::validation("select a classroom"));
    }
    Ok(())
}

#[instrument(skip_all, fields(subject = %change.subject_id, teacher = %change.teacher_id))]
pub fn assign_teacher(
    backend: &dyn Backend,
    teachers: &[Teacher],
    classroom: Option<&Classroom>,
    change: &AssignmentChange,
) -> Result<AssignmentReload, ActionError> {
    validate_change(change, classroom.map_or("", |c| c.id.as_str()))?;
    let Some(classroom) = classroom else {
        return Err(ActionError::validation("select a classroom"));
    };
    let subject_id = change.subject_id.trim();
    let teacher_id = change.teacher_id.trim();
    let teacher = teachers
        .iter()
        .find(|t| t.id == teacher_id)
        .ok_or_else(|| ActionError::not_found("teacher not found"))?;

    let subject_name = if change.subject_name.trim().is_empty() {
        subject_id.to_string()
    } else {
        change.subject_name.trim().to_string()
    };
    let entry = TeacherAssignment::new(
        Subject::new(subject_id, subject_name, subject_id),
        Some(teacher.name()),
    );
    let next = apply_assignment(&classroom.assignments, subject_id, entry);

    backend
        .update_assignments(&classroom.id, &next)
        .map_err(|e| {
            warn!(classroom = %classroom.id, error = %e, "assignment write failed");
            e
        })?;
    info!(classroom = %classroom.id, "teacher assigned");

    let assignments = backend.get_classroom(&classroom.id)?.assignments;
    let classrooms = backend.list_classrooms()?;
    Ok(AssignmentReload {
        assignments,
        classrooms,
    })
}
