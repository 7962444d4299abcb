use crate::error::ActionError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: code.into(),
        }
    }

    /// Upstream sources disagree on which field identifies a subject, so any of
    /// id, code or name counts. Blank values never match.
    fn matches_any(&self, id: &str, code: &str, name: &str) -> bool {
        fn same(a: &str, b: &str) -> bool {
            let a = a.trim();
            !a.is_empty() && a == b.trim()
        }
        same(&self.id, id) || same(&self.code, code) || same(&self.name, name)
    }

    pub fn matches(&self, other: &Subject) -> bool {
        self.matches_any(&other.id, &other.code, &other.name)
    }

    /// Match a single loose key (as sent by the dashboard) against every
    /// identifying field.
    pub fn matches_key(&self, key: &str) -> bool {
        self.matches_any(key, key, key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherName {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl TeacherName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// The backend stores "no teacher" as `{firstName: "", lastName: ""}`; in
/// memory that is `None`.
mod teacher_slot {
    use super::TeacherName;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        teacher: &Option<TeacherName>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match teacher {
            Some(t) => t.serialize(serializer),
            None => TeacherName::default().serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TeacherName>, D::Error> {
        let raw: Option<TeacherName> = Option::deserialize(deserializer)?;
        Ok(raw.filter(|t| !t.is_blank()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsByPeriod {
    #[serde(default)]
    pub period1: Vec<Value>,
    #[serde(default)]
    pub period2: Vec<Value>,
    #[serde(default)]
    pub period3: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub subject: Subject,
    #[serde(default, with = "teacher_slot")]
    pub teacher: Option<TeacherName>,
    #[serde(default)]
    pub activities: Vec<Value>,
    #[serde(default)]
    pub extra_points: Vec<Value>,
    #[serde(default)]
    pub points_by_period: PointsByPeriod,
}

impl TeacherAssignment {
    pub fn new(subject: Subject, teacher: Option<TeacherName>) -> Self {
        Self {
            subject,
            teacher,
            activities: Vec::new(),
            extra_points: Vec::new(),
            points_by_period: PointsByPeriod::default(),
        }
    }

    pub fn placeholder(subject: Subject) -> Self {
        Self::new(subject, None)
    }

    pub fn is_assigned(&self) -> bool {
        self.teacher.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub id_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade_level: u8,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub students: Vec<StudentRef>,
    #[serde(default)]
    pub assignments: Vec<TeacherAssignment>,
}

/// Entry of the "available teachers" reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Teacher {
    pub fn name(&self) -> TeacherName {
        TeacherName::new(self.first_name.clone(), self.last_name.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }

    pub fn requires_reason(self) -> bool {
        !matches!(self, Self::Present)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

impl AttendanceMark {
    pub fn present() -> Self {
        Self {
            status: AttendanceStatus::Present,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub classroom_id: String,
    pub date: NaiveDate,
    pub subject: Option<String>,
    pub entries: BTreeMap<String, AttendanceMark>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub date: NaiveDate,
    pub classroom_id: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportClassroom {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade_level: u8,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub shift: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStudent {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub id_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    #[serde(default)]
    pub student: Option<ReportStudent>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Stored attendance snapshot for one classroom, as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReportEntry {
    #[serde(default)]
    pub classroom: ReportClassroom,
    #[serde(default)]
    pub attendance: Vec<ReportLine>,
}

/// `{ success, data?, message? }` wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_optional(self, what: &str) -> Result<Option<T>, ActionError> {
        if !self.success {
            return Err(ActionError::remote(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("{what} failed")),
            ));
        }
        Ok(self.data)
    }

    pub fn into_result(self, what: &str) -> Result<T, ActionError> {
        self.into_optional(what)?
            .ok_or_else(|| ActionError::remote(format!("{what}: response carried no data")))
    }
}
