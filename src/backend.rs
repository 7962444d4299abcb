use crate::error::ActionError;
use crate::model::{
    ApiEnvelope, AttendanceRecord, AttendanceReportEntry, Classroom, ReportQuery, Subject,
    Teacher, TeacherAssignment,
};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

/// School REST backend. Each call is one request/response; callers block
/// until it resolves. Nothing here retries.
pub trait Backend {
    fn list_classrooms(&self) -> Result<Vec<Classroom>, ActionError>;
    fn get_classroom(&self, classroom_id: &str) -> Result<Classroom, ActionError>;
    /// Whole-array replace of a classroom's roster; the backend echoes the
    /// updated classroom.
    fn update_assignments(
        &self,
        classroom_id: &str,
        assignments: &[TeacherAssignment],
    ) -> Result<Classroom, ActionError>;
    fn list_teachers(&self) -> Result<Vec<Teacher>, ActionError>;
    fn list_subjects(&self) -> Result<Vec<Subject>, ActionError>;
    fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<Value>, ActionError>;
    fn attendance_report(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<AttendanceReportEntry>, ActionError>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
    user_id: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, user_id: Option<String>) -> Result<Self, ActionError> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ActionError::validation(
                "apiBaseUrl must start with http:// or https://",
            ));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| ActionError::remote(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base.to_string(),
            user_id: user_id.filter(|u| !u.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/{path}/{id}` with `id` percent-encoded as a single segment.
    fn entity_url(&self, path: &str, id: &str) -> Result<Url, ActionError> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| ActionError::validation(format!("invalid backend url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ActionError::validation("backend url cannot carry a path"))?
            .push(id);
        Ok(url)
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("X-Request-Id", Uuid::new_v4().to_string());
        match &self.user_id {
            Some(user) => builder.header("X-User-Id", user.as_str()),
            None => builder,
        }
    }

    fn send<T: DeserializeOwned>(
        &self,
        what: &str,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, ActionError> {
        self.send_with_status(what, builder).map(|(_, env)| env)
    }

    fn send_with_status<T: DeserializeOwned>(
        &self,
        what: &str,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, ApiEnvelope<T>), ActionError> {
        let resp = self.decorate(builder).send().map_err(|e| {
            warn!(what, error = %e, "backend request failed");
            ActionError::remote(format!("{what}: {e}"))
        })?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| ActionError::remote(format!("{what}: {e}")))?;
        debug!(what, %status, bytes = body.len(), "backend response");
        match serde_json::from_str::<ApiEnvelope<T>>(&body) {
            Ok(env) => Ok((status, env)),
            Err(e) if status.is_success() => {
                Err(ActionError::remote(format!("{what}: malformed response: {e}")))
            }
            Err(_) => Err(ActionError::remote(format!("{what}: HTTP {status}"))),
        }
    }
}

impl Backend for HttpBackend {
    fn list_classrooms(&self) -> Result<Vec<Classroom>, ActionError> {
        let req = self.client.get(self.url("classrooms"));
        self.send("load classrooms", req)?
            .into_result("load classrooms")
    }

    fn get_classroom(&self, classroom_id: &str) -> Result<Classroom, ActionError> {
        let req = self.client.get(self.entity_url("classrooms", classroom_id)?);
        self.send("load classroom", req)?
            .into_result("load classroom")
    }

    fn update_assignments(
        &self,
        classroom_id: &str,
        assignments: &[TeacherAssignment],
    ) -> Result<Classroom, ActionError> {
        let req = self
            .client
            .put(self.entity_url("classrooms", classroom_id)?)
            .json(&json!({ "assignments": assignments }));
        self.send("update classroom", req)?
            .into_result("update classroom")
    }

    fn list_teachers(&self) -> Result<Vec<Teacher>, ActionError> {
        let req = self.client.get(self.url("teachers"));
        self.send("load teachers", req)?.into_result("load teachers")
    }

    fn list_subjects(&self) -> Result<Vec<Subject>, ActionError> {
        let req = self.client.get(self.url("subjects"));
        self.send("load subjects", req)?.into_result("load subjects")
    }

    fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<Value>, ActionError> {
        let req = self.client.post(self.url("attendance")).json(record);
        self.send("save attendance", req)?
            .into_optional("save attendance")
    }

    fn attendance_report(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<AttendanceReportEntry>, ActionError> {
        let mut params = vec![("date", query.date.format("%Y-%m-%d").to_string())];
        if let Some(id) = &query.classroom_id {
            params.push(("classroomId", id.clone()));
        }
        if let Some(subject) = &query.subject {
            params.push(("subject", subject.clone()));
        }
        let req = self.client.get(self.url("attendance")).query(&params);
        let (status, env) = self.send_with_status("load attendance", req)?;
        // The backend answers 404 when nothing was recorded for the query.
        if status == StatusCode::NOT_FOUND {
            debug!(date = %query.date, "no attendance stored");
            return Ok(Vec::new());
        }
        env.into_result("load attendance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized_and_checked() {
        let b = HttpBackend::new(" http://localhost:4000/api/ ", None).expect("backend");
        assert_eq!(b.base_url(), "http://localhost:4000/api");
        assert_eq!(b.url("/classrooms"), "http://localhost:4000/api/classrooms");
        assert!(matches!(
            HttpBackend::new("localhost:4000", None),
            Err(ActionError::Validation(_))
        ));
    }

    #[test]
    fn entity_ids_stay_inside_one_path_segment() {
        let b = HttpBackend::new("http://localhost:4000/api/", None).expect("backend");
        let url = b.entity_url("classrooms", "c1").expect("url");
        assert_eq!(url.as_str(), "http://localhost:4000/api/classrooms/c1");
        let url = b.entity_url("classrooms", "a/b?c#d").expect("url");
        assert_eq!(url.as_str(), "http://localhost:4000/api/classrooms/a%2Fb%3Fc%23d");
        assert_eq!(url.path_segments().map(|s| s.count()), Some(3));
    }
}
