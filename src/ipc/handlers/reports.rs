use crate::attendance::parse_iso_date;
use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{backend, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::ReportQuery;
use crate::report::{self, ReportHeading};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::setup::{section_str, SetupSection};

fn output_dir(state: &AppState, params: &serde_json::Value) -> Result<PathBuf, HandlerErr> {
    if let Some(dir) = optional_str(params, "outDir") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = section_str(state, SetupSection::Reports, "outputDir") {
        return Ok(PathBuf::from(dir));
    }
    state
        .workspace
        .as_ref()
        .map(|w| w.join("reports"))
        .ok_or_else(|| HandlerErr::new("bad_params", "missing outDir"))
}

/// Writes beside the target and renames, so a failed write never leaves a
/// partial report behind.
fn write_report(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let tmp = path.with_extension("pdf.part");
    std::fs::write(&tmp, bytes)
        .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("failed to write {}", path.to_string_lossy()));
    }
    Ok(())
}

fn attendance_report(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = parse_iso_date(&required_str(params, "date")?)?;
    let query = ReportQuery {
        date,
        classroom_id: optional_str(params, "classroomId"),
        subject: optional_str(params, "subject"),
    };
    let out_dir = output_dir(state, params)?;
    let heading = ReportHeading::new(date, query.subject.as_deref()).with_title(
        &section_str(state, SetupSection::Reports, "title").unwrap_or_default(),
    );

    let records = backend(state)?.attendance_report(&query)?;
    if records.is_empty() {
        return Err(HandlerErr::new(
            "not_found",
            format!("no attendance recorded for {}", date.format("%Y-%m-%d")),
        ));
    }

    let (layout, bytes) = report::build_report(&records, &heading).map_err(|e| {
        warn!(error = %e, "report generation failed");
        HandlerErr::from(e)
    })?;
    let file_name = report::report_file_name(date);
    let path = out_dir.join(&file_name);
    write_report(&path, &bytes)
        .map_err(|e| HandlerErr::new("io_failed", format!("{e:#}")))?;
    info!(path = %path.to_string_lossy(), pages = layout.page_count(), "attendance report written");

    Ok(json!({
        "path": path.to_string_lossy(),
        "fileName": file_name,
        "pageCount": layout.page_count(),
        "classroomCount": records.len(),
        "byteCount": bytes.len(),
        "notice": format!("Report saved as {file_name}")
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.report" => attendance_report(state, &req.params),
        _ => return None,
    };
    Some(reply(&req.id, result))
}
