use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
pub(crate) enum SetupSection {
    Connection,
    Reports,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "connection" => Some(Self::Connection),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Connection => "setup.connection",
            Self::Reports => "setup.reports",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Connection => json!({
            "apiBaseUrl": "",
            "userId": ""
        }),
        SetupSection::Reports => json!({
            "title": crate::report::DEFAULT_TITLE,
            "outputDir": ""
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.len() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Connection => match k.as_str() {
                "apiBaseUrl" => {
                    let url = parse_string_max(v, k, 300)?;
                    if !url.is_empty()
                        && !url.starts_with("http://")
                        && !url.starts_with("https://")
                    {
                        return Err("apiBaseUrl must start with http:// or https://".into());
                    }
                    obj.insert(k.clone(), Value::String(url));
                }
                "userId" => {
                    obj.insert(k.clone(), Value::String(parse_string_max(v, k, 120)?));
                }
                _ => return Err(format!("unknown connection field: {}", k)),
            },
            SetupSection::Reports => match k.as_str() {
                "title" => {
                    let title = parse_string_max(v, k, 120)?;
                    if title.is_empty() {
                        return Err("title must not be empty".into());
                    }
                    obj.insert(k.clone(), Value::String(title));
                }
                "outputDir" => {
                    obj.insert(k.clone(), Value::String(parse_string_max(v, k, 1024)?));
                }
                _ => return Err(format!("unknown reports field: {}", k)),
            },
        }
    }
    Ok(())
}

pub(crate) fn load_section(
    conn: &rusqlite::Connection,
    section: SetupSection,
) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort apply: malformed historical values should not block setup UI.
            let _ = merge_section_patch(section, &mut current, saved_obj);
        }
    }
    Ok(current)
}

/// Reads one string field of a section, falling back to defaults when no
/// workspace is open.
pub(crate) fn section_str(state: &AppState, section: SetupSection, key: &str) -> Option<String> {
    let value = match state.db.as_ref() {
        Some(conn) => load_section(conn, section).ok()?,
        None => default_section(section),
    };
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let connection = match load_section(conn, SetupSection::Connection) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let reports = match load_section(conn, SetupSection::Reports) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(
        &req.id,
        json!({
            "connection": connection,
            "reports": reports
        }),
    )
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
