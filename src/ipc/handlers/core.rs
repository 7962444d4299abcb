use crate::backend::HttpBackend;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::optional_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use super::setup::{section_str, SetupSection};

pub const ENV_API_BASE_URL: &str = "SCHOOLD_API_BASE_URL";
pub const ENV_USER_ID: &str = "SCHOOLD_USER_ID";

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "backendConnected": state.backend.is_some()
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            info!(workspace = %path.to_string_lossy(), "workspace selected");
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Params win over workspace setup, which wins over the environment.
fn handle_backend_connect(state: &mut AppState, req: &Request) -> serde_json::Value {
    let base_url = optional_str(&req.params, "baseUrl")
        .or_else(|| section_str(state, SetupSection::Connection, "apiBaseUrl"))
        .or_else(|| env_value(ENV_API_BASE_URL));
    let Some(base_url) = base_url else {
        return err(&req.id, "bad_params", "missing baseUrl", None);
    };
    let user_id = optional_str(&req.params, "userId")
        .or_else(|| section_str(state, SetupSection::Connection, "userId"))
        .or_else(|| env_value(ENV_USER_ID));

    match HttpBackend::new(&base_url, user_id) {
        Ok(backend) => {
            let base = backend.base_url().to_string();
            state.backend = Some(Box::new(backend));
            state.reset_session();
            info!(base_url = %base, "backend connected");
            ok(&req.id, json!({ "baseUrl": base }))
        }
        Err(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "backend.connect" => Some(handle_backend_connect(state, req)),
        _ => None,
    }
}
