use crate::backend::Backend;
use crate::ipc::error::HandlerErr;
use crate::ipc::types::AppState;

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    optional_str(params, key).ok_or_else(|| HandlerErr::new("bad_params", format!("missing {key}")))
}

/// Trimmed string param; blank counts as absent.
pub fn optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn backend(state: &AppState) -> Result<&dyn Backend, HandlerErr> {
    state
        .backend
        .as_deref()
        .ok_or_else(|| HandlerErr::new("no_backend", "connect to the school backend first"))
}
