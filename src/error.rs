use thiserror::Error;

/// Failure of one user-triggered action. Every variant ends up as a single
/// transient notification in the dashboard; none of them is fatal to the
/// sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Required input missing before anything was attempted.
    #[error("{0}")]
    Validation(String),
    /// A referenced entity is not in the loaded reference lists.
    #[error("{0}")]
    NotFound(String),
    /// The backend answered `success: false`, or the transport failed.
    #[error("{0}")]
    Remote(String),
    /// Drawing the report document failed; no partial file is produced.
    #[error("{0}")]
    Format(String),
}

impl ActionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Stable IPC error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "bad_params",
            Self::NotFound(_) => "not_found",
            Self::Remote(_) => "remote_failed",
            Self::Format(_) => "format_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ActionError::validation("x").code(), "bad_params");
        assert_eq!(ActionError::not_found("x").code(), "not_found");
        assert_eq!(ActionError::remote("x").code(), "remote_failed");
        assert_eq!(ActionError::format("x").code(), "format_failed");
        assert_eq!(ActionError::remote("backend down").to_string(), "backend down");
    }
}
