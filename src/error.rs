use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum SeachartError {
    #[error("Backend API error: {0}")]
    Api(#[from] ApiError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was requested before the state it needs exists
    #[error("{0}")]
    NotReady(String),
}

/// Routing/monitoring backend errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered but reported a failure in its `error` field
    #[error("Backend reported: {0}")]
    Backend(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Overlay group errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OverlayError {
    #[error("Unknown overlay group: {0}")]
    UnknownGroup(String),
}

/// TUI errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for seachart operations
pub type Result<T> = std::result::Result<T, SeachartError>;

impl SeachartError {
    /// Check if this error is transient (a later attempt may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            SeachartError::Api(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

impl ApiError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            ApiError::Http(err) => err.is_timeout() || err.is_connect(),
            ApiError::HttpStatus(status) => status.is_server_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_recoverability() {
        let busy = SeachartError::Api(ApiError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY));
        assert!(busy.is_recoverable());

        let missing = SeachartError::Api(ApiError::HttpStatus(reqwest::StatusCode::NOT_FOUND));
        assert!(!missing.is_recoverable());

        let backend = SeachartError::Api(ApiError::Backend("Failed to calculate route".into()));
        assert!(!backend.is_recoverable());
        assert_eq!(
            backend.to_string(),
            "Backend API error: Backend reported: Failed to calculate route"
        );
    }

    #[test]
    fn test_unknown_group_message() {
        let err: SeachartError = OverlayError::UnknownGroup("vessels2".into()).into();
        assert_eq!(err.to_string(), "Overlay error: Unknown overlay group: vessels2");
        assert!(!err.is_recoverable());
    }
}
