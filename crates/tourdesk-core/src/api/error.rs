use thiserror::Error;

/// A failed API call.
///
/// `detail` carries the (truncated) response body for logs. `message` is the
/// server's `message` field and is the only part shown to the user.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {detail}")]
    AccessDenied { detail: String, message: Option<String> },

    #[error("Unauthorized - session expired or token invalid")]
    Unauthorized { message: Option<String> },

    #[error("Resource not found: {detail}")]
    NotFound { detail: String, message: Option<String> },

    #[error("Validation failed: {detail}")]
    Validation { detail: String, message: Option<String> },

    #[error("Rate limited - please wait before retrying")]
    RateLimited { message: Option<String> },

    #[error("Server error: {detail}")]
    ServerError { detail: String, message: Option<String> },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Pull the `message` field out of a JSON error body, if there is one.
    pub fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::server_message(body);
        let detail = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { detail, message },
            404 => ApiError::NotFound { detail, message },
            422 => ApiError::Validation { detail, message },
            429 => ApiError::RateLimited { message },
            500..=599 => ApiError::ServerError { detail, message },
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }

    /// A rejection whose message is meant for the user as-is.
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::Validation {
            detail: message.clone(),
            message: Some(message),
        }
    }

    /// A server-side failure reported in a 2xx body.
    pub fn server_error(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::ServerError {
            detail: message.clone(),
            message: Some(message),
        }
    }

    /// The server's own `message`, if it sent one.
    pub fn server_text(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied { message, .. }
            | ApiError::Unauthorized { message }
            | ApiError::NotFound { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::RateLimited { message }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            ApiError::NetworkError(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Raw bodies never reach the user: without a server `message` the
    /// caller falls back to its own wording. Session expiry and rate limiting
    /// still get a canned line when the server said nothing.
    pub fn user_message(&self) -> Option<String> {
        if let Some(message) = self.server_text() {
            return Some(message.to_string());
        }
        match self {
            ApiError::Unauthorized { .. } => Some("Session expired, please log in again".to_string()),
            ApiError::RateLimited { .. } => Some(self.to_string()),
            _ => None,
        }
    }

    /// True when the failure came back from the server (as opposed to the
    /// request never completing).
    pub fn is_http_response(&self) -> bool {
        !matches!(self, ApiError::NetworkError(_) | ApiError::InvalidResponse(_))
    }
}
