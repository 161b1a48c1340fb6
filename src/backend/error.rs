use thiserror::Error;

/// Message the backend sends when a NIK is already registered.
pub const DUPLICATE_NIK_MESSAGE: &str = "NIK SUDAH ADA";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The server answered with a non-success HTTP status.
    #[error("Backend responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never got an answer (connection refused, DNS, reset).
    #[error("No response from backend: {0}")]
    NoResponse(String),

    /// HTTP succeeded but the envelope status was not `"success"`.
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("{}", DUPLICATE_NIK_MESSAGE)]
    DuplicateNik,

    #[error("Backend request failed: {0}")]
    Other(String),
}

impl BackendError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return BackendError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            };
        }
        if e.is_connect() || e.is_timeout() || e.is_request() {
            return BackendError::NoResponse(e.to_string());
        }
        if e.is_decode() {
            return BackendError::Other(format!("Unreadable response: {}", e));
        }
        BackendError::Other(e.to_string())
    }

    /// Classify a backend message, singling out the duplicate-NIK conflict.
    pub fn rejected(message: Option<String>, fallback: &str) -> Self {
        match message {
            Some(m) if m.trim() == DUPLICATE_NIK_MESSAGE => BackendError::DuplicateNik,
            Some(m) if !m.trim().is_empty() => BackendError::Rejected(m),
            _ => BackendError::Rejected(fallback.to_string()),
        }
    }

    /// What staff should be told.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Status { status: 404, .. } => "Data not found.".to_string(),
            BackendError::Status { status: 500, .. } => {
                "The server hit an error. Please try again.".to_string()
            }
            BackendError::Status { status, message } => format!("Error {}: {}", status, message),
            BackendError::NoResponse(_) => {
                "Cannot reach the server. Check your network connection.".to_string()
            }
            BackendError::Rejected(message) => message.clone(),
            BackendError::DuplicateNik => DUPLICATE_NIK_MESSAGE.to_string(),
            BackendError::Other(_) => {
                "Something went wrong while contacting the server. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_by_status() {
        let not_found = BackendError::Status {
            status: 404,
            message: "nope".to_string(),
        };
        assert_eq!(not_found.user_message(), "Data not found.");

        let server = BackendError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(server.user_message().contains("server"));

        let other = BackendError::Status {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert_eq!(other.user_message(), "Error 403: Forbidden");
    }

    #[test]
    fn test_duplicate_nik_surfaced_verbatim() {
        let err = BackendError::rejected(Some("NIK SUDAH ADA".to_string()), "fallback");
        assert_eq!(err, BackendError::DuplicateNik);
        assert_eq!(err.user_message(), "NIK SUDAH ADA");
        assert_eq!(err.to_string(), "NIK SUDAH ADA");
    }

    #[test]
    fn test_rejected_fallback() {
        assert_eq!(
            BackendError::rejected(None, "Import failed"),
            BackendError::Rejected("Import failed".to_string())
        );
        assert_eq!(
            BackendError::rejected(Some("  ".to_string()), "Import failed"),
            BackendError::Rejected("Import failed".to_string())
        );
    }

    #[test]
    fn test_no_response_message() {
        let err = BackendError::NoResponse("connection refused".to_string());
        assert!(err.user_message().contains("network"));
    }
}
