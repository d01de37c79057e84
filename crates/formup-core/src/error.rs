//! Error type returned by the upload client.
//!
//! `Transport` and `Status` are the two runtime failures; the rest are raised
//! before anything goes on the wire.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// libcurl reported a failure (connection refused, DNS, reset, ...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {code}")]
    Status { code: u32, body: Vec<u8> },

    /// Address could not be parsed or joined onto the base URL, or is not http(s).
    #[error("invalid address {address:?}: {reason}")]
    InvalidUrl { address: String, reason: String },

    /// A field value that has no form encoding (nested object, array, null).
    #[error("field {field:?}: unsupported value of type {kind}")]
    UnsupportedValue { field: String, kind: &'static str },

    /// libcurl refused a form part.
    #[error("form part: {0}")]
    Form(#[from] curl::FormError),

    /// The blocking task running the transfer panicked or was cancelled.
    #[error("transfer task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl UploadError {
    /// HTTP status carried by a server rejection, if this is one.
    pub fn status(&self) -> Option<u32> {
        match self {
            UploadError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for failures that happened below HTTP (no response at all).
    pub fn is_transport(&self) -> bool {
        matches!(self, UploadError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reports_code() {
        let e = UploadError::Status {
            code: 403,
            body: b"CSRF verification failed".to_vec(),
        };
        assert_eq!(e.status(), Some(403));
        assert!(!e.is_transport());
        assert_eq!(e.to_string(), "HTTP 403");
    }

    #[test]
    fn unsupported_value_names_field() {
        let e = UploadError::UnsupportedValue {
            field: "meta".to_string(),
            kind: "object",
        };
        assert!(e.status().is_none());
        assert!(e.to_string().contains("\"meta\""));
        assert!(e.to_string().contains("object"));
    }
}
