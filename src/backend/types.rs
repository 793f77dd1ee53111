use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::PDF_MEDIA_TYPE;

/// A file as handed over by a file picker: name, declared media type and content
#[derive(Debug, Clone, PartialEq)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Convenience constructor for a file declared as PDF
    pub fn pdf(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(name, PDF_MEDIA_TYPE, bytes)
    }

    /// Whether the declared media type identifies a PDF
    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Body of a successful upload response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub session_id: String,
}

/// Body of a successful chat response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Extract a printable detail. FastAPI validation errors carry a list here,
    /// which is rendered as compact JSON.
    pub fn into_detail(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Which backend operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Chat,
    Health,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::Upload => "Upload",
            Operation::Chat => "Chat",
            Operation::Health => "Health check",
        }
    }
}

/// Failure of a single backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("backend returned status {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("network error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    /// User-facing reason: the backend's own detail when it sent one,
    /// otherwise a generic "<Operation> failed (<status>)".
    pub fn reason(&self, op: Operation) -> String {
        match self {
            BackendError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            BackendError::Status { status, detail: None } => {
                format!("{} failed ({})", op.label(), status)
            }
            BackendError::Transport(msg) => msg.clone(),
            BackendError::Timeout => format!("{} timed out", op.label()),
            BackendError::Decode(msg) => format!("{} returned an invalid response: {}", op.label(), msg),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reason_prefers_backend_detail() {
        let err = BackendError::Status {
            status: 500,
            detail: Some("corrupt file".to_string()),
        };
        assert_eq!(err.reason(Operation::Upload), "corrupt file");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_reason_falls_back_to_status() {
        let err = BackendError::Status { status: 413, detail: None };
        assert_eq!(err.reason(Operation::Upload), "Upload failed (413)");
        assert_eq!(err.reason(Operation::Chat), "Chat failed (413)");
    }

    #[test]
    fn test_reason_for_transport_failures() {
        assert_eq!(BackendError::Timeout.reason(Operation::Chat), "Chat timed out");
        assert_eq!(
            BackendError::Timeout.reason(Operation::Health),
            "Health check timed out"
        );
        assert_eq!(
            BackendError::Transport("connection refused".into()).reason(Operation::Upload),
            "connection refused"
        );
        assert!(BackendError::Decode("expected value".into())
            .reason(Operation::Upload)
            .starts_with("Upload returned an invalid response"));
    }

    #[test]
    fn test_error_body_detail() {
        let body: ErrorBody = serde_json::from_value(json!({"detail": "Only PDF files allowed"})).unwrap();
        assert_eq!(body.into_detail().as_deref(), Some("Only PDF files allowed"));

        let body: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.into_detail(), None);

        let body: ErrorBody =
            serde_json::from_value(json!({"detail": [{"loc": ["body", "query"], "msg": "field required"}]}))
                .unwrap();
        let detail = body.into_detail().unwrap();
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_media_type_check() {
        assert!(FileCandidate::pdf("a.pdf", vec![1u8]).is_pdf());
        assert!(FileCandidate::new("A.PDF", "Application/PDF", vec![1u8]).is_pdf());
        assert!(!FileCandidate::new("notes.txt", "text/plain", vec![1u8]).is_pdf());
    }

    #[test]
    fn test_chat_response_without_sources() {
        let resp: ChatResponse = serde_json::from_value(json!({"answer": "$42"})).unwrap();
        assert_eq!(resp.answer, "$42");
        assert!(resp.sources.is_empty());
    }
}
