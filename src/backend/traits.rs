use async_trait::async_trait;

use super::types::{BackendError, ChatRequest, ChatResponse, FileCandidate, UploadResponse};

/// The document/answer service the client talks to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Submit one PDF. `session_id` is `None` only for the first upload of a session.
    async fn upload(
        &self,
        file: FileCandidate,
        session_id: Option<String>,
    ) -> Result<UploadResponse, BackendError>;

    /// Ask a question against the documents of a session
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError>;

    /// Check whether the backend is reachable
    async fn health(&self) -> Result<bool, BackendError> {
        Ok(true)
    }

    /// Human-readable location of the backend, for display
    fn endpoint(&self) -> String;
}
