use crate::constants::{PLACEHOLDER_NO_SESSION, PLACEHOLDER_READY};
use crate::session::{ConversationLog, Document, DocumentRegistry, Message, SessionStore};

/// Global application state
///
/// Owned by the [`Controller`](crate::coordinator::Controller) and changed only
/// through its upload and chat operations. Everything outside the crate sees it
/// through clones handed out by `Controller::snapshot`, which are read-only.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub(crate) session: SessionStore,
    pub(crate) documents: DocumentRegistry,
    pub(crate) log: ConversationLog,
    /// A chat request is in flight
    pub(crate) busy: bool,
    /// Upload batches currently running
    pub(crate) uploads_in_flight: usize,
    /// Most recent failure, shown until the next upload batch or chat clears it
    pub(crate) last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.id()
    }

    pub fn documents(&self) -> &[Document] {
        self.documents.documents()
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.documents
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads_in_flight > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Chat is available once a session exists
    pub fn can_chat(&self) -> bool {
        self.session.is_established()
    }

    /// Whether a send button for `input` would be enabled
    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && self.can_chat() && !self.busy
    }

    /// Placeholder text for the question input
    pub fn input_placeholder(&self) -> &'static str {
        if self.can_chat() {
            PLACEHOLDER_READY
        } else {
            PLACEHOLDER_NO_SESSION
        }
    }
}
