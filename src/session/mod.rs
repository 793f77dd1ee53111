/// Session management module - Gateway

mod conversation;
mod documents;
mod store;

pub use conversation::{ConversationLog, Message, MessageRole};
pub use documents::{size_label, Document, DocumentId, DocumentRegistry, DocumentStatus};
pub use store::SessionStore;
