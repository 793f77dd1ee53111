// Gateway module for coordinator - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod chat;
mod controller;
mod upload;

// Public re-exports - the ONLY way to drive the application state
pub use chat::{ChatOutcome, PendingChat};
pub use controller::Controller;
pub use upload::UploadSummary;
