// Gateway module for backend - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod http;
mod traits;
mod types;

// Public re-exports - the ONLY way to access backend functionality
pub use http::HttpBackend;
#[cfg(test)]
pub use traits::MockBackend;
pub use traits::Backend;
pub use types::{
    BackendError, ChatRequest, ChatResponse, FileCandidate, Operation, UploadResponse,
};
