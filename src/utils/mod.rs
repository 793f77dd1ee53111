// Gateway module for utils - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod errors;
mod files;
mod logger;

// Public re-exports - the ONLY way to access utils functionality
pub use errors::PdfChatError;
pub use files::{declared_media_type, parse_path_list, read_candidate, select_files};
pub use logger::{init_file_logger, init_logger, log_progress};
