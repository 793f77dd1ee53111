pub mod app;
pub mod backend;
pub mod cli;
pub mod constants;
pub mod coordinator;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{load_config, AppState, Config};
pub use backend::{Backend, BackendError, FileCandidate, HttpBackend};
pub use coordinator::{ChatOutcome, Controller, UploadSummary};
pub use tui::run_ui;
pub use utils::PdfChatError;
