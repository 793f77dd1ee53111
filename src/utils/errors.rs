use thiserror::Error;

/// Main error type for pdfchat
#[derive(Error, Debug)]
pub enum PdfChatError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid file {path}: {reason}")]
    InvalidFile { path: String, reason: String },
}
