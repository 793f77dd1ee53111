/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/api/health";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes, OCR on large scans is slow
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;

// Documents
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
pub const UPLOAD_FORM_FIELD: &str = "file";

// Conversation text
pub const NO_SESSION_MESSAGE: &str = "Please upload at least one PDF first.";
pub const READY_TO_CHAT_SUFFIX: &str = "You can now chat with your documents.";
pub const PLACEHOLDER_NO_SESSION: &str = "Upload PDF(s) first...";
pub const PLACEHOLDER_READY: &str = "Ask a question about your PDFs...";

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;
pub const UI_DEFAULT_VIEWPORT_HEIGHT: u16 = 20;
