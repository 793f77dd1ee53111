use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{AppState, UIConfig};
use crate::backend::FileCandidate;
use crate::coordinator::{ChatOutcome, Controller, UploadSummary};
use crate::utils::{parse_path_list, select_files};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Which line the keyboard is feeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Scrolling the conversation
    Normal,
    /// Typing a question
    Insert,
    /// Typing a `:` command
    Command,
}

/// Terminal front end over a [`Controller`]
pub struct App {
    pub controller: Controller,
    pub ui: UIConfig,
    /// Question buffer
    pub input: String,
    /// Command buffer, without the leading ':'
    pub command: String,
    pub mode: InputMode,
    /// Is the app running?
    pub running: bool,
    /// Lines scrolled up from the bottom of the conversation
    pub scroll_from_bottom: u16,
    /// Show the command help panel instead of the conversation
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    spinner_frame: usize,
    upload_task: Option<JoinHandle<UploadSummary>>,
    chat_task: Option<JoinHandle<ChatOutcome>>,
}

impl App {
    pub fn new(controller: Controller, ui: UIConfig) -> Self {
        Self {
            controller,
            ui,
            input: String::new(),
            command: String::new(),
            mode: InputMode::Insert,
            running: true,
            scroll_from_bottom: 0,
            show_help: false,
            status_message: None,
            spinner_frame: 0,
            upload_task: None,
            chat_task: None,
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.controller.snapshot()
    }

    /// The question box takes keystrokes once a session exists and no answer
    /// is pending
    pub fn accepts_input(&self) -> bool {
        self.controller.read(|s| s.can_chat() && !s.is_busy())
    }

    /// The upload picker accepts new files only between batches
    pub fn picker_enabled(&self) -> bool {
        self.upload_task.is_none()
    }

    /// Start an upload batch in the background. Returns false when ignored.
    pub fn start_upload(&mut self, candidates: Vec<FileCandidate>) -> bool {
        if !self.picker_enabled() {
            self.set_status("An upload is already running");
            return false;
        }
        if candidates.is_empty() {
            self.set_status("No files selected");
            return false;
        }

        debug!(count = candidates.len(), "starting upload batch");
        let controller = self.controller.clone();
        self.upload_task = Some(tokio::spawn(async move {
            controller.upload_batch(candidates).await
        }));
        self.scroll_to_bottom();
        true
    }

    /// Handle `:upload <path>...`
    pub async fn upload_paths(&mut self, args: &str) {
        if !self.picker_enabled() {
            self.set_status("An upload is already running");
            return;
        }
        let paths = parse_path_list(args);
        if paths.is_empty() {
            self.set_status("Usage: :upload <path>...");
            return;
        }
        let candidates = select_files(&paths).await;
        self.start_upload(candidates);
    }

    /// Send the question buffer. The buffer is cleared only when the
    /// question was accepted.
    pub fn submit_question(&mut self) {
        match self.controller.begin_chat(&self.input) {
            Ok(pending) => {
                self.input.clear();
                self.clear_status();
                self.scroll_to_bottom();
                self.chat_task = Some(tokio::spawn(pending.complete()));
            }
            Err(ChatOutcome::Busy) => self.set_status("Still waiting for the previous answer"),
            Err(ChatOutcome::NoSession) => self.scroll_to_bottom(),
            Err(_) => {}
        }
    }

    /// Collect background work that has finished
    pub async fn poll_tasks(&mut self) {
        if self.upload_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.upload_task.take() {
                match task.await {
                    Ok(summary) if summary.attempted == 0 => {
                        self.set_status("No PDF files in the selection")
                    }
                    Ok(summary) => self.set_status(format!(
                        "Upload finished: {} succeeded, {} failed",
                        summary.succeeded, summary.failed
                    )),
                    Err(e) => {
                        warn!(error = %e, "upload task ended abnormally");
                        self.set_status(format!("Upload task failed: {}", e));
                    }
                }
                self.scroll_to_bottom();
            }
        }

        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                match task.await {
                    Ok(ChatOutcome::Answered { sources, .. }) if !sources.is_empty() => {
                        self.set_status(format!("{} source(s) cited", sources.len()))
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "chat task ended abnormally");
                        self.set_status(format!("Chat task failed: {}", e));
                    }
                }
                self.scroll_to_bottom();
            }
        }
    }

    /// Run a `:` command line
    pub async fn run_command(&mut self, line: &str) {
        let line = line.trim();
        let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match name {
            "upload" | "u" => self.upload_paths(args).await,
            "docs" | "d" => {
                self.ui.show_documents = !self.ui.show_documents;
            }
            "help" | "h" => self.show_help = true,
            "quit" | "q" => self.quit(),
            "" => {}
            other => self.set_status(format!("Unknown command: {}", other)),
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(amount);
    }

    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(amount);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Wait for background work to settle
    #[cfg(test)]
    async fn settle(&mut self) {
        if let Some(task) = &self.upload_task {
            while !task.is_finished() {
                tokio::task::yield_now().await;
            }
        }
        if let Some(task) = &self.chat_task {
            while !task.is_finished() {
                tokio::task::yield_now().await;
            }
        }
        self.poll_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChatResponse, MockBackend, UploadResponse};
    use crate::constants::NO_SESSION_MESSAGE;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn app_with_backend() -> App {
        let mut backend = MockBackend::new();
        backend.expect_upload().returning(|_, _| {
            Ok(UploadResponse {
                session_id: "s1".to_string(),
                success: Some(true),
            })
        });
        backend.expect_chat().returning(|req| {
            Ok(ChatResponse {
                answer: format!("answer to {}", req.query),
                sources: Vec::new(),
            })
        });
        App::new(Controller::new(Arc::new(backend)), UIConfig::default())
    }

    #[tokio::test]
    async fn test_question_kept_without_session() {
        let mut app = app_with_backend();
        app.input = "hello".to_string();
        app.submit_question();

        assert_eq!(app.input, "hello");
        let state = app.snapshot();
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].content, NO_SESSION_MESSAGE);
    }

    #[tokio::test]
    async fn test_upload_then_question() {
        let mut app = app_with_backend();
        assert!(app.start_upload(vec![FileCandidate::pdf("a.pdf", vec![1u8; 10])]));
        assert!(!app.picker_enabled());
        app.settle().await;
        assert!(app.picker_enabled());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Upload finished: 1 succeeded, 0 failed")
        );

        app.input = "total?".to_string();
        app.submit_question();
        assert!(app.input.is_empty());
        app.settle().await;

        let state = app.snapshot();
        assert!(!state.is_busy());
        assert_eq!(
            state.messages().last().map(|m| m.content.as_str()),
            Some("answer to total?")
        );
    }

    #[tokio::test]
    async fn test_upload_ignored_while_batch_runs() {
        let mut app = app_with_backend();
        assert!(app.start_upload(vec![FileCandidate::pdf("a.pdf", vec![1u8])]));
        assert!(!app.start_upload(vec![FileCandidate::pdf("b.pdf", vec![1u8])]));
        assert_eq!(app.status_message.as_deref(), Some("An upload is already running"));
        app.settle().await;
        assert_eq!(app.snapshot().documents().len(), 1);
    }

    #[tokio::test]
    async fn test_commands() {
        let mut app = app_with_backend();
        assert!(app.ui.show_documents);
        app.run_command("docs").await;
        assert!(!app.ui.show_documents);

        app.run_command("help").await;
        assert!(app.show_help);

        app.run_command("upload").await;
        assert_eq!(app.status_message.as_deref(), Some("Usage: :upload <path>..."));

        app.run_command("frobnicate now").await;
        assert_eq!(app.status_message.as_deref(), Some("Unknown command: frobnicate"));

        app.run_command("q").await;
        assert!(!app.running);
    }

    #[test]
    fn test_scrolling() {
        let mut app = App::new(
            Controller::new(Arc::new(MockBackend::new())),
            UIConfig::default(),
        );
        app.scroll_up(5);
        app.scroll_down(2);
        assert_eq!(app.scroll_from_bottom, 3);
        app.scroll_down(10);
        assert_eq!(app.scroll_from_bottom, 0);
    }
}
