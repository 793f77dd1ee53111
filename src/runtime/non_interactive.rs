use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::{
    backend::FileCandidate,
    cli::OutputFormat,
    coordinator::{ChatOutcome, Controller, UploadSummary},
    session::{Document, Message, MessageRole},
    utils::select_files,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The question that was asked
    pub prompt: String,
    /// How the question ended
    pub outcome: ChatOutcome,
    /// Upload counters for the --file batch
    pub upload: UploadSummary,
    /// Documents left attached after the batch
    pub documents: Vec<Document>,
    /// Full conversation log, in order
    pub messages: Vec<Message>,
    /// Last recorded failure, if any
    pub error: Option<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Backend the run talked to
    pub backend: String,
    /// Session id, if one was established
    pub session_id: Option<String>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

impl NonInteractiveResult {
    pub fn answered(&self) -> bool {
        self.outcome.is_answered()
    }
}

/// Runs one upload batch followed by a single question
pub struct NonInteractiveRunner {
    controller: Controller,
}

impl NonInteractiveRunner {
    pub fn new(controller: Controller) -> Self {
        Self { controller }
    }

    /// Upload `files` then ask `prompt`
    pub async fn execute(&self, files: &[PathBuf], prompt: String) -> NonInteractiveResult {
        let candidates = select_files(files).await;
        self.execute_candidates(candidates, prompt).await
    }

    pub async fn execute_candidates(
        &self,
        candidates: Vec<FileCandidate>,
        prompt: String,
    ) -> NonInteractiveResult {
        let start_time = Instant::now();

        let upload = self.controller.upload_batch(candidates).await;
        let outcome = self.controller.send_query(&prompt).await;

        let state = self.controller.snapshot();
        NonInteractiveResult {
            prompt,
            outcome,
            upload,
            documents: state.documents().to_vec(),
            messages: state.messages().to_vec(),
            error: state.last_error().map(str::to_owned),
            metadata: ExecutionMetadata {
                backend: self.controller.backend_endpoint(),
                session_id: state.session_id().map(str::to_owned),
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();
                for msg in &result.messages {
                    output.push_str(&format!("[{}] {}\n", msg.role, msg.content));
                }
                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                if !result.documents.is_empty() {
                    output.push_str("## Documents\n\n");
                    for doc in &result.documents {
                        output.push_str(&format!("- {} ({})\n", doc.name, doc.size_label));
                    }
                    output.push('\n');
                }

                output.push_str("## Conversation\n\n");
                for msg in &result.messages {
                    match msg.role {
                        MessageRole::User => {
                            output.push_str(&format!("**You:** {}\n\n", msg.content))
                        }
                        MessageRole::Assistant => {
                            output.push_str(&format!("{}\n\n", msg.content))
                        }
                        MessageRole::System => {
                            output.push_str(&format!("> {}\n\n", msg.content))
                        }
                    }
                }

                if let ChatOutcome::Answered { sources, .. } = &result.outcome {
                    if !sources.is_empty() {
                        output.push_str(&format!("*{} source(s) cited*\n\n", sources.len()));
                    }
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Backend: {} | Session: {} | Duration: {}ms*\n",
                    result.metadata.backend,
                    result.metadata.session_id.as_deref().unwrap_or("none"),
                    result.metadata.duration_ms
                ));

                output
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ChatResponse, MockBackend, UploadResponse};
    use serde_json::json;
    use std::sync::Arc;

    fn runner(chat_ok: bool) -> NonInteractiveRunner {
        let mut backend = MockBackend::new();
        backend.expect_upload().returning(|f, _| {
            if f.name == "bad.pdf" {
                Err(BackendError::Status {
                    status: 500,
                    detail: Some("corrupt file".to_string()),
                })
            } else {
                Ok(UploadResponse {
                    session_id: "s1".to_string(),
                    success: Some(true),
                })
            }
        });
        backend.expect_chat().returning(move |_| {
            if chat_ok {
                Ok(ChatResponse {
                    answer: "$42".to_string(),
                    sources: vec![json!({"page": 3})],
                })
            } else {
                Err(BackendError::Timeout)
            }
        });
        backend
            .expect_endpoint()
            .returning(|| "http://localhost:8000".to_string());
        NonInteractiveRunner::new(Controller::new(Arc::new(backend)))
    }

    #[tokio::test]
    async fn test_upload_and_ask() {
        let runner = runner(true);
        let result = runner
            .execute_candidates(
                vec![
                    FileCandidate::pdf("bad.pdf", vec![1u8]),
                    FileCandidate::pdf("good.pdf", vec![1u8]),
                ],
                "What is the total?".to_string(),
            )
            .await;

        assert!(result.answered());
        assert_eq!(result.upload.succeeded, 1);
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.metadata.session_id.as_deref(), Some("s1"));
        // The upload error from the batch is cleared once the chat starts
        assert_eq!(result.error, None);

        let text = runner.format_result(&result, OutputFormat::Text);
        assert!(text.contains("[system] Upload error for bad.pdf: corrupt file\n"));
        assert!(text.ends_with("[user] What is the total?\n[assistant] $42\n"));

        let markdown = runner.format_result(&result, OutputFormat::Markdown);
        assert!(markdown.contains("- good.pdf (0.00 KB)"));
        assert!(markdown.contains("**You:** What is the total?"));
        assert!(markdown.contains("*1 source(s) cited*"));

        let value: serde_json::Value =
            serde_json::from_str(&runner.format_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(value["outcome"]["outcome"], "answered");
        assert_eq!(value["outcome"]["answer"], "$42");
        assert_eq!(value["messages"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_question_without_documents() {
        let runner = runner(true);
        let result = runner.execute_candidates(Vec::new(), "hello".to_string()).await;

        assert!(!result.answered());
        assert_eq!(result.outcome, ChatOutcome::NoSession);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.metadata.session_id, None);
    }

    #[tokio::test]
    async fn test_failed_question() {
        let runner = runner(false);
        let result = runner
            .execute_candidates(vec![FileCandidate::pdf("good.pdf", vec![1u8])], "q".to_string())
            .await;

        assert!(!result.answered());
        assert_eq!(result.error.as_deref(), Some("Chat timed out"));
        assert_eq!(
            result.messages.last().map(|m| m.content.as_str()),
            Some("Error: Chat timed out")
        );
    }
}
