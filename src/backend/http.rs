use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::traits::Backend;
use super::types::{BackendError, ChatRequest, ChatResponse, ErrorBody, FileCandidate, UploadResponse};
use crate::app::BackendConfig;
use crate::constants::{
    CHAT_PATH, HEALTH_CHECK_TIMEOUT_SECS, HEALTH_PATH, HTTP_REQUEST_TIMEOUT_SECS, PDF_MEDIA_TYPE, UPLOAD_FORM_FIELD,
    UPLOAD_PATH,
};

/// Backend reached over HTTP
pub struct HttpBackend {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

impl HttpBackend {
    /// Create a backend client for `base_url` (e.g. "http://localhost:8000")
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let timeout = if config.request_timeout_secs == 0 {
            HTTP_REQUEST_TIMEOUT_SECS
        } else {
            config.request_timeout_secs
        };
        let mut backend = Self::new(&config.base_url, Duration::from_secs(timeout))?;
        backend.health_timeout = Duration::from_secs(config.health_timeout_secs.max(1));
        Ok(backend)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a response into `T`, or into a `BackendError` carrying the backend's detail.
/// An unreadable error body is treated like an empty one.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let detail = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_detail);
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(
        &self,
        file: FileCandidate,
        session_id: Option<String>,
    ) -> Result<UploadResponse, BackendError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(PDF_MEDIA_TYPE)?;
        let form = multipart::Form::new().part(UPLOAD_FORM_FIELD, part);

        let mut request = self.client.post(self.url(UPLOAD_PATH)).multipart(form);
        if let Some(id) = &session_id {
            request = request.query(&[("session_id", id.as_str())]);
        }

        debug!(file = %file.name, session = ?session_id, "uploading document");
        let response = request.send().await?;
        read_json(response).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError> {
        debug!(session = %request.session_id, "submitting query");
        let response = self
            .client
            .post(self.url(CHAT_PATH))
            .json(&request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<bool, BackendError> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .timeout(self.health_timeout)
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use crate::coordinator::{ChatOutcome, Controller};
    use std::sync::Arc;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn json_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    /// Read headers, then as much body as Content-Length announces
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if raw.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&raw).to_string()
    }

    /// Serve exactly one request with a canned response and hand back the raw request text
    async fn one_shot_server(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = json_response(status_line, body);

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{}", addr), handle)
    }

    /// Answer the first `answered` connections with `body`, then accept every
    /// later connection and never reply
    async fn stalling_server(answered: usize, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = json_response("200 OK", body);

        tokio::spawn(async move {
            let mut held = Vec::new();
            let mut served = 0;
            while let Ok((mut socket, _)) = listener.accept().await {
                if served < answered {
                    served += 1;
                    read_request(&mut socket).await;
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                } else {
                    held.push(socket);
                }
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_first_upload_omits_session_id() {
        let (url, server) = one_shot_server("200 OK", r#"{"success":true,"session_id":"s1"}"#).await;
        let backend = HttpBackend::new(&url, Duration::from_secs(5)).unwrap();

        let resp = backend
            .upload(FileCandidate::pdf("a.pdf", b"%PDF-1.4".to_vec()), None)
            .await
            .unwrap();
        assert_eq!(resp.session_id, "s1");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/upload HTTP/1.1"));
        assert!(request.contains("name=\"file\"; filename=\"a.pdf\""));
        assert!(request.contains("Content-Type: application/pdf"));
        assert!(request.contains("%PDF-1.4"));
    }

    #[tokio::test]
    async fn test_later_upload_carries_session_id() {
        let (url, server) = one_shot_server("200 OK", r#"{"session_id":"s1"}"#).await;
        let backend = HttpBackend::new(&url, Duration::from_secs(5)).unwrap();

        backend
            .upload(FileCandidate::pdf("b.pdf", b"%PDF".to_vec()), Some("s1".to_string()))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/upload?session_id=s1 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_upload_error_detail_is_kept() {
        let (url, _server) = one_shot_server("500 Internal Server Error", r#"{"detail":"corrupt file"}"#).await;
        let backend = HttpBackend::new(&url, Duration::from_secs(5)).unwrap();

        let err = backend
            .upload(FileCandidate::pdf("b.pdf", b"%PDF".to_vec()), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Status {
                status: 500,
                detail: Some("corrupt file".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_chat_error_without_json_body() {
        let (url, _server) = one_shot_server("502 Bad Gateway", "<html>bad gateway</html>").await;
        let backend = HttpBackend::new(&url, Duration::from_secs(5)).unwrap();

        let err = backend
            .chat(ChatRequest {
                query: "q".into(),
                session_id: "s1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(crate::backend::Operation::Chat), "Chat failed (502)");
    }

    #[tokio::test]
    async fn test_chat_sends_query_and_session() {
        let (url, server) = one_shot_server("200 OK", r#"{"answer":"$42","sources":[{"page":1}]}"#).await;
        let backend = HttpBackend::new(&url, Duration::from_secs(5)).unwrap();

        let resp = backend
            .chat(ChatRequest {
                query: "What is the total?".into(),
                session_id: "s1".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.answer, "$42");
        assert_eq!(resp.sources.len(), 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/chat HTTP/1.1"));
        assert!(request.contains(r#""query":"What is the total?""#));
        assert!(request.contains(r#""session_id":"s1""#));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let (url, _server) = one_shot_server("200 OK", r#"{"unexpected":true}"#).await;
        let backend = HttpBackend::new(&url, Duration::from_secs(5)).unwrap();

        let err = backend
            .upload(FileCandidate::pdf("a.pdf", b"%PDF".to_vec()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = backend
            .chat(ChatRequest {
                query: "q".into(),
                session_id: "s1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
        assert!(!backend.health().await.is_ok_and(|up| up));
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        let url = stalling_server(0, "").await;
        let backend = HttpBackend::new(&url, Duration::from_millis(200)).unwrap();

        let err = backend
            .chat(ChatRequest {
                query: "q".into(),
                session_id: "s1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::Timeout);
    }

    #[tokio::test]
    async fn test_timeouts_release_busy_and_upload_state() {
        let url = stalling_server(1, r#"{"session_id":"s1"}"#).await;
        let backend = HttpBackend::new(&url, Duration::from_millis(200)).unwrap();
        let controller = Controller::new(Arc::new(backend));

        let first = controller
            .upload_batch(vec![FileCandidate::pdf("a.pdf", vec![1u8; 16])])
            .await;
        assert_eq!(first.succeeded, 1);

        let second = controller
            .upload_batch(vec![FileCandidate::pdf("b.pdf", vec![1u8; 16])])
            .await;
        assert_eq!(second.failed, 1);
        let state = controller.snapshot();
        assert!(!state.is_uploading());
        assert_eq!(state.last_error(), Some("Upload timed out"));
        assert_eq!(state.documents().len(), 1);

        let outcome = controller.send_query("What is the total?").await;
        assert_eq!(
            outcome,
            ChatOutcome::Failed {
                reason: "Chat timed out".to_string()
            }
        );
        let state = controller.snapshot();
        assert!(!state.is_busy());
        assert!(state.can_send("try again"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8000");
        assert_eq!(backend.url(UPLOAD_PATH), "http://localhost:8000/api/upload");
    }
}
