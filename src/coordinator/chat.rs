use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::controller::Controller;
use crate::app::AppState;
use crate::backend::{ChatRequest, Operation};
use crate::constants::NO_SESSION_MESSAGE;

/// How a chat submission ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChatOutcome {
    /// Blank query, nothing happened
    Ignored,
    /// No session yet; the user was asked to upload first
    NoSession,
    /// Another chat request is still in flight
    Busy,
    Answered {
        answer: String,
        sources: Vec<serde_json::Value>,
    },
    Failed {
        reason: String,
    },
}

impl ChatOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, ChatOutcome::Answered { .. })
    }
}

/// Holds the busy flag; releasing it is tied to drop so every exit path clears it
struct BusyGuard {
    state: Arc<RwLock<AppState>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.write().busy = false;
    }
}

/// A chat that passed validation: the question is already in the log and the
/// busy flag is held until this value is completed or dropped.
pub struct PendingChat {
    controller: Controller,
    request: ChatRequest,
    guard: BusyGuard,
}

impl PendingChat {
    pub fn query(&self) -> &str {
        &self.request.query
    }

    /// Send the question and log the answer or the error
    pub async fn complete(self) -> ChatOutcome {
        let PendingChat {
            controller,
            request,
            guard,
        } = self;

        let result = controller.backend.chat(request).await;

        let outcome = controller.update(|s| match result {
            Ok(resp) => {
                info!(sources = resp.sources.len(), "answer received");
                s.log.assistant(resp.answer.clone());
                ChatOutcome::Answered {
                    answer: resp.answer,
                    sources: resp.sources,
                }
            }
            Err(err) => {
                let reason = err.reason(Operation::Chat);
                warn!(error = %err, "chat failed");
                s.last_error = Some(reason.clone());
                s.log.system(format!("Error: {}", reason));
                ChatOutcome::Failed { reason }
            }
        });

        drop(guard);
        outcome
    }
}

impl Controller {
    /// Validate a query and, if it may be sent, log it and take the busy flag.
    ///
    /// Runs synchronously so the question shows up in the log before any network
    /// latency. Rejections are returned as the final `ChatOutcome`.
    pub fn begin_chat(&self, query: &str) -> Result<PendingChat, ChatOutcome> {
        if query.trim().is_empty() {
            return Err(ChatOutcome::Ignored);
        }

        let mut state = self.state.write();

        let Some(session_id) = state.session.id().map(str::to_owned) else {
            debug!("chat rejected, no session");
            state.log.system(NO_SESSION_MESSAGE);
            return Err(ChatOutcome::NoSession);
        };

        if state.busy {
            debug!("chat rejected, request already in flight");
            return Err(ChatOutcome::Busy);
        }

        state.log.user(query);
        state.busy = true;
        state.last_error = None;
        drop(state);

        Ok(PendingChat {
            controller: self.clone(),
            request: ChatRequest {
                query: query.to_string(),
                session_id,
            },
            guard: BusyGuard {
                state: Arc::clone(&self.state),
            },
        })
    }

    /// Validate, send and log one question
    pub async fn send_query(&self, query: &str) -> ChatOutcome {
        match self.begin_chat(query) {
            Ok(pending) => pending.complete().await,
            Err(outcome) => outcome,
        }
    }
}
