use parking_lot::RwLock;
use std::sync::Arc;

use crate::app::AppState;
use crate::backend::Backend;

/// Single owner of the application state.
///
/// Cloning is cheap and every clone drives the same state, so a UI can hand a
/// clone to a spawned task and keep drawing from snapshots meanwhile. The lock is
/// only held for synchronous updates, never across a backend call.
#[derive(Clone)]
pub struct Controller {
    pub(super) backend: Arc<dyn Backend>,
    pub(super) state: Arc<RwLock<AppState>>,
}

impl Controller {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(AppState::new())),
        }
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    /// Inspect the state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn backend_endpoint(&self) -> String {
        self.backend.endpoint()
    }

    /// Probe the backend's health endpoint. Never touches the state.
    pub async fn backend_healthy(&self) -> bool {
        self.backend.health().await.unwrap_or(false)
    }

    pub(super) fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        f(&mut self.state.write())
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("backend", &self.backend.endpoint())
            .field("state", &*self.state.read())
            .finish()
    }
}
