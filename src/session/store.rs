use tracing::{info, warn};

/// Holds the backend-issued session id.
///
/// Absent until the first successful upload. Later uploads hand back the same id,
/// so adoption is idempotent; the store never clears itself.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    id: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_established(&self) -> bool {
        self.id.is_some()
    }

    /// Adopt the id returned by a successful upload
    pub fn adopt(&mut self, id: impl Into<String>) {
        let id = id.into();
        match &self.id {
            None => {
                info!(session = %id, "session established");
                self.id = Some(id);
            }
            Some(current) if *current == id => {}
            Some(current) => {
                // The backend is expected to echo the id we sent; follow it if it did not
                warn!(previous = %current, session = %id, "backend switched session id");
                self.id = Some(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_absent() {
        let store = SessionStore::new();
        assert!(!store.is_established());
        assert_eq!(store.id(), None);
    }

    #[test]
    fn test_adopt_is_idempotent() {
        let mut store = SessionStore::new();
        store.adopt("s1");
        store.adopt("s1");
        assert_eq!(store.id(), Some("s1"));
        assert!(store.is_established());
    }

    #[test]
    fn test_adopt_follows_a_changed_id() {
        let mut store = SessionStore::new();
        store.adopt("s1");
        store.adopt("s2");
        assert_eq!(store.id(), Some("s2"));
        assert!(store.is_established());
    }
}
