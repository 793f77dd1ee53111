use serde::Serialize;
use std::fmt;

/// Unique handle for a document in the registry.
///
/// Allocated from a per-registry counter, so two files with the same name and size
/// selected together still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Inserted optimistically, upload still in flight
    Uploading,
    /// Upload confirmed by the backend
    Attached,
}

/// A document shown as attached to the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub size_label: String,
    pub status: DocumentStatus,
}

/// Format a byte count the way the document bar shows it, e.g. "12.50 KB"
pub fn size_label(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Ordered set of documents attached to the session.
///
/// Writes are two-phase: `insert_tentative` followed by exactly one of `commit`
/// or `rollback`, both keyed by the id returned from the insert.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
    next_id: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document in the `Uploading` state and return its id
    pub fn insert_tentative(&mut self, name: impl Into<String>, size: u64) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        self.documents.push(Document {
            id,
            name: name.into(),
            size_label: size_label(size),
            status: DocumentStatus::Uploading,
        });
        id
    }

    /// Keep a tentatively inserted document. Returns false if the id is unknown.
    pub fn commit(&mut self, id: DocumentId) -> bool {
        match self.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.status = DocumentStatus::Attached;
                true
            }
            None => false,
        }
    }

    /// Remove a tentatively inserted document. Returns the removed entry.
    pub fn rollback(&mut self, id: DocumentId) -> Option<Document> {
        let pos = self.documents.iter().position(|d| d.id == id)?;
        Some(self.documents.remove(pos))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Documents whose upload has been confirmed
    pub fn attached(&self) -> impl Iterator<Item = &Document> {
        self.documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Attached)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
