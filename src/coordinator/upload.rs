use serde::Serialize;
use tracing::{debug, info, warn};

use super::controller::Controller;
use crate::backend::{BackendError, FileCandidate, Operation};
use crate::constants::READY_TO_CHAT_SUFFIX;
use crate::session::DocumentId;

/// Counters for one upload batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// PDFs submitted (non-PDF candidates are not counted)
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Session id after the batch
    pub session_id: Option<String>,
}

impl UploadSummary {
    /// The batch line appended after at least one success
    fn summary_line(&self) -> Option<String> {
        if self.succeeded == 0 {
            return None;
        }
        let tail = if self.failed > 0 {
            format!("{} failed.", self.failed)
        } else {
            READY_TO_CHAT_SUFFIX.to_string()
        };
        Some(format!("{} PDF(s) uploaded successfully. {}", self.succeeded, tail))
    }
}

/// Marks an upload batch as running for as long as it is alive
struct BatchGuard<'a> {
    controller: &'a Controller,
}

impl<'a> BatchGuard<'a> {
    fn enter(controller: &'a Controller) -> Self {
        controller.update(|s| {
            s.uploads_in_flight += 1;
            s.last_error = None;
        });
        Self { controller }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.controller
            .update(|s| s.uploads_in_flight = s.uploads_in_flight.saturating_sub(1));
    }
}

/// A registry entry still waiting for its upload. Dropped unsettled, it is
/// rolled back so no entry outlives a cancelled batch as `Uploading`.
struct TentativeDoc<'a> {
    controller: &'a Controller,
    id: DocumentId,
    settled: bool,
}

impl<'a> TentativeDoc<'a> {
    fn new(controller: &'a Controller, id: DocumentId) -> Self {
        Self {
            controller,
            id,
            settled: false,
        }
    }

    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for TentativeDoc<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let id = self.id;
            debug!(doc = %id, "rolling back unfinished upload");
            self.controller.update(|s| s.documents.rollback(id));
        }
    }
}

impl Controller {
    /// Upload a batch of picked files.
    ///
    /// Only candidates declared as PDF are submitted, one at a time and in order.
    /// A failed file is reported, rolled back from the registry and skipped; it
    /// never stops the rest of the batch.
    pub async fn upload_batch(&self, batch: Vec<FileCandidate>) -> UploadSummary {
        let pdfs: Vec<FileCandidate> = batch.into_iter().filter(|f| f.is_pdf()).collect();
        if pdfs.is_empty() {
            debug!("no PDF in selection, nothing to upload");
            return UploadSummary {
                session_id: self.read(|s| s.session_id().map(str::to_owned)),
                ..UploadSummary::default()
            };
        }

        let _batch = BatchGuard::enter(self);
        let mut summary = UploadSummary {
            attempted: pdfs.len(),
            ..UploadSummary::default()
        };

        for file in pdfs {
            let name = file.name.clone();

            // Optimistic insert and progress line, then read the session to attach to
            let (doc_id, session_id) = self.update(|s| {
                let id = s.documents.insert_tentative(&file.name, file.size());
                s.log.system(format!("Uploading PDF: {}...", file.name));
                (id, s.session.id().map(str::to_owned))
            });
            let tentative = TentativeDoc::new(self, doc_id);

            let result = match self.backend.upload(file, session_id).await {
                Ok(resp) if resp.session_id.is_empty() => Err(BackendError::Decode(
                    "response carried an empty session_id".to_string(),
                )),
                other => other,
            };

            match result {
                Ok(resp) => {
                    info!(file = %name, session = %resp.session_id, "upload succeeded");
                    self.update(|s| {
                        s.session.adopt(resp.session_id);
                        s.documents.commit(doc_id);
                        s.log.system(format!("✓ {} uploaded successfully", name));
                    });
                    tentative.settle();
                    summary.succeeded += 1;
                }
                Err(err) => {
                    let reason = err.reason(Operation::Upload);
                    warn!(file = %name, status = ?err.status(), error = %err, "upload failed");
                    self.update(|s| {
                        s.last_error = Some(reason.clone());
                        s.log.system(format!("Upload error for {}: {}", name, reason));
                        s.documents.rollback(doc_id);
                    });
                    tentative.settle();
                    summary.failed += 1;
                }
            }
        }

        let line = summary.summary_line();
        summary.session_id = self.update(|s| {
            if let Some(line) = line {
                s.log.system(line);
            }
            s.session_id().map(str::to_owned)
        });

        summary
    }
}
