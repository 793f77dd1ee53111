use std::path::{Path, PathBuf};
use tracing::warn;

use super::errors::PdfChatError;
use crate::backend::FileCandidate;
use crate::constants::{FALLBACK_MEDIA_TYPE, PDF_MEDIA_TYPE};

/// Media type a file picker would declare for `path`, judged by extension only
pub fn declared_media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
        _ => FALLBACK_MEDIA_TYPE,
    }
}

/// Read one path into a candidate
pub async fn read_candidate(path: &Path) -> Result<FileCandidate, PdfChatError> {
    let invalid = |reason: String| PdfChatError::InvalidFile {
        path: path.display().to_string(),
        reason,
    };

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_file() {
        return Err(invalid("not a regular file".to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| invalid("no file name".to_string()))?;
    let bytes = tokio::fs::read(path).await?;

    Ok(FileCandidate::new(name, declared_media_type(path), bytes))
}

/// Turn picked paths into candidates, in order.
///
/// Paths a picker could not have offered (missing, directories, unreadable) are
/// skipped with a warning. Non-PDF files are kept; the upload filter drops them.
pub async fn select_files(paths: &[PathBuf]) -> Vec<FileCandidate> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        match read_candidate(path).await {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => warn!(error = %e, "skipping selection"),
        }
    }
    candidates
}

/// Split a `:upload` argument list into paths, honouring double quotes
pub fn parse_path_list(input: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }

    paths
}
