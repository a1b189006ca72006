//! Input resolution: turn a user-supplied file path into an [`Upload`].
//!
//! The declared MIME type is what a browser upload widget would report:
//! taken from the caller's override when given, otherwise guessed from the
//! file extension. The bytes are read fully into memory; nothing is copied
//! elsewhere on disk.

use crate::error::AnalyzerError;
use crate::upload::{mime_from_path, Upload};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read a local file into an upload.
///
/// `mime_override` replaces the extension-based guess when the caller knows
/// better (e.g. a scanned receipt saved without an extension).
pub async fn read_upload(path: &Path, mime_override: Option<&str>) -> Result<Upload, AnalyzerError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => AnalyzerError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => AnalyzerError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => AnalyzerError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mime_type = mime_override
        .map(str::to_string)
        .unwrap_or_else(|| mime_from_path(path).to_string());

    debug!("Read upload '{}' ({}, {} bytes)", filename, mime_type, bytes.len());
    Ok(Upload::new(filename, mime_type, bytes))
}
