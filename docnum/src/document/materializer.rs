//! Materializer boundary
//!
//! A materializer turns an allocated identifier into a saved artifact
//! (template filled, written under a new name). Everything it reports as
//! an error is fatal for the current run only.

use std::fs;
use std::path::{Path, PathBuf};

use shared::DocumentIdentifier;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Template file not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Template is not a usable document: {0}")]
    InvalidTemplate(String),

    #[error("Placeholder '{0}' not found in template")]
    PlaceholderMissing(String),

    #[error("Placeholder '{0}' spans more than one paragraph")]
    UnsupportedPlaceholder(String),

    #[error("Artifact was not saved: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Fills a template with an identifier and saves the result
pub trait Materializer {
    /// Returns the path of the saved artifact
    fn materialize(&mut self, identifier: &DocumentIdentifier) -> MaterializeResult<PathBuf>;
}

/// Confirm an artifact exists and is non-empty; returns its size
pub fn verify_artifact(path: &Path) -> MaterializeResult<u64> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        _ => Err(MaterializeError::ArtifactMissing(path.to_path_buf())),
    }
}
