//! Error types for the export pipeline
//!
//! Only configuration problems and archive I/O are errors. Compatibility
//! issues, unknown adapter ids and per-skill packaging failures inside a
//! filesystem export are reported as warnings instead.

use thiserror::Error;

/// Failure to package a single skill
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("skill '{skill}' has no portability slug and slug generation is disabled")]
    MissingSlug { skill: String },

    #[error("skill '{skill}' has invalid slug '{slug}' (expected lowercase letters, digits and single hyphens)")]
    InvalidSlug { skill: String, slug: String },
}

/// Failure to build, read or write an export archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsafe path in export: {0}")]
    UnsafePath(String),

    #[error("file '{path}' is flagged binary but is not valid base64: {source}")]
    InvalidBase64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
