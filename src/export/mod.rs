//! Export artifacts and the filesystem exporter
//!
//! Every generator in the crate produces [`ExportedFile`] values: a path
//! relative to an export root plus text or base64 content.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;

pub mod archive;
pub mod filesystem;

/// Placeholder file that keeps an otherwise empty directory in an archive
pub const PLACEHOLDER: &str = ".gitkeep";

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    /// Slash-separated, relative to the export root
    pub path: String,
    /// Text, or base64 when `binary` is set
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub binary: bool,
}

impl ExportedFile {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            binary: false,
        }
    }

    /// Binary file; content is stored base64-encoded
    pub fn binary(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            content: STANDARD.encode(bytes),
            binary: true,
        }
    }

    /// File whose content is already base64 when `binary` is set
    pub fn encoded(path: impl Into<String>, content: impl Into<String>, binary: bool) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            binary,
        }
    }

    /// Empty directory marker at `<dir>/.gitkeep`
    pub fn placeholder(dir: &str) -> Self {
        Self::text(format!("{}/{}", dir.trim_end_matches('/'), PLACEHOLDER), "")
    }

    /// Raw bytes, decoding base64 for binary files
    pub fn bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        if self.binary {
            STANDARD
                .decode(self.content.trim())
                .map_err(|source| ArchiveError::InvalidBase64 {
                    path: self.path.clone(),
                    source,
                })
        } else {
            Ok(self.content.as_bytes().to_vec())
        }
    }

    /// Prefix the path with a directory
    pub fn nested_under(mut self, dir: &str) -> Self {
        self.path = format!("{}/{}", dir.trim_end_matches('/'), self.path);
        self
    }
}

/// Check that a relative export path cannot escape its root
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path.split('/').all(|part| !part.is_empty() && part != "." && part != "..")
}
