//! Output boundary: a write-only key → content store keyed by filename.

use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::errors::SessionError;

/// Destination for finalized artifacts.
pub trait ArtifactSink {
    /// Write `content` under `filename`, returning where it landed.
    fn write(&mut self, filename: &str, content: &str) -> Result<PathBuf, SessionError>;
}

/// Writes artifacts as plain-text files into one directory.
///
/// The directory is created on first write if absent.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, filename: &str, content: &str) -> Result<PathBuf, SessionError> {
        fs::create_dir_all(&self.dir).map_err(|source| SessionError::OutputWrite {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(filename);
        fs::write(&path, content).map_err(|source| SessionError::OutputWrite {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "Artifact written");
        Ok(path)
    }
}
