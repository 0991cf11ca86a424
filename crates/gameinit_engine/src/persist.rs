use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("destination directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Whether the install marker exists, i.e. assets are already in place.
pub fn marker_present(path: &Path) -> bool {
    let present = path.exists();
    engine_debug!("marker {:?} present={}", path, present);
    present
}

/// Ensure the directory a file will land in exists; create if missing.
pub fn ensure_parent_dir(file: &Path) -> Result<PathBuf, PersistError> {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.exists() {
        let meta = fs::metadata(&dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(&dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(dir)
}

/// A download being written to a temp file beside its destination.
///
/// Dropping it removes the temp file, so an abandoned transfer never leaves a
/// partial file at the destination. [`PartialDownload::commit`] renames it
/// into place.
pub struct PartialDownload {
    tmp: NamedTempFile,
    hasher: Sha256,
    written: u64,
}

/// Summary of a committed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedFile {
    pub path: PathBuf,
    pub byte_len: u64,
    pub sha256: String,
}

impl PartialDownload {
    pub fn create(destination: &Path) -> Result<Self, PersistError> {
        let dir = ensure_parent_dir(destination)?;
        let tmp = NamedTempFile::new_in(&dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        Ok(Self {
            tmp,
            hasher: Sha256::new(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        self.hasher.update(chunk);
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Hex digest of everything written so far.
    pub fn sha256_hex(&self) -> String {
        format!("{:x}", self.hasher.clone().finalize())
    }

    pub fn commit(mut self, destination: &Path) -> Result<CommittedFile, PersistError> {
        self.tmp.flush()?;
        self.tmp.as_file_mut().sync_all()?;
        let sha256 = self.sha256_hex();

        // Rename over any older copy; it stays in place if this fails.
        self.tmp
            .persist(destination)
            .map_err(|e| PersistError::Io(e.error))?;
        engine_debug!("committed {} bytes to {:?}", self.written, destination);
        Ok(CommittedFile {
            path: destination.to_path_buf(),
            byte_len: self.written,
            sha256,
        })
    }
}
