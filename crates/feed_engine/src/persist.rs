use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot write next to {path}: {source}")]
    Directory { path: String, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Replaces one file atomically: the new contents go to a temp file in
/// the same directory which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.target
    }

    pub fn write(&self, contents: &str) -> Result<(), PersistError> {
        let dir = self.directory()?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| PersistError::Directory {
            path: dir.display().to_string(),
            source,
        })?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.target).map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }

    /// Current contents, or `None` when the file does not exist yet.
    pub fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.target) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn directory(&self) -> Result<PathBuf, PersistError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| PersistError::Directory {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(dir)
    }
}
