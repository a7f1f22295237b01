//! Output directory handling
//!
//! Writes are whole-file overwrites. Nothing is transactional: on failure the
//! caller decides whether to [`OutputDir::discard`] what was written.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

/// Directory receiving the artifacts of one invocation
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    created: bool,
    written: Vec<PathBuf>,
}

impl OutputDir {
    /// Creates the directory (and parents) if it does not exist yet
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the directory cannot be created
    pub fn prepare(path: &Path) -> Result<Self> {
        let created = !path.exists();
        if created {
            fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            created,
            written: Vec::new(),
        })
    }

    /// Whether [`OutputDir::prepare`] created the directory
    #[must_use]
    pub fn created(&self) -> bool {
        self.created
    }

    /// Writes `contents` to `name` inside the directory, replacing any existing file
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be written
    pub fn write(&mut self, name: &str, contents: &str) -> Result<PathBuf> {
        let target = self.path.join(name);
        fs::write(&target, contents).map_err(|e| Error::io(&target, e))?;
        info!(path = %target.display(), "wrote artifact");
        self.written.push(target.clone());
        Ok(target)
    }

    /// Paths written so far, in write order
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    #[must_use]
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }

    /// Removes the directory if this invocation created it
    ///
    /// A directory that existed beforehand is left alone, including files
    /// already written into it.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if removal fails
    pub fn discard(self) -> Result<()> {
        if self.created {
            fs::remove_dir_all(&self.path).map_err(|e| Error::io(&self.path, e))?;
        }
        Ok(())
    }
}
