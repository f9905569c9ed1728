//! Whole-file replacement for manifests and tag files.
//!
//! A bag file is never edited in place. The new contents are written to a
//! sibling `<name>.lock`, synced, and renamed over the original, so a
//! concurrent reader sees either the old file or the new one. The lock file
//! is created exclusively, which also keeps two writers from racing on the
//! same manifest.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::LockError;
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// Exclusive claim on a bag file, released by [`replace`](LockFile::replace)
/// or by dropping it.
#[derive(Debug)]
pub struct LockFile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
}

impl LockFile {
    /// Create `<target>.lock`, failing with `AlreadyLocked` if it exists.
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let mut name = target.clone().into_os_string();
        name.push(LOCK_SUFFIX);
        let lock_path = PathBuf::from(name);

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::AlreadyLocked { path: lock_path }.into())
            }
            Err(source) => {
                return Err(LockError::Create {
                    path: lock_path,
                    source,
                }
                .into())
            }
        };

        Ok(Self {
            target,
            lock_path,
            file: Some(file),
        })
    }

    /// Write `contents`, sync, and move the lock file over the target.
    pub fn replace(mut self, contents: &[u8]) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        let committed = file
            .write_all(contents)
            .and_then(|()| file.sync_all())
            .and_then(|()| {
                drop(file);
                fs::rename(&self.lock_path, &self.target)
            });
        committed.map_err(|source| {
            let _ = fs::remove_file(&self.lock_path);
            LockError::Commit {
                path: self.lock_path.clone(),
                source,
            }
            .into()
        })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

/// Replace the file at `path` with `contents` through a [`LockFile`].
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    LockFile::acquire(path)?.replace(contents)
}
