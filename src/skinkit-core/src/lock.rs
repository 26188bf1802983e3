//! Advisory cross-process mutex backed by a marker file.
//!
//! The marker's existence is the whole protocol: whoever creates it holds
//! the lock, and deleting it releases the lock. There is no owner token, so
//! any process may remove any marker, and a crashed holder leaves a stale
//! marker behind until something clears it.

use crate::abort::{AbortSignal, Deadline};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MARKER_CONTENTS: &[u8] = b"locked";

#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to create lock marker {path}: {source}")]
    Create { path: PathBuf, source: io::Error },
    #[error("failed to remove lock marker {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// How long to keep polling an existing marker before giving up.
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// How an acquisition attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Acquired,
    TimedOut,
    Aborted,
}

/// Scoped lock guard. Dropping a held guard deletes the marker.
///
/// Acquisition can finish without the lock (timeout or abort); check
/// [`FileMutex::is_held`] before touching the protected resource.
#[derive(Debug)]
pub struct FileMutex {
    path: PathBuf,
    outcome: LockOutcome,
    released: bool,
}

impl FileMutex {
    pub fn acquire(
        path: impl Into<PathBuf>,
        options: &LockOptions,
        abort: &dyn AbortSignal,
    ) -> Result<Self, LockError> {
        let path = path.into();
        let deadline = Deadline::after(options.timeout);

        let outcome = loop {
            if create_marker(&path)? {
                tracing::debug!(path = %path.display(), "lock acquired");
                break LockOutcome::Acquired;
            }
            if abort.abort_requested() {
                tracing::debug!(path = %path.display(), "abort requested while waiting for lock");
                break LockOutcome::Aborted;
            }
            if deadline.expired() {
                tracing::warn!(path = %path.display(), "timed out waiting for lock");
                break LockOutcome::TimedOut;
            }
            abort.wait_for_abort(options.poll_interval);
        };

        Ok(Self {
            path,
            outcome,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn outcome(&self) -> LockOutcome {
        self.outcome
    }

    pub fn is_held(&self) -> bool {
        self.outcome == LockOutcome::Acquired && !self.released
    }

    /// Deletes the marker if it is present. Calling it again is a no-op.
    pub fn release(&mut self) -> Result<(), LockError> {
        self.released = true;
        remove_marker(&self.path)
    }
}

impl Drop for FileMutex {
    fn drop(&mut self) {
        if !self.is_held() {
            return;
        }
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to release lock on drop");
        }
    }
}

/// Returns `Ok(false)` when someone else already holds the marker.
fn create_marker(path: &Path) -> Result<bool, LockError> {
    create_marker_with(path, |file| file.write_all(MARKER_CONTENTS))
}

/// A marker whose contents could not be written is removed before the error
/// is returned.
fn create_marker_with<W>(path: &Path, write: W) -> Result<bool, LockError>
where
    W: FnOnce(&mut File) -> io::Result<()>,
{
    let file = OpenOptions::new().write(true).create_new(true).open(path);
    let mut file = match file {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => {
            return Err(LockError::Create {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if let Err(source) = write(&mut file) {
        drop(file);
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial lock marker");
        }
        return Err(LockError::Create {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(true)
}

fn remove_marker(path: &Path) -> Result<(), LockError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LockError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
