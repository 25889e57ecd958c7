//! Core types for the watch subsystem.
//!
//! - [`WatchError`] - Errors specific to file watching
//! - [`WatchTarget`] - A registered path and whether it is a directory
//! - [`FsChange`] - A classified file system notification
//! - [`ReloadTrigger`] - What caused a view reload

use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Error type for watch operations.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum WatchError {
    /// Failed to initialize the file watcher.
    #[error("failed to initialize file watcher: {message}")]
    #[diagnostic(
        code(bhejo::watch::init_failed),
        help("check that the platform supports file notifications and the inotify limit is not exhausted")
    )]
    InitFailed {
        /// Human-readable error message.
        message: String,
        /// The underlying notify error, if available.
        #[source]
        source: Option<notify::Error>,
    },

    /// Failed to watch a specific path.
    #[error("failed to watch path '{path}': {message}")]
    #[diagnostic(
        code(bhejo::watch::path_error),
        help("ensure the path exists and you have read permissions")
    )]
    PathError {
        /// The path that could not be watched.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

impl WatchError {
    /// Create a new `InitFailed` error.
    pub fn init_failed(message: impl Into<String>, source: Option<notify::Error>) -> Self {
        Self::InitFailed {
            message: message.into(),
            source,
        }
    }

    /// Create a new `PathError`.
    pub fn path_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PathError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Whether a watch target is a directory or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A view root; its matching children are watched as well.
    Directory,
    /// A single view description.
    File,
}

impl TargetKind {
    /// Kind of an existing path on disk.
    #[must_use]
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }
}

/// A registered path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchTarget {
    /// The watched path.
    pub path: PathBuf,
    /// Directory or file.
    pub kind: TargetKind,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The path is now registered with the backend.
    Registered(TargetKind),
    /// The path did not exist; nothing was registered.
    ///
    /// Not an error. The next event on the parent directory retries it.
    Skipped,
    /// The path is not something the set watches (wrong extension, outside
    /// the view root).
    Ignored,
}

/// What happened to a path, reduced from the backend's event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsChangeKind {
    /// Created, or moved into place.
    Created,
    /// Contents or metadata changed.
    Modified,
    /// Deleted, or moved away.
    Removed,
}

/// A single classified file system notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsChange {
    /// The path the event refers to.
    pub path: PathBuf,
    /// What happened.
    pub kind: FsChangeKind,
}

impl FsChange {
    /// Create a new change record.
    pub fn new(path: impl Into<PathBuf>, kind: FsChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// A modification of `path`.
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FsChangeKind::Modified)
    }
}

/// What triggered a view reload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReloadTrigger {
    /// A watched file was modified.
    FileModified(PathBuf),

    /// A file was created (possibly recreated after deletion).
    FileCreated(PathBuf),

    /// A watched file was deleted.
    FileDeleted(PathBuf),

    /// The reload was requested from the tray menu.
    Manual,

    /// Initial load at startup.
    Initial,
}

impl From<FsChange> for ReloadTrigger {
    fn from(change: FsChange) -> Self {
        match change.kind {
            FsChangeKind::Created => Self::FileCreated(change.path),

            FsChangeKind::Modified => Self::FileModified(change.path),

            FsChangeKind::Removed => Self::FileDeleted(change.path),
        }
    }
}

impl fmt::Display for ReloadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileModified(p) => write!(f, "file modified: {}", p.display()),

            Self::FileCreated(p) => write!(f, "file created: {}", p.display()),

            Self::FileDeleted(p) => write!(f, "file deleted: {}", p.display()),

            Self::Manual => write!(f, "manual reload"),

            Self::Initial => write!(f, "initial load"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_error_display() {
        let err = WatchError::init_failed("test error", None);
        assert!(err.to_string().contains("test error"));

        let err = WatchError::path_error("/test/views", "permission denied");
        assert!(err.to_string().contains("/test/views"));
    }

    #[test]
    fn test_reload_trigger_from_change() {
        let trigger = ReloadTrigger::from(FsChange::new("a.view", FsChangeKind::Removed));
        assert_eq!(trigger, ReloadTrigger::FileDeleted(PathBuf::from("a.view")));
        assert!(trigger.to_string().contains("deleted"));

        assert!(ReloadTrigger::Manual.to_string().contains("manual"));
    }
}
