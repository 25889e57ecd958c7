//! The set of watched view paths.
//!
//! [`WatchSet`] owns every [`WatchTarget`] and keeps the registrations alive
//! across the quirks of OS watch facilities: a path may be dropped after it
//! fires, and editors often replace a file by deleting and recreating it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::types::{TargetKind, WatchError, WatchOutcome, WatchTarget};

/// The OS notification facility behind a [`WatchSet`].
///
/// Implementations must tolerate `watch` being called again for a path that
/// is already watched.
pub trait WatchBackend {
    /// Start (or restart) watching `path` non-recursively.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathError`] if the facility refuses the path.
    fn watch(&mut self, path: &Path) -> Result<(), WatchError>;

    /// Stop watching `path`. Unknown paths are ignored.
    fn unwatch(&mut self, path: &Path);
}

/// Self-healing set of watched paths.
///
/// Roots added with [`WatchSet::add_watch`] are remembered permanently. A
/// file target that vanishes is dropped from the registered set, but the next
/// event inside its root rescans the directory and registers it again. A
/// vanished root is only picked up again by [`WatchSet::refresh_roots`].
#[derive(Debug)]
pub struct WatchSet<B> {
    backend: B,
    extension: String,
    roots: BTreeSet<PathBuf>,
    registered: BTreeMap<PathBuf, TargetKind>,
}

impl<B: WatchBackend> WatchSet<B> {
    /// Create an empty set watching files with the given extension.
    ///
    /// The extension is given without the leading dot (`"view"`).
    pub fn new(backend: B, extension: impl Into<String>) -> Self {
        Self {
            backend,
            extension: extension.into(),
            roots: BTreeSet::new(),
            registered: BTreeMap::new(),
        }
    }

    /// Register `path`, and every matching file inside it if it is a
    /// directory.
    ///
    /// A missing path is not an error and yields [`WatchOutcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathError`] if the backend refuses the path or
    /// the directory cannot be listed.
    pub fn add_watch(&mut self, path: impl AsRef<Path>) -> Result<WatchOutcome, WatchError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "watch registration skipped, path does not exist");
            return Ok(WatchOutcome::Skipped);
        }

        let outcome = self.ensure_watched(path)?;
        if outcome == WatchOutcome::Registered(TargetKind::Directory) {
            self.roots.insert(path.to_path_buf());
            let found = self.rescan(path)?;
            debug!(path = %path.display(), files = found, "watching view root");
        }

        Ok(outcome)
    }

    /// Idempotently (re)register `path` with the backend.
    ///
    /// Call this from any event handler. If the path has vanished it is
    /// dropped from the registered set and [`WatchOutcome::Skipped`] is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathError`] if the backend refuses the path.
    pub fn ensure_watched(&mut self, path: &Path) -> Result<WatchOutcome, WatchError> {
        if !path.exists() {
            if self.registered.remove(path).is_some() {
                self.backend.unwatch(path);
                debug!(path = %path.display(), "watched path vanished");
            }
            return Ok(WatchOutcome::Skipped);
        }

        let kind = TargetKind::of(path);
        self.backend.watch(path)?;
        if self.registered.insert(path.to_path_buf(), kind).is_none() {
            debug!(path = %path.display(), ?kind, "watching");
        }

        Ok(WatchOutcome::Registered(kind))
    }

    /// Repair the watch set after the backend reported a change on `path`.
    ///
    /// The path itself is re-registered if it is one of ours, and its root
    /// directory is re-registered and rescanned so recreated or new view
    /// files are picked up.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathError`] if the backend refuses a path.
    pub fn on_fs_event(&mut self, path: &Path) -> Result<WatchOutcome, WatchError> {
        if self.roots.contains(path) {
            let outcome = self.ensure_watched(path)?;
            if outcome != WatchOutcome::Skipped {
                self.rescan(path)?;
            }
            return Ok(outcome);
        }

        let outcome = if self.wants(path) {
            self.ensure_watched(path)?
        } else {
            trace!(path = %path.display(), "event on unwatched path");
            WatchOutcome::Ignored
        };

        if let Some(parent) = path.parent()
            && self.roots.contains(parent)
            && self.ensure_watched(parent)? != WatchOutcome::Skipped
        {
            self.rescan(parent)?;
        }

        Ok(outcome)
    }

    /// Re-register every root and rescan it.
    ///
    /// A root directory that was removed and recreated produces no event the
    /// old registration can see, so this is the way back to a live watch.
    /// Returns the number of roots that are registered afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathError`] if the backend refuses a path.
    pub fn refresh_roots(&mut self) -> Result<usize, WatchError> {
        let roots: Vec<PathBuf> = self.roots.iter().cloned().collect();
        let mut live = 0;
        for root in roots {
            if self.ensure_watched(&root)? != WatchOutcome::Skipped {
                let found = self.rescan(&root)?;
                trace!(path = %root.display(), files = found, "refreshed view root");
                live += 1;
            }
        }
        Ok(live)
    }

    /// Returns `true` if a change on `path` concerns the view layer.
    ///
    /// That is any registered path, any root, or anything directly inside a
    /// root, whatever its extension.
    #[must_use]
    pub fn is_relevant(&self, path: &Path) -> bool {
        self.registered.contains_key(path)
            || self.roots.contains(path)
            || path.parent().is_some_and(|p| self.roots.contains(p))
    }

    /// Returns `true` if `path` is currently registered.
    #[must_use]
    pub fn is_watched(&self, path: &Path) -> bool {
        self.registered.contains_key(path)
    }

    /// Snapshot of every registered target, in path order.
    #[must_use]
    pub fn targets(&self) -> Vec<WatchTarget> {
        self.registered
            .iter()
            .map(|(path, kind)| WatchTarget {
                path: path.clone(),
                kind: *kind,
            })
            .collect()
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// The backend, for inspection.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Unregister everything.
    pub fn clear(&mut self) {
        for path in std::mem::take(&mut self.registered).into_keys() {
            self.backend.unwatch(&path);
        }
        self.roots.clear();
    }

    fn wants(&self, path: &Path) -> bool {
        self.registered.contains_key(path)
            || (self.has_extension(path) && path.parent().is_some_and(|p| self.roots.contains(p)))
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }

    /// Register every matching file directly inside `dir`.
    fn rescan(&mut self, dir: &Path) -> Result<usize, WatchError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(WatchError::path_error(dir, e.to_string())),
        };

        let mut found = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file()
                && self.has_extension(&path)
                && self.ensure_watched(&path)? != WatchOutcome::Skipped
            {
                found += 1;
            }
        }

        Ok(found)
    }
}
