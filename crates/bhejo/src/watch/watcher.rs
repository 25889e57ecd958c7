//! `notify`-backed watch facility.
//!
//! [`NotifyBackend`] owns the platform watcher. Its callback runs on the
//! notify thread and only classifies events and forwards them into the
//! application's event channel; all bookkeeping happens on the loop thread.

use std::path::Path;

use crossbeam_channel::Sender;
use notify::event::{AccessKind, AccessMode, MetadataKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace};

use super::set::WatchBackend;
use super::types::{FsChange, FsChangeKind, WatchError};
use crate::event::AppEvent;

/// Watch facility backed by the platform's native notifier.
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
}

impl NotifyBackend {
    /// Create a watcher that sends classified changes into `events`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InitFailed`] if the platform watcher cannot be
    /// created.
    pub fn new(events: Sender<AppEvent>) -> Result<Self, WatchError> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let Some(kind) = classify(&event.kind) else {
                    trace!(kind = ?event.kind, "ignoring event");
                    return;
                };
                for path in event.paths {
                    // The receiver only goes away during shutdown.
                    let _ = events.send(AppEvent::Fs(FsChange::new(path, kind)));
                }
            }
            Err(e) => debug!(error = %e, "watch error"),
        })
        .map_err(|e| {
            WatchError::init_failed(format!("failed to create file watcher: {e}"), Some(e))
        })?;

        Ok(Self { watcher })
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, path: &Path) -> Result<(), WatchError> {
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::path_error(path, format!("failed to watch: {e}")))
    }

    fn unwatch(&mut self, path: &Path) {
        if let Err(e) = self.watcher.unwatch(path) {
            trace!(path = %path.display(), error = %e, "unwatch failed");
        }
    }
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend").finish_non_exhaustive()
    }
}

/// Reduce a notify event kind to the change it represents.
///
/// Reads and opens return `None`: loading a view reads the very files being
/// watched and must not retrigger a reload.
#[must_use]
pub const fn classify(kind: &EventKind) -> Option<FsChangeKind> {
    match kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            Some(FsChangeKind::Created)
        }

        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            Some(FsChangeKind::Removed)
        }

        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => None,

        EventKind::Modify(_)
        | EventKind::Access(AccessKind::Close(AccessMode::Write))
        | EventKind::Any => Some(FsChangeKind::Modified),

        EventKind::Access(_) | EventKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};

    #[test]
    fn test_classify_triggering_kinds() {
        assert_eq!(
            classify(&EventKind::Create(CreateKind::File)),
            Some(FsChangeKind::Created)
        );
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(FsChangeKind::Modified)
        );
        assert_eq!(
            classify(&EventKind::Remove(RemoveKind::File)),
            Some(FsChangeKind::Removed)
        );
        assert_eq!(
            classify(&EventKind::Access(AccessKind::Close(AccessMode::Write))),
            Some(FsChangeKind::Modified)
        );
    }

    #[test]
    fn test_classify_renames() {
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            Some(FsChangeKind::Created)
        );
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            Some(FsChangeKind::Removed)
        );
    }

    #[test]
    fn test_classify_ignores_reads() {
        assert_eq!(classify(&EventKind::Access(AccessKind::Open(AccessMode::Any))), None);
        assert_eq!(classify(&EventKind::Access(AccessKind::Close(AccessMode::Read))), None);
        assert_eq!(
            classify(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime))),
            None
        );
        assert_eq!(classify(&EventKind::Other), None);
    }

    #[test]
    fn test_notify_backend_watches_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut backend = NotifyBackend::new(tx).unwrap();

        backend.watch(dir.path()).unwrap();
        backend.unwatch(dir.path());
        // Unknown paths are tolerated.
        backend.unwatch(&dir.path().join("missing.view"));
    }
}
