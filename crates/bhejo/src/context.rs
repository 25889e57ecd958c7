//! The application context.
//!
//! [`AppContext`] owns every piece of mutable state the reload loop touches:
//! the UI runtime, the watch set, the loader, the current view instance and
//! the shared data backend. It is passed explicitly to the orchestrator; no
//! global state exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::view::{UiRuntime, ViewInstance, ViewLoader};
use crate::watch::{WatchBackend, WatchSet};

/// Single owner of the application's mutable state.
#[derive(Debug)]
pub struct AppContext<R, B> {
    runtime: R,
    watch_set: WatchSet<B>,
    loader: ViewLoader,
    entry: PathBuf,
    current: Option<ViewInstance>,
    backend: Arc<Backend>,
}

impl<R: UiRuntime, B: WatchBackend> AppContext<R, B> {
    /// Create a context with no view loaded yet.
    pub fn new(
        runtime: R,
        watch_set: WatchSet<B>,
        entry: impl Into<PathBuf>,
        backend: Arc<Backend>,
    ) -> Self {
        Self {
            runtime,
            watch_set,
            loader: ViewLoader::new(),
            entry: entry.into(),
            current: None,
            backend,
        }
    }

    /// Path of the entry view description.
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// The view instance on screen, if any.
    pub const fn current(&self) -> Option<&ViewInstance> {
        self.current.as_ref()
    }

    /// Take the current instance, leaving none.
    pub const fn take_current(&mut self) -> Option<ViewInstance> {
        self.current.take()
    }

    /// Replace the current instance.
    pub fn set_current(&mut self, instance: ViewInstance) {
        self.current = Some(instance);
    }

    /// The UI runtime.
    pub const fn runtime(&self) -> &R {
        &self.runtime
    }

    /// The UI runtime, mutably.
    pub const fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// The watch set.
    pub const fn watch_set(&self) -> &WatchSet<B> {
        &self.watch_set
    }

    /// The watch set, mutably.
    pub const fn watch_set_mut(&mut self) -> &mut WatchSet<B> {
        &mut self.watch_set
    }

    /// Split borrow of the loader, runtime and entry for a load.
    pub(crate) fn load_parts(&mut self) -> (&mut ViewLoader, &mut R, &Path) {
        (&mut self.loader, &mut self.runtime, &self.entry)
    }

    /// The data backend shared with the view layer.
    pub const fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// Whether the current window is visible. No window counts as hidden.
    pub fn is_visible(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| c.is_visible(&self.runtime))
    }

    /// Show and focus the current window.
    pub fn show_current(&mut self) {
        let Some(current) = &self.current else {
            debug!("no window to show");
            return;
        };
        let handle = current.handle();
        if let Err(e) = self.runtime.show(handle) {
            warn!(error = %e, %handle, "failed to show window");
        }
        if let Err(e) = self.runtime.request_activate(handle) {
            warn!(error = %e, %handle, "failed to activate window");
        }
    }

    /// Hide the current window if visible, otherwise show and focus it.
    pub fn toggle_current(&mut self) {
        if self.is_visible() {
            if let Some(current) = &self.current
                && let Err(e) = self.runtime.hide(current.handle())
            {
                warn!(error = %e, handle = %current.handle(), "failed to hide window");
            }
        } else {
            self.show_current();
        }
    }

    /// Close and dispose the current window and drop every watch.
    pub fn shutdown(&mut self) {
        if let Some(current) = self.current.take() {
            let handle = current.handle();
            if let Err(e) = self.runtime.close(handle) {
                warn!(error = %e, %handle, "failed to close window");
            }
            if let Err(e) = self.runtime.dispose(handle) {
                warn!(error = %e, %handle, "failed to dispose window");
            }
        }
        self.watch_set.clear();
        debug!("context shut down");
    }
}
