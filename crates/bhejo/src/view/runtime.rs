//! UI runtime boundary.
//!
//! The reload loop only needs a handful of window primitives, collected in
//! [`UiRuntime`]. [`HeadlessRuntime`] implements them in memory: windows are
//! plain records, every call is logged and kept in a bounded journal.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use tracing::{debug, info};

use super::description::ViewTree;
use super::error::RuntimeError;

/// Opaque handle to a window owned by a [`UiRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Window primitives the reload loop relies on.
///
/// A freshly loaded window is hidden until [`UiRuntime::show`] is called.
pub trait UiRuntime {
    /// Instantiate a window from a resolved view tree.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Rejected`] if the runtime cannot build it.
    fn load_view(&mut self, tree: &ViewTree) -> Result<WindowHandle, RuntimeError>;

    /// Make the window visible.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownHandle`] for a dead handle.
    fn show(&mut self, handle: WindowHandle) -> Result<(), RuntimeError>;

    /// Hide the window without destroying it.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownHandle`] for a dead handle.
    fn hide(&mut self, handle: WindowHandle) -> Result<(), RuntimeError>;

    /// Close the window. It stays allocated until disposed.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownHandle`] for a dead handle.
    fn close(&mut self, handle: WindowHandle) -> Result<(), RuntimeError>;

    /// Release the window's resources. The handle is dead afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownHandle`] for a dead handle.
    fn dispose(&mut self, handle: WindowHandle) -> Result<(), RuntimeError>;

    /// Whether the window is currently visible.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownHandle`] for a dead handle.
    fn is_visible(&self, handle: WindowHandle) -> Result<bool, RuntimeError>;

    /// Ask for input focus.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownHandle`] for a dead handle.
    fn request_activate(&mut self, handle: WindowHandle) -> Result<(), RuntimeError>;
}

/// One primitive invocation, as recorded by [`HeadlessRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeCall {
    /// `load_view` created this window.
    Load(WindowHandle),
    /// `show`
    Show(WindowHandle),
    /// `hide`
    Hide(WindowHandle),
    /// `close`
    Close(WindowHandle),
    /// `dispose`
    Dispose(WindowHandle),
    /// `request_activate`
    Activate(WindowHandle),
}

#[derive(Debug)]
struct HeadlessWindow {
    title: String,
    components: usize,
    visible: bool,
    closed: bool,
}

const JOURNAL_CAPACITY: usize = 256;

/// In-memory [`UiRuntime`].
#[derive(Debug, Default)]
pub struct HeadlessRuntime {
    next_id: u64,
    windows: BTreeMap<WindowHandle, HeadlessWindow>,
    active: Option<WindowHandle>,
    journal: VecDeque<RuntimeCall>,
}

impl HeadlessRuntime {
    /// Create a runtime with no windows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of windows not yet disposed.
    #[must_use]
    pub fn live_windows(&self) -> usize {
        self.windows.len()
    }

    /// The window holding input focus.
    #[must_use]
    pub const fn active(&self) -> Option<WindowHandle> {
        self.active
    }

    /// Whether `handle` has been closed (and not shown since).
    #[must_use]
    pub fn is_closed(&self, handle: WindowHandle) -> bool {
        self.windows.get(&handle).is_some_and(|w| w.closed)
    }

    /// Title of a live window.
    #[must_use]
    pub fn title(&self, handle: WindowHandle) -> Option<&str> {
        self.windows.get(&handle).map(|w| w.title.as_str())
    }

    /// Recent primitive calls, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<RuntimeCall> {
        self.journal.iter().copied().collect()
    }

    /// Forget the recorded calls.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn record(&mut self, call: RuntimeCall) {
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(call);
    }

    fn window_mut(&mut self, handle: WindowHandle) -> Result<&mut HeadlessWindow, RuntimeError> {
        self.windows
            .get_mut(&handle)
            .ok_or(RuntimeError::UnknownHandle(handle))
    }
}

impl UiRuntime for HeadlessRuntime {
    fn load_view(&mut self, tree: &ViewTree) -> Result<WindowHandle, RuntimeError> {
        self.next_id += 1;
        let handle = WindowHandle(self.next_id);
        self.windows.insert(
            handle,
            HeadlessWindow {
                title: tree.window.title.clone(),
                components: tree.components.len(),
                visible: false,
                closed: false,
            },
        );
        self.record(RuntimeCall::Load(handle));
        debug!(%handle, title = %tree.window.title, components = tree.components.len(), "window created");
        Ok(handle)
    }

    fn show(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
        let window = self.window_mut(handle)?;
        window.visible = true;
        window.closed = false;
        info!(%handle, title = %window.title, components = window.components, "window shown");
        self.record(RuntimeCall::Show(handle));
        Ok(())
    }

    fn hide(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
        self.window_mut(handle)?.visible = false;
        if self.active == Some(handle) {
            self.active = None;
        }
        debug!(%handle, "window hidden");
        self.record(RuntimeCall::Hide(handle));
        Ok(())
    }

    fn close(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
        let window = self.window_mut(handle)?;
        window.visible = false;
        window.closed = true;
        if self.active == Some(handle) {
            self.active = None;
        }
        debug!(%handle, "window closed");
        self.record(RuntimeCall::Close(handle));
        Ok(())
    }

    fn dispose(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
        self.windows
            .remove(&handle)
            .ok_or(RuntimeError::UnknownHandle(handle))?;
        if self.active == Some(handle) {
            self.active = None;
        }
        debug!(%handle, "window disposed");
        self.record(RuntimeCall::Dispose(handle));
        Ok(())
    }

    fn is_visible(&self, handle: WindowHandle) -> Result<bool, RuntimeError> {
        self.windows
            .get(&handle)
            .map(|w| w.visible)
            .ok_or(RuntimeError::UnknownHandle(handle))
    }

    fn request_activate(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
        self.window_mut(handle)?;
        self.active = Some(handle);
        self.record(RuntimeCall::Activate(handle));
        Ok(())
    }
}
