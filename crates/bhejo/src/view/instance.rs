use std::sync::Arc;

use super::description::ViewTree;
use super::runtime::{UiRuntime, WindowHandle};

/// A live window built from one load of the view description.
///
/// Not `Clone`: exactly one owner is responsible for closing and disposing
/// it through the runtime.
#[derive(Debug)]
pub struct ViewInstance {
    handle: WindowHandle,
    tree: Arc<ViewTree>,
    generation: u64,
}

impl ViewInstance {
    pub(crate) const fn new(handle: WindowHandle, tree: Arc<ViewTree>, generation: u64) -> Self {
        Self {
            handle,
            tree,
            generation,
        }
    }

    /// The runtime handle of the window.
    #[must_use]
    pub const fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// The tree this window was built from.
    #[must_use]
    pub fn tree(&self) -> &Arc<ViewTree> {
        &self.tree
    }

    /// Number of successful loads up to and including this one.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the window is visible. A dead handle counts as hidden.
    #[must_use]
    pub fn is_visible(&self, runtime: &impl UiRuntime) -> bool {
        runtime.is_visible(self.handle).unwrap_or(false)
    }
}
