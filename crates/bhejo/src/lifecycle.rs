//! Window lifecycle across reloads.
//!
//! [`transition`] hands the screen over from the previous view instance to a
//! freshly loaded one. The user's window state survives a reload they did not
//! initiate: a visible composer stays visible and focused, a window hidden in
//! the tray stays hidden.
//!
//! Ordering is fixed:
//!
//! ```text
//! capture previous.visible ─▶ show + activate next (if it was visible)
//!                          ─▶ close previous ─▶ dispose previous
//! ```
//!
//! The previous window is never disposed before its successor exists and is
//! on screen. If the successor cannot be shown, the handover is rolled back:
//! the successor is discarded and the previous window stays current.

use tracing::{info, warn};

use crate::view::{RuntimeError, UiRuntime, ViewInstance};

/// A handover that was abandoned because the successor could not be shown.
#[derive(Debug)]
pub struct Rollback {
    /// The instance that stays current.
    pub previous: ViewInstance,
    /// Why the successor could not be shown.
    pub source: RuntimeError,
}

/// Make `next` current, migrating visibility from `previous`.
///
/// Failures to activate `next` or to tear down `previous` are logged and do
/// not stop the handover.
///
/// # Errors
///
/// Returns a [`Rollback`] holding `previous` if `previous` was visible and
/// `next` could not be shown. `next` has been closed and disposed by then.
pub fn transition<R: UiRuntime>(
    runtime: &mut R,
    previous: Option<ViewInstance>,
    next: ViewInstance,
) -> Result<ViewInstance, Rollback> {
    let Some(previous) = previous else {
        info!(handle = %next.handle(), generation = next.generation(), "view loaded");
        return Ok(next);
    };

    let was_visible = match runtime.is_visible(previous.handle()) {
        Ok(visible) => visible,
        Err(e) => {
            warn!(error = %e, "could not query previous window, treating it as hidden");
            false
        }
    };

    if was_visible {
        if let Err(source) = runtime.show(next.handle()) {
            warn!(error = %source, handle = %next.handle(), "failed to show reloaded window, keeping the current one");
            discard(runtime, &next);
            return Err(Rollback { previous, source });
        }
        if let Err(e) = runtime.request_activate(next.handle()) {
            warn!(error = %e, "failed to activate reloaded window");
        }
    }

    discard(runtime, &previous);

    info!(
        from = %previous.handle(),
        to = %next.handle(),
        generation = next.generation(),
        visible = was_visible,
        "view reloaded"
    );
    Ok(next)
}

fn discard<R: UiRuntime>(runtime: &mut R, instance: &ViewInstance) {
    let handle = instance.handle();
    if let Err(e) = runtime.close(handle) {
        warn!(error = %e, %handle, "failed to close window");
    }
    if let Err(e) = runtime.dispose(handle) {
        warn!(error = %e, %handle, "failed to dispose window");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{HeadlessRuntime, RuntimeCall, ViewLoader, ViewTree, WindowHandle};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn fixture() -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(&main, "[window]\ntitle = \"Bhejo\"\n").unwrap();
        (dir, main)
    }

    #[test]
    fn test_first_load_keeps_default_visibility() {
        let (_dir, main) = fixture();
        let mut runtime = HeadlessRuntime::new();
        let mut loader = ViewLoader::new();

        let next = loader.reload(&mut runtime, &main).unwrap();
        let current = transition(&mut runtime, None, next).unwrap();

        assert!(!current.is_visible(&runtime));
        assert_eq!(runtime.journal(), vec![RuntimeCall::Load(current.handle())]);
    }

    #[test]
    fn test_visible_previous_shows_next_before_disposal() {
        let (_dir, main) = fixture();
        let mut runtime = HeadlessRuntime::new();
        let mut loader = ViewLoader::new();

        let a = loader.reload(&mut runtime, &main).unwrap();
        let a_handle = a.handle();
        runtime.show(a_handle).unwrap();
        runtime.clear_journal();

        let b = loader.reload(&mut runtime, &main).unwrap();
        let b_handle = b.handle();
        let current = transition(&mut runtime, Some(a), b).unwrap();

        assert_eq!(current.handle(), b_handle);
        assert!(current.is_visible(&runtime));
        assert_eq!(runtime.active(), Some(b_handle));
        assert_eq!(runtime.live_windows(), 1);
        assert_eq!(
            runtime.journal(),
            vec![
                RuntimeCall::Load(b_handle),
                RuntimeCall::Show(b_handle),
                RuntimeCall::Activate(b_handle),
                RuntimeCall::Close(a_handle),
                RuntimeCall::Dispose(a_handle),
            ]
        );
    }

    #[test]
    fn test_hidden_previous_leaves_next_hidden_and_still_disposes() {
        let (_dir, main) = fixture();
        let mut runtime = HeadlessRuntime::new();
        let mut loader = ViewLoader::new();

        let a = loader.reload(&mut runtime, &main).unwrap();
        let a_handle = a.handle();
        let b = loader.reload(&mut runtime, &main).unwrap();
        let current = transition(&mut runtime, Some(a), b).unwrap();

        assert!(!current.is_visible(&runtime));
        assert_eq!(runtime.live_windows(), 1);
        assert!(runtime.journal().contains(&RuntimeCall::Dispose(a_handle)));
        assert!(!runtime.journal().iter().any(|c| matches!(c, RuntimeCall::Show(_))));
    }

    #[test]
    fn test_dead_previous_handle_is_tolerated() {
        let (_dir, main) = fixture();
        let mut runtime = HeadlessRuntime::new();
        let mut loader = ViewLoader::new();

        let a = loader.reload(&mut runtime, &main).unwrap();
        runtime.dispose(a.handle()).unwrap();

        let b = loader.reload(&mut runtime, &main).unwrap();
        let b_handle = b.handle();
        let current = transition(&mut runtime, Some(a), b).unwrap();

        assert_eq!(current.handle(), b_handle);
        assert_eq!(runtime.live_windows(), 1);
    }

    /// Headless runtime that refuses to show one window.
    struct RefusesShow {
        inner: HeadlessRuntime,
        refused: Option<WindowHandle>,
    }

    impl UiRuntime for RefusesShow {
        fn load_view(&mut self, tree: &ViewTree) -> Result<WindowHandle, RuntimeError> {
            self.inner.load_view(tree)
        }
        fn show(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
            if self.refused == Some(handle) {
                return Err(RuntimeError::Rejected {
                    message: "compositor went away".to_string(),
                });
            }
            self.inner.show(handle)
        }
        fn hide(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
            self.inner.hide(handle)
        }
        fn close(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
            self.inner.close(handle)
        }
        fn dispose(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
            self.inner.dispose(handle)
        }
        fn is_visible(&self, handle: WindowHandle) -> Result<bool, RuntimeError> {
            self.inner.is_visible(handle)
        }
        fn request_activate(&mut self, handle: WindowHandle) -> Result<(), RuntimeError> {
            self.inner.request_activate(handle)
        }
    }

    #[test]
    fn test_unshowable_successor_keeps_visible_previous() {
        let (_dir, main) = fixture();
        let mut runtime = RefusesShow {
            inner: HeadlessRuntime::new(),
            refused: None,
        };
        let mut loader = ViewLoader::new();

        let a = loader.reload(&mut runtime, &main).unwrap();
        let a_handle = a.handle();
        runtime.show(a_handle).unwrap();

        let b = loader.reload(&mut runtime, &main).unwrap();
        let b_handle = b.handle();
        runtime.refused = Some(b_handle);
        runtime.inner.clear_journal();

        let rollback = transition(&mut runtime, Some(a), b).unwrap_err();

        assert_eq!(rollback.previous.handle(), a_handle);
        assert!(matches!(rollback.source, RuntimeError::Rejected { .. }));
        assert!(rollback.previous.is_visible(&runtime));
        assert_eq!(runtime.inner.live_windows(), 1);
        assert_eq!(
            runtime.inner.journal(),
            vec![RuntimeCall::Close(b_handle), RuntimeCall::Dispose(b_handle)]
        );
    }

    #[test]
    fn test_unshowable_successor_is_irrelevant_when_hidden() {
        let (_dir, main) = fixture();
        let mut runtime = RefusesShow {
            inner: HeadlessRuntime::new(),
            refused: None,
        };
        let mut loader = ViewLoader::new();

        let a = loader.reload(&mut runtime, &main).unwrap();
        let b = loader.reload(&mut runtime, &main).unwrap();
        let b_handle = b.handle();
        runtime.refused = Some(b_handle);

        let current = transition(&mut runtime, Some(a), b).unwrap();
        assert_eq!(current.handle(), b_handle);
        assert_eq!(runtime.inner.live_windows(), 1);
    }
}
