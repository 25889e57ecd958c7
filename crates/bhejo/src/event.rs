//! Messages consumed by the reload orchestrator.

use crate::backend::ViewAction;
use crate::tray::TrayCommand;
use crate::watch::FsChange;

/// Everything that can happen to the application, as one queue item.
///
/// File notifications, tray clicks and view-layer calls all arrive through a
/// single channel and are handled one at a time on the loop thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A watched path changed on disk.
    Fs(FsChange),
    /// A tray menu command.
    Tray(TrayCommand),
    /// A call from the view layer into the data backend.
    View(ViewAction),
}

impl From<FsChange> for AppEvent {
    fn from(change: FsChange) -> Self {
        Self::Fs(change)
    }
}

impl From<TrayCommand> for AppEvent {
    fn from(command: TrayCommand) -> Self {
        Self::Tray(command)
    }
}

impl From<ViewAction> for AppEvent {
    fn from(action: ViewAction) -> Self {
        Self::View(action)
    }
}
