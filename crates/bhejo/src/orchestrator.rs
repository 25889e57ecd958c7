//! Reload orchestration.
//!
//! The [`ReloadOrchestrator`] consumes [`AppEvent`]s one at a time and drives
//! the reload state machine:
//!
//! ```text
//!            fs event                 deadline
//!   Idle ───────────────▶ Debouncing ──────────▶ Reloading
//!    ▲                     │      ▲                  │
//!    │                     └──────┘ fs event         │
//!    │                     (deadline reset)          │
//!    └─────────────── done ◀─────────────────────────┘
//! ```
//!
//! A reload runs synchronously on the loop thread. File events that arrive
//! meanwhile wait in the channel and are handled once it is back in `Idle`,
//! so a burst during a reload still coalesces into one follow-up reload.
//!
//! A manual reload from the tray skips the debouncer and cancels any pending
//! deadline. It also re-registers the view roots first, so a root directory
//! that was deleted and recreated is watched again. Only the very first load can fail fatally; every later failure
//! keeps the current view on screen.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, at, never, select};
use tracing::{debug, error, info, trace, warn};

use crate::Error;
use crate::context::AppContext;
use crate::event::AppEvent;
use crate::lifecycle::{self, Rollback};
use crate::tray::TrayCommand;
use crate::view::{LoadError, UiRuntime};
use crate::watch::{Debouncer, FsChange, ReloadTrigger, WatchBackend};

/// Where the reload state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadState {
    /// Nothing pending.
    #[default]
    Idle,
    /// A deadline is armed; more events push it back.
    Debouncing,
    /// The loader and lifecycle coordinator are running.
    Reloading,
}

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep processing events.
    Continue,
    /// The user asked to quit.
    Quit,
}

/// Result of one reload attempt.
#[derive(Debug)]
pub enum ReloadOutcome {
    /// A new view instance is current.
    Loaded {
        /// Generation of the new instance.
        generation: u64,
    },
    /// The load failed and the previous instance is still current.
    KeptPrevious(LoadError),
}

/// Drives reloads from file events, the debounce deadline and tray commands.
#[derive(Debug)]
pub struct ReloadOrchestrator {
    state: ReloadState,
    debouncer: Debouncer,
    trigger: Option<ReloadTrigger>,
}

impl ReloadOrchestrator {
    /// Create an idle orchestrator with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            state: ReloadState::Idle,
            debouncer: Debouncer::new(quiet),
            trigger: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReloadState {
        self.state
    }

    /// The debouncer, for inspection.
    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Load the first view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FirstLoad`] if the view cannot be loaded. There is
    /// nothing to fall back to, so the caller should exit.
    pub fn start<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
    ) -> Result<u64, Error> {
        match self.reload(ctx, ReloadTrigger::Initial)? {
            ReloadOutcome::Loaded { generation } => Ok(generation),
            // Unreachable in practice: a failure without a previous view is
            // returned as `FirstLoad` above.
            ReloadOutcome::KeptPrevious(source) => Err(Error::FirstLoad { source }),
        }
    }

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FirstLoad`] if a manual reload runs before any view
    /// was loaded and fails.
    pub fn handle_event<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        event: AppEvent,
        now: Instant,
    ) -> Result<Flow, Error> {
        match event {
            AppEvent::Fs(change) => self.on_fs_change(ctx, change, now),

            AppEvent::Tray(command) => return self.on_tray(ctx, command),

            AppEvent::View(action) => {
                debug!(?action, "view action");
                let result = ctx.backend().perform(action);
                info!(%result, "view action handled");
            }
        }

        Ok(Flow::Continue)
    }

    /// Fire the pending reload if its deadline has passed.
    ///
    /// Returns `None` if nothing was due.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FirstLoad`] if no view was ever loaded and the load
    /// fails.
    pub fn poll_timer<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        now: Instant,
    ) -> Result<Option<ReloadOutcome>, Error> {
        if self.state != ReloadState::Debouncing || !self.debouncer.fire_if_due(now) {
            return Ok(None);
        }

        let trigger = self.trigger.take().unwrap_or(ReloadTrigger::Manual);
        self.reload(ctx, trigger).map(Some)
    }

    /// Reload the view now.
    ///
    /// A failure keeps the current view and is returned as
    /// [`ReloadOutcome::KeptPrevious`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::FirstLoad`] if there is no current view and the
    /// load fails.
    pub fn reload<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        trigger: ReloadTrigger,
    ) -> Result<ReloadOutcome, Error> {
        self.state = ReloadState::Reloading;
        self.debouncer.cancel();
        self.trigger = None;
        info!(%trigger, entry = %ctx.entry().display(), "reloading view");

        let result = load_and_transition(ctx);
        self.state = ReloadState::Idle;
        result
    }

    /// Run the event loop until quit, then shut the context down.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::FirstLoad`] from a reload with no current view.
    pub fn run<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        events: &Receiver<AppEvent>,
    ) -> Result<(), Error> {
        let result = self.drive(ctx, events);
        ctx.shutdown();
        info!("bhejo stopped");
        result
    }

    fn drive<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        events: &Receiver<AppEvent>,
    ) -> Result<(), Error> {
        loop {
            let deadline = self.debouncer.deadline().map_or_else(never, at);

            select! {
                recv(events) -> event => {
                    let Ok(event) = event else {
                        debug!("event channel closed");
                        return Ok(());
                    };
                    if self.handle_event(ctx, event, Instant::now())? == Flow::Quit {
                        return Ok(());
                    }
                }

                recv(deadline) -> _ => {
                    self.poll_timer(ctx, Instant::now())?;
                }
            }
        }
    }

    fn on_fs_change<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        change: FsChange,
        now: Instant,
    ) {
        if !ctx.watch_set().is_relevant(&change.path) {
            trace!(path = %change.path.display(), "ignoring change outside the view root");
            return;
        }

        if let Err(e) = ctx.watch_set_mut().on_fs_event(&change.path) {
            warn!(error = %e, path = %change.path.display(), "failed to repair watch");
        }

        debug!(path = %change.path.display(), kind = ?change.kind, "change detected, debouncing");
        self.trigger = Some(change.into());
        self.debouncer.notify(now);
        self.state = ReloadState::Debouncing;
    }

    fn on_tray<R: UiRuntime, B: WatchBackend>(
        &mut self,
        ctx: &mut AppContext<R, B>,
        command: TrayCommand,
    ) -> Result<Flow, Error> {
        debug!(%command, "tray command");
        match command {
            TrayCommand::Compose => ctx.show_current(),

            TrayCommand::Toggle => ctx.toggle_current(),

            TrayCommand::Reload => {
                match ctx.watch_set_mut().refresh_roots() {
                    Ok(0) => warn!("no view root is present, nothing is being watched"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "failed to refresh view root watch"),
                }
                self.reload(ctx, ReloadTrigger::Manual)?;
            }

            TrayCommand::Quit => {
                info!("quit requested");
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }
}

impl Default for ReloadOrchestrator {
    fn default() -> Self {
        Self::new(crate::watch::DEFAULT_QUIET_PERIOD)
    }
}

fn load_and_transition<R: UiRuntime, B: WatchBackend>(
    ctx: &mut AppContext<R, B>,
) -> Result<ReloadOutcome, Error> {
    let (loader, runtime, entry) = ctx.load_parts();
    let loaded = loader.reload(runtime, entry);

    match loaded {
        Ok(next) => {
            let generation = next.generation();
            let previous = ctx.take_current();
            match lifecycle::transition(ctx.runtime_mut(), previous, next) {
                Ok(current) => {
                    ctx.set_current(current);
                    Ok(ReloadOutcome::Loaded { generation })
                }
                Err(Rollback { previous, source }) => {
                    ctx.set_current(previous);
                    Ok(ReloadOutcome::KeptPrevious(LoadError::Instantiate { source }))
                }
            }
        }

        Err(source) if ctx.current().is_none() => {
            error!(error = %source, "initial view load failed");
            Err(Error::FirstLoad { source })
        }

        Err(e) => {
            warn!(error = %e, "view reload failed, keeping the current view");
            Ok(ReloadOutcome::KeptPrevious(e))
        }
    }
}
