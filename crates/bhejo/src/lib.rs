//! # bhejo
//!
//! A tray composer that broadcasts a post to the social accounts a user has
//! selected. Its view layer is described by `.view` files on disk and is
//! hot-reloaded while the application runs.
//!
//! ## The reload loop
//!
//! ```text
//! ┌─────────────┐     ┌──────────┐     ┌───────────┐     ┌────────────┐     ┌───────────┐
//! │   notify    │────▶│ WatchSet │────▶│ Debouncer │────▶│ ViewLoader │────▶│ lifecycle │
//! │  (events)   │     │ (repair) │     │  (100ms)  │     │  (parse)   │     │ (migrate) │
//! └─────────────┘     └──────────┘     └───────────┘     └────────────┘     └───────────┘
//!                              ▲                                 │
//!                              └──── ReloadOrchestrator ─────────┘
//! ```
//!
//! Every callback (file events, the debounce deadline, tray commands) is an
//! [`AppEvent`] consumed one at a time by the [`ReloadOrchestrator`]. All
//! mutable state lives in a single [`AppContext`] passed explicitly to the
//! orchestrator, so a reload cycle can be driven from tests with synthetic
//! events and instants.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bhejo::{AppContext, Backend, HeadlessRuntime, NotifyBackend, ReloadOrchestrator, WatchSet};
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let watch_set = WatchSet::new(NotifyBackend::new(tx.clone())?, "view");
//! let mut ctx = AppContext::new(
//!     HeadlessRuntime::new(),
//!     watch_set,
//!     "views/main.view",
//!     Arc::new(Backend::default()),
//! );
//!
//! let mut orchestrator = ReloadOrchestrator::new(std::time::Duration::from_millis(100));
//! orchestrator.start(&mut ctx)?; // fatal if the first load fails
//! ctx.watch_set_mut().add_watch("views")?;
//! orchestrator.run(&mut ctx, &rx)?;
//! ```
//!
//! ## Error Handling
//!
//! Errors are [`thiserror`] enums carrying [`miette`] diagnostics. A failed
//! reload never escapes the orchestrator: the previous view stays current and
//! the failure is logged. Only a failure of the very first load is returned
//! as [`Error::FirstLoad`].

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub use miette;

// ============================================================================
// Core Modules
// ============================================================================

mod error;
pub use error::Error;

/// A Result type that displays errors with miette's fancy formatting.
pub type Result<T> = miette::Result<T>;

pub mod backend;
pub mod context;
pub mod event;
pub mod lifecycle;
pub mod logging;
pub mod orchestrator;
pub mod settings;
pub mod tray;
pub mod view;
pub mod watch;

pub use backend::{Account, Backend, BackendError, PostOutcome, ViewAction};
pub use context::AppContext;
pub use event::AppEvent;
pub use orchestrator::{Flow, ReloadOrchestrator, ReloadOutcome, ReloadState};
pub use settings::{ConfigError, Settings, SettingsOverrides};
pub use tray::{ParseCommandError, TrayCommand};
pub use view::{
    HeadlessRuntime, LoadError, RuntimeCall, RuntimeError, UiRuntime, ViewInstance, ViewLoader,
    ViewTree, WindowHandle,
};
pub use watch::{
    Debouncer, FsChange, FsChangeKind, NotifyBackend, ReloadTrigger, TargetKind, WatchBackend,
    WatchError, WatchOutcome, WatchSet, WatchTarget,
};
