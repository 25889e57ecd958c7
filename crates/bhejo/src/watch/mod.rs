//! File watching for the view layer.
//!
//! This module keeps the set of watched view files healthy and turns bursts
//! of file system notifications into a single reload request.
//!
//! # Features
//!
//! - **Self-healing watch set** - Paths are re-registered after every event,
//!   so watch facilities that drop a path after firing keep working
//! - **Atomic-save tolerance** - A file deleted and recreated by an editor is
//!   picked up again from the directory event that follows
//! - **Debouncing** - A single re-armable deadline coalesces rapid saves
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌─────────────┐
//! │   notify    │────▶│ NotifyBackend │────▶│  AppEvent   │
//! │  (inotify)  │     │  (classify)   │     │  (channel)  │
//! └─────────────┘     └───────────────┘     └─────────────┘
//!                            ▲                     │
//!                            │                     ▼
//!                     ┌─────────────┐      ┌─────────────┐
//!                     │  WatchSet   │◀─────│  Debouncer  │
//!                     │  (repair)   │      │  (100 ms)   │
//!                     └─────────────┘      └─────────────┘
//! ```
//!
//! # Trigger Policy
//!
//! Any create, modify or remove event inside the view root re-arms the
//! debouncer, including changes to files that are not view descriptions.
//! This catches new `.view` files the moment they appear.

mod debounce;
mod set;
mod types;
mod watcher;

pub use debounce::{DEFAULT_QUIET_PERIOD, Debouncer, PendingReload};
pub use set::{WatchBackend, WatchSet};
pub use types::{
    FsChange, FsChangeKind, ReloadTrigger, TargetKind, WatchError, WatchOutcome, WatchTarget,
};
pub use watcher::{NotifyBackend, classify};
