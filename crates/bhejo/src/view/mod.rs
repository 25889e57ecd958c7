//! The view layer: description format, loader, live instances and the UI
//! runtime boundary.

mod description;
mod error;
mod instance;
mod loader;
mod runtime;

pub use description::{Component, ComponentKind, ViewDescription, ViewTree, WindowSpec};
pub use error::{LoadError, RuntimeError};
pub use instance::ViewInstance;
pub use loader::ViewLoader;
pub use runtime::{HeadlessRuntime, RuntimeCall, UiRuntime, WindowHandle};
