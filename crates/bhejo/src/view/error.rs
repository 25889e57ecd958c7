//! View error types with rich diagnostics.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};

use super::runtime::WindowHandle;

/// Error type for loading a view from disk.
///
/// A `LoadError` at startup is fatal. On any later reload it is logged and
/// the previous view stays on screen.
///
/// # Example Output
///
/// ```text
/// Error: bhejo::view::parse_error
///   × parse error in views/main.view
///    ╭─[views/main.view:3:9]
///  3 │ title = Bhejo
///    ·         ──┬──
///    ·           ╰── invalid string
///    ╰────
///   help: check for missing quotes, unknown keys, or unknown component kinds
/// ```
#[derive(Debug, Diagnostic, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// View description not found
    #[error("view description not found: {}", .path.display())]
    #[diagnostic(
        code(bhejo::view::not_found),
        help("editors that save atomically may briefly remove the file; save again to retry")
    )]
    NotFound {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Failed to read file
    #[error("failed to read view description: {}", .path.display())]
    #[diagnostic(
        code(bhejo::view::read_error),
        help("check file permissions and ensure it's readable")
    )]
    Read {
        /// Path to the file
        path: PathBuf,

        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed view description
    #[error("parse error in {}", .path.display())]
    #[diagnostic(
        code(bhejo::view::parse_error),
        help("check for missing quotes, unknown keys, or unknown component kinds")
    )]
    Parse {
        /// Path to the file
        path: PathBuf,

        /// The source file content for display
        #[source_code]
        src: NamedSource<String>,

        /// The location of the error, when the parser reports one
        #[label("{message}")]
        span: Option<SourceSpan>,

        /// Description of what went wrong
        message: String,
    },

    /// Entry file without a `[window]` table
    #[error("{} has no [window] table", .path.display())]
    #[diagnostic(
        code(bhejo::view::missing_window),
        help("the entry view must declare [window] with at least a title")
    )]
    MissingWindow {
        /// Path to the entry file
        path: PathBuf,
    },

    /// A file imports itself, directly or through other files
    #[error("import cycle: {} is imported again by {}", .path.display(), .importer.display())]
    #[diagnostic(code(bhejo::view::import_cycle))]
    ImportCycle {
        /// The file that was re-entered
        path: PathBuf,

        /// The file whose import closed the cycle
        importer: PathBuf,
    },

    /// Two components share an id
    #[error("duplicate component id `{id}` in {}", .path.display())]
    #[diagnostic(
        code(bhejo::view::duplicate_id),
        help("component ids must be unique across the entry file and all imports")
    )]
    DuplicateId {
        /// The repeated id
        id: String,

        /// File containing the second occurrence
        path: PathBuf,
    },

    /// The UI runtime refused to instantiate the tree
    #[error("failed to instantiate view")]
    #[diagnostic(code(bhejo::view::instantiate))]
    Instantiate {
        /// Error reported by the runtime
        #[from]
        source: RuntimeError,
    },
}

/// Error type for UI runtime primitives.
#[derive(Debug, Diagnostic, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuntimeError {
    /// The handle does not name a live window (never created, or disposed).
    #[error("unknown window handle {0}")]
    #[diagnostic(code(bhejo::runtime::unknown_handle))]
    UnknownHandle(WindowHandle),

    /// The runtime refused the view tree.
    #[error("view rejected: {message}")]
    #[diagnostic(code(bhejo::runtime::rejected))]
    Rejected {
        /// Why the tree was refused
        message: String,
    },
}
