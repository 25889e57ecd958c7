//! Crate-level error type.
//!
//! Each subsystem owns its own error enum ([`WatchError`], [`LoadError`],
//! [`ConfigError`]). [`Error`] wraps them transparently so `miette` renders
//! the inner diagnostic, and adds the few conditions that only make sense at
//! the application level.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::settings::ConfigError;
use crate::view::LoadError;
use crate::watch::WatchError;

/// Errors surfaced to the binary.
///
/// | Variant | When It Occurs |
/// |---------|----------------|
/// | [`Error::Watch`] | The watcher could not be created or a path could not be watched |
/// | [`Error::Config`] | Settings file missing or malformed |
/// | [`Error::FirstLoad`] | The initial view failed to load |
/// | [`Error::Logging`] | The tracing subscriber could not be installed |
/// | [`Error::Thread`] | A helper thread could not be spawned |
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// File watching failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Watch(#[from] WatchError),

    /// Settings could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// The view failed to load at startup, so there is no window to keep.
    #[error("initial view load failed")]
    #[diagnostic(
        code(bhejo::reload::first_load),
        help("fix the view description and start bhejo again")
    )]
    FirstLoad {
        /// Why the load failed.
        #[source]
        #[diagnostic_source]
        source: LoadError,
    },

    /// The logging subscriber could not be installed.
    #[error("failed to initialize logging: {message}")]
    #[diagnostic(code(bhejo::logging::init_failed))]
    Logging {
        /// Error reported by `tracing-subscriber`.
        message: String,
    },

    /// A helper thread could not be spawned.
    #[error("failed to spawn {name} thread")]
    #[diagnostic(code(bhejo::thread::spawn_failed))]
    Thread {
        /// Thread name.
        name: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Splits a TOML error into a label span and a message.
pub(crate) fn toml_error_parts(e: &toml::de::Error) -> (Option<SourceSpan>, String) {
    let span = e
        .span()
        .map(|range| SourceSpan::new(range.start.into(), range.end - range.start));
    (span, e.message().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_first_load_display() {
        let err = Error::FirstLoad {
            source: LoadError::NotFound {
                path: PathBuf::from("views/main.view"),
            },
        };
        assert!(err.to_string().contains("initial view load failed"));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.is_some_and(|s| s.contains("main.view")));
    }

    #[test]
    fn test_toml_error_parts_has_span() {
        let err = toml::from_str::<toml::Table>("title = ").unwrap_err();
        let (span, message) = toml_error_parts(&err);
        assert!(span.is_some());
        assert!(!message.is_empty());
    }
}
