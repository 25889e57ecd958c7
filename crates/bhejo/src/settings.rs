//! Application settings.
//!
//! Settings are layered, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. `bhejo.toml` in the working directory, or the file given with
//!    `--config`
//! 3. `BHEJO_*` environment variables (a `.env` file is loaded into the
//!    environment first) and command-line flags
//!
//! The last layer is applied by the binary through [`SettingsOverrides`].
//!
//! ```toml
//! view_root = "views"
//! entry = "main.view"
//! debounce_ms = 100
//! extension = "view"
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::error::toml_error_parts;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "bhejo.toml";

/// Errors raised while loading settings.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// An explicitly requested settings file does not exist.
    #[error("settings file not found: {}", .path.display())]
    #[diagnostic(
        code(bhejo::config::not_found),
        help("check the --config path or BHEJO_CONFIG")
    )]
    NotFound {
        /// Path to the missing file
        path: PathBuf,
    },

    /// The settings file could not be read.
    #[error("failed to read settings file: {}", .path.display())]
    #[diagnostic(code(bhejo::config::read_error))]
    Read {
        /// Path to the file
        path: PathBuf,

        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is malformed.
    #[error("invalid settings in {}", .path.display())]
    #[diagnostic(
        code(bhejo::config::parse_error),
        help("known keys: view_root, entry, debounce_ms, extension")
    )]
    Parse {
        /// Path to the file
        path: PathBuf,

        /// The source file content for display
        #[source_code]
        src: NamedSource<String>,

        /// The location of the error
        #[label("{message}")]
        span: Option<SourceSpan>,

        /// Description of what went wrong
        message: String,
    },
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the view descriptions.
    pub view_root: PathBuf,
    /// Entry view, relative to `view_root`.
    pub entry: PathBuf,
    /// Debounce quiet period in milliseconds.
    pub debounce_ms: u64,
    /// Extension of view description files, without the dot.
    pub extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_root: PathBuf::from("views"),
            entry: PathBuf::from("main.view"),
            debounce_ms: 100,
            extension: "view".to_string(),
        }
    }
}

/// Values that take priority over the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Replaces [`Settings::view_root`].
    pub view_root: Option<PathBuf>,
    /// Replaces [`Settings::entry`].
    pub entry: Option<PathBuf>,
    /// Replaces [`Settings::debounce_ms`].
    pub debounce_ms: Option<u64>,
}

impl Settings {
    /// Load settings from `explicit`, or from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, or fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` does not exist, and
    /// [`ConfigError::Read`] or [`ConfigError::Parse`] if the chosen file
    /// cannot be used.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    debug!("no settings file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let settings = Self::parse(&content, path)?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Parse settings from TOML text. `path` is used for diagnostics only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| {
            let (span, message) = toml_error_parts(&e);
            ConfigError::Parse {
                path: path.to_path_buf(),
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span,
                message,
            }
        })
    }

    /// Apply overrides on top of these settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(view_root) = overrides.view_root {
            self.view_root = view_root;
        }
        if let Some(entry) = overrides.entry {
            self.entry = entry;
        }
        if let Some(debounce_ms) = overrides.debounce_ms {
            self.debounce_ms = debounce_ms;
        }
        self
    }

    /// The debounce quiet period.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Full path of the entry view.
    #[must_use]
    pub fn entry_path(&self) -> PathBuf {
        self.view_root.join(&self.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.debounce(), Duration::from_millis(100));
        assert_eq!(settings.entry_path(), Path::new("views").join("main.view"));
        assert_eq!(settings.extension, "view");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings =
            Settings::parse("view_root = \"ui\"\ndebounce_ms = 250\n", Path::new("bhejo.toml"))
                .unwrap();
        assert_eq!(settings.view_root, Path::new("ui"));
        assert_eq!(settings.debounce_ms, 250);
        assert_eq!(settings.entry, Path::new("main.view"));
    }

    #[test]
    fn test_unknown_key_has_span() {
        let err = Settings::parse("debounce = 5\n", Path::new("bhejo.toml")).unwrap_err();
        match err {
            ConfigError::Parse { span, message, .. } => {
                assert!(span.is_some());
                assert!(message.contains("debounce"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_from_file_and_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bhejo.toml");
        fs::write(&path, "entry = \"compose.view\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap().with_overrides(SettingsOverrides {
            debounce_ms: Some(20),
            ..SettingsOverrides::default()
        });
        assert_eq!(settings.entry, Path::new("compose.view"));
        assert_eq!(settings.debounce(), Duration::from_millis(20));
        assert_eq!(settings.view_root, Path::new("views"));
    }
}
