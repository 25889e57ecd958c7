//! View description format.
//!
//! A view description is a TOML file with the `.view` extension:
//!
//! ```toml
//! imports = ["Accounts.view"]
//!
//! [window]
//! title = "Bhejo Socials"
//! width = 420
//! height = 560
//!
//! [[component]]
//! id = "composer"
//! kind = "text_area"
//! text = "What's happening?"
//! ```
//!
//! The entry file must have a `[window]` table. Imported files contribute
//! components only; a `[window]` table in an import is ignored.

use std::path::{Path, PathBuf};

use miette::NamedSource;
use serde::Deserialize;

use super::error::LoadError;
use crate::error::toml_error_parts;

/// A single parsed `.view` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewDescription {
    /// Other view files, relative to this one.
    #[serde(default)]
    pub imports: Vec<String>,

    /// Window properties (entry file only).
    #[serde(default)]
    pub window: Option<WindowSpec>,

    /// Components declared in this file.
    #[serde(default, rename = "component")]
    pub components: Vec<Component>,
}

impl ViewDescription {
    /// Parse a view description, reporting errors against `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] with the offending span when the content
    /// is not a valid view description.
    pub fn parse(content: &str, path: &Path) -> Result<Self, LoadError> {
        toml::from_str(content).map_err(|e| {
            let (span, message) = toml_error_parts(&e);
            LoadError::Parse {
                path: path.to_path_buf(),
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span,
                message,
            }
        })
    }
}

/// Top-level window properties.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSpec {
    /// Window title.
    pub title: String,

    /// Width in logical pixels.
    #[serde(default = "WindowSpec::default_width")]
    pub width: u32,

    /// Height in logical pixels.
    #[serde(default = "WindowSpec::default_height")]
    pub height: u32,
}

impl WindowSpec {
    const fn default_width() -> u32 {
        420
    }

    const fn default_height() -> u32 {
        560
    }
}

/// Kinds of component the composer window is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Static text.
    Label,
    /// Multi-line text input.
    TextArea,
    /// Push button.
    Button,
    /// Account list with selection checkboxes.
    AccountList,
    /// Platform chooser for adding accounts.
    PlatformPicker,
    /// Result line for the last post.
    Status,
}

/// One component of the view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Component {
    /// Unique id across the whole tree.
    pub id: String,

    /// What to render.
    pub kind: ComponentKind,

    /// Label, placeholder or caption.
    #[serde(default)]
    pub text: Option<String>,
}

/// A fully resolved view: the entry file plus everything it imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTree {
    /// The entry file the tree was loaded from.
    pub entry: PathBuf,

    /// Window properties from the entry file.
    pub window: WindowSpec,

    /// Components in load order (each file's own components, then its imports).
    pub components: Vec<Component>,

    /// Every file that contributed, canonicalized.
    pub sources: Vec<PathBuf>,
}

impl ViewTree {
    /// Look up a component by id.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }
}
