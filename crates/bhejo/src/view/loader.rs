//! View loader.
//!
//! The [`ViewLoader`] reads the entry `.view` file and everything it imports,
//! resolves them into one [`ViewTree`] and asks the [`UiRuntime`] for a
//! window. Parsed files are cached by canonical path; [`ViewLoader::reload`]
//! drops the cache first so edits on disk are always seen.
//!
//! # Example
//!
//! ```rust,ignore
//! use bhejo::{HeadlessRuntime, ViewLoader};
//!
//! let mut runtime = HeadlessRuntime::new();
//! let mut loader = ViewLoader::new();
//!
//! let instance = loader.reload(&mut runtime, "views/main.view".as_ref())?;
//! println!("loaded {} components", instance.tree().components.len());
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::description::{ViewDescription, ViewTree};
use super::error::LoadError;
use super::instance::ViewInstance;
use super::runtime::UiRuntime;

/// Parses view descriptions and instantiates them through a runtime.
#[derive(Debug, Default)]
pub struct ViewLoader {
    cache: HashMap<PathBuf, Arc<ViewDescription>>,
    generation: u64,
}

impl ViewLoader {
    /// Create a loader with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached description.
    pub fn clear_cache(&mut self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "clearing view cache");
        }
        self.cache.clear();
    }

    /// Number of cached descriptions.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Number of successful loads so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear the cache, then [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn reload<R: UiRuntime>(
        &mut self,
        runtime: &mut R,
        entry: &Path,
    ) -> Result<ViewInstance, LoadError> {
        self.clear_cache();
        self.load(runtime, entry)
    }

    /// Resolve `entry` and instantiate it as a new, hidden window.
    ///
    /// Cached descriptions are reused. Nothing outside the loader changes
    /// when this fails.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if any file is missing, unreadable or
    /// malformed, if imports form a cycle, if component ids collide, or if
    /// the runtime rejects the tree.
    pub fn load<R: UiRuntime>(
        &mut self,
        runtime: &mut R,
        entry: &Path,
    ) -> Result<ViewInstance, LoadError> {
        let tree = Arc::new(self.resolve(entry)?);
        let handle = runtime.load_view(&tree)?;
        self.generation += 1;
        Ok(ViewInstance::new(handle, tree, self.generation))
    }

    /// Resolve `entry` and its imports into a [`ViewTree`].
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn resolve(&mut self, entry: &Path) -> Result<ViewTree, LoadError> {
        let key = canonical(entry)?;
        let desc = self.read(&key)?;
        let window = desc
            .window
            .clone()
            .ok_or_else(|| LoadError::MissingWindow {
                path: entry.to_path_buf(),
            })?;

        let mut tree = ViewTree {
            entry: entry.to_path_buf(),
            window,
            components: Vec::new(),
            sources: Vec::new(),
        };
        let mut ids = HashSet::new();
        let mut stack = Vec::new();
        self.collect(key, &mut stack, &mut ids, &mut tree)?;

        Ok(tree)
    }

    fn collect(
        &mut self,
        path: PathBuf,
        stack: &mut Vec<PathBuf>,
        ids: &mut HashSet<String>,
        tree: &mut ViewTree,
    ) -> Result<(), LoadError> {
        // Diamond imports contribute once.
        if tree.sources.contains(&path) {
            return Ok(());
        }

        let desc = self.read(&path)?;
        for component in &desc.components {
            if !ids.insert(component.id.clone()) {
                return Err(LoadError::DuplicateId {
                    id: component.id.clone(),
                    path,
                });
            }
            tree.components.push(component.clone());
        }
        tree.sources.push(path.clone());

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        stack.push(path);
        for import in &desc.imports {
            let child = canonical(&dir.join(import))?;
            if stack.contains(&child) {
                return Err(LoadError::ImportCycle {
                    path: child,
                    importer: stack.last().cloned().unwrap_or_default(),
                });
            }
            self.collect(child, stack, ids, tree)?;
        }
        stack.pop();

        Ok(())
    }

    fn read(&mut self, path: &Path) -> Result<Arc<ViewDescription>, LoadError> {
        if let Some(desc) = self.cache.get(path) {
            return Ok(Arc::clone(desc));
        }

        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let desc = Arc::new(ViewDescription::parse(&content, path)?);
        self.cache.insert(path.to_path_buf(), Arc::clone(&desc));
        Ok(desc)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, LoadError> {
    path.canonicalize().map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> LoadError {
    if e.kind() == ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Read {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::error::RuntimeError;
    use crate::view::runtime::{HeadlessRuntime, WindowHandle};
    use tempfile::tempdir;

    const MAIN: &str = r#"
        imports = ["Accounts.view"]

        [window]
        title = "Bhejo Socials"

        [[component]]
        id = "composer"
        kind = "text_area"
    "#;

    const ACCOUNTS: &str = r#"
        [[component]]
        id = "accounts"
        kind = "account_list"
    "#;

    struct RejectingRuntime;

    impl UiRuntime for RejectingRuntime {
        fn load_view(&mut self, _tree: &ViewTree) -> Result<WindowHandle, RuntimeError> {
            Err(RuntimeError::Rejected {
                message: "no display".to_string(),
            })
        }
        fn show(&mut self, h: WindowHandle) -> Result<(), RuntimeError> {
            Err(RuntimeError::UnknownHandle(h))
        }
        fn hide(&mut self, h: WindowHandle) -> Result<(), RuntimeError> {
            Err(RuntimeError::UnknownHandle(h))
        }
        fn close(&mut self, h: WindowHandle) -> Result<(), RuntimeError> {
            Err(RuntimeError::UnknownHandle(h))
        }
        fn dispose(&mut self, h: WindowHandle) -> Result<(), RuntimeError> {
            Err(RuntimeError::UnknownHandle(h))
        }
        fn is_visible(&self, h: WindowHandle) -> Result<bool, RuntimeError> {
            Err(RuntimeError::UnknownHandle(h))
        }
        fn request_activate(&mut self, h: WindowHandle) -> Result<(), RuntimeError> {
            Err(RuntimeError::UnknownHandle(h))
        }
    }

    #[test]
    fn test_load_resolves_imports() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(&main, MAIN).unwrap();
        fs::write(dir.path().join("Accounts.view"), ACCOUNTS).unwrap();

        let mut runtime = HeadlessRuntime::new();
        let mut loader = ViewLoader::new();
        let instance = loader.load(&mut runtime, &main).unwrap();

        let tree = instance.tree();
        assert_eq!(tree.window.title, "Bhejo Socials");
        assert_eq!(tree.components.len(), 2);
        assert!(tree.component("accounts").is_some());
        assert_eq!(tree.sources.len(), 2);
        assert_eq!(instance.generation(), 1);
        assert!(!instance.is_visible(&runtime));
        assert_eq!(loader.cached(), 2);
    }

    #[test]
    fn test_reload_sees_edits_that_cache_would_hide() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(&main, MAIN).unwrap();
        fs::write(dir.path().join("Accounts.view"), ACCOUNTS).unwrap();

        let mut runtime = HeadlessRuntime::new();
        let mut loader = ViewLoader::new();
        loader.load(&mut runtime, &main).unwrap();

        fs::write(&main, MAIN.replace("Bhejo Socials", "Edited")).unwrap();

        let stale = loader.load(&mut runtime, &main).unwrap();
        assert_eq!(stale.tree().window.title, "Bhejo Socials");

        let fresh = loader.reload(&mut runtime, &main).unwrap();
        assert_eq!(fresh.tree().window.title, "Edited");
        assert_eq!(fresh.generation(), 3);
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let dir = tempdir().unwrap();
        let mut loader = ViewLoader::new();

        let err = loader
            .reload(&mut HeadlessRuntime::new(), &dir.path().join("main.view"))
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert_eq!(loader.generation(), 0);
    }

    #[test]
    fn test_missing_window_table() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(&main, ACCOUNTS).unwrap();

        let err = ViewLoader::new().resolve(&main).unwrap_err();
        assert!(matches!(err, LoadError::MissingWindow { .. }));
    }

    #[test]
    fn test_import_cycle_is_rejected() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(
            &main,
            "imports = [\"a.view\"]\n[window]\ntitle = \"t\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("a.view"), "imports = [\"main.view\"]\n").unwrap();

        let err = ViewLoader::new().resolve(&main).unwrap_err();
        assert!(matches!(err, LoadError::ImportCycle { .. }));
    }

    #[test]
    fn test_diamond_import_contributes_once() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(
            &main,
            "imports = [\"a.view\", \"b.view\"]\n[window]\ntitle = \"t\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("a.view"), "imports = [\"shared.view\"]\n").unwrap();
        fs::write(dir.path().join("b.view"), "imports = [\"shared.view\"]\n").unwrap();
        fs::write(
            dir.path().join("shared.view"),
            "[[component]]\nid = \"status\"\nkind = \"status\"\n",
        )
        .unwrap();

        let tree = ViewLoader::new().resolve(&main).unwrap();
        assert_eq!(tree.components.len(), 1);
        assert_eq!(tree.sources.len(), 4);
    }

    #[test]
    fn test_duplicate_component_id() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(&main, MAIN).unwrap();
        fs::write(
            dir.path().join("Accounts.view"),
            "[[component]]\nid = \"composer\"\nkind = \"label\"\n",
        )
        .unwrap();

        let err = ViewLoader::new().resolve(&main).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateId { ref id, .. } if id == "composer"));
    }

    #[test]
    fn test_runtime_rejection_is_instantiate_error() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.view");
        fs::write(&main, "[window]\ntitle = \"t\"\n").unwrap();

        let mut loader = ViewLoader::new();
        let err = loader.load(&mut RejectingRuntime, &main).unwrap_err();
        assert!(matches!(err, LoadError::Instantiate { .. }));
        assert_eq!(loader.generation(), 0);
    }
}
