//! Module bookkeeping.

use crate::builtin::{BUILTIN_PREFIX, StaticLoader};
use crate::native::NativeLoader;
use crate::{Module, ModuleError, ModuleKind, ModuleMetadata};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default initial capacity of a [`ModuleLoader`].
pub const DEFAULT_CAPACITY: usize = 8;

/// Backend that turns a path into an unopened [`Module`].
pub trait PluginLoader: Send {
    /// Open the module at `path` without initializing it.
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, ModuleError>;
}

/// The standard backend: `builtin:` paths go to a [`StaticLoader`],
/// everything else to the [`NativeLoader`].
#[derive(Debug, Default, Clone)]
pub struct DefaultLoader {
    /// In-process modules.
    pub builtin: StaticLoader,
    /// Shared-library modules.
    pub native: NativeLoader,
}

impl PluginLoader for DefaultLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, ModuleError> {
        let is_builtin = path
            .to_str()
            .is_some_and(|p| p.starts_with(BUILTIN_PREFIX));
        if is_builtin {
            self.builtin.open(path)
        } else {
            self.native.open(path)
        }
    }
}

struct LoadedModule {
    module: Box<dyn Module>,
    path: PathBuf,
}

/// Owns loaded modules and their backing libraries.
///
/// Module ids are unique: loading a second module with an id already in use
/// fails with [`ModuleError::AlreadyLoaded`]. Every module is deinitialized
/// before it is dropped, at the latest when the loader itself is dropped.
///
/// # Example
///
/// ```rust
/// use conduit_modules::{ModuleKind, ModuleLoader};
///
/// let mut loader = ModuleLoader::default();
/// let meta = loader.load("builtin:chain", "effect=compressor").unwrap();
/// assert_eq!(meta.kind, ModuleKind::AudioProcessing);
///
/// assert!(loader.module("chain").unwrap().is_active());
/// loader.unload("chain").unwrap();
/// assert!(loader.unload("chain").is_err());
/// ```
pub struct ModuleLoader {
    backend: Box<dyn PluginLoader>,
    modules: Vec<LoadedModule>,
}

impl ModuleLoader {
    /// An empty loader opening modules through `backend`.
    pub fn new(backend: impl PluginLoader + 'static) -> Self {
        Self::with_capacity(backend, DEFAULT_CAPACITY)
    }

    /// An empty loader with room for `capacity` modules before growing.
    pub fn with_capacity(backend: impl PluginLoader + 'static, capacity: usize) -> Self {
        Self {
            backend: Box::new(backend),
            modules: Vec::with_capacity(capacity),
        }
    }

    /// Open, check and initialize the module at `path`.
    ///
    /// A module that fails any step is released before this returns.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        config: &str,
    ) -> Result<&ModuleMetadata, ModuleError> {
        let path = path.as_ref();
        let mut module = self.backend.open(path).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "modules: open failed");
        })?;

        let id = module.metadata().id.clone();
        if self.position(&id).is_some() {
            tracing::warn!(%id, path = %path.display(), "modules: duplicate id rejected");
            return Err(ModuleError::AlreadyLoaded(id));
        }

        if let Err(e) = module.init(config) {
            tracing::warn!(%id, error = %e, "modules: init failed");
            return Err(match e {
                ModuleError::InitFailed { .. } => e,
                other => ModuleError::InitFailed {
                    id,
                    code: other.errno(),
                    reason: other.to_string(),
                },
            });
        }

        tracing::info!(
            %id,
            kind = %module.metadata().kind,
            version = %module.metadata().version,
            path = %path.display(),
            "modules: loaded"
        );
        let index = self.modules.len();
        self.modules.push(LoadedModule {
            module,
            path: path.to_path_buf(),
        });
        Ok(self.modules[index].module.metadata())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.modules
            .iter()
            .position(|m| m.module.metadata().id == id)
    }

    /// Deinitialize and release the module `id`.
    pub fn unload(&mut self, id: &str) -> Result<(), ModuleError> {
        let index = self
            .position(id)
            .ok_or_else(|| ModuleError::NotFound(id.to_owned()))?;
        let mut loaded = self.modules.swap_remove(index);
        loaded.module.deinit();
        tracing::info!(%id, path = %loaded.path.display(), "modules: unloaded");
        Ok(())
    }

    /// The loaded module `id`.
    pub fn module(&self, id: &str) -> Option<&dyn Module> {
        let loaded = self.modules.iter().find(|m| m.module.metadata().id == id)?;
        Some(loaded.module.as_ref())
    }

    /// The loaded module `id`, for processing and parameter calls.
    pub fn module_mut(&mut self, id: &str) -> Option<&mut dyn Module> {
        let loaded = self
            .modules
            .iter_mut()
            .find(|m| m.module.metadata().id == id)?;
        Some(loaded.module.as_mut())
    }

    /// Path module `id` was loaded from.
    pub fn path(&self, id: &str) -> Option<&Path> {
        self.position(id).map(|i| self.modules[i].path.as_path())
    }

    /// Metadata of every loaded module.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleMetadata> {
        self.modules.iter().map(|m| m.module.metadata())
    }

    /// Metadata of loaded modules of one kind.
    pub fn modules_by_type(&self, kind: ModuleKind) -> impl Iterator<Item = &ModuleMetadata> {
        self.modules().filter(move |m| m.kind == kind)
    }

    /// Number of loaded modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Deinitialize and release every module, newest first.
    pub fn cleanup(&mut self) {
        while let Some(mut loaded) = self.modules.pop() {
            loaded.module.deinit();
            tracing::debug!(id = %loaded.module.metadata().id, "modules: released");
        }
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(DefaultLoader::default())
    }
}

impl Drop for ModuleLoader {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("modules", &self.modules().map(|m| &m.id).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_loader_dispatches_by_prefix() {
        let backend = DefaultLoader::default();
        assert!(backend.open(Path::new("builtin:chain")).is_ok());
        let err = backend.open(Path::new("/nonexistent/libx.so")).err().unwrap();
        assert!(matches!(err, ModuleError::LoadFailed { .. }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut loader = ModuleLoader::default();
        loader.load("builtin:chain", "").unwrap();
        let err = loader.load("builtin:chain", "").unwrap_err();
        assert_eq!(err, ModuleError::AlreadyLoaded("chain".into()));
        assert_eq!(loader.len(), 1);
    }

    #[test]
    fn test_failed_init_leaves_nothing_loaded() {
        let mut loader = ModuleLoader::default();
        let err = loader.load("builtin:chain", "channels=0").unwrap_err();
        assert!(matches!(err, ModuleError::InitFailed { .. }));
        assert!(loader.is_empty());
    }

    #[test]
    fn test_path_is_recorded() {
        let mut loader = ModuleLoader::default();
        loader.load("builtin:chain", "").unwrap();
        assert_eq!(loader.path("chain"), Some(Path::new("builtin:chain")));
        assert_eq!(loader.path("other"), None);
    }
}
