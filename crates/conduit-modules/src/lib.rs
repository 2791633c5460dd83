//! Conduit Modules - loadable audio modules.
//!
//! A [`Module`] is a unit of audio functionality loaded at runtime: an input,
//! an output, a processor, a network service or a control surface. Modules
//! are opened by a [`PluginLoader`] backend and owned by a [`ModuleLoader`],
//! which initializes them, keeps their ids unique and deinitializes them on
//! unload.
//!
//! ## Backends
//!
//! - [`NativeLoader`] - shared libraries exporting the C [`ModuleInterface`]
//! - [`StaticLoader`] - modules compiled into the binary, opened as
//!   `builtin:<name>` (ships [`ChainModule`] as `builtin:chain`)
//! - [`DefaultLoader`] - picks one of the above by path
//!
//! ## Errors
//!
//! [`ModuleError::status`] reports the [`ModuleStatus`] shared with native
//! modules; [`ModuleError::errno`] the POSIX-style code.

mod builtin;
mod error;
mod loader;
mod module;
pub mod native;

pub use builtin::{BUILTIN_PREFIX, ChainModule, ModuleFactory, StaticLoader};
pub use error::{ModuleError, ModuleStatus};
pub use loader::{DEFAULT_CAPACITY, DefaultLoader, ModuleLoader, PluginLoader};
pub use module::{Module, ModuleKind, ModuleMetadata};
pub use native::{MODULE_ABI_VERSION, ModuleInterface, NativeLoader, RawAudioFormat};
