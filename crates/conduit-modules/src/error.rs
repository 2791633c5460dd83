//! Error types for module loading and module calls.

use conduit_chain::ChainError;
use thiserror::Error;

/// Load status codes shared with native modules.
///
/// The discriminants are stable and cross the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ModuleStatus {
    /// The operation succeeded.
    Success = 0,
    /// The library could not be opened, or no such module is loaded.
    LoadFailed = -1,
    /// The library does not expose a usable module interface.
    InvalidFormat = -2,
    /// The module was built against a different ABI version.
    VersionMismatch = -3,
    /// The module's `init` reported failure.
    InitFailed = -4,
    /// A module with the same id is already loaded.
    AlreadyLoaded = -5,
}

impl ModuleStatus {
    /// The raw status code.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Errors returned by [`ModuleLoader`](crate::ModuleLoader) and [`Module`](crate::Module) calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    /// The backend could not open the module at `path`.
    #[error("failed to load module '{path}': {reason}")]
    LoadFailed {
        /// Path or `builtin:` name given to the loader.
        path: String,
        /// Backend-specific detail.
        reason: String,
    },

    /// The library's module interface is missing or malformed.
    #[error("invalid module format: {0}")]
    InvalidFormat(String),

    /// ABI version reported by the module differs from ours.
    #[error("module ABI version {found} does not match {expected}")]
    VersionMismatch {
        /// Version this build expects.
        expected: u32,
        /// Version the module reports.
        found: u32,
    },

    /// The module rejected its configuration.
    #[error("module '{id}' failed to initialize: {reason}")]
    InitFailed {
        /// Module id.
        id: String,
        /// Negative status code returned by the module, or `-EINVAL`.
        code: i32,
        /// Human-readable detail.
        reason: String,
    },

    /// A module with this id is already loaded.
    #[error("module '{0}' is already loaded")]
    AlreadyLoaded(String),

    /// No loaded module has this id.
    #[error("module '{0}' is not loaded")]
    NotFound(String),

    /// The module is not initialized and cannot process audio.
    #[error("module '{0}' is not active")]
    Inactive(String),

    /// A parameter key or value was rejected.
    #[error("invalid parameter {key}={value}")]
    InvalidParameter {
        /// Parameter name.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// A call argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The module's `process_audio` reported failure.
    #[error("module '{id}' failed to process audio (code {code})")]
    Process {
        /// Module id.
        id: String,
        /// Negative status code returned by the module.
        code: i32,
    },

    /// A built-in module's effect chain failed.
    #[error("module chain: {0}")]
    Chain(#[from] ChainError),
}

impl ModuleError {
    /// POSIX-style negative error code for this error.
    pub fn errno(&self) -> i32 {
        match self {
            ModuleError::LoadFailed { .. } | ModuleError::NotFound(_) => -libc::ENOENT,
            ModuleError::AlreadyLoaded(_) => -libc::EEXIST,
            ModuleError::Inactive(_) => -libc::EBUSY,
            ModuleError::InitFailed { code, .. } | ModuleError::Process { code, .. }
                if *code < 0 =>
            {
                *code
            }
            ModuleError::Chain(e) => e.errno(),
            _ => -libc::EINVAL,
        }
    }

    /// The load status this error reports across the module boundary.
    pub fn status(&self) -> ModuleStatus {
        match self {
            ModuleError::InvalidFormat(_) => ModuleStatus::InvalidFormat,
            ModuleError::VersionMismatch { .. } => ModuleStatus::VersionMismatch,
            ModuleError::InitFailed { .. } => ModuleStatus::InitFailed,
            ModuleError::AlreadyLoaded(_) => ModuleStatus::AlreadyLoaded,
            _ => ModuleStatus::LoadFailed,
        }
    }
}
