//! Shared-library modules.
//!
//! A native module is a shared library exporting one C symbol:
//!
//! ```c
//! const ConduitModuleInterface *conduit_get_interface(void);
//! ```
//!
//! The returned table must stay valid until the library is unloaded. Its
//! `abi_version` must equal [`MODULE_ABI_VERSION`]; strings are
//! NUL-terminated UTF-8 and `kind` is a [`ModuleKind`] ABI value.
//!
//! | Callback        | Contract                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | `init`          | `0` on success, negative status otherwise                       |
//! | `deinit`        | releases everything `init` acquired                             |
//! | `process_audio` | writes `size` bytes to `output`; `0` or negative status         |
//! | `is_active`     | whether `process_audio` may be called                           |
//! | `set_parameter` | optional; `0` or negative status                                |
//! | `get_parameter` | optional; copies a NUL-terminated value, returns its length or a negative status |

#![allow(unsafe_code)]

use crate::{Module, ModuleError, ModuleKind, ModuleMetadata, PluginLoader};
use conduit_core::AudioFormat;
use libloading::Library;
use std::ffi::{CStr, CString, c_char, c_int};
use std::path::Path;

/// ABI version this build accepts.
pub const MODULE_ABI_VERSION: u32 = 1;

/// Name of the exported entry point.
pub const ENTRY_SYMBOL: &str = "conduit_get_interface";

const ENTRY_SYMBOL_NUL: &[u8] = b"conduit_get_interface\0";
const PARAMETER_CAPACITY: usize = 256;

/// C view of [`AudioFormat`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bits per sample.
    pub bit_depth: u16,
    /// Period size in frames.
    pub buffer_size: u32,
}

impl From<&AudioFormat> for RawAudioFormat {
    fn from(format: &AudioFormat) -> Self {
        Self {
            sample_rate: format.sample_rate,
            channels: format.channels,
            bit_depth: format.bit_depth,
            buffer_size: format.buffer_size,
        }
    }
}

/// Module function table exported by a shared library.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ModuleInterface {
    /// Must equal [`MODULE_ABI_VERSION`].
    pub abi_version: u32,
    /// Unique module id.
    pub id: *const c_char,
    /// Display name.
    pub name: *const c_char,
    /// One-line description.
    pub description: *const c_char,
    /// Version string.
    pub version: *const c_char,
    /// [`ModuleKind`] ABI value.
    pub kind: u32,
    /// Initialize with a configuration string.
    pub init: Option<unsafe extern "C" fn(config: *const c_char) -> c_int>,
    /// Release module resources.
    pub deinit: Option<unsafe extern "C" fn()>,
    /// Process `size` bytes of interleaved audio.
    pub process_audio: Option<
        unsafe extern "C" fn(
            input: *const u8,
            output: *mut u8,
            size: usize,
            format: *const RawAudioFormat,
        ) -> c_int,
    >,
    /// Report readiness.
    pub is_active: Option<unsafe extern "C" fn() -> bool>,
    /// Set a named parameter.
    pub set_parameter: Option<unsafe extern "C" fn(key: *const c_char, value: *const c_char) -> c_int>,
    /// Copy a named parameter's value into `out`.
    pub get_parameter:
        Option<unsafe extern "C" fn(key: *const c_char, out: *mut c_char, out_len: usize) -> c_int>,
}

/// Signature of [`ENTRY_SYMBOL`].
pub type GetInterfaceFn = unsafe extern "C" fn() -> *const ModuleInterface;

struct VTable {
    init: unsafe extern "C" fn(*const c_char) -> c_int,
    deinit: unsafe extern "C" fn(),
    process_audio: unsafe extern "C" fn(*const u8, *mut u8, usize, *const RawAudioFormat) -> c_int,
    is_active: unsafe extern "C" fn() -> bool,
    set_parameter: Option<unsafe extern "C" fn(*const c_char, *const c_char) -> c_int>,
    get_parameter: Option<unsafe extern "C" fn(*const c_char, *mut c_char, usize) -> c_int>,
}

/// A module backed by a shared library.
///
/// Field order matters: the library is dropped after everything that points
/// into it.
pub struct NativeModule {
    metadata: ModuleMetadata,
    vtable: VTable,
    initialized: bool,
    _library: Library,
}

// SAFETY: the function table is plain code pointers into a library we own;
// the module contract requires native modules to tolerate calls from any
// one thread at a time, which `&mut self` on every mutating call enforces.
unsafe impl Send for NativeModule {}

/// Reads a required NUL-terminated string from the interface table.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_string(ptr: *const c_char, field: &str) -> Result<String, ModuleError> {
    if ptr.is_null() {
        return Err(ModuleError::InvalidFormat(format!("{field} is null")));
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    Ok(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

fn c_string(value: &str) -> Result<CString, ModuleError> {
    CString::new(value).map_err(|_| ModuleError::InvalidArgument("string contains NUL"))
}

impl NativeModule {
    fn from_interface(library: Library, raw: *const ModuleInterface) -> Result<Self, ModuleError> {
        if raw.is_null() {
            return Err(ModuleError::InvalidFormat("entry point returned null".into()));
        }
        // SAFETY: non-null, and the table lives as long as `library`.
        let interface = unsafe { *raw };
        if interface.abi_version != MODULE_ABI_VERSION {
            return Err(ModuleError::VersionMismatch {
                expected: MODULE_ABI_VERSION,
                found: interface.abi_version,
            });
        }
        let missing = |name: &str| ModuleError::InvalidFormat(format!("{name} callback is null"));
        let vtable = VTable {
            init: interface.init.ok_or_else(|| missing("init"))?,
            deinit: interface.deinit.ok_or_else(|| missing("deinit"))?,
            process_audio: interface
                .process_audio
                .ok_or_else(|| missing("process_audio"))?,
            is_active: interface.is_active.ok_or_else(|| missing("is_active"))?,
            set_parameter: interface.set_parameter,
            get_parameter: interface.get_parameter,
        };

        // SAFETY: the ABI requires these to be null or NUL-terminated strings.
        let metadata = unsafe {
            ModuleMetadata {
                id: read_string(interface.id, "id")?,
                name: read_string(interface.name, "name")?,
                description: read_string(interface.description, "description")?,
                version: read_string(interface.version, "version")?,
                kind: ModuleKind::from_raw(interface.kind).ok_or_else(|| {
                    ModuleError::InvalidFormat(format!("unknown module kind {}", interface.kind))
                })?,
            }
        };
        if metadata.id.is_empty() {
            return Err(ModuleError::InvalidFormat("id is empty".into()));
        }

        Ok(Self {
            metadata,
            vtable,
            initialized: false,
            _library: library,
        })
    }
}

impl Module for NativeModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    fn init(&mut self, config: &str) -> Result<(), ModuleError> {
        let config = c_string(config)?;
        // SAFETY: valid C string for the duration of the call.
        let code = unsafe { (self.vtable.init)(config.as_ptr()) };
        if code != 0 {
            return Err(ModuleError::InitFailed {
                id: self.metadata.id.clone(),
                code: if code < 0 { code } else { -libc::EINVAL },
                reason: format!("init returned {code}"),
            });
        }
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) {
        if self.initialized {
            // SAFETY: paired with a successful init.
            unsafe { (self.vtable.deinit)() };
            self.initialized = false;
        }
    }

    fn process_audio(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        format: &AudioFormat,
    ) -> Result<usize, ModuleError> {
        if !self.initialized {
            return Err(ModuleError::Inactive(self.metadata.id.clone()));
        }
        if output.len() < input.len() {
            return Err(ModuleError::InvalidArgument("output shorter than input"));
        }
        let raw = RawAudioFormat::from(format);
        // SAFETY: both buffers hold at least `input.len()` bytes and outlive the call.
        let code = unsafe {
            (self.vtable.process_audio)(input.as_ptr(), output.as_mut_ptr(), input.len(), &raw)
        };
        if code < 0 {
            return Err(ModuleError::Process {
                id: self.metadata.id.clone(),
                code,
            });
        }
        Ok(input.len())
    }

    fn is_active(&self) -> bool {
        // SAFETY: no arguments; valid while the library is loaded.
        self.initialized && unsafe { (self.vtable.is_active)() }
    }

    fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ModuleError> {
        let rejected = || ModuleError::InvalidParameter {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let set = self.vtable.set_parameter.ok_or_else(rejected)?;
        let (c_key, c_value) = (c_string(key)?, c_string(value)?);
        // SAFETY: valid C strings for the duration of the call.
        if unsafe { set(c_key.as_ptr(), c_value.as_ptr()) } != 0 {
            return Err(rejected());
        }
        Ok(())
    }

    fn get_parameter(&self, key: &str) -> Option<String> {
        let get = self.vtable.get_parameter?;
        let c_key = c_string(key).ok()?;
        let mut out = [0 as c_char; PARAMETER_CAPACITY];
        // SAFETY: `out` is writable for its full length.
        let len = unsafe { get(c_key.as_ptr(), out.as_mut_ptr(), out.len()) };
        if len < 0 {
            return None;
        }
        // never trust the module to terminate the buffer
        out[PARAMETER_CAPACITY - 1] = 0;
        // SAFETY: NUL-terminated by the line above.
        Some(unsafe { CStr::from_ptr(out.as_ptr()) }.to_string_lossy().into_owned())
    }
}

impl Drop for NativeModule {
    fn drop(&mut self) {
        self.deinit();
    }
}

/// Opens modules from shared libraries with `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl PluginLoader for NativeLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, ModuleError> {
        let load_failed = |reason: String| ModuleError::LoadFailed {
            path: path.display().to_string(),
            reason,
        };
        // SAFETY: loading a library runs its initializers; the caller chose this path.
        let library = unsafe { Library::new(path) }.map_err(|e| load_failed(e.to_string()))?;
        // SAFETY: the symbol has the documented `GetInterfaceFn` signature.
        let get_interface: GetInterfaceFn = unsafe {
            *library
                .get::<GetInterfaceFn>(ENTRY_SYMBOL_NUL)
                .map_err(|e| ModuleError::InvalidFormat(format!("{ENTRY_SYMBOL}: {e}")))?
        };
        // SAFETY: see above.
        let raw = unsafe { get_interface() };
        let module = NativeModule::from_interface(library, raw)?;
        tracing::debug!(
            id = %module.metadata.id,
            path = %path.display(),
            "modules: native library opened"
        );
        Ok(Box::new(module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModuleStatus;

    #[test]
    fn test_missing_library_is_load_failed() {
        let err = NativeLoader
            .open(Path::new("/nonexistent/libconduit_missing.so"))
            .err()
            .unwrap();
        assert_eq!(err.status(), ModuleStatus::LoadFailed);
        assert_eq!(err.errno(), -libc::ENOENT);
    }

    #[test]
    fn test_non_library_file_is_load_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_module.so");
        std::fs::write(&path, b"plain text").unwrap();
        let err = NativeLoader.open(&path).err().unwrap();
        assert!(matches!(err, ModuleError::LoadFailed { .. }));
    }

    #[test]
    fn test_raw_format_mirrors_audio_format() {
        let format = AudioFormat {
            sample_rate: 48000,
            channels: 2,
            bit_depth: 16,
            buffer_size: 256,
        };
        let raw = RawAudioFormat::from(&format);
        assert_eq!(raw.sample_rate, 48000);
        assert_eq!(raw.channels, 2);
        assert_eq!(raw.bit_depth, 16);
        assert_eq!(raw.buffer_size, 256);
    }
}
