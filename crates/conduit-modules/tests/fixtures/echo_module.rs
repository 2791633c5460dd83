//! Minimal native module used by `tests/native.rs`.
//!
//! Built as a cdylib with plain `rustc`. `--cfg stale_abi` exports a table
//! with the wrong ABI version and `--cfg no_process` leaves out the
//! `process_audio` callback.

#![allow(unexpected_cfgs)]

use std::ffi::{CStr, c_char, c_int};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[repr(C)]
pub struct RawAudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub buffer_size: u32,
}

type ProcessFn = unsafe extern "C" fn(*const u8, *mut u8, usize, *const RawAudioFormat) -> c_int;

#[repr(C)]
pub struct ModuleInterface {
    pub abi_version: u32,
    pub id: *const c_char,
    pub name: *const c_char,
    pub description: *const c_char,
    pub version: *const c_char,
    pub kind: u32,
    pub init: Option<unsafe extern "C" fn(*const c_char) -> c_int>,
    pub deinit: Option<unsafe extern "C" fn()>,
    pub process_audio: Option<ProcessFn>,
    pub is_active: Option<unsafe extern "C" fn() -> bool>,
    pub set_parameter: Option<unsafe extern "C" fn(*const c_char, *const c_char) -> c_int>,
    pub get_parameter: Option<unsafe extern "C" fn(*const c_char, *mut c_char, usize) -> c_int>,
}

struct Exported(ModuleInterface);

// SAFETY: the table only holds pointers to static strings and functions.
unsafe impl Sync for Exported {}

const EINVAL: c_int = 22;

static ACTIVE: AtomicBool = AtomicBool::new(false);
static PROCESSED: AtomicUsize = AtomicUsize::new(0);
static LOG: Mutex<Option<PathBuf>> = Mutex::new(None);

fn log(event: &str) {
    let path = LOG.lock().unwrap().clone();
    if let Some(path) = path {
        let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
        writeln!(file, "{event}").unwrap();
    }
}

unsafe extern "C" fn init(config: *const c_char) -> c_int {
    let config = unsafe { CStr::from_ptr(config) }.to_string_lossy().into_owned();
    if !config.is_empty() {
        *LOG.lock().unwrap() = Some(PathBuf::from(config));
    }
    PROCESSED.store(0, Ordering::SeqCst);
    ACTIVE.store(true, Ordering::SeqCst);
    log("init");
    0
}

unsafe extern "C" fn deinit() {
    ACTIVE.store(false, Ordering::SeqCst);
    log("deinit");
}

/// Copies the input with every sample byte inverted; rejects zero channels.
unsafe extern "C" fn process_audio(
    input: *const u8,
    output: *mut u8,
    size: usize,
    format: *const RawAudioFormat,
) -> c_int {
    if unsafe { (*format).channels } == 0 {
        return -EINVAL;
    }
    let input = unsafe { std::slice::from_raw_parts(input, size) };
    let output = unsafe { std::slice::from_raw_parts_mut(output, size) };
    for (y, x) in output.iter_mut().zip(input) {
        *y = !x;
    }
    PROCESSED.fetch_add(size, Ordering::SeqCst);
    0
}

unsafe extern "C" fn is_active() -> bool {
    ACTIVE.load(Ordering::SeqCst)
}

unsafe extern "C" fn get_parameter(key: *const c_char, out: *mut c_char, out_len: usize) -> c_int {
    let key = unsafe { CStr::from_ptr(key) };
    if key.to_bytes() != b"processed_bytes" {
        return -EINVAL;
    }
    let value = PROCESSED.load(Ordering::SeqCst).to_string();
    let len = value.len().min(out_len - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(value.as_ptr().cast::<c_char>(), out, len);
        *out.add(len) = 0;
    }
    len as c_int
}

const fn text(bytes: &'static [u8]) -> *const c_char {
    bytes.as_ptr().cast()
}

static INTERFACE: Exported = Exported(ModuleInterface {
    abi_version: if cfg!(stale_abi) { 99 } else { 1 },
    id: text(b"echo\0"),
    name: text(b"Echo Inverter\0"),
    description: text(b"Inverts every byte it is given\0"),
    version: text(b"0.3.1\0"),
    kind: 2,
    init: Some(init),
    deinit: Some(deinit),
    process_audio: if cfg!(no_process) {
        None
    } else {
        Some(process_audio as ProcessFn)
    },
    is_active: Some(is_active),
    set_parameter: None,
    get_parameter: Some(get_parameter),
});

#[no_mangle]
pub extern "C" fn conduit_get_interface() -> *const ModuleInterface {
    &INTERFACE.0
}
