// FFI Layer: Context C API
//
// Entry points for a managed-language bridge that keeps the context as a
// 64-bit integer. Every function catches panics; none of them aborts the host.

use crate::core::error::{Result, SpoofError};
use crate::core::handles::NULL_HANDLE;
use crate::ffi::error::*;
use crate::ops;
use std::ffi::{c_char, CStr};
use std::panic::catch_unwind;

/// Borrow a NUL-terminated UTF-8 string from C
///
/// # Safety
/// `ptr` must be null or point to a valid NUL-terminated string.
unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(SpoofError::InvalidArgument(format!("{} is NULL", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| SpoofError::InvalidArgument(format!("{} is not valid UTF-8", what)))
}

/// Create a context for a device and return its handle (0 on failure)
#[no_mangle]
pub extern "C" fn spoof_cuda_initialize(device_id: u32) -> u64 {
    catch_unwind(|| ops::initialize(device_id)).unwrap_or(NULL_HANDLE)
}

/// Destroy a context; null and stale handles are ignored
#[no_mangle]
pub extern "C" fn spoof_cuda_destroy(handle: u64, device_id: u32) {
    let _ = catch_unwind(|| ops::destroy(handle, device_id));
}

/// Compile a kernel and register it under `name`, reporting a status code
///
/// # Safety
/// `source` and `name` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn spoof_cuda_compile_status(
    handle: u64,
    source: *const c_char,
    name: *const c_char,
) -> SpoofInfo {
    let result = catch_unwind(|| {
        let run = || -> Result<()> {
            let source = c_str(source, "kernel source")?;
            let name = c_str(name, "kernel name")?;
            ops::compile(handle, source, name).map(|_| ())
        };
        match run() {
            Ok(()) => SPOOF_SUCCESS,
            Err(e) => e.to_spoof_info(),
        }
    });

    result.unwrap_or(SPOOF_PANIC)
}

/// Compile a kernel and register it under `name`
///
/// # Safety
/// `source` and `name` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn spoof_cuda_compile(
    handle: u64,
    source: *const c_char,
    name: *const c_char,
) -> bool {
    spoof_cuda_compile_status(handle, source, name) == SPOOF_SUCCESS
}

/// Check if a kernel is registered under `name`
///
/// # Safety
/// `name` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn spoof_cuda_has_operator(handle: u64, name: *const c_char) -> bool {
    let result = catch_unwind(|| {
        c_str(name, "kernel name")
            .and_then(|name| ops::lookup(handle, name))
            .map(|op| op.is_some())
            .unwrap_or(false)
    });

    result.unwrap_or(false)
}

/// Number of registered operators, or -1 for an invalid handle
#[no_mangle]
pub extern "C" fn spoof_cuda_operator_count(handle: u64) -> i64 {
    let result = catch_unwind(|| {
        ops::with_context(handle, |ctx| ctx.operators().len() as i64).unwrap_or(-1)
    });

    result.unwrap_or(-1)
}

/// Static message for a status code
#[no_mangle]
pub extern "C" fn spoof_info_to_string(info: SpoofInfo) -> *const c_char {
    spoof_info_message(info).as_ptr()
}
