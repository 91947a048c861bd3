// FFI Layer: Status Codes
// SpoofInfo return type for the C entry points that report a status

use std::ffi::CStr;

/// Status code returned across the C boundary
pub type SpoofInfo = i32;

// Success
pub const SPOOF_SUCCESS: SpoofInfo = 0;

// Handle and argument errors (< 0)
pub const SPOOF_NULL_HANDLE: SpoofInfo = -1;
pub const SPOOF_INVALID_HANDLE: SpoofInfo = -2;
pub const SPOOF_INVALID_ARGUMENT: SpoofInfo = -3;

// Pipeline errors
pub const SPOOF_MISSING_TOOLCHAIN_ROOT: SpoofInfo = -4;
pub const SPOOF_COMPILATION_FAILED: SpoofInfo = -5;

pub const SPOOF_PANIC: SpoofInfo = -101; // Rust panic caught at FFI boundary

/// Message for a SpoofInfo code, NUL-terminated for C callers
pub fn spoof_info_message(info: SpoofInfo) -> &'static CStr {
    match info {
        SPOOF_SUCCESS => c"SPOOF_SUCCESS: operation completed successfully",
        SPOOF_NULL_HANDLE => c"SPOOF_NULL_HANDLE: context handle is null",
        SPOOF_INVALID_HANDLE => c"SPOOF_INVALID_HANDLE: context handle is stale or unknown",
        SPOOF_INVALID_ARGUMENT => c"SPOOF_INVALID_ARGUMENT: invalid kernel source or name",
        SPOOF_MISSING_TOOLCHAIN_ROOT => {
            c"SPOOF_MISSING_TOOLCHAIN_ROOT: toolchain root environment variable is not set"
        }
        SPOOF_COMPILATION_FAILED => c"SPOOF_COMPILATION_FAILED: kernel compilation failed",
        SPOOF_PANIC => c"SPOOF_PANIC: internal panic caught at FFI boundary",
        _ => c"Unknown SpoofInfo code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            SPOOF_SUCCESS,
            SPOOF_NULL_HANDLE,
            SPOOF_INVALID_HANDLE,
            SPOOF_INVALID_ARGUMENT,
            SPOOF_MISSING_TOOLCHAIN_ROOT,
            SPOOF_COMPILATION_FAILED,
            SPOOF_PANIC,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_unknown_code_message() {
        assert_eq!(spoof_info_message(42).to_str().unwrap(), "Unknown SpoofInfo code");
        let msg = spoof_info_message(SPOOF_COMPILATION_FAILED).to_str().unwrap();
        assert!(msg.starts_with("SPOOF_COMPILATION_FAILED"));
    }
}
