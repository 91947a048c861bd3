// Core Layer: Rust Error Types
// Idiomatic Rust error handling

use crate::ffi::error::*;
use std::fmt;

/// Errors raised by the context, handle and compile operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpoofError {
    /// Context handle is zero
    NullHandle,
    /// Context handle does not name a live context (never issued or destroyed)
    InvalidHandle,
    /// Kernel source or name is unusable
    InvalidArgument(String),
    /// The toolchain root environment variable is unset or empty
    MissingToolchainRoot { var: String },
    /// The external compiler rejected the kernel
    CompilationFailed { name: String, log: String },
    /// Panic occurred
    Panic(String),
}

impl SpoofError {
    /// Convert Rust error to C API status code
    pub fn to_spoof_info(&self) -> SpoofInfo {
        match self {
            Self::NullHandle => SPOOF_NULL_HANDLE,
            Self::InvalidHandle => SPOOF_INVALID_HANDLE,
            Self::InvalidArgument(_) => SPOOF_INVALID_ARGUMENT,
            Self::MissingToolchainRoot { .. } => SPOOF_MISSING_TOOLCHAIN_ROOT,
            Self::CompilationFailed { .. } => SPOOF_COMPILATION_FAILED,
            Self::Panic(_) => SPOOF_PANIC,
        }
    }

    /// True for errors raised by the toolchain itself rather than by setup
    pub fn is_compilation_failure(&self) -> bool {
        matches!(self, Self::CompilationFailed { .. })
    }
}

impl fmt::Display for SpoofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullHandle => write!(f, "Context handle is null"),
            Self::InvalidHandle => write!(f, "Context handle is stale or unknown"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::MissingToolchainRoot { var } => {
                write!(f, "Environment variable {} is not set; cannot locate the CUDA toolchain", var)
            }
            Self::CompilationFailed { name, log } => {
                write!(f, "Compilation of kernel '{}' failed: {}", name, log)
            }
            Self::Panic(msg) => write!(f, "Panic: {}", msg),
        }
    }
}

impl std::error::Error for SpoofError {}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, SpoofError>;
