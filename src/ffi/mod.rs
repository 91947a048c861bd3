// FFI Layer: C API Module
//
// This module exposes the context handle API to C and JNI callers

pub mod context;
pub mod error;

// Re-export commonly used items
pub use context::{
    spoof_cuda_compile, spoof_cuda_compile_status, spoof_cuda_destroy, spoof_cuda_has_operator,
    spoof_cuda_initialize, spoof_cuda_operator_count, spoof_info_to_string,
};
pub use error::*;
