// SpoofCuda: JIT compilation runtime for generated CUDA kernels
//
// Kernels arrive as generated CUDA C++ source plus a logical name. The runtime
// compiles them for the context's device, reads their aggregation metadata from
// the source text and keeps the result for later dispatch under that name.
//
// Architecture:
// - Layer 1 (ffi): C API with integer context handles and status codes
// - Layer 2 (ops): handle-based operations over a process-wide context table
// - Layer 3 (core): execution contexts, operator registry, handles, errors
// - classifier: aggregation type/operator from kernel source markers
// - compiler: backend trait, NVRTC backend, per-context compilation cache

// Public modules
pub mod classifier;
pub mod compiler;
pub mod core;
pub mod ffi;
pub mod ops;

// Re-export commonly used items for convenience
pub use classifier::{classify, Classification, ClassifyWarning};
pub use compiler::{Backend, CompileOptions, CompileRequest, CompiledProgram};
pub use crate::core::{AggOp, AggType, CompiledOperator, ExecutionContext, Handle, Result, SpoofError};

// FFI exports are automatically available through #[no_mangle]
// functions in the ffi module
