// Compiler Module: JIT compilation infrastructure

pub mod backend;
pub mod cache;
#[cfg(feature = "cuda")]
pub mod nvrtc_backend;
pub mod options;
pub mod program;

// Re-exports
pub use backend::{default_backend, Backend, DisabledBackend};
pub use cache::{CacheKey, CacheStats, CachedProgram, CompilationCache};
#[cfg(feature = "cuda")]
pub use nvrtc_backend::NvrtcBackend;
pub use options::{CompileOptions, CompileRequest};
pub use program::CompiledProgram;
