// Compiler Backend Abstraction
//
// Trait for the external JIT toolchain (NVRTC, or a stand-in in tests)

use crate::compiler::options::CompileRequest;
use crate::compiler::program::CompiledProgram;
use crate::core::error::{Result, SpoofError};

/// JIT backend trait
///
/// A backend turns kernel source into a program for one device. It is called
/// synchronously and may block for seconds.
pub trait Backend: Send + Sync {
    /// Compile one kernel source
    ///
    /// Rejected sources must surface as `SpoofError::CompilationFailed`.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledProgram>;

    /// Get backend name
    fn name(&self) -> &str;
}

/// Backend used when the crate is built without CUDA support
///
/// Fails every request as a toolchain error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBackend;

impl Backend for DisabledBackend {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledProgram> {
        Err(SpoofError::CompilationFailed {
            name: request.name.to_string(),
            log: "built without the `cuda` feature; no JIT compiler available".to_string(),
        })
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Backend a new context gets when none is supplied
#[cfg(feature = "cuda")]
pub fn default_backend() -> Box<dyn Backend> {
    Box::new(crate::compiler::nvrtc_backend::NvrtcBackend::new())
}

/// Backend a new context gets when none is supplied
#[cfg(not(feature = "cuda"))]
pub fn default_backend() -> Box<dyn Backend> {
    Box::new(DisabledBackend)
}
