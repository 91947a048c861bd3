// NVRTC Backend: JIT compilation of CUDA C++ through cudarc
//
// Compiles kernel source to PTX at runtime. Include flags are passed through
// verbatim so their order is preserved.

use crate::compiler::backend::Backend;
use crate::compiler::options::CompileRequest;
use crate::compiler::program::CompiledProgram;
use crate::core::error::{Result, SpoofError};
use cudarc::nvrtc::{compile_ptx_with_opts, CompileOptions as NvrtcOptions};

/// NVRTC JIT backend
#[derive(Debug, Default)]
pub struct NvrtcBackend {
    /// Target architecture, e.g. "sm_80"; NVRTC's default when None
    arch: Option<&'static str>,
}

impl NvrtcBackend {
    /// Create a new NVRTC backend
    pub fn new() -> Self {
        Self { arch: None }
    }

    /// Create a backend targeting a specific architecture
    pub fn with_arch(arch: &'static str) -> Self {
        Self { arch: Some(arch) }
    }
}

impl Backend for NvrtcBackend {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledProgram> {
        log::debug!(
            "NVRTC compiling '{}' for device {} with {} include flags",
            request.name,
            request.device_id,
            request.include_flags.len()
        );

        let opts = NvrtcOptions {
            options: request.include_flags.to_vec(),
            arch: self.arch,
            ..Default::default()
        };

        let ptx = compile_ptx_with_opts(request.source, opts).map_err(|e| {
            SpoofError::CompilationFailed {
                name: request.name.to_string(),
                log: e.to_string(),
            }
        })?;

        log::trace!("NVRTC produced PTX for '{}'", request.name);
        Ok(CompiledProgram::new(ptx.to_src(), request.device_id, request.variant))
    }

    fn name(&self) -> &str {
        "nvrtc"
    }
}
