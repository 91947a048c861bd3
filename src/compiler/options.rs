// Compile Options
//
// Options controlling how a context invokes the JIT compiler:
// - Toolchain root: environment variable naming the CUDA installation
// - Kernel include dirs: headers shipped alongside the generated kernels
// - System include dirs: fixed CUDA header locations
// - Variant selector: kernel variant passed with every request
// - Cache budget: size limit of the per-context compilation cache
//
// Include flags are always emitted in this order, kernel dirs first, then
// system dirs, then `<toolchain root>/include`. Earlier paths win on lookup.

use crate::core::error::{Result, SpoofError};

/// Default environment variable holding the CUDA installation root
pub const DEFAULT_TOOLCHAIN_ENV: &str = "CUDA_PATH";

/// Header directories of the kernel source tree, relative to the working directory
pub const DEFAULT_KERNEL_INCLUDE_DIRS: [&str; 2] = [
    "./src/main/cpp/kernels/spoof_native_cuda/",
    "./src/main/cpp/kernels/",
];

/// Fixed CUDA header directories
pub const DEFAULT_SYSTEM_INCLUDE_DIRS: [&str; 2] = [
    "/usr/local/cuda/include",
    "/usr/local/cuda/include/cuda/std/detail/libcxx/include/",
];

/// Default cache budget in megabytes
pub const DEFAULT_CACHE_SIZE_MB: usize = 100;

/// Options for compiling kernels in one execution context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Environment variable naming the toolchain root
    pub toolchain_env: String,

    /// Kernel-tree include directories (highest precedence)
    pub kernel_include_dirs: Vec<String>,

    /// System CUDA include directories
    pub system_include_dirs: Vec<String>,

    /// Variant selector; 0 selects the default kernel variant
    pub variant: u32,

    /// Compilation cache budget in megabytes
    pub cache_size_mb: usize,
}

impl CompileOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self {
            toolchain_env: DEFAULT_TOOLCHAIN_ENV.to_string(),
            kernel_include_dirs: DEFAULT_KERNEL_INCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
            system_include_dirs: DEFAULT_SYSTEM_INCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
            variant: 0,
            cache_size_mb: DEFAULT_CACHE_SIZE_MB,
        }
    }

    /// Create options reading the toolchain root from a different variable
    pub fn with_toolchain_env(var: impl Into<String>) -> Self {
        Self {
            toolchain_env: var.into(),
            ..Self::new()
        }
    }

    /// Create options with a custom cache budget
    pub fn with_cache_size_mb(cache_size_mb: usize) -> Self {
        Self {
            cache_size_mb,
            ..Self::new()
        }
    }

    /// Set kernel include directories
    pub fn set_kernel_include_dirs(&mut self, dirs: Vec<String>) -> &mut Self {
        self.kernel_include_dirs = dirs;
        self
    }

    /// Set system include directories
    pub fn set_system_include_dirs(&mut self, dirs: Vec<String>) -> &mut Self {
        self.system_include_dirs = dirs;
        self
    }

    /// Set variant selector
    pub fn set_variant(&mut self, variant: u32) -> &mut Self {
        self.variant = variant;
        self
    }

    /// Set cache budget
    pub fn set_cache_size_mb(&mut self, cache_size_mb: usize) -> &mut Self {
        self.cache_size_mb = cache_size_mb;
        self
    }

    /// Look up the toolchain root through `env`
    ///
    /// An unset or empty variable is a configuration error.
    pub fn resolve_toolchain_root(&self, env: &dyn Fn(&str) -> Option<String>) -> Result<String> {
        match env(&self.toolchain_env) {
            Some(root) if !root.is_empty() => Ok(root),
            _ => {
                log::error!("{} is not set; cannot build the CUDA include path", self.toolchain_env);
                Err(SpoofError::MissingToolchainRoot {
                    var: self.toolchain_env.clone(),
                })
            }
        }
    }

    /// Ordered `-I` flags for a resolved toolchain root
    pub fn include_flags(&self, toolchain_root: &str) -> Vec<String> {
        self.kernel_include_dirs
            .iter()
            .chain(self.system_include_dirs.iter())
            .map(|dir| format!("-I{}", dir))
            .chain(std::iter::once(format!(
                "-I{}/include",
                toolchain_root.trim_end_matches('/')
            )))
            .collect()
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the process environment
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// One request to the compiler backend
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Logical kernel name (diagnostics only)
    pub name: &'a str,
    /// Raw kernel source text
    pub source: &'a str,
    /// Kernel variant selector
    pub variant: u32,
    /// Ordered include flags
    pub include_flags: &'a [String],
    /// Device the program is compiled for
    pub device_id: u32,
}
