// Core Layer: Execution Context
//
// One context per device association. It owns the operator registry, the
// compilation cache and the compiler backend; nothing is shared between contexts.

use crate::classifier::classify;
use crate::compiler::backend::{default_backend, Backend};
use crate::compiler::cache::{CacheStats, CompilationCache};
use crate::compiler::options::{process_env, CompileOptions, CompileRequest};
use crate::core::error::{Result, SpoofError};
use crate::core::operator::{CompiledOperator, OperatorRegistry};
use std::sync::Arc;

/// Compilation scope bound to one device
pub struct ExecutionContext {
    device_id: u32,
    options: CompileOptions,
    backend: Box<dyn Backend>,
    cache: CompilationCache,
    operators: OperatorRegistry,
}

impl ExecutionContext {
    /// Create an empty context for `device_id` with the default backend
    ///
    /// Does not bind the device; that is the caller's runtime's job.
    pub fn new(device_id: u32) -> Self {
        Self::with_backend(device_id, CompileOptions::new(), default_backend())
    }

    /// Create an empty context with explicit options and backend
    pub fn with_backend(device_id: u32, options: CompileOptions, backend: Box<dyn Backend>) -> Self {
        log::debug!(
            "Creating execution context for device {} ({} backend)",
            device_id,
            backend.name()
        );
        let cache = CompilationCache::new(options.cache_size_mb);
        Self {
            device_id,
            options,
            backend,
            cache,
            operators: OperatorRegistry::new(),
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Compile `source` and register it under `name`
    ///
    /// The toolchain root is read from the process environment.
    pub fn compile(&mut self, source: &str, name: &str) -> Result<Arc<CompiledOperator>> {
        self.compile_with_env(source, name, &process_env)
    }

    /// Compile `source` and register it under `name`, resolving the toolchain
    /// root through `env`
    ///
    /// On any error the registry is left untouched and the context stays usable.
    pub fn compile_with_env(
        &mut self,
        source: &str,
        name: &str,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Arc<CompiledOperator>> {
        if name.is_empty() {
            return Err(SpoofError::InvalidArgument("kernel name is empty".to_string()));
        }
        if source.is_empty() {
            return Err(SpoofError::InvalidArgument(format!("kernel '{}' has empty source", name)));
        }

        log::info!("compiling cuda kernel {}\n{}", name, source);

        let toolchain_root = self.options.resolve_toolchain_root(env)?;
        let classification = classify(source);
        let include_flags = self.options.include_flags(&toolchain_root);

        let request = CompileRequest {
            name,
            source,
            variant: self.options.variant,
            include_flags: &include_flags,
            device_id: self.device_id,
        };
        let program = self
            .cache
            .get_or_compile(&request, self.backend.as_ref())
            .map_err(|e| {
                log::warn!("Kernel '{}' failed to compile: {}", name, e);
                e
            })?;

        let op = CompiledOperator::new(program, classification.agg_type, classification.agg_op);
        if self.operators.insert(name, op).is_some() {
            log::debug!("Replaced previously registered kernel '{}'", name);
        }

        self.operators
            .get(name)
            .ok_or_else(|| SpoofError::Panic(format!("kernel '{}' vanished after insert", name)))
    }

    /// Look up a registered operator
    pub fn operator(&self, name: &str) -> Option<Arc<CompiledOperator>> {
        self.operators.get(name)
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        log::trace!(
            "Releasing context of device {}: {} operators, {} cached programs",
            self.device_id,
            self.operators.len(),
            self.cache.stats().num_entries
        );
    }
}
