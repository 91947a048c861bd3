// Context Operations
//
// Handle-based entry points over a process-wide table of execution contexts.
// A handle is an opaque u64 that stays valid until `destroy`; afterwards every
// operation on it reports InvalidHandle (or is a no-op for `destroy`).
//
// Each context sits behind its own mutex. The table lock is only held while
// resolving a handle, never during compilation.

use crate::compiler::backend::Backend;
use crate::compiler::options::CompileOptions;
use crate::core::context::ExecutionContext;
use crate::core::error::Result;
use crate::core::handles::{Handle, NULL_HANDLE};
use crate::core::operator::CompiledOperator;
use parking_lot::Mutex;
use std::sync::Arc;

crate::define_handle_registry!(CONTEXTS, Mutex<ExecutionContext>);

/// Create a context for `device_id` with the default backend and options
pub fn initialize(device_id: u32) -> Handle {
    log::info!("initializing cuda device {}", device_id);
    register(ExecutionContext::new(device_id))
}

/// Create a context with an explicit backend and options
pub fn initialize_with_backend(
    device_id: u32,
    options: CompileOptions,
    backend: Box<dyn Backend>,
) -> Handle {
    register(ExecutionContext::with_backend(device_id, options, backend))
}

fn register(ctx: ExecutionContext) -> Handle {
    let handle = CONTEXTS.insert(Mutex::new(ctx));
    log::trace!("Registered context handle {:#x}", handle);
    handle
}

/// Release a context and everything it owns
///
/// Null, unknown and already-destroyed handles are ignored.
pub fn destroy(handle: Handle, device_id: u32) {
    if handle == NULL_HANDLE {
        return;
    }
    match CONTEXTS.remove(handle) {
        Ok(_) => log::debug!("Destroyed context {:#x} of device {}", handle, device_id),
        Err(e) => log::trace!("Ignoring destroy of {:#x}: {}", handle, e),
    }
}

/// Run `f` with exclusive access to the context behind `handle`
///
/// The context lock is not reentrant: calling `with_context`, `compile` or
/// `lookup` on the same handle from inside `f` deadlocks. Use the
/// `ExecutionContext` passed to `f` instead.
pub fn with_context<R>(handle: Handle, f: impl FnOnce(&mut ExecutionContext) -> R) -> Result<R> {
    let ctx: Arc<Mutex<ExecutionContext>> = CONTEXTS.get(handle)?;
    let mut guard = ctx.lock();
    Ok(f(&mut guard))
}

/// Compile `source` under `name` in the context behind `handle`
pub fn compile(handle: Handle, source: &str, name: &str) -> Result<Arc<CompiledOperator>> {
    with_context(handle, |ctx| ctx.compile(source, name))?
}

/// Compile with an explicit environment lookup for the toolchain root
pub fn compile_with_env(
    handle: Handle,
    source: &str,
    name: &str,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<Arc<CompiledOperator>> {
    with_context(handle, |ctx| ctx.compile_with_env(source, name, env))?
}

/// Look up an operator registered in the context behind `handle`
pub fn lookup(handle: Handle, name: &str) -> Result<Option<Arc<CompiledOperator>>> {
    with_context(handle, |ctx| ctx.operator(name))
}

/// Check if `handle` names a live context
pub fn is_live(handle: Handle) -> bool {
    CONTEXTS.contains(handle)
}
