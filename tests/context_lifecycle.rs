// Context Lifecycle Tests
//
// Exercises the handle API end to end: initialize → compile → lookup → destroy,
// with a stand-in backend so no GPU or CUDA toolkit is required.

use spoof_cuda::compiler::{Backend, CompileOptions, CompileRequest, CompiledProgram};
use spoof_cuda::core::{AggOp, AggType, SpoofError, NULL_HANDLE};
use spoof_cuda::ffi::{SPOOF_COMPILATION_FAILED, SPOOF_MISSING_TOOLCHAIN_ROOT};
use spoof_cuda::{classify, ops};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend that "compiles" by echoing the source, rejecting `#error`
struct FakeNvrtc {
    calls: Arc<AtomicUsize>,
}

impl Backend for FakeNvrtc {
    fn compile(&self, request: &CompileRequest<'_>) -> spoof_cuda::Result<CompiledProgram> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.source.contains("#error") {
            return Err(SpoofError::CompilationFailed {
                name: request.name.to_string(),
                log: "kernel.cu(1): error: #error directive".to_string(),
            });
        }
        Ok(CompiledProgram::new(
            format!(".entry {}", request.name),
            request.device_id,
            request.variant,
        ))
    }

    fn name(&self) -> &str {
        "fake-nvrtc"
    }
}

fn new_context(device_id: u32) -> (u64, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = FakeNvrtc { calls: calls.clone() };
    let handle = ops::initialize_with_backend(device_id, CompileOptions::new(), Box::new(backend));
    (handle, calls)
}

fn cuda_env(var: &str) -> Option<String> {
    (var == "CUDA_PATH").then(|| "/usr/local/cuda-12".to_string())
}

const ROW_SUM: &str = "// CellType.ROW_AGG\n// AggOp.SUM\nextern \"C\" __global__ void TMP10() {}";
const FULL_MIN: &str = "// CellType.FULL_AGG\n// AggOp.MIN\nextern \"C\" __global__ void TMP10() {}";

#[test]
fn test_round_trip_registration() {
    let (ctx, _) = new_context(0);

    ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).unwrap();

    let op = ops::lookup(ctx, "TMP10").unwrap().expect("operator registered");
    let expected = classify(ROW_SUM);
    assert_eq!((op.agg_type(), op.agg_op()), expected.pair());
    assert_eq!((op.agg_type(), op.agg_op()), (AggType::RowAgg, AggOp::Sum));
    assert_eq!(op.program().device_id(), 0);

    ops::destroy(ctx, 0);
}

#[test]
fn test_overwrite_replaces_entry() {
    let (ctx, calls) = new_context(0);

    ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).unwrap();
    ops::compile_with_env(ctx, FULL_MIN, "TMP10", &cuda_env).unwrap();

    let op = ops::lookup(ctx, "TMP10").unwrap().unwrap();
    assert_eq!(op.agg_type(), AggType::FullAgg);
    assert_eq!(op.agg_op(), AggOp::Min);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(ops::with_context(ctx, |c| c.operators().len()).unwrap(), 1);

    ops::destroy(ctx, 0);
}

#[test]
fn test_repeated_source_reuses_compiled_program() {
    let (ctx, calls) = new_context(0);

    let first = ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).unwrap();
    let again = ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(first.program(), again.program()));

    ops::destroy(ctx, 0);
}

#[test]
fn test_context_isolation() {
    let (a, _) = new_context(0);
    let (b, _) = new_context(1);
    assert_ne!(a, b);

    ops::compile_with_env(a, ROW_SUM, "TMP10", &cuda_env).unwrap();
    ops::compile_with_env(b, FULL_MIN, "TMP11", &cuda_env).unwrap();

    assert!(ops::lookup(a, "TMP11").unwrap().is_none());
    assert!(ops::lookup(b, "TMP10").unwrap().is_none());

    ops::destroy(a, 0);

    let op = ops::lookup(b, "TMP11").unwrap().unwrap();
    assert_eq!(op.agg_type(), AggType::FullAgg);
    assert_eq!(op.program().device_id(), 1);

    ops::destroy(b, 1);
}

#[test]
fn test_destroy_safety() {
    let (ctx, _) = new_context(0);

    ops::destroy(ctx, 0);
    ops::destroy(ctx, 0);
    ops::destroy(NULL_HANDLE, 0);

    assert!(!ops::is_live(ctx));
    assert_eq!(
        ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).unwrap_err(),
        SpoofError::InvalidHandle
    );
}

#[test]
fn test_stale_handle_does_not_reach_new_context() {
    let (old, _) = new_context(0);
    ops::destroy(old, 0);

    let (new, _) = new_context(0);
    ops::compile_with_env(new, ROW_SUM, "TMP10", &cuda_env).unwrap();

    assert_ne!(old, new);
    assert_eq!(ops::lookup(old, "TMP10").unwrap_err(), SpoofError::InvalidHandle);

    ops::destroy(new, 0);
}

#[test]
fn test_missing_environment_is_distinct_from_compile_failure() {
    let (ctx, calls) = new_context(0);

    let env_err = ops::compile_with_env(ctx, ROW_SUM, "TMP10", &|_| None).unwrap_err();
    assert!(matches!(env_err, SpoofError::MissingToolchainRoot { ref var } if var == "CUDA_PATH"));
    assert!(ops::lookup(ctx, "TMP10").unwrap().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let compile_err = ops::compile_with_env(ctx, "#error nope", "TMP12", &cuda_env).unwrap_err();
    assert!(compile_err.is_compilation_failure());
    assert!(ops::lookup(ctx, "TMP12").unwrap().is_none());

    assert_eq!(env_err.to_spoof_info(), SPOOF_MISSING_TOOLCHAIN_ROOT);
    assert_eq!(compile_err.to_spoof_info(), SPOOF_COMPILATION_FAILED);

    // Context is still usable after both failures
    assert!(ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).is_ok());

    ops::destroy(ctx, 0);
}

#[test]
fn test_custom_toolchain_variable() {
    let calls = Arc::new(AtomicUsize::new(0));
    let ctx = ops::initialize_with_backend(
        0,
        CompileOptions::with_toolchain_env("SPOOF_TEST_CUDA_ROOT"),
        Box::new(FakeNvrtc { calls: calls.clone() }),
    );

    // CUDA_PATH alone is not enough once a different variable is configured
    assert!(ops::compile_with_env(ctx, ROW_SUM, "TMP10", &cuda_env).is_err());

    let env = |var: &str| (var == "SPOOF_TEST_CUDA_ROOT").then(|| "/opt/cuda".to_string());
    assert!(ops::compile_with_env(ctx, ROW_SUM, "TMP10", &env).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    ops::destroy(ctx, 0);
}
