// Operations Module
//
// High-level, handle-based API used by the host runtime

pub mod context;

pub use context::{
    compile, compile_with_env, destroy, initialize, initialize_with_backend, is_live, lookup,
    with_context,
};
