// Core Layer: Rust Implementation Module
//
// Execution contexts, compiled operators, handles and errors

pub mod context;
pub mod error;
pub mod handles;
pub mod operator;

// Re-export commonly used types
pub use context::ExecutionContext;
pub use error::{Result, SpoofError};
pub use handles::{Handle, HandleRegistry, NULL_HANDLE};
pub use operator::{AggOp, AggType, CompiledOperator, OperatorRegistry, OutputDims};
