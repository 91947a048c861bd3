// Core Layer: Compiled operators and the per-context operator registry

use crate::compiler::program::CompiledProgram;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How a kernel's output is reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggType {
    /// No aggregation declared or recognised
    None,
    NoAgg,
    FullAgg,
    RowAgg,
    ColAgg,
}

/// Reduction operator; only meaningful when the type is not NO_AGG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggOp {
    None,
    Sum,
    SumSq,
    Min,
    Max,
}

/// Output shape class implied by an aggregation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDims {
    /// Same shape as the main input
    Input,
    /// One value per row (rows x 1)
    Rows,
    /// One value per column (1 x cols)
    Columns,
    /// Single value
    Scalar,
    /// Aggregation type was not recognised
    Unknown,
}

impl AggType {
    /// Name as it appears in generated source
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::NoAgg => "NO_AGG",
            Self::FullAgg => "FULL_AGG",
            Self::RowAgg => "ROW_AGG",
            Self::ColAgg => "COL_AGG",
        }
    }

    /// Output shape of a kernel with this aggregation
    pub fn output_dims(&self) -> OutputDims {
        match self {
            Self::NoAgg => OutputDims::Input,
            Self::RowAgg => OutputDims::Rows,
            Self::ColAgg => OutputDims::Columns,
            Self::FullAgg => OutputDims::Scalar,
            Self::None => OutputDims::Unknown,
        }
    }

    /// True if the kernel reduces its output
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::FullAgg | Self::RowAgg | Self::ColAgg)
    }
}

impl AggOp {
    /// Name as it appears in generated source
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Sum => "SUM",
            Self::SumSq => "SUM_SQ",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

impl fmt::Display for AggType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully compiled kernel together with its aggregation metadata
///
/// Immutable once built; shared by Arc between the registry and callers.
#[derive(Debug)]
pub struct CompiledOperator {
    program: Arc<CompiledProgram>,
    agg_type: AggType,
    agg_op: AggOp,
}

impl CompiledOperator {
    pub fn new(program: Arc<CompiledProgram>, agg_type: AggType, agg_op: AggOp) -> Self {
        Self {
            program,
            agg_type,
            agg_op,
        }
    }

    pub fn program(&self) -> &Arc<CompiledProgram> {
        &self.program
    }

    pub fn agg_type(&self) -> AggType {
        self.agg_type
    }

    pub fn agg_op(&self) -> AggOp {
        self.agg_op
    }

    pub fn output_dims(&self) -> OutputDims {
        self.agg_type.output_dims()
    }
}

/// Map from kernel name to compiled operator
///
/// Inserting an existing name replaces the previous entry.
#[derive(Debug, Default)]
pub struct OperatorRegistry {
    ops: HashMap<String, Arc<CompiledOperator>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an operator, returning the one it replaced
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        op: CompiledOperator,
    ) -> Option<Arc<CompiledOperator>> {
        self.ops.insert(name.into(), Arc::new(op))
    }

    pub fn get(&self, name: &str) -> Option<Arc<CompiledOperator>> {
        self.ops.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<CompiledOperator>> {
        self.ops.remove(name)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Registered kernel names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}
