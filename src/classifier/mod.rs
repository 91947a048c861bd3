// Source Classifier: aggregation metadata from generated kernel source
//
// The code generator writes the cell template's aggregation settings into the
// kernel text, e.g. `CellType.ROW_AGG` and `AggOp.SUM`. Rather than parsing the
// source, we look for the first marker and search a fixed window that starts
// at the marker for one of the known values.
//
// The window starts at the marker itself, so the marker's own characters are
// part of the 30 bytes searched. The window counts bytes, not characters, so
// multibyte text between the marker and its value shortens it.

use crate::core::operator::{AggOp, AggType};

/// Marker preceding the aggregation type
pub const CELL_TYPE_MARKER: &str = "CellType";

/// Marker preceding the aggregation operator
pub const AGG_OP_MARKER: &str = "AggOp";

/// Bytes inspected from the start of a marker
pub const MARKER_WINDOW: usize = 30;

/// Type values in match precedence order
const AGG_TYPE_TOKENS: [(&str, AggType); 4] = [
    ("FULL_AGG", AggType::FullAgg),
    ("ROW_AGG", AggType::RowAgg),
    ("COL_AGG", AggType::ColAgg),
    ("NO_AGG", AggType::NoAgg),
];

/// Operator values in match precedence order
const AGG_OP_TOKENS: [(&str, AggOp); 4] = [
    ("AggOp.SUM", AggOp::Sum),
    ("AggOp.SUM_SQ", AggOp::SumSq),
    ("AggOp.MIN", AggOp::Min),
    ("AggOp.MAX", AggOp::Max),
];

/// Non-fatal classification problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyWarning {
    /// `CellType` was found but no known type followed it
    UnknownAggType { window: String },
    /// `AggOp` was found but no known operator followed it
    UnknownAggOp { window: String },
}

/// Result of classifying one kernel source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub agg_type: AggType,
    pub agg_op: AggOp,
    pub warnings: Vec<ClassifyWarning>,
}

impl Classification {
    /// The (type, operator) pair without diagnostics
    pub fn pair(&self) -> (AggType, AggOp) {
        (self.agg_type, self.agg_op)
    }
}

/// Text window of at most MARKER_WINDOW bytes starting at `start`
///
/// The end is clamped to the source length and pulled back to a char boundary.
fn window_at(source: &str, start: usize) -> &str {
    let mut end = start.saturating_add(MARKER_WINDOW).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[start..end]
}

/// First token from `tokens` present in `window`, in table order
fn first_match<V: Copy>(window: &str, tokens: &[(&str, V)]) -> Option<V> {
    tokens
        .iter()
        .find(|(token, _)| window.contains(token))
        .map(|(_, value)| *value)
}

/// Classify a kernel's aggregation type and operator from its source text
///
/// Never fails: an unrecognised value leaves the field at NONE and records a
/// warning, which is also logged.
pub fn classify(source: &str) -> Classification {
    let mut result = Classification {
        agg_type: AggType::None,
        agg_op: AggOp::None,
        warnings: Vec::new(),
    };

    let Some(type_pos) = source.find(CELL_TYPE_MARKER) else {
        log::trace!("No {} marker, kernel declares no aggregation", CELL_TYPE_MARKER);
        return result;
    };

    let window = window_at(source, type_pos);
    match first_match(window, &AGG_TYPE_TOKENS) {
        Some(agg_type) => result.agg_type = agg_type,
        None => {
            log::warn!("unknown aggregation type near {:?}", window);
            result.warnings.push(ClassifyWarning::UnknownAggType {
                window: window.to_string(),
            });
        }
    }

    if result.agg_type == AggType::NoAgg {
        return result;
    }

    if let Some(op_pos) = source.find(AGG_OP_MARKER) {
        let window = window_at(source, op_pos);
        match first_match(window, &AGG_OP_TOKENS) {
            Some(agg_op) => result.agg_op = agg_op,
            None => {
                log::warn!("unknown aggregation operator near {:?}", window);
                result.warnings.push(ClassifyWarning::UnknownAggOp {
                    window: window.to_string(),
                });
            }
        }
    }

    log::debug!("Classified kernel as ({:?}, {:?})", result.agg_type, result.agg_op);
    result
}
