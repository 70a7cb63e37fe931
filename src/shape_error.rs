//! ShapeError: Unified error type for shape-graph public APIs
//!
//! Every fallible operation in the crate returns this error so callers can
//! propagate failures with `?` instead of matching on per-module types.

use crate::metric::heat::HeatBackend;
use crate::operator::OperatorKind;
use crate::topology::point::VertexId;
use thiserror::Error;

/// Unified error type for shape and graph operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    /// The edge-list file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(String),
    /// A row of an edge-list file could not be converted into an edge.
    #[error("edge list parse error on line {line}: {reason}")]
    EdgeListParse { line: usize, reason: String },
    /// No factory is registered for the requested operator.
    #[error("no operator registered for `{0}`")]
    UnregisteredOperator(OperatorKind),
    /// The shape has no operator bound under this kind.
    #[error("operator `{0}` is not equipped on this shape")]
    OperatorNotEquipped(OperatorKind),
    /// A string did not name any known operator kind.
    #[error("unknown operator name `{0}`")]
    UnknownOperatorName(String),
    /// No factory is registered for the requested heat-distance backend.
    #[error("no heat-distance backend registered for `{0}`")]
    UnregisteredHeatBackend(HeatBackend),
    /// A string did not name any known heat-distance backend.
    #[error("unknown heat-distance backend `{0}`")]
    UnknownHeatBackend(String),
    /// Distances were requested before a metric was equipped.
    #[error("no metric equipped on this shape")]
    MetricNotEquipped,
    /// The vertex id does not belong to this shape.
    #[error("vertex {0} is not part of this shape")]
    UnknownVertex(VertexId),
    /// A dense vertex index is past the end of the vertex sequence.
    #[error("vertex index {index} out of range for {len} vertices")]
    VertexIndexOutOfRange { index: usize, len: usize },
    /// A metric produced a distance row of the wrong length.
    #[error("distance row {row} has length {found}, expected {expected}")]
    DistanceRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A field handed to an operator has the wrong number of entries.
    #[error("operator `{operator}` expects a field of length {expected}, got {found}")]
    FieldLengthMismatch {
        operator: OperatorKind,
        expected: usize,
        found: usize,
    },
    /// The iterative linear solver hit its iteration cap.
    #[error("linear solver did not converge after {iterations} iterations (residual {residual:e})")]
    SolverDidNotConverge { iterations: usize, residual: f64 },
    /// A structural invariant of a shape does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for ShapeError {
    fn from(err: std::io::Error) -> Self {
        ShapeError::Io(err.to_string())
    }
}
