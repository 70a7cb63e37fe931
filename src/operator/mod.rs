//! Differential operators bound to a shape.
//!
//! An operator is produced by an [`OperatorFactory`] applied to a shape and
//! keeps whatever geometry it needs, so it stays valid independently of the
//! borrow it was built from. Factories are looked up by [`OperatorKind`] in an
//! [`OperatorRegistry`](registry::OperatorRegistry).

pub mod incidence;
pub mod registry;

use crate::shape::Shape;
use crate::shape_error::ShapeError;
use std::fmt;
use std::str::FromStr;

pub use incidence::{FaceDivergence, FaceOrientation, FaceValuedGradient};
pub use registry::OperatorRegistry;

/// The closed set of operators a shape can carry.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum OperatorKind {
    /// Vertex field → per-face (per-edge on a graph) gradient.
    FaceValuedGradient,
    /// Per-face field → vertex divergence.
    FaceDivergence,
    /// Per-face field → field expressed in the canonical face orientation.
    FaceOrientation,
}

impl OperatorKind {
    /// Every kind, in slot order.
    pub const ALL: [OperatorKind; 3] = [
        OperatorKind::FaceValuedGradient,
        OperatorKind::FaceDivergence,
        OperatorKind::FaceOrientation,
    ];

    /// Registry name of the operator.
    pub const fn name(self) -> &'static str {
        match self {
            OperatorKind::FaceValuedGradient => "face_valued_gradient",
            OperatorKind::FaceDivergence => "face_divergence",
            OperatorKind::FaceOrientation => "face_orientation_operator",
        }
    }

    /// Dense slot index, stable across releases.
    #[inline]
    pub const fn slot(self) -> usize {
        match self {
            OperatorKind::FaceValuedGradient => 0,
            OperatorKind::FaceDivergence => 1,
            OperatorKind::FaceOrientation => 2,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperatorKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ShapeError::UnknownOperatorName(s.to_string()))
    }
}

/// A shape-bound linear operator on discrete fields.
pub trait Operator: fmt::Debug + Send + Sync {
    fn kind(&self) -> OperatorKind;

    /// Number of entries `apply` expects.
    fn input_len(&self) -> usize;

    /// Number of entries `apply` returns.
    fn output_len(&self) -> usize;

    /// Apply the operator to `field`.
    ///
    /// Fails with [`ShapeError::FieldLengthMismatch`] if `field` does not
    /// have [`input_len`](Self::input_len) entries.
    fn apply(&self, field: &[f64]) -> Result<Vec<f64>, ShapeError>;
}

/// Builds an operator bound to the given shape.
pub type OperatorFactory = fn(&dyn Shape) -> Result<Box<dyn Operator>, ShapeError>;

#[inline]
pub(crate) fn check_field_len(
    operator: OperatorKind,
    expected: usize,
    field: &[f64],
) -> Result<(), ShapeError> {
    if field.len() != expected {
        return Err(ShapeError::FieldLengthMismatch {
            operator,
            expected,
            found: field.len(),
        });
    }
    Ok(())
}
