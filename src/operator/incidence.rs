//! Graph operators built from the oriented vertex/edge incidence structure.
//!
//! Edges are the top-dimensional cells of a graph, so the "face" fields these
//! operators consume and produce have one entry per edge, ordered like
//! [`Shape::edges`]. Edge `e = (u_e, v_e)` is oriented from `u_e` to `v_e`.
//!
//! - gradient: `(∇f)_e = f(v_e) - f(u_e)`
//! - divergence: `div = -∇ᵀ`, so `⟨∇f, X⟩ = -⟨f, div X⟩`
//! - orientation: re-express an edge field in ascending-id orientation

use super::{Operator, OperatorKind, check_field_len};
use crate::shape::Shape;
use crate::shape_error::ShapeError;

/// Dense incidence data shared by the graph operators.
#[derive(Clone, Debug)]
struct Incidence {
    n_vertices: usize,
    edges: Vec<(usize, usize)>,
}

impl Incidence {
    fn from_shape(shape: &dyn Shape) -> Result<Self, ShapeError> {
        Ok(Self {
            n_vertices: shape.n_vertices(),
            edges: shape.edge_indices()?,
        })
    }
}

/// Edge-valued gradient of a vertex field.
#[derive(Clone, Debug)]
pub struct FaceValuedGradient {
    incidence: Incidence,
}

impl FaceValuedGradient {
    pub fn new(shape: &dyn Shape) -> Result<Self, ShapeError> {
        Ok(Self {
            incidence: Incidence::from_shape(shape)?,
        })
    }

    /// Registry entry point.
    pub fn from_registry(shape: &dyn Shape) -> Result<Box<dyn Operator>, ShapeError> {
        Ok(Box::new(Self::new(shape)?))
    }
}

impl Operator for FaceValuedGradient {
    fn kind(&self) -> OperatorKind {
        OperatorKind::FaceValuedGradient
    }

    fn input_len(&self) -> usize {
        self.incidence.n_vertices
    }

    fn output_len(&self) -> usize {
        self.incidence.edges.len()
    }

    fn apply(&self, field: &[f64]) -> Result<Vec<f64>, ShapeError> {
        check_field_len(self.kind(), self.input_len(), field)?;
        Ok(self
            .incidence
            .edges
            .iter()
            .map(|&(u, v)| field[v] - field[u])
            .collect())
    }
}

/// Vertex divergence of an edge field.
#[derive(Clone, Debug)]
pub struct FaceDivergence {
    incidence: Incidence,
}

impl FaceDivergence {
    pub fn new(shape: &dyn Shape) -> Result<Self, ShapeError> {
        Ok(Self {
            incidence: Incidence::from_shape(shape)?,
        })
    }

    /// Registry entry point.
    pub fn from_registry(shape: &dyn Shape) -> Result<Box<dyn Operator>, ShapeError> {
        Ok(Box::new(Self::new(shape)?))
    }
}

impl Operator for FaceDivergence {
    fn kind(&self) -> OperatorKind {
        OperatorKind::FaceDivergence
    }

    fn input_len(&self) -> usize {
        self.incidence.edges.len()
    }

    fn output_len(&self) -> usize {
        self.incidence.n_vertices
    }

    fn apply(&self, field: &[f64]) -> Result<Vec<f64>, ShapeError> {
        check_field_len(self.kind(), self.input_len(), field)?;
        let mut out = vec![0.0; self.incidence.n_vertices];
        for (&(u, v), &x) in self.incidence.edges.iter().zip(field) {
            // self-loops cancel
            out[u] += x;
            out[v] -= x;
        }
        Ok(out)
    }
}

/// Maps an edge field onto the ascending-id orientation of each edge.
///
/// Entries on edges stored as `(u, v)` with `u > v` flip sign; self-loops
/// carry no orientation and map to zero.
#[derive(Clone, Debug)]
pub struct FaceOrientation {
    signs: Vec<f64>,
}

impl FaceOrientation {
    pub fn new(shape: &dyn Shape) -> Result<Self, ShapeError> {
        let signs = shape
            .edges()
            .iter()
            .map(|&(u, v)| match u.cmp(&v) {
                std::cmp::Ordering::Less => 1.0,
                std::cmp::Ordering::Greater => -1.0,
                std::cmp::Ordering::Equal => 0.0,
            })
            .collect();
        Ok(Self { signs })
    }

    /// Registry entry point.
    pub fn from_registry(shape: &dyn Shape) -> Result<Box<dyn Operator>, ShapeError> {
        Ok(Box::new(Self::new(shape)?))
    }

    /// Per-edge orientation signs.
    pub fn signs(&self) -> &[f64] {
        &self.signs
    }
}

impl Operator for FaceOrientation {
    fn kind(&self) -> OperatorKind {
        OperatorKind::FaceOrientation
    }

    fn input_len(&self) -> usize {
        self.signs.len()
    }

    fn output_len(&self) -> usize {
        self.signs.len()
    }

    fn apply(&self, field: &[f64]) -> Result<Vec<f64>, ShapeError> {
        check_field_len(self.kind(), self.input_len(), field)?;
        Ok(self.signs.iter().zip(field).map(|(s, x)| s * x).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::graph::Graph;

    fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn gradient_of_constant_vanishes() {
        let g = Graph::new([(0, 1), (1, 2), (2, 0)]).unwrap();
        let grad = FaceValuedGradient::new(&g).unwrap();
        assert_eq!(grad.apply(&[4.0, 4.0, 4.0]).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn gradient_follows_edge_orientation() {
        // edges enumerate as (0,1), (0,2), (1,2)
        let g = Graph::new([(0, 1), (1, 2), (2, 0)]).unwrap();
        let grad = FaceValuedGradient::new(&g).unwrap();
        assert_eq!(grad.apply(&[1.0, 2.0, 4.0]).unwrap(), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn divergence_is_negative_adjoint() {
        let g = Graph::new([(3, 1), (1, 4), (4, 3), (4, 5)]).unwrap();
        let grad = FaceValuedGradient::new(&g).unwrap();
        let div = FaceDivergence::new(&g).unwrap();
        let f = [0.5, -1.0, 2.0, 3.5];
        let x = [1.0, -2.0, 0.25, 4.0];
        let lhs = dot(&grad.apply(&f).unwrap(), &x);
        let rhs = -dot(&f, &div.apply(&x).unwrap());
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn divergence_sums_to_zero() {
        let g = Graph::new([(0, 1), (1, 2), (2, 3)]).unwrap();
        let div = FaceDivergence::new(&g).unwrap();
        let out = div.apply(&[1.0, 2.0, 3.0]).unwrap();
        assert!(out.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn orientation_flips_descending_edges() {
        let g = Graph::new([(2, 1), (1, 1), (1, 3)]).unwrap();
        let orient = FaceOrientation::new(&g).unwrap();
        // edges: (2,1), (1,1), (1,3)
        assert_eq!(orient.signs(), &[-1.0, 0.0, 1.0]);
        assert_eq!(orient.apply(&[2.0, 5.0, 3.0]).unwrap(), vec![-2.0, 0.0, 3.0]);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let g = Graph::new([(0, 1)]).unwrap();
        let grad = FaceValuedGradient::new(&g).unwrap();
        let err = grad.apply(&[1.0]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::FieldLengthMismatch {
                operator: OperatorKind::FaceValuedGradient,
                expected: 2,
                found: 1,
            }
        );
    }
}
