//! Shapes: geometric entities that can be equipped with operators.
//!
//! [`Shape`] is the capability every backing (graph, mesh, point cloud)
//! shares: read access to its vertices and edges, plus a typed slot per
//! [`OperatorKind`] holding an operator bound to that shape.

pub mod graph;

use crate::operator::{Operator, OperatorFactory, OperatorKind};
use crate::shape_error::ShapeError;
use crate::topology::point::{Edge, VertexId};
use hashbrown::HashMap;
use std::sync::Arc;

pub use graph::Graph;

/// Whether a shape is backed by a polygonal mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    Mesh,
    NonMesh,
}

/// Operators bound to a shape, one slot per [`OperatorKind`].
///
/// Slots hold `Arc`s so metrics built from the shape can keep using its
/// operators after the borrow ends.
#[derive(Debug, Default)]
pub struct OperatorSet {
    slots: [Option<Arc<dyn Operator>>; 3],
}

impl OperatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `operator` under `kind`, returning the operator it displaces.
    pub fn insert(
        &mut self,
        kind: OperatorKind,
        operator: Box<dyn Operator>,
    ) -> Option<Arc<dyn Operator>> {
        self.slots[kind.slot()].replace(Arc::from(operator))
    }

    #[inline]
    pub fn get(&self, kind: OperatorKind) -> Option<&dyn Operator> {
        self.slots[kind.slot()].as_deref()
    }

    /// A shared handle to the operator bound under `kind`.
    pub fn shared(&self, kind: OperatorKind) -> Option<Arc<dyn Operator>> {
        self.slots[kind.slot()].clone()
    }

    #[inline]
    pub fn contains(&self, kind: OperatorKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound kinds in slot order.
    pub fn kinds(&self) -> impl Iterator<Item = OperatorKind> + '_ {
        OperatorKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

/// A geometric entity that can carry operators.
pub trait Shape: Send + Sync {
    fn kind(&self) -> ShapeKind;

    fn is_mesh(&self) -> bool {
        self.kind() == ShapeKind::Mesh
    }

    /// Vertices in the shape's canonical order.
    fn vertices(&self) -> &[VertexId];

    fn n_vertices(&self) -> usize {
        self.vertices().len()
    }

    /// Undirected edges in the shape's canonical order.
    fn edges(&self) -> &[Edge];

    fn n_edges(&self) -> usize {
        self.edges().len()
    }

    /// Edges as positions into [`vertices`](Self::vertices).
    ///
    /// Fails with [`ShapeError::UnknownVertex`] if an edge references a
    /// vertex outside the vertex sequence.
    fn edge_indices(&self) -> Result<Vec<(usize, usize)>, ShapeError> {
        let index: HashMap<VertexId, usize> = self
            .vertices()
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();
        let lookup = |v: VertexId| index.get(&v).copied().ok_or(ShapeError::UnknownVertex(v));
        self.edges()
            .iter()
            .map(|&(u, v)| -> Result<(usize, usize), ShapeError> {
                Ok((lookup(u)?, lookup(v)?))
            })
            .collect()
    }

    fn operators(&self) -> &OperatorSet;

    fn operators_mut(&mut self) -> &mut OperatorSet;

    fn operator(&self, kind: OperatorKind) -> Option<&dyn Operator> {
        self.operators().get(kind)
    }

    fn has_operator(&self, kind: OperatorKind) -> bool {
        self.operators().contains(kind)
    }

    /// The operator bound under `kind`, or [`ShapeError::OperatorNotEquipped`].
    fn require_operator(&self, kind: OperatorKind) -> Result<Arc<dyn Operator>, ShapeError> {
        self.operators()
            .shared(kind)
            .ok_or(ShapeError::OperatorNotEquipped(kind))
    }

    /// Bind `kind → factory(self)`.
    ///
    /// An operator already bound under `kind` is replaced; the replacement is
    /// logged at `warn` level. Factory failures propagate and leave the
    /// existing binding untouched.
    fn equip_with_operator(
        &mut self,
        kind: OperatorKind,
        factory: OperatorFactory,
    ) -> Result<(), ShapeError>
    where
        Self: Sized,
    {
        let operator = factory(&*self)?;
        if self.operators_mut().insert(kind, operator).is_some() {
            log::warn!("operator `{kind}` was already equipped; overwriting");
        } else {
            log::debug!("equipped operator `{kind}`");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{FaceOrientation, FaceValuedGradient};

    /// A bare shape with explicit vertex and edge lists.
    struct Wire {
        vertices: Vec<VertexId>,
        edges: Vec<Edge>,
        operators: OperatorSet,
    }

    impl Shape for Wire {
        fn kind(&self) -> ShapeKind {
            ShapeKind::Mesh
        }
        fn vertices(&self) -> &[VertexId] {
            &self.vertices
        }
        fn edges(&self) -> &[Edge] {
            &self.edges
        }
        fn operators(&self) -> &OperatorSet {
            &self.operators
        }
        fn operators_mut(&mut self) -> &mut OperatorSet {
            &mut self.operators
        }
    }

    fn wire(vertices: &[i64], edges: &[(i64, i64)]) -> Wire {
        Wire {
            vertices: vertices.iter().map(|&v| VertexId::new(v)).collect(),
            edges: edges
                .iter()
                .map(|&(u, v)| (VertexId::new(u), VertexId::new(v)))
                .collect(),
            operators: OperatorSet::new(),
        }
    }

    #[test]
    fn default_edge_indices_follow_vertex_order() {
        let w = wire(&[10, 20, 30], &[(30, 10), (20, 30)]);
        assert_eq!(w.edge_indices().unwrap(), vec![(2, 0), (1, 2)]);
        assert!(w.is_mesh());
    }

    #[test]
    fn dangling_edge_is_unknown_vertex() {
        let w = wire(&[1, 2], &[(1, 7)]);
        assert_eq!(
            w.edge_indices().unwrap_err(),
            ShapeError::UnknownVertex(VertexId::new(7))
        );
    }

    #[test]
    fn equip_binds_and_overwrites() {
        let mut w = wire(&[1, 2], &[(1, 2)]);
        assert!(w.operators().is_empty());
        w.equip_with_operator(OperatorKind::FaceValuedGradient, FaceValuedGradient::from_registry)
            .unwrap();
        assert!(w.has_operator(OperatorKind::FaceValuedGradient));
        assert_eq!(
            w.operator(OperatorKind::FaceValuedGradient).unwrap().kind(),
            OperatorKind::FaceValuedGradient
        );

        // Rebinding a slot with a different implementation replaces it.
        w.equip_with_operator(OperatorKind::FaceValuedGradient, FaceOrientation::from_registry)
            .unwrap();
        assert_eq!(w.operators().len(), 1);
        assert_eq!(
            w.operator(OperatorKind::FaceValuedGradient).unwrap().kind(),
            OperatorKind::FaceOrientation
        );
    }

    #[test]
    fn failing_factory_keeps_previous_binding() {
        fn broken(_: &dyn Shape) -> Result<Box<dyn Operator>, ShapeError> {
            Err(ShapeError::InvalidConfig("broken".into()))
        }
        let mut w = wire(&[1, 2], &[(1, 2)]);
        w.equip_with_operator(OperatorKind::FaceDivergence, FaceOrientation::from_registry)
            .unwrap();
        assert!(w.equip_with_operator(OperatorKind::FaceDivergence, broken).is_err());
        assert!(w.has_operator(OperatorKind::FaceDivergence));
        assert_eq!(w.operators().kinds().collect::<Vec<_>>(), vec![OperatorKind::FaceDivergence]);
    }

    #[test]
    fn required_operator_is_shared_or_reported() {
        let mut w = wire(&[1, 2], &[(1, 2)]);
        assert_eq!(
            w.require_operator(OperatorKind::FaceValuedGradient).unwrap_err(),
            ShapeError::OperatorNotEquipped(OperatorKind::FaceValuedGradient)
        );
        w.equip_with_operator(OperatorKind::FaceValuedGradient, FaceValuedGradient::from_registry)
            .unwrap();
        let grad = w.require_operator(OperatorKind::FaceValuedGradient).unwrap();
        assert_eq!(grad.apply(&[1.0, 3.0]).unwrap(), vec![2.0]);
    }
}
