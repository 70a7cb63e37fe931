//! Distance metrics bound to a shape.
//!
//! Metrics are chosen through the closed [`MetricKind`] enum. Each variant has
//! exactly one construction path:
//! - [`MetricKind::ShortestPath`] builds [`ShortestPathMetric`] from the shape;
//! - [`MetricKind::HeatDistance`] resolves a backend through the heat-distance
//!   registry ([`HeatDistanceMetric::from_registry`]);
//! - [`MetricKind::Custom`] calls a caller-supplied factory with the shape.

pub mod heat;
pub mod laplacian;
pub mod shortest_path;

use crate::shape::Shape;
use crate::shape_error::ShapeError;
use std::fmt;

pub use heat::{HeatBackend, HeatDistanceConfig, HeatDistanceMetric, HeatDistanceRegistry};
pub use shortest_path::ShortestPathMetric;

/// Builds a metric bound to the given shape.
pub type MetricFactory = fn(&dyn Shape) -> Result<Box<dyn Metric>, ShapeError>;

/// Selects how a metric is constructed for a shape.
#[derive(Clone, Copy, Debug)]
pub enum MetricKind {
    /// Hop-count shortest paths.
    ShortestPath,
    /// Heat distance, built by the named backend.
    HeatDistance(HeatBackend),
    /// Any other metric, built directly from the shape.
    Custom(MetricFactory),
}

impl MetricKind {
    /// Construct the metric this kind names, bound to `shape`.
    pub fn build(self, shape: &dyn Shape) -> Result<Box<dyn Metric>, ShapeError> {
        match self {
            MetricKind::ShortestPath => Ok(Box::new(ShortestPathMetric::new(shape)?)),
            MetricKind::HeatDistance(which) => HeatDistanceMetric::from_registry(which, shape),
            MetricKind::Custom(factory) => factory(shape),
        }
    }
}

/// A shape-bound distance function over dense vertex indices.
pub trait Metric: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of vertices of the bound shape.
    fn n_vertices(&self) -> usize;

    /// Distances from the vertex at `source` to every vertex.
    ///
    /// Unreachable vertices are at `f64::INFINITY`.
    fn dist_from(&self, source: usize) -> Result<Vec<f64>, ShapeError>;

    /// All pairwise distances.
    fn dist_matrix(&self) -> Result<DistanceMatrix, ShapeError> {
        DistanceMatrix::try_from_rows(self.n_vertices(), |i| self.dist_from(i))
    }
}

/// Neighbour lists of the simple graph underlying `shape`, by vertex index.
///
/// Self-loops are dropped and each neighbour appears once, in ascending
/// order.
pub(crate) fn simple_neighbors(shape: &dyn Shape) -> Result<Vec<Vec<usize>>, ShapeError> {
    let mut neighbors = vec![Vec::new(); shape.n_vertices()];
    for (u, v) in shape.edge_indices()? {
        if u != v {
            neighbors[u].push(v);
            neighbors[v].push(u);
        }
    }
    for nbrs in &mut neighbors {
        nbrs.sort_unstable();
        nbrs.dedup();
    }
    Ok(neighbors)
}

#[inline]
pub(crate) fn check_source(source: usize, len: usize) -> Result<(), ShapeError> {
    if source >= len {
        return Err(ShapeError::VertexIndexOutOfRange { index: source, len });
    }
    Ok(())
}

/// Dense row-major `n × n` distance matrix indexed by vertex position.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Build from `n` rows produced by `row`, checking each row's length.
    pub fn try_from_rows<F>(n: usize, mut row: F) -> Result<Self, ShapeError>
    where
        F: FnMut(usize) -> Result<Vec<f64>, ShapeError>,
    {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            let r = row(i)?;
            if r.len() != n {
                return Err(ShapeError::DistanceRowLength {
                    row: i,
                    expected: n,
                    found: r.len(),
                });
            }
            data.extend_from_slice(&r);
        }
        Ok(Self { n, data })
    }

    /// Side length.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.n && j < self.n {
            Some(self.data[i * self.n + j])
        } else {
            None
        }
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.n).then(|| &self.data[i * self.n..(i + 1) * self.n])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on zero; an empty matrix has no rows anyway
        self.data.chunks_exact(self.n.max(1))
    }

    /// Row-major backing storage.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
