//! Graph: a shape backed purely by vertex/edge adjacency.
//!
//! A [`Graph`] is built once from an edge list and never mutated afterwards.
//! Construction equips the three face operators from an operator registry.
//! A metric can be equipped later; its distance matrix is computed on first
//! use and dropped whenever the metric is replaced.
//!
//! ```rust
//! use shape_graph::prelude::*;
//!
//! let mut g = Graph::new([(0, 1), (1, 2), (2, 0)]).unwrap();
//! assert_eq!(g.n_vertices(), 3);
//! assert!(g.has_operator(OperatorKind::FaceValuedGradient));
//!
//! g.equip_with_metric(MetricKind::ShortestPath).unwrap();
//! assert_eq!(g.dist(VertexId::new(0), VertexId::new(2)).unwrap(), 1.0);
//! ```

use crate::debug_invariants::DebugInvariants;
use crate::io::{CsvEdgeListReader, CsvEdgeListWriter, EdgeListReader, EdgeListWriter};
use crate::metric::{DistanceMatrix, Metric, MetricKind};
use crate::operator::{OperatorKind, OperatorRegistry};
use crate::shape::{OperatorSet, Shape, ShapeKind};
use crate::shape_error::ShapeError;
use crate::topology::adjacency::AdjacencyGraph;
use crate::topology::cache::InvalidateCache;
use crate::topology::point::{Edge, VertexId};
use itertools::Itertools;
use once_cell::sync::OnceCell;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Graph-backed shape.
#[derive(Debug)]
pub struct Graph {
    adjacency: AdjacencyGraph,
    operators: OperatorSet,
    edges: OnceCell<Vec<Edge>>,
    vertex_signal: Option<Vec<f64>>,
    metric: Option<Box<dyn Metric>>,
    dist_matrix: OnceCell<DistanceMatrix>,
}

impl Graph {
    /// Build a graph from undirected `(u, v)` pairs and equip the default
    /// operators from the global [`OperatorRegistry`].
    pub fn new<I, U>(edges: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = (U, U)>,
        U: Into<VertexId>,
    {
        let registry = OperatorRegistry::global().read().clone();
        Self::with_registry(edges, &registry)
    }

    /// Like [`Graph::new`], resolving operators from `registry`.
    ///
    /// Fails with [`ShapeError::UnregisteredOperator`] if `registry` lacks
    /// one of the default operator kinds.
    pub fn with_registry<I, U>(edges: I, registry: &OperatorRegistry) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = (U, U)>,
        U: Into<VertexId>,
    {
        let adjacency = AdjacencyGraph::from_edges(edges);
        log::debug!(
            "graph: built adjacency with {} vertices and {} edges",
            adjacency.node_count(),
            adjacency.edge_count()
        );
        let mut graph = Self {
            adjacency,
            operators: OperatorSet::new(),
            edges: OnceCell::new(),
            vertex_signal: None,
            metric: None,
            dist_matrix: OnceCell::new(),
        };
        graph.at_init(registry)?;
        crate::debug_invariants!(graph.validate_invariants(), "Graph::with_registry");
        Ok(graph)
    }

    fn at_init(&mut self, registry: &OperatorRegistry) -> Result<(), ShapeError> {
        for kind in OperatorKind::ALL {
            let factory = registry.from_registry(kind)?;
            self.equip_with_operator(kind, factory)?;
        }
        Ok(())
    }

    /// Load a graph from a comma-separated edge-list file.
    ///
    /// The first line is a header; see [`crate::io::csv`] for the format.
    /// A missing file is [`ShapeError::Io`], a malformed record is
    /// [`ShapeError::EdgeListParse`]; neither yields a partial graph.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ShapeError> {
        let path = path.as_ref();
        log::debug!("graph: loading edge list from {}", path.display());
        let edges = {
            let file = File::open(path)?;
            CsvEdgeListReader.read(file)?
        };
        Self::new(edges)
    }

    /// Load a graph from comma-separated edge-list text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ShapeError> {
        Self::new(CsvEdgeListReader.read(reader)?)
    }

    /// Write the edge list (header `u,v`) so [`Graph::from_reader`] can
    /// load it back.
    pub fn write_edge_list<W: Write>(&self, writer: W) -> Result<(), ShapeError> {
        CsvEdgeListWriter::default().write(writer, self.edges())
    }

    /// The underlying adjacency structure.
    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.adjacency.contains(v)
    }

    /// Position of `v` in [`vertices`](Shape::vertices).
    pub fn vertex_index(&self, v: VertexId) -> Option<usize> {
        self.adjacency.index_of(v)
    }

    fn require_index(&self, v: VertexId) -> Result<usize, ShapeError> {
        self.vertex_index(v).ok_or(ShapeError::UnknownVertex(v))
    }

    /// Neighbours of `v` in insertion order. A self-loop lists `v` itself.
    pub fn neighbors(&self, v: VertexId) -> Result<Vec<VertexId>, ShapeError> {
        let i = self.require_index(v)?;
        Ok(self
            .adjacency
            .neighbor_indices(i)
            .iter()
            .map(|&j| self.adjacency.vertices()[j])
            .collect())
    }

    pub fn degree(&self, v: VertexId) -> Result<usize, ShapeError> {
        let i = self.require_index(v)?;
        Ok(self.adjacency.neighbor_indices(i).len())
    }

    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency.has_edge(u, v)
    }

    /// Store a per-vertex signal, replacing any previous one.
    ///
    /// The length is not enforced; a mismatch with
    /// [`n_vertices`](Shape::n_vertices) is only logged.
    pub fn set_vertex_signal(&mut self, signal: impl Into<Vec<f64>>) {
        let signal = signal.into();
        if signal.len() != self.n_vertices() {
            log::warn!(
                "vertex signal has {} entries but the graph has {} vertices",
                signal.len(),
                self.n_vertices()
            );
        }
        self.vertex_signal = Some(signal);
    }

    pub fn vertex_signal(&self) -> Option<&[f64]> {
        self.vertex_signal.as_deref()
    }

    /// Bind a metric, replacing any previous one and clearing the cached
    /// distance matrix.
    ///
    /// Heat distance is built through its backend registry; every other kind
    /// is built directly from this graph. If construction fails the previous
    /// metric and its cache are kept.
    pub fn equip_with_metric(&mut self, kind: MetricKind) -> Result<(), ShapeError> {
        let metric = kind.build(&*self)?;
        match self.metric.replace(metric) {
            Some(old) => log::debug!("graph: replaced metric `{}`", old.name()),
            None => log::debug!("graph: equipped metric"),
        }
        self.dist_matrix.take();
        Ok(())
    }

    pub fn metric(&self) -> Option<&dyn Metric> {
        self.metric.as_deref()
    }

    /// Pairwise distances under the equipped metric, computed on first call.
    pub fn dist_matrix(&self) -> Result<&DistanceMatrix, ShapeError> {
        let metric = self.metric().ok_or(ShapeError::MetricNotEquipped)?;
        self.dist_matrix.get_or_try_init(|| {
            log::debug!("graph: computing `{}` distance matrix", metric.name());
            metric.dist_matrix()
        })
    }

    /// Whether the distance matrix for the current metric is cached.
    pub fn has_cached_dist_matrix(&self) -> bool {
        self.dist_matrix.get().is_some()
    }

    /// Distance between two vertices under the equipped metric.
    pub fn dist(&self, u: VertexId, v: VertexId) -> Result<f64, ShapeError> {
        let (i, j) = (self.require_index(u)?, self.require_index(v)?);
        let matrix = self.dist_matrix()?;
        matrix
            .get(i, j)
            .ok_or(ShapeError::VertexIndexOutOfRange {
                index: i.max(j),
                len: matrix.len(),
            })
    }
}

impl Shape for Graph {
    fn kind(&self) -> ShapeKind {
        ShapeKind::NonMesh
    }

    fn vertices(&self) -> &[VertexId] {
        self.adjacency.vertices()
    }

    fn n_vertices(&self) -> usize {
        self.adjacency.node_count()
    }

    fn edges(&self) -> &[Edge] {
        self.edges.get_or_init(|| self.adjacency.edges())
    }

    fn edge_indices(&self) -> Result<Vec<(usize, usize)>, ShapeError> {
        Ok(self.adjacency.edge_indices())
    }

    fn operators(&self) -> &OperatorSet {
        &self.operators
    }

    fn operators_mut(&mut self) -> &mut OperatorSet {
        &mut self.operators
    }
}

impl InvalidateCache for Graph {
    fn invalidate_cache(&mut self) {
        self.edges.take();
        self.dist_matrix.take();
    }
}

impl DebugInvariants for Graph {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Graph");
    }

    fn validate_invariants(&self) -> Result<(), ShapeError> {
        let vertices = self.vertices();
        if let Some(dup) = vertices.iter().duplicates().next() {
            return Err(ShapeError::InvariantViolation(format!(
                "vertex {dup} appears twice in the vertex sequence"
            )));
        }
        for (i, &v) in vertices.iter().enumerate() {
            if self.adjacency.index_of(v) != Some(i) {
                return Err(ShapeError::InvariantViolation(format!(
                    "vertex {v} is not indexed at position {i}"
                )));
            }
        }
        let edges = self.edges();
        if edges.len() != self.adjacency.edge_count() {
            return Err(ShapeError::InvariantViolation(format!(
                "edge cache holds {} edges, adjacency holds {}",
                edges.len(),
                self.adjacency.edge_count()
            )));
        }
        if let Some(&(u, v)) = edges.iter().find(|&&(u, v)| !self.has_edge(u, v)) {
            return Err(ShapeError::InvariantViolation(format!(
                "cached edge ({u}, {v}) is missing from the adjacency"
            )));
        }
        if let Some(matrix) = self.dist_matrix.get() {
            if matrix.len() != vertices.len() {
                return Err(ShapeError::InvariantViolation(format!(
                    "distance matrix is {0}x{0} for {1} vertices",
                    matrix.len(),
                    vertices.len()
                )));
            }
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(Graph: Send, Sync);
