//! Undirected adjacency structure over integer vertex ids.
//!
//! [`AdjacencyGraph`] stores vertices in first-seen order and maps each id to
//! a dense index. Neighbour lists are kept in insertion order and hold
//! dense indices, so enumeration is deterministic for a given edge list.
//!
//! Duplicate edges (in either orientation) collapse to one. A self-loop is
//! stored once, as the vertex appearing in its own neighbour list.

use crate::topology::point::{Edge, VertexId};
use hashbrown::{HashMap, HashSet};

/// Insertion-ordered undirected graph.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    order: Vec<VertexId>,
    index: HashMap<VertexId, usize>,
    neighbors: Vec<Vec<usize>>,
    links: HashSet<(usize, usize)>,
}

impl AdjacencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from undirected `(u, v)` pairs.
    ///
    /// # Example
    /// ```rust
    /// use shape_graph::topology::adjacency::AdjacencyGraph;
    /// let g = AdjacencyGraph::from_edges([(0, 1), (1, 2), (2, 1)]);
    /// assert_eq!(g.node_count(), 3);
    /// assert_eq!(g.edge_count(), 2);
    /// ```
    pub fn from_edges<I, U>(edges: I) -> Self
    where
        I: IntoIterator<Item = (U, U)>,
        U: Into<VertexId>,
    {
        let edges = edges.into_iter();
        let mut graph = Self::default();
        let (lower, _) = edges.size_hint();
        graph.order.reserve(lower);
        graph.index.reserve(lower);
        graph.links.reserve(lower);
        for (u, v) in edges {
            graph.add_edge(u.into(), v.into());
        }
        graph
    }

    /// Inserts `v` if it is not yet present and returns its dense index.
    pub fn add_vertex(&mut self, v: VertexId) -> usize {
        if let Some(&i) = self.index.get(&v) {
            return i;
        }
        let i = self.order.len();
        self.order.push(v);
        self.index.insert(v, i);
        self.neighbors.push(Vec::new());
        i
    }

    /// Inserts the undirected edge `{u, v}`; returns `false` if it already
    /// existed.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> bool {
        let a = self.add_vertex(u);
        let b = self.add_vertex(v);
        if !self.links.insert((a.min(b), a.max(b))) {
            return false;
        }
        self.neighbors[a].push(b);
        if a != b {
            self.neighbors[b].push(a);
        }
        true
    }

    /// Number of vertices.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of distinct undirected edges, self-loops included.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    /// Vertices in first-seen order.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.order
    }

    /// Dense index of `v`, if present.
    #[inline]
    pub fn index_of(&self, v: VertexId) -> Option<usize> {
        self.index.get(&v).copied()
    }

    /// Vertex id at dense index `i`.
    #[inline]
    pub fn vertex_at(&self, i: usize) -> Option<VertexId> {
        self.order.get(i).copied()
    }

    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        self.index.contains_key(&v)
    }

    /// Neighbour indices of the vertex at dense index `i`, in insertion
    /// order. Empty for out-of-range indices.
    #[inline]
    pub fn neighbor_indices(&self, i: usize) -> &[usize] {
        self.neighbors.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        match (self.index_of(u), self.index_of(v)) {
            (Some(a), Some(b)) => self.links.contains(&(a.min(b), a.max(b))),
            _ => false,
        }
    }

    /// Enumerate each undirected edge once.
    ///
    /// Vertices are visited in order; each contributes the pairs to those of
    /// its neighbours that have not been visited yet, so `(u, v)` is oriented
    /// from the earlier-seen endpoint.
    pub fn edges(&self) -> Vec<Edge> {
        self.edge_indices()
            .into_iter()
            .map(|(i, j)| (self.order[i], self.order[j]))
            .collect()
    }

    /// Edges as pairs of dense indices, in the same order as [`edges`](Self::edges).
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        let mut visited = vec![false; self.order.len()];
        let mut out = Vec::with_capacity(self.links.len());
        for (i, nbrs) in self.neighbors.iter().enumerate() {
            for &j in nbrs {
                if !visited[j] {
                    out.push((i, j));
                }
            }
            visited[i] = true;
        }
        out
    }
}
