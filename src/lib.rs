//! # shape-graph
//!
//! shape-graph models discrete geometric objects as *shapes* that can be
//! extended at runtime with differential operators and distance metrics
//! chosen from registries. Downstream spectral and geometric-analysis code
//! gets one interface whatever backs the shape.
//!
//! ## Features
//! - [`Graph`](shape::graph::Graph): a shape built from an edge list, with
//!   lazily cached edge enumeration and distance matrix
//! - Typed operator slots ([`OperatorKind`](operator::OperatorKind)) filled
//!   from an [`OperatorRegistry`](operator::OperatorRegistry) at construction
//! - Closed [`MetricKind`](metric::MetricKind) selection, including a
//!   registry-backed heat distance
//! - Comma-separated edge-list reader and writer
//!
//! ## Logging
//! The crate logs through the [`log`] facade (`debug` for construction and
//! equipping, `warn` for overwritten operators and mismatched signals). It
//! never installs a logger.
//!
//! ## Concurrency
//! Shapes are `Send + Sync`. Lazy caches use `once_cell::sync::OnceCell`, so a
//! first access racing from several threads stores exactly one value. The
//! global registries sit behind `parking_lot::RwLock`.

pub mod debug_invariants;
pub mod io;
pub mod metric;
pub mod operator;
pub mod shape;
pub mod shape_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::io::{CsvEdgeListReader, CsvEdgeListWriter, EdgeListReader, EdgeListWriter};
    pub use crate::metric::{
        DistanceMatrix, HeatBackend, HeatDistanceConfig, HeatDistanceMetric,
        HeatDistanceRegistry, Metric, MetricFactory, MetricKind, ShortestPathMetric,
    };
    pub use crate::operator::{Operator, OperatorFactory, OperatorKind, OperatorRegistry};
    pub use crate::shape::graph::Graph;
    pub use crate::shape::{OperatorSet, Shape, ShapeKind};
    pub use crate::shape_error::ShapeError;
    pub use crate::topology::cache::InvalidateCache;
    pub use crate::topology::point::{Edge, VertexId};
}
