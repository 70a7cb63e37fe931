//! Graph topology building blocks.
//!
//! - [`point`]: the `VertexId` handle and the `Edge` pair type
//! - [`adjacency`]: the insertion-ordered undirected adjacency structure
//! - [`cache`]: the cache invalidation hook shared by shapes

pub mod adjacency;
pub mod cache;
pub mod point;

pub use adjacency::AdjacencyGraph;
pub use cache::InvalidateCache;
pub use point::{Edge, VertexId};
