//! Edge-list I/O.
//!
//! Readers turn a byte stream into raw `(u, v)` pairs for
//! [`Graph::new`](crate::shape::graph::Graph::new); writers serialize a shape's
//! edges so the matching reader can load them back.

pub mod csv;

use crate::shape_error::ShapeError;
use crate::topology::point::Edge;
use std::io::{Read, Write};

pub use csv::{CsvEdgeListReader, CsvEdgeListWriter};

/// Trait for readers producing a raw edge list.
pub trait EdgeListReader {
    /// Parse every edge from `reader`, failing on the first malformed record.
    fn read<R: Read>(&self, reader: R) -> Result<Vec<Edge>, ShapeError>;
}

/// Trait for writers serializing an edge list.
pub trait EdgeListWriter {
    fn write<W: Write>(&self, writer: W, edges: &[Edge]) -> Result<(), ShapeError>;
}
