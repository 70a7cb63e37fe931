//! `VertexId`: a strong, zero-cost handle for graph vertices
//!
//! Vertex ids are taken verbatim from the edge list a graph is built from.
//! Unlike dense indices they are never relabelled, so any integer (including
//! zero and negatives) is a valid id.

use std::fmt;

/// Opaque vertex identifier.
///
/// This type is `repr(transparent)` over `i64`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct VertexId(i64);

impl VertexId {
    /// Wraps a raw integer id.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use shape_graph::topology::point::VertexId;
    /// let v = VertexId::new(7);
    /// assert_eq!(v.get(), 7);
    /// ```
    #[inline]
    pub const fn new(raw: i64) -> Self {
        VertexId(raw)
    }

    /// Returns the raw integer id.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for VertexId {
    #[inline]
    fn from(raw: i64) -> Self {
        VertexId(raw)
    }
}

impl From<i32> for VertexId {
    #[inline]
    fn from(raw: i32) -> Self {
        VertexId(i64::from(raw))
    }
}

impl From<u32> for VertexId {
    #[inline]
    fn from(raw: u32) -> Self {
        VertexId(i64::from(raw))
    }
}

impl From<VertexId> for i64 {
    #[inline]
    fn from(v: VertexId) -> Self {
        v.0
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VertexId").field(&self.0).finish()
    }
}

/// Prints only the raw integer.
impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected edge as stored by the adjacency structure, in enumeration
/// orientation.
pub type Edge = (VertexId, VertexId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_round_trip() {
        for raw in [-3, 0, 1, i64::MAX] {
            assert_eq!(VertexId::new(raw).get(), raw);
            assert_eq!(i64::from(VertexId::from(raw)), raw);
        }
    }

    #[test]
    fn formatting() {
        let v = VertexId::new(42);
        assert_eq!(format!("{v}"), "42");
        assert_eq!(format!("{v:?}"), "VertexId(42)");
    }

    #[test]
    fn serializes_as_raw_integer() {
        let v = VertexId::new(5);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "5");
        let back: VertexId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
