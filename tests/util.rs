#![allow(dead_code)]
use shape_graph::topology::point::{Edge, VertexId};
use std::path::PathBuf;

pub fn v(raw: i64) -> VertexId {
    VertexId::new(raw)
}

/// Undirected edges as sorted `(min, max)` raw pairs, for order-agnostic
/// comparison.
pub fn edge_set(edges: &[Edge]) -> Vec<(i64, i64)> {
    let mut out: Vec<(i64, i64)> = edges
        .iter()
        .map(|&(a, b)| (a.get().min(b.get()), a.get().max(b.get())))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Write `contents` to a file unique to this process and test name.
pub fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "shape_graph_{}_{name}.csv",
        std::process::id()
    ));
    std::fs::write(&path, contents).expect("write temp edge list");
    path
}
