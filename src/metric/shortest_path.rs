//! Hop-count shortest-path metric (breadth-first search).

use super::{Metric, check_source, simple_neighbors};
use crate::shape::Shape;
use crate::shape_error::ShapeError;
use std::collections::VecDeque;

/// Unweighted shortest-path distance: the number of edges on a shortest path.
#[derive(Clone, Debug)]
pub struct ShortestPathMetric {
    neighbors: Vec<Vec<usize>>,
}

impl ShortestPathMetric {
    pub fn new(shape: &dyn Shape) -> Result<Self, ShapeError> {
        Ok(Self {
            neighbors: simple_neighbors(shape)?,
        })
    }
}

impl Metric for ShortestPathMetric {
    fn name(&self) -> &'static str {
        "shortest_path"
    }

    fn n_vertices(&self) -> usize {
        self.neighbors.len()
    }

    fn dist_from(&self, source: usize) -> Result<Vec<f64>, ShapeError> {
        check_source(source, self.neighbors.len())?;
        let mut dist = vec![f64::INFINITY; self.neighbors.len()];
        let mut queue = VecDeque::new();
        dist[source] = 0.0;
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            let next = dist[u] + 1.0;
            for &v in &self.neighbors[u] {
                if dist[v].is_infinite() {
                    dist[v] = next;
                    queue.push_back(v);
                }
            }
        }
        Ok(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::graph::Graph;

    #[test]
    fn path_distances() {
        let g = Graph::new([(0, 1), (1, 2), (2, 3)]).unwrap();
        let m = ShortestPathMetric::new(&g).unwrap();
        assert_eq!(m.dist_from(0).unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(m.dist_from(2).unwrap(), vec![2.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn components_are_infinitely_far() {
        let g = Graph::new([(0, 1), (5, 6)]).unwrap();
        let m = ShortestPathMetric::new(&g).unwrap();
        let d = m.dist_from(0).unwrap();
        assert_eq!(d[1], 1.0);
        assert!(d[2].is_infinite() && d[3].is_infinite());
    }

    #[test]
    fn matrix_is_symmetric() {
        let g = Graph::new([(0, 1), (1, 2), (2, 0), (2, 3)]).unwrap();
        let m = ShortestPathMetric::new(&g).unwrap().dist_matrix().unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.get(0, 3), Some(2.0));
    }

    #[test]
    fn out_of_range_source() {
        let g = Graph::new([(0, 1)]).unwrap();
        let m = ShortestPathMetric::new(&g).unwrap();
        assert_eq!(
            m.dist_from(2).unwrap_err(),
            ShapeError::VertexIndexOutOfRange { index: 2, len: 2 }
        );
    }
}
