mod util;

use shape_graph::prelude::*;
use util::v;

fn path4() -> Graph {
    Graph::new([(0, 1), (1, 2), (2, 3)]).expect("build path")
}

/// A metric that puts every pair of distinct vertices at distance 7.
#[derive(Debug)]
struct Constant {
    n: usize,
}

impl Metric for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }
    fn n_vertices(&self) -> usize {
        self.n
    }
    fn dist_from(&self, source: usize) -> Result<Vec<f64>, ShapeError> {
        Ok((0..self.n)
            .map(|i| if i == source { 0.0 } else { 7.0 })
            .collect())
    }
}

fn constant(shape: &dyn Shape) -> Result<Box<dyn Metric>, ShapeError> {
    Ok(Box::new(Constant {
        n: shape.n_vertices(),
    }))
}

#[test]
fn distances_need_a_metric() {
    let g = path4();
    assert!(g.metric().is_none());
    assert_eq!(g.dist_matrix().unwrap_err(), ShapeError::MetricNotEquipped);
    assert_eq!(
        g.dist(v(0), v(1)).unwrap_err(),
        ShapeError::MetricNotEquipped
    );
}

#[test]
fn distance_matrix_is_lazy() {
    let mut g = path4();
    g.equip_with_metric(MetricKind::ShortestPath).expect("equip");
    assert_eq!(g.metric().unwrap().name(), "shortest_path");
    assert!(!g.has_cached_dist_matrix());

    assert_eq!(g.dist(v(0), v(3)).unwrap(), 3.0);
    assert!(g.has_cached_dist_matrix());

    let first = g.dist_matrix().unwrap() as *const DistanceMatrix;
    let second = g.dist_matrix().unwrap() as *const DistanceMatrix;
    assert_eq!(first, second);
}

#[test]
fn re_equipping_replaces_metric_and_clears_cache() {
    let mut g = path4();
    g.equip_with_metric(MetricKind::ShortestPath).expect("equip");
    assert_eq!(g.dist(v(0), v(2)).unwrap(), 2.0);

    g.equip_with_metric(MetricKind::Custom(constant)).expect("re-equip");
    assert_eq!(g.metric().unwrap().name(), "constant");
    assert!(!g.has_cached_dist_matrix());
    assert_eq!(g.dist(v(0), v(2)).unwrap(), 7.0);
    assert_eq!(g.dist(v(2), v(2)).unwrap(), 0.0);
}

#[test]
fn failed_equip_keeps_previous_metric() {
    fn broken(_: &dyn Shape) -> Result<Box<dyn Metric>, ShapeError> {
        Err(ShapeError::InvalidConfig("no".into()))
    }
    let mut g = path4();
    g.equip_with_metric(MetricKind::ShortestPath).expect("equip");
    g.dist_matrix().expect("distances");
    assert!(g.equip_with_metric(MetricKind::Custom(broken)).is_err());
    assert_eq!(g.metric().unwrap().name(), "shortest_path");
    assert!(g.has_cached_dist_matrix());
}

#[test]
fn heat_distance_goes_through_the_registry() {
    let mut g = path4();
    g.equip_with_metric(MetricKind::HeatDistance(HeatBackend::Varadhan))
        .expect("equip heat");
    assert_eq!(g.metric().unwrap().name(), "heat_distance");

    let d = g.dist_matrix().expect("heat distances");
    assert_eq!(d.len(), 4);
    assert_eq!(d.get(0, 0), Some(0.0));
    let row = d.row(0).unwrap();
    assert!(row[1] < row[2] && row[2] < row[3], "{row:?}");
    assert!((d.get(1, 3).unwrap() - d.get(3, 1).unwrap()).abs() < 1e-9);
}

#[test]
fn heat_distance_stays_finite_along_a_long_path() {
    let mut g = Graph::new((0..39).map(|i| (i, i + 1))).expect("build path");
    for backend in HeatBackend::ALL {
        g.equip_with_metric(MetricKind::HeatDistance(backend))
            .expect("equip heat");
        let row = g.dist_matrix().expect("heat distances").row(0).unwrap().to_vec();
        assert_eq!(row.len(), 40);
        assert!(row.iter().all(|d| d.is_finite()), "{backend}: {row:?}");
        assert!(row.windows(2).all(|w| w[0] < w[1]), "{backend}: {row:?}");
    }
    // the default backend counts hops on a path
    g.equip_with_metric(MetricKind::HeatDistance(HeatBackend::default()))
        .expect("equip heat");
    assert!((g.dist(v(0), v(39)).unwrap() - 39.0).abs() < 1e-6);
}

#[test]
fn unknown_vertex_in_dist() {
    let mut g = path4();
    g.equip_with_metric(MetricKind::ShortestPath).expect("equip");
    assert_eq!(
        g.dist(v(0), v(99)).unwrap_err(),
        ShapeError::UnknownVertex(v(99))
    );
}

#[test]
fn empty_graph_has_empty_matrix() {
    let mut g = Graph::new(Vec::<(i64, i64)>::new()).expect("build");
    g.equip_with_metric(MetricKind::ShortestPath).expect("equip");
    assert!(g.dist_matrix().unwrap().is_empty());
}

#[test]
fn invalidation_drops_distance_cache() {
    let mut g = path4();
    g.equip_with_metric(MetricKind::ShortestPath).expect("equip");
    g.dist_matrix().expect("distances");
    g.invalidate_cache();
    assert!(!g.has_cached_dist_matrix());
    assert_eq!(g.dist(v(1), v(3)).unwrap(), 2.0);
}
