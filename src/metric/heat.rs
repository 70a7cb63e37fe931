//! Heat distance and its backend registry.
//!
//! Heat distance needs construction parameters (a backend and its
//! configuration) that a plain `fn(&dyn Shape)` factory cannot supply, so it
//! is always built through [`HeatDistanceMetric::from_registry`], which looks
//! the backend up in the process-wide [`HeatDistanceRegistry`].
//!
//! Both backends start from one implicit heat step `u = (I + tL)⁻¹ δ_s`,
//! solved with an exact factorization so that `u` stays positive and
//! accurate far from the source. Vertices outside the source's connected
//! component are at infinite distance.
//!
//! # Heat method backend
//! Normalises the shape's [`FaceValuedGradient`](OperatorKind::FaceValuedGradient)
//! of `u` to unit edge directions `X = -∇u / |∇u|`, then recovers the distance
//! `φ` from the Poisson problem `L φ = -div X` built with the shape's
//! [`FaceDivergence`](OperatorKind::FaceDivergence), shifted so `φ(s) = 0`.
//! Exact on trees and grids.
//!
//! # Varadhan backend
//! Applies Varadhan's formula with symmetric normalisation to the heat
//! kernel `k = (I + tL)⁻¹`:
//!
//! `d(i, j) = sqrt(-4t · ln(k_ij / sqrt(k_ii · k_jj)))`
//!
//! The kernel is dense (`n²` entries) and computed once per metric.
//!
//! # Limitations
//! - Heat values underflow roughly 700 hops from the source at `t = 1`.
//!   Past that point the heat method flattens out and Varadhan saturates; a
//!   warning is logged. A larger `time` pushes the horizon out.

use super::laplacian::{GraphLaplacian, ShiftedFactor};
use super::{Metric, check_source};
use crate::operator::{Operator, OperatorKind};
use crate::shape::Shape;
use crate::shape_error::ShapeError;
use hashbrown::HashMap;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

static GLOBAL: Lazy<RwLock<HeatDistanceRegistry>> =
    Lazy::new(|| RwLock::new(HeatDistanceRegistry::default()));

/// Relative heat difference below which an edge counts as level.
const LEVEL_TOLERANCE: f64 = 1e-9;

/// Available heat-distance backends.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HeatBackend {
    /// Heat step, normalised gradient, Poisson solve.
    #[default]
    HeatMethod,
    /// Heat kernel plus Varadhan's formula.
    Varadhan,
}

impl HeatBackend {
    pub const ALL: [HeatBackend; 2] = [HeatBackend::HeatMethod, HeatBackend::Varadhan];

    /// Registry tag.
    pub const fn tag(self) -> &'static str {
        match self {
            HeatBackend::HeatMethod => "heat_method",
            HeatBackend::Varadhan => "varadhan",
        }
    }
}

impl fmt::Display for HeatBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for HeatBackend {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeatBackend::ALL
            .into_iter()
            .find(|b| b.tag() == s)
            .ok_or_else(|| ShapeError::UnknownHeatBackend(s.to_string()))
    }
}

/// Tuning for heat-distance backends.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeatDistanceConfig {
    /// Diffusion time `t`. Graph edges have unit length, so `t = 1` matches
    /// the usual `t = h²` choice.
    pub time: f64,
    /// Relative residual at which the Poisson solve stops.
    pub tolerance: f64,
    /// Iteration cap for the Poisson solve.
    pub max_iterations: usize,
}

impl Default for HeatDistanceConfig {
    fn default() -> Self {
        Self {
            time: 1.0,
            tolerance: 1e-10,
            max_iterations: 10_000,
        }
    }
}

impl HeatDistanceConfig {
    pub fn validate(&self) -> Result<(), ShapeError> {
        if !(self.time.is_finite() && self.time > 0.0) {
            return Err(ShapeError::InvalidConfig(format!(
                "heat time must be positive and finite, got {}",
                self.time
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ShapeError::InvalidConfig(format!(
                "solver tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ShapeError::InvalidConfig(
                "solver needs at least one iteration".into(),
            ));
        }
        Ok(())
    }
}

/// Builds a heat-distance metric for a shape with the given configuration.
pub type HeatBackendFactory =
    fn(&dyn Shape, &HeatDistanceConfig) -> Result<Box<dyn Metric>, ShapeError>;

/// Mapping from backend to factory, plus the configuration handed to it.
#[derive(Clone, Debug)]
pub struct HeatDistanceRegistry {
    backends: HashMap<HeatBackend, HeatBackendFactory>,
    config: HeatDistanceConfig,
}

impl Default for HeatDistanceRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(HeatBackend::HeatMethod, HeatDistanceMetric::heat_method);
        registry.register(HeatBackend::Varadhan, HeatDistanceMetric::varadhan);
        registry
    }
}

impl HeatDistanceRegistry {
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
            config: HeatDistanceConfig::default(),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static RwLock<HeatDistanceRegistry> {
        &GLOBAL
    }

    pub fn register(
        &mut self,
        which: HeatBackend,
        factory: HeatBackendFactory,
    ) -> Option<HeatBackendFactory> {
        let previous = self.backends.insert(which, factory);
        if previous.is_some() {
            log::debug!("heat-distance registry: replaced backend `{which}`");
        }
        previous
    }

    pub fn unregister(&mut self, which: HeatBackend) -> Option<HeatBackendFactory> {
        self.backends.remove(&which)
    }

    pub fn resolve(&self, which: HeatBackend) -> Result<HeatBackendFactory, ShapeError> {
        self.backends
            .get(&which)
            .copied()
            .ok_or(ShapeError::UnregisteredHeatBackend(which))
    }

    pub fn config(&self) -> &HeatDistanceConfig {
        &self.config
    }

    /// Replace the configuration after validating it.
    pub fn set_config(&mut self, config: HeatDistanceConfig) -> Result<(), ShapeError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}

/// Operators and edge order the heat method steers by.
#[derive(Debug)]
struct Flow {
    gradient: Arc<dyn Operator>,
    divergence: Arc<dyn Operator>,
    edges: Vec<(usize, usize)>,
}

/// Heat distance on a shape.
#[derive(Debug)]
pub struct HeatDistanceMetric {
    backend: HeatBackend,
    laplacian: GraphLaplacian,
    component: Vec<usize>,
    config: HeatDistanceConfig,
    /// Present for [`HeatBackend::HeatMethod`] only.
    flow: Option<Flow>,
    factor: OnceCell<ShiftedFactor>,
    /// Row-major heat kernel for [`HeatBackend::Varadhan`], filled on first use.
    kernel: OnceCell<Vec<f64>>,
}

impl HeatDistanceMetric {
    /// Bind `backend` to `shape`.
    ///
    /// The heat method uses the gradient and divergence operators equipped
    /// on `shape` and fails with [`ShapeError::OperatorNotEquipped`] if
    /// either is missing.
    pub fn new(
        shape: &dyn Shape,
        backend: HeatBackend,
        config: HeatDistanceConfig,
    ) -> Result<Self, ShapeError> {
        config.validate()?;
        let laplacian = GraphLaplacian::from_shape(shape)?;
        let flow = match backend {
            HeatBackend::HeatMethod => Some(Flow {
                gradient: shape.require_operator(OperatorKind::FaceValuedGradient)?,
                divergence: shape.require_operator(OperatorKind::FaceDivergence)?,
                edges: shape.edge_indices()?,
            }),
            HeatBackend::Varadhan => None,
        };
        Ok(Self {
            backend,
            component: laplacian.components(),
            laplacian,
            config,
            flow,
            factor: OnceCell::new(),
            kernel: OnceCell::new(),
        })
    }

    /// Build the `which` backend from the global registry.
    pub fn from_registry(
        which: HeatBackend,
        shape: &dyn Shape,
    ) -> Result<Box<dyn Metric>, ShapeError> {
        // release the lock before running the factory
        let (factory, config) = {
            let registry = HeatDistanceRegistry::global().read();
            (registry.resolve(which)?, registry.config().clone())
        };
        factory(shape, &config)
    }

    /// Registry entry for [`HeatBackend::HeatMethod`].
    pub fn heat_method(
        shape: &dyn Shape,
        config: &HeatDistanceConfig,
    ) -> Result<Box<dyn Metric>, ShapeError> {
        Ok(Box::new(Self::new(
            shape,
            HeatBackend::HeatMethod,
            config.clone(),
        )?))
    }

    /// Registry entry for [`HeatBackend::Varadhan`].
    pub fn varadhan(
        shape: &dyn Shape,
        config: &HeatDistanceConfig,
    ) -> Result<Box<dyn Metric>, ShapeError> {
        Ok(Box::new(Self::new(
            shape,
            HeatBackend::Varadhan,
            config.clone(),
        )?))
    }

    pub fn backend(&self) -> HeatBackend {
        self.backend
    }

    pub fn config(&self) -> &HeatDistanceConfig {
        &self.config
    }

    fn factor(&self) -> &ShiftedFactor {
        self.factor.get_or_init(|| {
            log::debug!(
                "heat distance: factoring {} vertices (t = {})",
                self.laplacian.len(),
                self.config.time
            );
            self.laplacian.factor_shifted(self.config.time)
        })
    }

    /// Heat after one implicit step from a unit source at `source`.
    fn heat_step(&self, source: usize) -> Vec<f64> {
        let mut delta = vec![0.0; self.laplacian.len()];
        delta[source] = 1.0;
        self.factor().solve(&delta)
    }

    /// Number of vertices sharing `source`'s component whose `heat` is zero.
    fn underflowed(&self, source: usize, heat: &[f64]) -> usize {
        let home = self.component[source];
        heat.iter()
            .zip(&self.component)
            .filter(|&(&h, &c)| c == home && h == 0.0)
            .count()
    }

    fn warn_underflow(&self, source: usize, count: usize) {
        if count > 0 {
            log::warn!(
                "heat distance: heat from vertex index {source} underflowed at {count} \
                 vertices of its component; increase the diffusion time"
            );
        }
    }

    fn heat_method_from(&self, flow: &Flow, source: usize) -> Result<Vec<f64>, ShapeError> {
        let heat = self.heat_step(source);
        self.warn_underflow(source, self.underflowed(source, &heat));

        let gradient = flow.gradient.apply(&heat)?;
        let direction: Vec<f64> = gradient
            .iter()
            .zip(&flow.edges)
            .map(|(&g, &(u, v))| {
                if g.abs() <= LEVEL_TOLERANCE * heat[u].max(heat[v]) {
                    0.0
                } else {
                    -g.signum()
                }
            })
            .collect();
        // L = -div ∘ ∇, so the least-squares fit of ∇φ to X solves L φ = -div X
        let rhs: Vec<f64> = flow
            .divergence
            .apply(&direction)?
            .into_iter()
            .map(|x| -x)
            .collect();
        let phi = self.laplacian.solve_poisson(
            &rhs,
            self.config.tolerance,
            self.config.max_iterations,
        )?;

        let home = self.component[source];
        let origin = phi[source];
        Ok(phi
            .iter()
            .zip(&self.component)
            .enumerate()
            .map(|(i, (&p, &c))| {
                if i == source {
                    0.0
                } else if c != home {
                    f64::INFINITY
                } else {
                    (p - origin).max(0.0)
                }
            })
            .collect())
    }

    fn kernel(&self) -> &[f64] {
        self.kernel.get_or_init(|| {
            let n = self.laplacian.len();
            log::debug!("heat distance: assembling {n}×{n} heat kernel");
            let mut k = vec![0.0; n * n];
            for j in 0..n {
                let column = self.heat_step(j);
                self.warn_underflow(j, self.underflowed(j, &column));
                for (i, value) in column.into_iter().enumerate() {
                    k[i * n + j] = value;
                }
            }
            // the exact kernel is symmetric
            for i in 0..n {
                for j in (i + 1)..n {
                    let avg = 0.5 * (k[i * n + j] + k[j * n + i]);
                    k[i * n + j] = avg;
                    k[j * n + i] = avg;
                }
            }
            k
        })
    }

    fn varadhan_from(&self, source: usize) -> Vec<f64> {
        let n = self.laplacian.len();
        let k = self.kernel();
        let home = self.component[source];
        let k_ss = k[source * n + source];
        (0..n)
            .map(|i| {
                if i == source {
                    0.0
                } else if self.component[i] != home {
                    f64::INFINITY
                } else {
                    // underflowed entries saturate at the largest finite distance
                    let k_si = k[source * n + i].max(f64::MIN_POSITIVE);
                    let ratio = k_si / (k_ss * k[i * n + i]).sqrt();
                    if ratio >= 1.0 {
                        0.0
                    } else {
                        (-4.0 * self.config.time * ratio.ln()).sqrt()
                    }
                }
            })
            .collect()
    }
}

impl Metric for HeatDistanceMetric {
    fn name(&self) -> &'static str {
        "heat_distance"
    }

    fn n_vertices(&self) -> usize {
        self.laplacian.len()
    }

    fn dist_from(&self, source: usize) -> Result<Vec<f64>, ShapeError> {
        check_source(source, self.laplacian.len())?;
        match &self.flow {
            Some(flow) => self.heat_method_from(flow, source),
            None => Ok(self.varadhan_from(source)),
        }
    }
}
