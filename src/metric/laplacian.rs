//! Combinatorial graph Laplacian and the linear solves heat distance needs.
//!
//! `L = D - A` over the simple graph underlying a shape: self-loops are
//! dropped and duplicate edges count once.
//!
//! - [`GraphLaplacian::factor_shifted`] factors `I + tL` exactly. It is a
//!   diagonally dominant M-matrix, so elimination never adds terms of
//!   opposite sign off the diagonal and the solves of a non-negative
//!   right-hand side only add non-negative terms. Heat values keep full
//!   relative precision however small they get, until they underflow.
//! - [`GraphLaplacian::solve_poisson`] and [`GraphLaplacian::solve_shifted`]
//!   use conjugate gradients.

use super::simple_neighbors;
use crate::shape::Shape;
use crate::shape_error::ShapeError;

/// Neighbour lists of the simple graph underlying a shape.
#[derive(Clone, Debug)]
pub struct GraphLaplacian {
    neighbors: Vec<Vec<usize>>,
}

impl GraphLaplacian {
    pub fn from_shape(shape: &dyn Shape) -> Result<Self, ShapeError> {
        Ok(Self {
            neighbors: simple_neighbors(shape)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    /// Connected-component label per vertex, numbered in order of first
    /// vertex.
    pub fn components(&self) -> Vec<usize> {
        let mut label = vec![usize::MAX; self.len()];
        let mut next = 0;
        let mut stack = Vec::new();
        for start in 0..self.len() {
            if label[start] != usize::MAX {
                continue;
            }
            label[start] = next;
            stack.push(start);
            while let Some(u) = stack.pop() {
                for &v in &self.neighbors[u] {
                    if label[v] == usize::MAX {
                        label[v] = next;
                        stack.push(v);
                    }
                }
            }
            next += 1;
        }
        label
    }

    /// `out = L x`
    pub fn apply(&self, x: &[f64], out: &mut [f64]) {
        for (i, nbrs) in self.neighbors.iter().enumerate() {
            let sum: f64 = nbrs.iter().map(|&j| x[j]).sum();
            out[i] = nbrs.len() as f64 * x[i] - sum;
        }
    }

    /// `out = (I + tL) x`
    pub fn apply_shifted(&self, t: f64, x: &[f64], out: &mut [f64]) {
        self.apply(x, out);
        for (o, xi) in out.iter_mut().zip(x) {
            *o = xi + t * *o;
        }
    }

    /// Dense `LDLᵀ` factorization of `I + tL`.
    pub fn factor_shifted(&self, t: f64) -> ShiftedFactor {
        let n = self.len();
        let mut a = vec![0.0; n * n];
        for (i, nbrs) in self.neighbors.iter().enumerate() {
            a[i * n + i] = 1.0 + t * nbrs.len() as f64;
            for &j in nbrs {
                a[i * n + j] = -t;
            }
        }

        let mut diag = vec![0.0; n];
        for k in 0..n {
            let d = a[k * n + k];
            diag[k] = d;
            for i in (k + 1)..n {
                let a_ik = a[i * n + k];
                if a_ik == 0.0 {
                    continue;
                }
                let l_ik = a_ik / d;
                a[i * n + k] = l_ik;
                // rows j < i already hold l_jk in column k
                for j in (k + 1)..=i {
                    let l_jk = a[j * n + k];
                    a[i * n + j] -= l_ik * l_jk * d;
                }
            }
        }
        ShiftedFactor { n, lower: a, diag }
    }

    /// Solve `(I + tL) x = b` with conjugate gradients.
    ///
    /// Stops once `‖r‖ ≤ tolerance · ‖b‖`; fails with
    /// [`ShapeError::SolverDidNotConverge`] after `max_iterations` steps.
    pub fn solve_shifted(
        &self,
        t: f64,
        b: &[f64],
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Vec<f64>, ShapeError> {
        conjugate_gradient(
            |x, out| self.apply_shifted(t, x, out),
            b,
            tolerance,
            max_iterations,
        )
    }

    /// Solve `L x = b` with conjugate gradients.
    ///
    /// `L` is singular, so `b` must sum to zero over every connected
    /// component. The solution is fixed only up to a constant per component.
    pub fn solve_poisson(
        &self,
        b: &[f64],
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Vec<f64>, ShapeError> {
        conjugate_gradient(|x, out| self.apply(x, out), b, tolerance, max_iterations)
    }
}

/// `I + tL = Λ D Λᵀ` with `Λ` unit lower triangular.
#[derive(Clone, Debug)]
pub struct ShiftedFactor {
    n: usize,
    /// Row-major; only the strictly lower triangle is meaningful.
    lower: Vec<f64>,
    diag: Vec<f64>,
}

impl ShiftedFactor {
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Solve `(I + tL) x = b`.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.n;
        let mut y = b.to_vec();
        for i in 0..n {
            let row = &self.lower[i * n..i * n + i];
            let sum: f64 = row.iter().zip(&y[..i]).map(|(l, yk)| l * yk).sum();
            y[i] -= sum;
        }
        for (yi, d) in y.iter_mut().zip(&self.diag) {
            *yi /= d;
        }
        for i in (0..n).rev() {
            let sum: f64 = ((i + 1)..n).map(|k| self.lower[k * n + i] * y[k]).sum();
            y[i] -= sum;
        }
        y
    }
}

fn conjugate_gradient<A>(
    apply: A,
    b: &[f64],
    tolerance: f64,
    max_iterations: usize,
) -> Result<Vec<f64>, ShapeError>
where
    A: Fn(&[f64], &mut [f64]),
{
    let n = b.len();
    let mut x = vec![0.0; n];
    let mut r = b.to_vec();
    let mut p = r.clone();
    let mut ap = vec![0.0; n];
    let b_norm = dot(b, b).sqrt();
    if b_norm == 0.0 {
        return Ok(x);
    }
    let threshold = tolerance * b_norm;
    let mut rr = dot(&r, &r);

    for _ in 0..max_iterations {
        if rr.sqrt() <= threshold {
            return Ok(x);
        }
        apply(&p, &mut ap);
        let alpha = rr / dot(&p, &ap);
        for i in 0..n {
            x[i] += alpha * p[i];
            r[i] -= alpha * ap[i];
        }
        let rr_next = dot(&r, &r);
        let beta = rr_next / rr;
        for i in 0..n {
            p[i] = r[i] + beta * p[i];
        }
        rr = rr_next;
    }

    if rr.sqrt() <= threshold {
        return Ok(x);
    }
    Err(ShapeError::SolverDidNotConverge {
        iterations: max_iterations,
        residual: rr.sqrt() / b_norm,
    })
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
