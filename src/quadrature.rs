//! Gauss type quadrature rules on the reference interval and the reference
//! square `[0,1]^2`.

use std::f64::consts::PI;

/// Values and first derivatives of the Legendre polynomials `P_0..=P_n` at `x`.
pub fn legendre_polynomials(n: usize, x: f64) -> (Vec<f64>, Vec<f64>) {
  let mut values = vec![0.0; n + 1];
  let mut derivs = vec![0.0; n + 1];
  values[0] = 1.0;
  if n >= 1 {
    values[1] = x;
    derivs[1] = 1.0;
  }
  for k in 1..n {
    let kf = k as f64;
    values[k + 1] = ((2.0 * kf + 1.0) * x * values[k] - kf * values[k - 1]) / (kf + 1.0);
    derivs[k + 1] = derivs[k - 1] + (2.0 * kf + 1.0) * values[k];
  }
  (values, derivs)
}

pub fn legendre(n: usize, x: f64) -> (f64, f64) {
  let (values, derivs) = legendre_polynomials(n, x);
  (values[n], derivs[n])
}

const NEWTON_TOL: f64 = 1e-15;
const NEWTON_MAXIT: usize = 100;

/// A one dimensional quadrature rule.
#[derive(Debug, Clone)]
pub struct QuadRule1d {
  nodes: Vec<f64>,
  weights: Vec<f64>,
}
impl QuadRule1d {
  /// `n`-point Gauss-Legendre rule on `[-1,1]`, exact up to degree `2n-1`.
  pub fn gauss_legendre(n: usize) -> Self {
    assert!(n >= 1, "Gauss rule needs at least one point");

    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    for i in 0..n.div_ceil(2) {
      let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
      let mut dp = 1.0;
      for _ in 0..NEWTON_MAXIT {
        let (p, d) = legendre(n, x);
        dp = d;
        let dx = p / d;
        x -= dx;
        if dx.abs() < NEWTON_TOL {
          break;
        }
      }
      let w = 2.0 / ((1.0 - x * x) * dp * dp);
      nodes[i] = -x;
      nodes[n - 1 - i] = x;
      weights[i] = w;
      weights[n - 1 - i] = w;
    }
    if n % 2 == 1 {
      nodes[n / 2] = 0.0;
    }
    Self { nodes, weights }
  }

  /// `n`-point Gauss-Lobatto rule on `[-1,1]`, including the end points.
  pub fn gauss_lobatto(n: usize) -> Self {
    assert!(n >= 2, "Gauss-Lobatto rule needs at least two points");

    let m = n - 1;
    let mf = m as f64;
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    nodes[0] = -1.0;
    nodes[m] = 1.0;
    for i in 1..m {
      // interior nodes are the roots of P_m'
      let mut x = -(PI * i as f64 / mf).cos();
      for _ in 0..NEWTON_MAXIT {
        let (p, dp) = legendre(m, x);
        let ddp = (2.0 * x * dp - mf * (mf + 1.0) * p) / (1.0 - x * x);
        let dx = dp / ddp;
        x -= dx;
        if dx.abs() < NEWTON_TOL {
          break;
        }
      }
      nodes[i] = x;
    }
    for (x, w) in nodes.iter().zip(weights.iter_mut()) {
      let (p, _) = legendre(m, *x);
      *w = 2.0 / (mf * (mf + 1.0) * p * p);
    }
    Self { nodes, weights }
  }

  /// Affinely maps the rule from `[-1,1]` onto `[0,1]`.
  pub fn to_unit_interval(self) -> Self {
    let nodes = self.nodes.iter().map(|x| 0.5 * (x + 1.0)).collect();
    let weights = self.weights.iter().map(|w| 0.5 * w).collect();
    Self { nodes, weights }
  }

  pub fn npoints(&self) -> usize {
    self.nodes.len()
  }
  pub fn nodes(&self) -> &[f64] {
    &self.nodes
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }
  pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
    self.nodes.iter().copied().zip(self.weights.iter().copied())
  }
}

/// Tensor product Gauss rule on the reference square `[0,1]^2`.
#[derive(Debug, Clone)]
pub struct QuadRule2d {
  points: Vec<na::Vector2<f64>>,
  weights: Vec<f64>,
}
impl QuadRule2d {
  /// `n x n` Gauss-Legendre points.
  pub fn gauss(n: usize) -> Self {
    let rule = QuadRule1d::gauss_legendre(n).to_unit_interval();
    let mut points = Vec::with_capacity(n * n);
    let mut weights = Vec::with_capacity(n * n);
    for (y, wy) in rule.iter() {
      for (x, wx) in rule.iter() {
        points.push(na::Vector2::new(x, y));
        weights.push(wx * wy);
      }
    }
    Self { points, weights }
  }

  pub fn npoints(&self) -> usize {
    self.points.len()
  }
  pub fn points(&self) -> &[na::Vector2<f64>] {
    &self.points
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }
}
