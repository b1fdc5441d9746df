//! Orthogonal Legendre basis on the reference cell `[-1,1]`.
//!
//! Cell `[x_l, x_r]` with center $x_c$ and width $h$ is mapped by
//! $xi = 2 (x - x_c) / h$. The modes are orthogonal with
//! $integral_(x_l)^(x_r) P_k P_l dif x = h / (2k+1) delta_(k l)$.

use crate::quadrature::{legendre_polynomials, QuadRule1d};

#[derive(Debug, Clone)]
pub struct LegendreBasis {
  degree: usize,
  quad: QuadRule1d,
  /// `[q][k]`
  values: Vec<Vec<f64>>,
  derivs: Vec<Vec<f64>>,
}

impl LegendreBasis {
  /// Basis up to `degree`, tabulated on a Gauss rule with `nquad` points.
  pub fn new(degree: usize, nquad: usize) -> Self {
    let quad = QuadRule1d::gauss_legendre(nquad);
    let (values, derivs) = quad
      .nodes()
      .iter()
      .map(|&xi| legendre_polynomials(degree, xi))
      .unzip();
    Self {
      degree,
      quad,
      values,
      derivs,
    }
  }

  pub fn degree(&self) -> usize {
    self.degree
  }
  pub fn nmodes(&self) -> usize {
    self.degree + 1
  }
  pub fn quad(&self) -> &QuadRule1d {
    &self.quad
  }
  pub fn values_at(&self, q: usize) -> &[f64] {
    &self.values[q]
  }
  pub fn derivs_at(&self, q: usize) -> &[f64] {
    &self.derivs[q]
  }

  /// $u(xi) = sum_k u_k P_k(xi)$
  pub fn evaluate(&self, coeffs: &[f64], xi: f64) -> f64 {
    let (values, _) = legendre_polynomials(self.degree, xi);
    coeffs.iter().zip(values).map(|(c, p)| c * p).sum()
  }

  pub fn evaluate_at_quad(&self, coeffs: &[f64], q: usize) -> f64 {
    coeffs.iter().zip(&self.values[q]).map(|(c, p)| c * p).sum()
  }

  /// Trace at $xi = -1$, using $P_k(-1) = (-1)^k$.
  pub fn left_value(&self, coeffs: &[f64]) -> f64 {
    coeffs
      .iter()
      .enumerate()
      .map(|(k, c)| if k % 2 == 0 { *c } else { -c })
      .sum()
  }

  /// Trace at $xi = 1$, using $P_k(1) = 1$.
  pub fn right_value(&self, coeffs: &[f64]) -> f64 {
    coeffs.iter().sum()
  }

  /// L2 projection of `f` onto the cell `[xl, xr]`.
  pub fn project(&self, f: impl Fn(f64) -> f64, xl: f64, xr: f64, coeffs: &mut [f64]) {
    let xc = 0.5 * (xl + xr);
    let h = xr - xl;
    coeffs.fill(0.0);
    for (q, (xi, w)) in self.quad.iter().enumerate() {
      let fx = f(xc + 0.5 * h * xi);
      for (k, c) in coeffs.iter_mut().enumerate() {
        *c += w * fx * self.values[q][k];
      }
    }
    for (k, c) in coeffs.iter_mut().enumerate() {
      *c *= 0.5 * (2 * k + 1) as f64;
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn traces() {
    let basis = LegendreBasis::new(3, 4);
    let coeffs = [1.0, 2.0, 3.0, 4.0];
    assert_relative_eq!(basis.right_value(&coeffs), basis.evaluate(&coeffs, 1.0));
    assert_relative_eq!(basis.left_value(&coeffs), basis.evaluate(&coeffs, -1.0), epsilon = 1e-13);
    assert_relative_eq!(basis.left_value(&coeffs), 1.0 - 2.0 + 3.0 - 4.0);
  }

  #[test]
  fn projection_reproduces_polynomials() {
    let basis = LegendreBasis::new(2, 4);
    let mut coeffs = [0.0; 3];
    // on [1,3]: x = 2 + xi, x^2 = 4 + 4 xi + xi^2 = 13/3 P_0 + 4 P_1 + 2/3 P_2
    basis.project(|x| x * x, 1.0, 3.0, &mut coeffs);
    assert_relative_eq!(coeffs[0], 13.0 / 3.0, epsilon = 1e-13);
    assert_relative_eq!(coeffs[1], 4.0, epsilon = 1e-13);
    assert_relative_eq!(coeffs[2], 2.0 / 3.0, epsilon = 1e-13);

    for xi in [-1.0, -0.3, 0.5, 1.0] {
      let x: f64 = 2.0 + xi;
      assert_relative_eq!(basis.evaluate(&coeffs, xi), x * x, epsilon = 1e-12);
    }
  }

  #[test]
  fn quadrature_tables() {
    let basis = LegendreBasis::new(2, 3);
    assert_eq!(basis.nmodes(), 3);
    assert_eq!(basis.values_at(0).len(), 3);
    // integral of P_1' = 2
    let integral: f64 = basis
      .quad()
      .weights()
      .iter()
      .enumerate()
      .map(|(q, w)| w * basis.derivs_at(q)[1])
      .sum();
    assert_relative_eq!(integral, 2.0, epsilon = 1e-14);
  }
}
