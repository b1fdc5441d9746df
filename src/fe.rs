//! Continuous tensor product Lagrange elements on quadrilaterals.

use crate::{
  mesh::QuadGeometry,
  quadrature::{QuadRule1d, QuadRule2d},
  CellIdx, Error, Point, Result,
};

/// Lagrange polynomials on the unit interval through the given nodes.
#[derive(Debug, Clone)]
pub struct LagrangeBasis1d {
  nodes: Vec<f64>,
}

impl LagrangeBasis1d {
  pub fn new(nodes: Vec<f64>) -> Self {
    assert!(!nodes.is_empty());
    Self { nodes }
  }

  /// Basis of degree `degree` through the Gauss-Lobatto points.
  /// These coincide with the equidistant points up to degree two.
  pub fn gauss_lobatto(degree: usize) -> Self {
    assert!(degree >= 1, "Lagrange elements need degree at least one");
    let rule = QuadRule1d::gauss_lobatto(degree + 1).to_unit_interval();
    Self::new(rule.nodes().to_vec())
  }

  pub fn degree(&self) -> usize {
    self.nodes.len() - 1
  }
  pub fn nodes(&self) -> &[f64] {
    &self.nodes
  }

  pub fn value(&self, i: usize, x: f64) -> f64 {
    let xi = self.nodes[i];
    self
      .nodes
      .iter()
      .enumerate()
      .filter(|&(m, _)| m != i)
      .map(|(_, &xm)| (x - xm) / (xi - xm))
      .product()
  }

  pub fn derivative(&self, i: usize, x: f64) -> f64 {
    let xi = self.nodes[i];
    let mut sum = 0.0;
    for (k, &xk) in self.nodes.iter().enumerate() {
      if k == i {
        continue;
      }
      let mut prod = 1.0 / (xi - xk);
      for (m, &xm) in self.nodes.iter().enumerate() {
        if m != i && m != k {
          prod *= (x - xm) / (xi - xm);
        }
      }
      sum += prod;
    }
    sum
  }
}

/// The `Q_p` element: tensor products of degree `p` Lagrange polynomials.
///
/// Local DoFs are numbered lexicographically, `i + (p+1) j` for the support
/// point at reference position `(x_i, x_j)`.
#[derive(Debug, Clone)]
pub struct FeQ {
  basis: LagrangeBasis1d,
}

impl FeQ {
  pub fn new(degree: usize) -> Self {
    Self {
      basis: LagrangeBasis1d::gauss_lobatto(degree),
    }
  }

  pub fn degree(&self) -> usize {
    self.basis.degree()
  }

  pub fn dofs_per_cell(&self) -> usize {
    (self.degree() + 1).pow(2)
  }

  /// Splits a local DoF into its tensor indices.
  pub fn tensor_index(&self, idof: usize) -> (usize, usize) {
    let n = self.degree() + 1;
    (idof % n, idof / n)
  }

  pub fn support_point(&self, idof: usize) -> na::Vector2<f64> {
    let (i, j) = self.tensor_index(idof);
    na::Vector2::new(self.basis.nodes[i], self.basis.nodes[j])
  }

  pub fn shape_value(&self, idof: usize, xi: &na::Vector2<f64>) -> f64 {
    let (i, j) = self.tensor_index(idof);
    self.basis.value(i, xi.x) * self.basis.value(j, xi.y)
  }

  pub fn shape_grad(&self, idof: usize, xi: &na::Vector2<f64>) -> na::Vector2<f64> {
    let (i, j) = self.tensor_index(idof);
    na::Vector2::new(
      self.basis.derivative(i, xi.x) * self.basis.value(j, xi.y),
      self.basis.value(i, xi.x) * self.basis.derivative(j, xi.y),
    )
  }
}

/// Shape function values and gradients at the quadrature points of one cell.
///
/// Reference data is tabulated once, [`CellValues::reinit`] maps it onto a
/// concrete cell.
pub struct CellValues<'a> {
  fe: &'a FeQ,
  quad: &'a QuadRule2d,
  ref_values: Vec<Vec<f64>>,
  ref_grads: Vec<Vec<na::Vector2<f64>>>,

  points: Vec<Point>,
  jxw: Vec<f64>,
  grads: Vec<Vec<na::Vector2<f64>>>,
}

impl<'a> CellValues<'a> {
  pub fn new(fe: &'a FeQ, quad: &'a QuadRule2d) -> Self {
    let ndofs = fe.dofs_per_cell();
    let ref_values = quad
      .points()
      .iter()
      .map(|xi| (0..ndofs).map(|i| fe.shape_value(i, xi)).collect())
      .collect();
    let ref_grads: Vec<Vec<_>> = quad
      .points()
      .iter()
      .map(|xi| (0..ndofs).map(|i| fe.shape_grad(i, xi)).collect())
      .collect();

    Self {
      fe,
      quad,
      ref_values,
      grads: ref_grads.clone(),
      ref_grads,
      points: vec![Point::zeros(); quad.npoints()],
      jxw: vec![0.0; quad.npoints()],
    }
  }

  pub fn reinit(&mut self, icell: CellIdx, geo: &QuadGeometry) -> Result<()> {
    for (q, xi) in self.quad.points().iter().enumerate() {
      let jacobian = geo.jacobian(xi);
      let det = jacobian.determinant();
      let inv_t = jacobian
        .try_inverse()
        .filter(|_| det > 0.0)
        .ok_or(Error::DegenerateCell { cell: icell, det })?
        .transpose();

      self.points[q] = geo.map(xi);
      self.jxw[q] = det * self.quad.weights()[q];
      for (grad, ref_grad) in self.grads[q].iter_mut().zip(&self.ref_grads[q]) {
        *grad = inv_t * ref_grad;
      }
    }
    Ok(())
  }

  pub fn fe(&self) -> &FeQ {
    self.fe
  }
  pub fn dofs_per_cell(&self) -> usize {
    self.fe.dofs_per_cell()
  }
  pub fn nquad_points(&self) -> usize {
    self.quad.npoints()
  }

  pub fn shape_value(&self, idof: usize, q: usize) -> f64 {
    self.ref_values[q][idof]
  }
  pub fn shape_grad(&self, idof: usize, q: usize) -> &na::Vector2<f64> {
    &self.grads[q][idof]
  }
  pub fn quadrature_point(&self, q: usize) -> &Point {
    &self.points[q]
  }
  pub fn jxw(&self, q: usize) -> f64 {
    self.jxw[q]
  }

  /// Value of the FE function with local coefficients `coeffs` at point `q`.
  pub fn function_value(&self, coeffs: &[f64], q: usize) -> f64 {
    coeffs
      .iter()
      .zip(&self.ref_values[q])
      .map(|(c, v)| c * v)
      .sum()
  }

  pub fn function_grad(&self, coeffs: &[f64], q: usize) -> na::Vector2<f64> {
    coeffs
      .iter()
      .zip(&self.grads[q])
      .map(|(c, g)| g * *c)
      .sum()
  }
}
