//! Iterative and direct solvers for the symmetric positive definite
//! Galerkin systems.

use crate::{Error, Result};

use faer::linalg::solvers::Solve;

use std::str::FromStr;

pub type CsrMatrix = nas::CsrMatrix<f64>;
pub type Vector = na::DVector<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearSolver {
  /// Conjugate gradients with SSOR preconditioning.
  Cg,
  /// Sparse Cholesky factorization.
  Cholesky,
}
impl FromStr for LinearSolver {
  type Err = Error;
  fn from_str(s: &str) -> Result<Self> {
    match s {
      "cg" => Ok(Self::Cg),
      "cholesky" => Ok(Self::Cholesky),
      _ => Err(Error::InvalidParameter(format!(
        "unknown linear solver `{s}`, expected `cg` or `cholesky`"
      ))),
    }
  }
}

/// Stopping criterion: absolute l2 norm of the residual.
#[derive(Debug, Clone, Copy)]
pub struct SolverControl {
  pub max_iterations: usize,
  pub tolerance: f64,
}
impl Default for SolverControl {
  fn default() -> Self {
    Self {
      max_iterations: 1000,
      tolerance: 1e-12,
    }
  }
}

/// $y = A x$
pub fn csr_mul(a: &CsrMatrix, x: &Vector, y: &mut Vector) {
  let offsets = a.row_offsets();
  let cols = a.col_indices();
  let vals = a.values();
  for irow in 0..a.nrows() {
    let range = offsets[irow]..offsets[irow + 1];
    y[irow] = cols[range.clone()]
      .iter()
      .zip(&vals[range])
      .map(|(&c, v)| v * x[c])
      .sum();
  }
}

/// Symmetric successive over-relaxation.
///
/// $M = 1/(omega (2 - omega)) (D + omega L) D^(-1) (D + omega U)$
pub struct SsorPreconditioner<'a> {
  matrix: &'a CsrMatrix,
  diagonal: Vec<f64>,
  omega: f64,
}

impl<'a> SsorPreconditioner<'a> {
  pub fn new(matrix: &'a CsrMatrix, omega: f64) -> Result<Self> {
    if !(omega > 0.0 && omega < 2.0) {
      return Err(Error::InvalidParameter(format!(
        "SSOR relaxation must lie in (0, 2), got {omega}"
      )));
    }
    let mut diagonal = vec![0.0; matrix.nrows()];
    for (r, c, &v) in matrix.triplet_iter() {
      if r == c {
        diagonal[r] += v;
      }
    }
    if let Some(irow) = diagonal.iter().position(|&d| d == 0.0) {
      return Err(Error::Factorization(format!(
        "SSOR needs a nonzero diagonal, row {irow} has none"
      )));
    }
    Ok(Self {
      matrix,
      diagonal,
      omega,
    })
  }

  /// $z = M^(-1) r$
  pub fn apply(&self, r: &Vector, z: &mut Vector) {
    let offsets = self.matrix.row_offsets();
    let cols = self.matrix.col_indices();
    let vals = self.matrix.values();
    let omega = self.omega;
    let n = r.len();

    // (D + omega L) y = omega (2 - omega) r
    for i in 0..n {
      let mut sum = omega * (2.0 - omega) * r[i];
      for k in offsets[i]..offsets[i + 1] {
        let j = cols[k];
        if j < i {
          sum -= omega * vals[k] * z[j];
        }
      }
      z[i] = sum / self.diagonal[i];
    }

    for i in 0..n {
      z[i] *= self.diagonal[i];
    }

    // (D + omega U) x = D y
    for i in (0..n).rev() {
      let mut sum = z[i];
      for k in offsets[i]..offsets[i + 1] {
        let j = cols[k];
        if j > i {
          sum -= omega * vals[k] * z[j];
        }
      }
      z[i] = sum / self.diagonal[i];
    }
  }
}

/// Preconditioned conjugate gradient method.
///
/// `x` holds the initial guess on entry and the solution on exit.
/// Returns the number of iterations needed.
pub fn solve_cg(
  a: &CsrMatrix,
  x: &mut Vector,
  b: &Vector,
  precond: &SsorPreconditioner,
  control: &SolverControl,
) -> Result<usize> {
  let n = b.len();
  let mut q = Vector::zeros(n);

  csr_mul(a, x, &mut q);
  let mut r = b - &q;
  let mut residual = r.norm();
  if residual <= control.tolerance {
    return Ok(0);
  }

  let mut z = Vector::zeros(n);
  precond.apply(&r, &mut z);
  let mut p = z.clone();
  let mut rz = r.dot(&z);

  for iteration in 1..=control.max_iterations {
    csr_mul(a, &p, &mut q);
    let alpha = rz / p.dot(&q);
    x.axpy(alpha, &p, 1.0);
    r.axpy(-alpha, &q, 1.0);

    residual = r.norm();
    tracing::trace!("CG iteration {iteration}: residual {residual:e}");
    if residual <= control.tolerance {
      return Ok(iteration);
    }

    precond.apply(&r, &mut z);
    let rz_new = r.dot(&z);
    let beta = rz_new / rz;
    rz = rz_new;
    p.axpy(1.0, &z, beta);
  }

  Err(Error::NoConvergence {
    iterations: control.max_iterations,
    residual,
  })
}

type SparseMatrixFaer = faer::sparse::SparseRowMat<usize, f64>;

pub fn nalgebra2faer(m: CsrMatrix) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (row_offsets, col_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseRowMat::new_checked(nrows, ncols, row_offsets, None, col_indices);
  faer::sparse::SparseRowMat::new(symbolic, values)
}

pub struct FaerCholesky {
  raw: faer::sparse::linalg::solvers::Llt<usize, f64>,
}
impl FaerCholesky {
  pub fn new(a: CsrMatrix) -> Result<Self> {
    let raw = nalgebra2faer(a)
      .sp_cholesky(faer::Side::Upper)
      .map_err(|e| Error::Factorization(format!("{e:?}")))?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &Vector) -> Vector {
    let b = faer::Col::from_fn(b.nrows(), |i| b[i]);
    let x = self.raw.solve(b);
    Vector::from_iterator(x.nrows(), x.iter().copied())
  }
}
