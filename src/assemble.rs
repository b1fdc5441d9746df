use crate::{
  dofs::DofHandler,
  fe::{CellValues, FeQ},
  mesh::QuadMesh,
  quadrature::QuadRule2d,
  sparse::SparseMatrix,
  util, DofIdx, Result,
};

use rayon::prelude::*;

pub type GalVec = na::DVector<f64>;

pub trait ElmatProvider: Sync {
  fn eval(&self, values: &CellValues) -> na::DMatrix<f64>;
}

impl<F> ElmatProvider for F
where
  F: Fn(&CellValues) -> na::DMatrix<f64> + Sync,
{
  fn eval(&self, values: &CellValues) -> na::DMatrix<f64> {
    self(values)
  }
}

/// Element Matrix Provider for the Laplacian, $A_(i j) = integral nabla phi_j dot nabla phi_i$.
pub fn laplace_elmat(values: &CellValues) -> na::DMatrix<f64> {
  let ndofs = values.dofs_per_cell();
  let mut elmat = na::DMatrix::zeros(ndofs, ndofs);
  for q in 0..values.nquad_points() {
    let jxw = values.jxw(q);
    for i in 0..ndofs {
      let grad_i = values.shape_grad(i, q);
      for j in 0..ndofs {
        elmat[(i, j)] += grad_i.dot(values.shape_grad(j, q)) * jxw;
      }
    }
  }
  elmat
}

/// Assembly algorithm for the Galerkin Matrix.
pub fn assemble_galmat(
  mesh: &QuadMesh,
  dofh: &DofHandler,
  fe: &FeQ,
  quad: &QuadRule2d,
  elmat: impl ElmatProvider,
) -> Result<SparseMatrix> {
  let ndofs = dofh.n_dofs();

  let cell_triplets: Vec<Vec<(usize, usize, f64)>> = (0..mesh.n_active_cells())
    .into_par_iter()
    .map_init(
      || CellValues::new(fe, quad),
      |values, icell| -> Result<Vec<(usize, usize, f64)>> {
        values.reinit(icell, &mesh.cell_geometry(icell))?;
        let elmat = elmat.eval(values);

        let dofs = dofh.cell_dofs(icell);
        let mut local_triplets = Vec::with_capacity(dofs.len() * dofs.len());
        for (ilocal, &iglobal) in dofs.iter().enumerate() {
          for (jlocal, &jglobal) in dofs.iter().enumerate() {
            let val = elmat[(ilocal, jlocal)];
            if val != 0.0 {
              local_triplets.push((iglobal, jglobal, val));
            }
          }
        }
        Ok(local_triplets)
      },
    )
    .collect::<Result<_>>()?;

  let triplets = cell_triplets.into_iter().flatten().collect();
  Ok(SparseMatrix::new(ndofs, ndofs, triplets))
}

/// Eliminates Dirichlet DoFs from the linear system, keeping it symmetric.
///
/// Rows and columns of fixed DoFs are cleared except for the diagonal, which
/// keeps its value (or the first nonzero diagonal entry of the matrix, should
/// it vanish). The known column contributions move to the right hand side and
/// `galsol` receives the prescribed values.
/// $mat(A_0, 0; 0, D) vec(mu_0, mu_diff) = vec(phi - A_(0 diff) gamma, D gamma)$
pub fn apply_boundary_values(
  dof_coeffs: &[(DofIdx, f64)],
  galmat: &mut SparseMatrix,
  galsol: &mut GalVec,
  galvec: &mut GalVec,
) {
  let ndofs = galmat.nrows();

  let diagonal = galmat.diagonal();
  let fallback_diag = diagonal
    .iter()
    .copied()
    .find(|&d| d != 0.0)
    .unwrap_or(1.0);

  let dof_coeffs_opt = util::sparse_to_dense_data(dof_coeffs.to_vec(), ndofs);
  let dof_coeffs_zeroed =
    na::DVector::from_iterator(ndofs, dof_coeffs_opt.iter().map(|v| v.unwrap_or(0.0)));

  // Modify galvec.
  *galvec -= galmat.to_nalgebra_csr() * dof_coeffs_zeroed;

  // Set entires zero that share a (row or column) index with a fixed dof.
  galmat.set_zero(|r, c| dof_coeffs_opt[r].is_some() || dof_coeffs_opt[c].is_some());

  for &(i, v) in dof_coeffs {
    let diag = if diagonal[i] != 0.0 {
      diagonal[i]
    } else {
      fallback_diag
    };
    galmat.push(i, i, diag);
    galvec[i] = diag * v;
    galsol[i] = v;
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{mesh::gen, Point};

  use approx::assert_relative_eq;

  #[test]
  fn laplace_elmat_of_unit_square() {
    let mesh = gen::rectangle(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 1, 1);
    let fe = FeQ::new(1);
    let quad = QuadRule2d::gauss(2);
    let mut values = CellValues::new(&fe, &quad);
    values.reinit(0, &mesh.cell_geometry(0)).unwrap();
    let elmat = laplace_elmat(&values);

    // local order (0,0), (1,0), (0,1), (1,1)
    #[rustfmt::skip]
    let expected = na::DMatrix::from_row_slice(4, 4, &[
       4.0, -1.0, -1.0, -2.0,
      -1.0,  4.0, -2.0, -1.0,
      -1.0, -2.0,  4.0, -1.0,
      -2.0, -1.0, -1.0,  4.0,
    ]) / 6.0;
    assert_relative_eq!(elmat, expected, epsilon = 1e-14);
  }

  #[test]
  fn galmat_is_symmetric_with_zero_row_sums() {
    let mut mesh = gen::gamma_mesh();
    mesh.refine_global(1);
    let fe = FeQ::new(2);
    let quad = QuadRule2d::gauss(4);
    let dofh = DofHandler::distribute_dofs(&mesh, &fe);
    let galmat = assemble_galmat(&mesh, &dofh, &fe, &quad, laplace_elmat)
      .unwrap()
      .to_nalgebra_dense();

    assert_relative_eq!(galmat, galmat.transpose(), epsilon = 1e-13);
    for row in galmat.row_iter() {
      assert_relative_eq!(row.sum(), 0.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn boundary_values_are_enforced_symmetrically() {
    let mut galmat = SparseMatrix::zeros(3, 3);
    for (r, c, v) in [
      (0, 0, 2.0),
      (0, 1, -1.0),
      (1, 0, -1.0),
      (1, 1, 2.0),
      (1, 2, -1.0),
      (2, 1, -1.0),
      (2, 2, 2.0),
    ] {
      galmat.push(r, c, v);
    }
    let mut galsol = GalVec::zeros(3);
    let mut galvec = GalVec::zeros(3);
    apply_boundary_values(&[(0, 1.0), (2, 3.0)], &mut galmat, &mut galsol, &mut galvec);

    let dense = galmat.to_nalgebra_dense();
    assert_relative_eq!(dense, dense.transpose());
    assert_eq!(dense[(0, 0)], 2.0);
    assert_eq!(dense[(0, 1)], 0.0);
    assert_eq!(galsol[2], 3.0);

    let solution = dense.lu().solve(&galvec).unwrap();
    assert_relative_eq!(solution, na::dvector![1.0, 2.0, 3.0], epsilon = 1e-14);
  }
}
