//! Norms of the difference between a FE function and a reference function.

use crate::{
  dofs::DofHandler,
  fe::{CellValues, FeQ},
  function::ScalarFunction,
  mesh::QuadMesh,
  quadrature::QuadRule2d,
  Result,
};

use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormType {
  L2Norm,
  H1Seminorm,
}

/// Per-cell norms of $u - u_h$.
pub fn integrate_difference(
  mesh: &QuadMesh,
  dofh: &DofHandler,
  fe: &FeQ,
  galsol: &na::DVector<f64>,
  exact: &impl ScalarFunction,
  quad: &QuadRule2d,
  norm: NormType,
) -> Result<na::DVector<f64>> {
  let cell_norms: Vec<f64> = (0..mesh.n_active_cells())
    .into_par_iter()
    .map_init(
      || CellValues::new(fe, quad),
      |values, icell| -> Result<f64> {
        values.reinit(icell, &mesh.cell_geometry(icell))?;
        let coeffs: Vec<f64> = dofh.cell_dofs(icell).iter().map(|&i| galsol[i]).collect();

        let mut sum = 0.0;
        for q in 0..values.nquad_points() {
          let p = values.quadrature_point(q);
          let diff = match norm {
            NormType::L2Norm => (exact.value(p) - values.function_value(&coeffs, q)).powi(2),
            NormType::H1Seminorm => {
              (exact.gradient(p) - values.function_grad(&coeffs, q)).norm_squared()
            }
          };
          sum += diff * values.jxw(q);
        }
        Ok(sum.sqrt())
      },
    )
    .collect::<Result<_>>()?;

  Ok(na::DVector::from_vec(cell_norms))
}

/// Global norm of $u - u_h$, the l2 norm of the per-cell norms.
pub fn global_error(
  mesh: &QuadMesh,
  dofh: &DofHandler,
  fe: &FeQ,
  galsol: &na::DVector<f64>,
  exact: &impl ScalarFunction,
  quad: &QuadRule2d,
  norm: NormType,
) -> Result<f64> {
  integrate_difference(mesh, dofh, fe, galsol, exact, quad, norm).map(|cell_norms| cell_norms.norm())
}
