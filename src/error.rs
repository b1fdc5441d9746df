use std::path::PathBuf;

use crate::CellIdx;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("grid file not found: {}", .0.display())]
  GridFileNotFound(PathBuf),

  #[error("failed to parse gmsh file: {0}")]
  Gmsh(String),

  #[error("malformed mesh: {0}")]
  MalformedMesh(String),

  #[error("degenerate cell {cell} (jacobian determinant {det:e})")]
  DegenerateCell { cell: CellIdx, det: f64 },

  #[error("CG did not converge within {iterations} iterations (residual {residual:e})")]
  NoConvergence { iterations: usize, residual: f64 },

  #[error("sparse factorization failed: {0}")]
  Factorization(String),

  #[error("failed to write VTK output: {0}")]
  Vtk(String),

  #[error("failed to parse parameter file: {0}")]
  Parameters(#[from] serde_json::Error),

  #[error("invalid parameter: {0}")]
  InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
