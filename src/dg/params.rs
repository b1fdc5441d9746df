//! Run-time parameters of the DG solver, read from a JSON file.

use super::{flux::NumericalFlux, flux::Pde, limiter::LimiterKind, test_case::TestCaseKind};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DgParameters {
  /// Polynomial degree of the modal basis.
  pub degree: usize,
  pub ncells: usize,
  pub cfl: f64,
  pub final_time: f64,
  pub pde: Pde,
  pub test_case: TestCaseKind,
  pub numerical_flux: NumericalFlux,
  pub limiter: LimiterKind,
  /// TVB constant $M$.
  pub tvb_parameter: f64,
  /// Write a solution file every this many time steps. With zero only the
  /// initial and the final solution are written.
  pub output_step: usize,
  /// Without a directory no solution files are written.
  pub output_dir: Option<PathBuf>,

  /// Domain, copied from the test case before the solver is set up.
  #[serde(skip)]
  pub xmin: f64,
  #[serde(skip)]
  pub xmax: f64,
}

impl Default for DgParameters {
  fn default() -> Self {
    Self {
      degree: 1,
      ncells: 100,
      cfl: 0.2,
      final_time: 0.5,
      pde: Pde::Linear,
      test_case: TestCaseKind::Sine,
      numerical_flux: NumericalFlux::LaxFriedrichs,
      limiter: LimiterKind::None,
      tvb_parameter: 0.0,
      output_step: 10,
      output_dir: Some(PathBuf::from("output")),
      xmin: 0.0,
      xmax: 0.0,
    }
  }
}

impl DgParameters {
  pub fn from_json(json: &str) -> Result<Self> {
    let params: Self = serde_json::from_str(json)?;
    params.validate()?;
    Ok(params)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    Self::from_json(&content)
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn validate(&self) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidParameter(msg));
    if self.ncells == 0 {
      return invalid("`ncells` must be positive".into());
    }
    if !(self.cfl > 0.0 && self.cfl.is_finite()) {
      return invalid(format!("`cfl` must be positive, got {}", self.cfl));
    }
    if !(self.final_time > 0.0 && self.final_time.is_finite()) {
      return invalid(format!("`final_time` must be positive, got {}", self.final_time));
    }
    if !(self.tvb_parameter >= 0.0) {
      return invalid(format!(
        "`tvb_parameter` must be non-negative, got {}",
        self.tvb_parameter
      ));
    }
    Ok(())
  }
}
