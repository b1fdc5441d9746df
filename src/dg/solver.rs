//! Time evolution of the modal DG discretization.
//!
//! With cell width $h$ and interface fluxes $hat(f)$ the semi-discrete
//! equations read
//! $(d u_k) / (d t) = (2k+1) / h (integral_(-1)^1 f(u) P_k' dif xi - hat(f)_(j+1/2) + (-1)^k hat(f)_(j-1/2))$.

use super::{
  basis::LegendreBasis,
  limiter::Limiter,
  params::DgParameters,
  test_case::TestCase,
};
use crate::{io::gnuplot, quadrature::QuadRule1d, Error, Result};

use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Modal coefficients, one column per cell.
pub type Modes = na::DMatrix<f64>;

fn cell_coeffs(u: &Modes, icell: usize) -> &[f64] {
  let n = u.nrows();
  &u.as_slice()[icell * n..(icell + 1) * n]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DgSummary {
  pub final_time: f64,
  pub nsteps: usize,
  pub noutputs: usize,
  /// L2 error at the final time, if the exact solution is known.
  pub l2_error: Option<f64>,
}

pub struct ScalarProblem {
  params: DgParameters,
  test_case: TestCase,
  basis: LegendreBasis,
  limiter: Limiter,
  h: f64,
}

impl ScalarProblem {
  pub fn new(params: DgParameters, test_case: TestCase) -> Result<Self> {
    params.validate()?;
    if !(params.xmin < params.xmax) {
      return Err(Error::InvalidParameter(format!(
        "empty domain [{}, {}]",
        params.xmin, params.xmax
      )));
    }
    let h = (params.xmax - params.xmin) / params.ncells as f64;
    // exact for the Burgers volume term $u^2 P_k'$
    let nquad = (3 * params.degree) / 2 + 2;
    let basis = LegendreBasis::new(params.degree, nquad);
    let limiter = Limiter::new(params.limiter, params.tvb_parameter, h);
    Ok(Self {
      params,
      test_case,
      basis,
      limiter,
      h,
    })
  }

  pub fn params(&self) -> &DgParameters {
    &self.params
  }
  pub fn cell_center(&self, icell: usize) -> f64 {
    self.params.xmin + (icell as f64 + 0.5) * self.h
  }

  /// Projected and limited initial condition.
  pub fn initial_condition(&self) -> Modes {
    let mut u = Modes::zeros(self.basis.nmodes(), self.params.ncells);
    let mut coeffs = vec![0.0; self.basis.nmodes()];
    for (icell, mut column) in u.column_iter_mut().enumerate() {
      let xc = self.cell_center(icell);
      self.basis.project(
        |x| self.test_case.initial_value(x),
        xc - 0.5 * self.h,
        xc + 0.5 * self.h,
        &mut coeffs,
      );
      column.copy_from_slice(&coeffs);
    }
    self.limiter.apply(&mut u);
    u
  }

  /// Total mass $integral u dif x$.
  pub fn mass(&self, u: &Modes) -> f64 {
    self.h * u.row(0).sum()
  }

  pub fn max_speed(&self, u: &Modes) -> f64 {
    let pde = self.params.pde;
    (0..u.ncols())
      .flat_map(|icell| {
        let coeffs = cell_coeffs(u, icell);
        (0..self.basis.quad().npoints())
          .map(move |q| self.basis.evaluate_at_quad(coeffs, q))
          .chain([self.basis.left_value(coeffs), self.basis.right_value(coeffs)])
      })
      .map(|v| pde.speed(v).abs())
      .fold(0.0, f64::max)
  }

  /// $Delta t = "cfl" h / max |f'(u)|$, unbounded for a vanishing speed.
  pub fn time_step(&self, u: &Modes) -> f64 {
    let speed = self.max_speed(u);
    if speed > 0.0 {
      self.params.cfl * self.h / speed
    } else {
      f64::INFINITY
    }
  }

  /// Right hand side $L(u)$ of the semi-discrete system.
  pub fn assemble_rhs(&self, u: &Modes) -> Modes {
    let ncells = u.ncols();
    let nmodes = u.nrows();
    let pde = self.params.pde;
    let numflux = self.params.numerical_flux;

    // flux through the left face of each cell, periodic
    let face_fluxes: Vec<f64> = (0..ncells)
      .map(|icell| {
        let left = cell_coeffs(u, (icell + ncells - 1) % ncells);
        let right = cell_coeffs(u, icell);
        numflux.eval(pde, self.basis.right_value(left), self.basis.left_value(right))
      })
      .collect();

    let columns: Vec<Vec<f64>> = (0..ncells)
      .into_par_iter()
      .map(|icell| {
        let coeffs = cell_coeffs(u, icell);
        let mut rhs = vec![0.0; nmodes];
        for (q, (_, w)) in self.basis.quad().iter().enumerate() {
          let f = pde.flux(self.basis.evaluate_at_quad(coeffs, q));
          for (k, r) in rhs.iter_mut().enumerate() {
            *r += w * f * self.basis.derivs_at(q)[k];
          }
        }

        let flux_left = face_fluxes[icell];
        let flux_right = face_fluxes[(icell + 1) % ncells];
        for (k, r) in rhs.iter_mut().enumerate() {
          let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
          *r += sign * flux_left - flux_right;
          *r *= (2 * k + 1) as f64 / self.h;
        }
        rhs
      })
      .collect();

    Modes::from_fn(nmodes, ncells, |k, icell| columns[icell][k])
  }

  /// One step of the three stage SSP Runge-Kutta method, limiting after
  /// every stage.
  pub fn ssprk3_step(&self, u: &mut Modes, dt: f64) {
    let mut u1 = &*u + dt * self.assemble_rhs(u);
    self.limiter.apply(&mut u1);

    let mut u2 = 0.75 * &*u + 0.25 * (&u1 + dt * self.assemble_rhs(&u1));
    self.limiter.apply(&mut u2);

    *u = (1.0 / 3.0) * &*u + (2.0 / 3.0) * (&u2 + dt * self.assemble_rhs(&u2));
    self.limiter.apply(u);
  }

  /// L2 error against the exact solution, if one is available at `time`.
  pub fn compute_error(&self, u: &Modes, time: f64) -> Option<f64> {
    let pde = self.params.pde;
    if !self.test_case.has_exact_solution(pde, time) {
      warn!("no exact solution for {pde:?} with this test case at t = {time}, skipping error");
      return None;
    }
    let quad = QuadRule1d::gauss_legendre(self.params.degree + 3);
    let mut sum = 0.0;
    for icell in 0..u.ncols() {
      let coeffs = cell_coeffs(u, icell);
      let xc = self.cell_center(icell);
      for (xi, w) in quad.iter() {
        let exact = self.test_case.exact_value(pde, xc + 0.5 * self.h * xi, time)?;
        sum += 0.5 * self.h * w * (self.basis.evaluate(coeffs, xi) - exact).powi(2);
      }
    }
    Some(sum.sqrt())
  }

  /// Writes `sol-NNNN.gpl`, adding the exact solution when requested.
  pub fn output(&self, u: &Modes, counter: usize, time: Option<f64>) -> Result<()> {
    let Some(dir) = &self.params.output_dir else {
      return Ok(());
    };
    std::fs::create_dir_all(dir)?;
    let pde = self.params.pde;
    let with_exact = time.filter(|&t| self.test_case.has_exact_solution(pde, t));

    let nsamples = self.params.degree + 2;
    let cells: Vec<Vec<Vec<f64>>> = (0..u.ncols())
      .map(|icell| {
        let coeffs = cell_coeffs(u, icell);
        let xc = self.cell_center(icell);
        (0..nsamples)
          .map(|i| {
            let xi = -1.0 + 2.0 * i as f64 / (nsamples - 1) as f64;
            let x = xc + 0.5 * self.h * xi;
            let mut row = vec![x, self.basis.evaluate(coeffs, xi)];
            if let Some(t) = with_exact {
              row.push(self.test_case.exact_value(pde, x, t).unwrap_or(f64::NAN));
            }
            row
          })
          .collect()
      })
      .collect();

    let columns: &[&str] = if with_exact.is_some() {
      &["x", "u_h", "u_exact"]
    } else {
      &["x", "u_h"]
    };
    let path = dir.join(format!("sol-{counter:04}.gpl"));
    gnuplot::write_gnuplot_file(&path, columns, &cells)?;
    info!("wrote {}", path.display());
    Ok(())
  }

  pub fn run(&self) -> Result<DgSummary> {
    let final_time = self.params.final_time;
    let mut u = self.initial_condition();
    let mass0 = self.mass(&u);

    let mut counter = 0;
    self.output(&u, counter, None)?;
    counter += 1;

    let mut time = 0.0;
    let mut nsteps = 0;
    while time < final_time {
      let mut dt = self.time_step(&u);
      let last = time + dt >= final_time;
      if last {
        dt = final_time - time;
      }

      self.ssprk3_step(&mut u, dt);
      nsteps += 1;
      time = if last { final_time } else { time + dt };
      debug!("step {nsteps}: t = {time:.6}, dt = {dt:.3e}");

      if !last && self.params.output_step > 0 && nsteps % self.params.output_step == 0 {
        self.output(&u, counter, None)?;
        counter += 1;
      }
    }

    self.output(&u, counter, Some(time))?;
    counter += 1;

    info!(
      "reached t = {time} after {nsteps} steps, mass change {:.3e}",
      self.mass(&u) - mass0
    );
    let l2_error = self.compute_error(&u, time);
    if let Some(err) = l2_error {
      info!("L2 error: {err:.6e}");
    }

    Ok(DgSummary {
      final_time: time,
      nsteps,
      noutputs: counter,
      l2_error,
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::dg::{LimiterKind, NumericalFlux, Pde, TestCaseKind};

  fn problem(kind: TestCaseKind, edit: impl FnOnce(&mut DgParameters)) -> ScalarProblem {
    let test_case = TestCase::new(kind);
    let mut params = DgParameters {
      output_dir: None,
      xmin: test_case.xmin,
      xmax: test_case.xmax,
      ..Default::default()
    };
    edit(&mut params);
    ScalarProblem::new(params, test_case).unwrap()
  }

  #[test]
  fn constant_state_is_steady() {
    let p = problem(TestCaseKind::Sine, |p| p.degree = 2);
    let mut u = Modes::zeros(3, p.params().ncells);
    u.row_mut(0).fill(0.7);
    let rhs = p.assemble_rhs(&u);
    assert!(rhs.amax() < 1e-12);
  }

  #[test]
  fn linear_advection_p2() {
    let p = problem(TestCaseKind::Sine, |p| {
      p.degree = 2;
      p.ncells = 40;
      p.cfl = 0.1;
      p.final_time = 0.5;
      p.numerical_flux = NumericalFlux::Upwind;
    });
    let summary = p.run().unwrap();
    assert_eq!(summary.final_time, 0.5);
    let err = summary.l2_error.unwrap();
    assert!(err < 1e-2, "L2 error {err}");
  }

  #[test]
  fn burgers_before_shock() {
    let p = problem(TestCaseKind::Sine, |p| {
      p.pde = Pde::Burgers;
      p.ncells = 100;
      p.final_time = 0.3;
      p.numerical_flux = NumericalFlux::Godunov;
    });
    let err = p.run().unwrap().l2_error.unwrap();
    assert!(err < 1e-2, "L2 error {err}");
  }

  #[test]
  fn mass_is_conserved_with_limiter() {
    let p = problem(TestCaseKind::Square, |p| {
      p.pde = Pde::Burgers;
      p.degree = 2;
      p.ncells = 50;
      p.cfl = 0.1;
      p.limiter = LimiterKind::Tvd;
    });
    let mut u = p.initial_condition();
    let mass0 = p.mass(&u);
    for _ in 0..20 {
      let dt = p.time_step(&u);
      p.ssprk3_step(&mut u, dt);
    }
    assert!((p.mass(&u) - mass0).abs() < 1e-12);
  }

  #[test]
  fn limited_square_wave_stays_bounded() {
    let p = problem(TestCaseKind::Square, |p| {
      p.ncells = 50;
      p.final_time = 0.25;
      p.limiter = LimiterKind::Tvd;
    });
    let mut u = p.initial_condition();
    for _ in 0..20 {
      let dt = p.time_step(&u);
      p.ssprk3_step(&mut u, dt);
    }
    for avg in u.row(0).iter() {
      assert!(*avg > -1e-10 && *avg < 1.0 + 1e-10, "average {avg}");
    }
  }

  #[test]
  fn no_exact_solution_for_burgers_square() {
    let p = problem(TestCaseKind::Square, |p| {
      p.pde = Pde::Burgers;
      p.ncells = 10;
      p.final_time = 0.1;
    });
    assert_eq!(p.run().unwrap().l2_error, None);
  }

  #[test]
  fn empty_domain_is_rejected() {
    let params = DgParameters {
      output_dir: None,
      ..Default::default()
    };
    let err = ScalarProblem::new(params, TestCase::new(TestCaseKind::Sine));
    assert!(matches!(err, Err(Error::InvalidParameter(_))));
  }
}
