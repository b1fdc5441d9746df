//! Initial conditions on periodic domains and their exact evolution.

use super::flux::Pde;

use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseKind {
  /// $u_0 = 1/4 + 1/2 sin(pi x)$ on `[-1,1]`.
  Sine,
  /// Continuous hat of height one supported on `[-1/2,1/2]`, domain `[-1,1]`.
  Hat,
  /// Indicator of `[-1/2,1/2]`, domain `[-1,1]`.
  Square,
  /// Gaussian, square, triangle and ellipse pulses side by side on `[-1,1]`.
  Composite,
}

const NEWTON_TOL: f64 = 1e-14;
const NEWTON_MAXIT: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct TestCase {
  pub kind: TestCaseKind,
  pub xmin: f64,
  pub xmax: f64,
}

impl TestCase {
  pub fn new(kind: TestCaseKind) -> Self {
    Self {
      kind,
      xmin: -1.0,
      xmax: 1.0,
    }
  }

  pub fn length(&self) -> f64 {
    self.xmax - self.xmin
  }

  /// Maps `x` into `[xmin, xmax)`.
  pub fn wrap(&self, x: f64) -> f64 {
    if (self.xmin..self.xmax).contains(&x) {
      x
    } else {
      self.xmin + (x - self.xmin).rem_euclid(self.length())
    }
  }

  pub fn initial_value(&self, x: f64) -> f64 {
    let x = self.wrap(x);
    match self.kind {
      TestCaseKind::Sine => 0.25 + 0.5 * (PI * x).sin(),
      TestCaseKind::Hat => (1.0 - 2.0 * x.abs()).max(0.0),
      TestCaseKind::Square => {
        if x.abs() <= 0.5 {
          1.0
        } else {
          0.0
        }
      }
      TestCaseKind::Composite => composite(x),
    }
  }

  /// $u_0'$, only meaningful for smooth data.
  fn initial_derivative(&self, x: f64) -> Option<f64> {
    match self.kind {
      TestCaseKind::Sine => Some(0.5 * PI * (PI * self.wrap(x)).cos()),
      _ => None,
    }
  }

  /// Time at which the Burgers solution develops a shock, $-1 / min u_0'$.
  fn breaking_time(&self) -> Option<f64> {
    match self.kind {
      TestCaseKind::Sine => Some(2.0 / PI),
      _ => None,
    }
  }

  pub fn has_exact_solution(&self, pde: Pde, time: f64) -> bool {
    match pde {
      Pde::Linear => true,
      Pde::Burgers => self.breaking_time().is_some_and(|tb| time < tb),
    }
  }

  /// Exact solution at `(x, time)`, if known.
  ///
  /// Linear advection shifts the initial data periodically. For Burgers the
  /// implicit characteristic relation $u = u_0(x - u t)$ is solved by Newton's
  /// method, valid up to the breaking time.
  pub fn exact_value(&self, pde: Pde, x: f64, time: f64) -> Option<f64> {
    if !self.has_exact_solution(pde, time) {
      return None;
    }
    match pde {
      Pde::Linear => Some(self.initial_value(x - time)),
      Pde::Burgers => {
        let mut u = self.initial_value(x);
        for _ in 0..NEWTON_MAXIT {
          let xi = x - u * time;
          let residual = u - self.initial_value(xi);
          let derivative = 1.0 + time * self.initial_derivative(xi)?;
          let du = residual / derivative;
          u -= du;
          if du.abs() < NEWTON_TOL {
            return Some(u);
          }
        }
        tracing::warn!("characteristic Newton iteration did not converge at x = {x}");
        Some(u)
      }
    }
  }
}

fn composite(x: f64) -> f64 {
  const DELTA: f64 = 0.005;
  const Z: f64 = -0.7;
  const A: f64 = 0.5;
  const ALPHA: f64 = 10.0;
  let beta = 2f64.ln() / (36.0 * DELTA * DELTA);

  let g = |x: f64, z: f64| (-beta * (x - z).powi(2)).exp();
  let f = |x: f64, a: f64| (1.0 - ALPHA * ALPHA * (x - a).powi(2)).max(0.0).sqrt();

  if (-0.8..=-0.6).contains(&x) {
    (g(x, Z - DELTA) + g(x, Z + DELTA) + 4.0 * g(x, Z)) / 6.0
  } else if (-0.4..=-0.2).contains(&x) {
    1.0
  } else if (0.0..=0.2).contains(&x) {
    1.0 - (10.0 * (x - 0.1)).abs()
  } else if (0.4..=0.6).contains(&x) {
    (f(x, A - DELTA) + f(x, A + DELTA) + 4.0 * f(x, A)) / 6.0
  } else {
    0.0
  }
}
