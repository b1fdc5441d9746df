//! Scalar functions with known gradient, used as Dirichlet data and as
//! reference solutions in the error computation.

use crate::Point;

use std::f64::consts::PI;

pub trait ScalarFunction: Sync {
  fn value(&self, p: &Point) -> f64;
  fn gradient(&self, p: &Point) -> na::Vector2<f64>;
}

/// The harmonic function $u = r^(2/3) sin(2/3 theta)$, with $theta in [0, 2 pi)$.
///
/// It vanishes on the two edges meeting at the re-entrant corner of the
/// Gamma domain and its gradient is singular at the origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct GammaSolution;

impl GammaSolution {
  fn polar(p: &Point) -> (f64, f64) {
    let r = p.norm();
    let mut theta = p.y.atan2(p.x);
    if theta < 0.0 {
      theta += 2.0 * PI;
    }
    (r, theta)
  }
}

impl ScalarFunction for GammaSolution {
  fn value(&self, p: &Point) -> f64 {
    let (r, theta) = Self::polar(p);
    r.powf(2.0 / 3.0) * (2.0 * theta / 3.0).sin()
  }

  fn gradient(&self, p: &Point) -> na::Vector2<f64> {
    let (r, theta) = Self::polar(p);
    let a = (2.0 / 3.0) * r.powf(-4.0 / 3.0);
    let (sin, cos) = (2.0 * theta / 3.0).sin_cos();
    na::Vector2::new(a * (-p.y * cos + p.x * sin), a * (p.x * cos + p.y * sin))
  }
}

/// Affine function, reproduced exactly by every `Q_p` space.
#[derive(Debug, Clone, Copy)]
pub struct AffineFunction {
  pub constant: f64,
  pub slope: na::Vector2<f64>,
}

impl ScalarFunction for AffineFunction {
  fn value(&self, p: &Point) -> f64 {
    self.constant + self.slope.dot(p)
  }
  fn gradient(&self, _: &Point) -> na::Vector2<f64> {
    self.slope
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn gamma_solution_boundary_values() {
    let u = GammaSolution;
    // vanishes on both sides of the re-entrant corner
    assert_relative_eq!(u.value(&Point::new(0.5, 0.0)), 0.0);
    assert_relative_eq!(u.value(&Point::new(0.0, -0.5)), 0.0, epsilon = 1e-15);
    assert_relative_eq!(u.value(&Point::new(0.0, 0.0)), 0.0);

    assert_relative_eq!(u.value(&Point::new(0.0, 1.0)), (PI / 3.0).sin());
    assert_relative_eq!(u.value(&Point::new(-1.0, 0.0)), (2.0 * PI / 3.0).sin());
  }

  #[test]
  fn gamma_solution_gradient_matches_finite_differences() {
    let u = GammaSolution;
    let h = 1e-6;
    for p in [
      Point::new(0.3, 0.7),
      Point::new(-0.4, 0.2),
      Point::new(-0.6, -0.5),
      Point::new(0.8, 0.1),
    ] {
      let grad = u.gradient(&p);
      let dx = (u.value(&(p + Point::new(h, 0.0))) - u.value(&(p - Point::new(h, 0.0)))) / (2.0 * h);
      let dy = (u.value(&(p + Point::new(0.0, h))) - u.value(&(p - Point::new(0.0, h)))) / (2.0 * h);
      assert_relative_eq!(grad.x, dx, epsilon = 1e-7);
      assert_relative_eq!(grad.y, dy, epsilon = 1e-7);
    }
  }

  #[test]
  fn gamma_solution_is_harmonic() {
    let u = GammaSolution;
    let h = 1e-3;
    let p = Point::new(-0.3, 0.4);
    let e = |x: f64, y: f64| u.value(&(p + Point::new(x, y)));
    let laplacian = (e(h, 0.0) + e(-h, 0.0) + e(0.0, h) + e(0.0, -h) - 4.0 * e(0.0, 0.0)) / (h * h);
    assert!(laplacian.abs() < 1e-5, "laplacian = {laplacian}");
  }
}
