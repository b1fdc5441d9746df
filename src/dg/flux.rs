//! Physical and numerical fluxes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pde {
  /// Linear advection with unit speed, $f(u) = u$.
  Linear,
  /// Inviscid Burgers equation, $f(u) = u^2 / 2$.
  Burgers,
}

impl Pde {
  pub fn flux(self, u: f64) -> f64 {
    match self {
      Self::Linear => u,
      Self::Burgers => 0.5 * u * u,
    }
  }

  /// Characteristic speed $f'(u)$.
  pub fn speed(self, u: f64) -> f64 {
    match self {
      Self::Linear => 1.0,
      Self::Burgers => u,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericalFlux {
  Central,
  /// Upwinding with the Roe speed.
  Upwind,
  /// Local Lax-Friedrichs (Rusanov).
  LaxFriedrichs,
  Godunov,
}

impl NumericalFlux {
  /// Flux through an interface with left state `ul` and right state `ur`.
  pub fn eval(self, pde: Pde, ul: f64, ur: f64) -> f64 {
    let fl = pde.flux(ul);
    let fr = pde.flux(ur);
    match self {
      Self::Central => 0.5 * (fl + fr),
      Self::Upwind => {
        let speed = if ul != ur {
          (fr - fl) / (ur - ul)
        } else {
          pde.speed(ul)
        };
        if speed >= 0.0 {
          fl
        } else {
          fr
        }
      }
      Self::LaxFriedrichs => {
        let alpha = pde.speed(ul).abs().max(pde.speed(ur).abs());
        0.5 * (fl + fr - alpha * (ur - ul))
      }
      Self::Godunov => godunov(pde, ul, ur),
    }
  }
}

/// Flux of the exact Riemann solution at the interface, for convex $f$:
/// $min_(ul <= u <= ur) f(u)$ or $max_(ur <= u <= ul) f(u)$.
fn godunov(pde: Pde, ul: f64, ur: f64) -> f64 {
  match pde {
    Pde::Linear => ul,
    Pde::Burgers => {
      if ul <= ur {
        if ul > 0.0 {
          pde.flux(ul)
        } else if ur < 0.0 {
          pde.flux(ur)
        } else {
          0.0
        }
      } else {
        pde.flux(ul).max(pde.flux(ur))
      }
    }
  }
}
