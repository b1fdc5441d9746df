//! Modal discontinuous Galerkin method for scalar conservation laws
//! $u_t + f(u)_x = 0$ on a periodic interval.
//!
//! The solution is a Legendre polynomial expansion per cell, advanced in
//! time by a strong stability preserving Runge-Kutta method and optionally
//! stabilized by a TVD/TVB slope limiter.

pub mod basis;
pub mod flux;
pub mod limiter;
pub mod params;
pub mod solver;
pub mod test_case;

pub use flux::{NumericalFlux, Pde};
pub use limiter::LimiterKind;
pub use params::DgParameters;
pub use solver::{DgSummary, ScalarProblem};
pub use test_case::{TestCase, TestCaseKind};
