//! Continuous Galerkin solution of the Laplace equation on the Gamma shaped
//! domain with a re-entrant corner, and a modal discontinuous Galerkin solver
//! for scalar conservation laws in one space dimension.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod convergence;
pub mod dg;
pub mod dofs;
pub mod error;
pub mod fe;
pub mod function;
pub mod io;
pub mod laplace;
pub mod linalg;
pub mod mesh;
pub mod norms;
pub mod quadrature;
pub mod sparse;
pub mod util;

pub use error::{Error, Result};

pub type VertexIdx = usize;
pub type CellIdx = usize;
pub type DofIdx = usize;

pub type Point = na::Vector2<f64>;
