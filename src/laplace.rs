//! Driver for the Laplace equation $-Delta u = 0$ with Dirichlet data taken
//! from a known exact solution.
//!
//! One call to [`LaplaceProblem::run`] performs a single refinement cycle:
//! grid and DoF setup, assembly, solve, output and error computation.

use crate::{
  assemble::{self, GalVec},
  dofs::DofHandler,
  fe::FeQ,
  function::{GammaSolution, ScalarFunction},
  io::vtk,
  linalg::{self, FaerCholesky, LinearSolver, SolverControl, SsorPreconditioner},
  mesh::{gen, gmsh, QuadMesh},
  norms::{self, NormType},
  quadrature::QuadRule2d,
  sparse::SparseMatrix,
  Error, Result,
};

use tracing::info;

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum MeshSource {
  /// The Gamma shaped domain meshed with three squares.
  Builtin,
  /// A gmsh file containing quadrilaterals.
  File(PathBuf),
  Given(QuadMesh),
}

impl MeshSource {
  fn load(&self) -> Result<QuadMesh> {
    match self {
      Self::Builtin => Ok(gen::gamma_mesh()),
      Self::File(path) => gmsh::read_gmsh_file(path),
      Self::Given(mesh) => Ok(mesh.clone()),
    }
  }
}

/// Outcome of one refinement cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
  pub ncells: usize,
  pub ndofs: usize,
  pub l2_error: f64,
  pub h1_error: f64,
}

/// Mesh, DoFs and linear system of one refinement level.
pub struct LaplaceSystem {
  pub mesh: QuadMesh,
  pub dofh: DofHandler,
  pub galmat: SparseMatrix,
  pub galvec: GalVec,
  pub galsol: GalVec,
}

pub struct LaplaceProblem<F: ScalarFunction = GammaSolution> {
  fe: FeQ,
  nrefine: usize,
  exact: F,
  mesh_source: MeshSource,
  output_dir: Option<PathBuf>,
  solver: LinearSolver,
  control: SolverControl,
  ssor_relaxation: f64,
}

impl LaplaceProblem<GammaSolution> {
  /// Fails for degree zero, since the element is continuous.
  pub fn new(degree: usize, nrefine: usize) -> Result<Self> {
    if degree == 0 {
      return Err(Error::InvalidParameter(
        "finite element degree must be at least one".into(),
      ));
    }
    Ok(Self {
      fe: FeQ::new(degree),
      nrefine,
      exact: GammaSolution,
      mesh_source: MeshSource::Builtin,
      output_dir: None,
      solver: LinearSolver::Cg,
      control: SolverControl::default(),
      ssor_relaxation: 1.2,
    })
  }
}

impl<F: ScalarFunction> LaplaceProblem<F> {
  pub fn with_exact_solution<G: ScalarFunction>(self, exact: G) -> LaplaceProblem<G> {
    LaplaceProblem {
      fe: self.fe,
      nrefine: self.nrefine,
      exact,
      mesh_source: self.mesh_source,
      output_dir: self.output_dir,
      solver: self.solver,
      control: self.control,
      ssor_relaxation: self.ssor_relaxation,
    }
  }
  pub fn with_mesh(mut self, mesh_source: MeshSource) -> Self {
    self.mesh_source = mesh_source;
    self
  }
  /// Directory receiving `solution-NN.vtk`. Without one no output is written.
  pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
    self.output_dir = dir;
    self
  }
  pub fn with_solver(mut self, solver: LinearSolver) -> Self {
    self.solver = solver;
    self
  }
  pub fn with_solver_control(mut self, control: SolverControl) -> Self {
    self.control = control;
    self
  }
  pub fn with_ssor_relaxation(mut self, omega: f64) -> Self {
    self.ssor_relaxation = omega;
    self
  }

  pub fn degree(&self) -> usize {
    self.fe.degree()
  }

  pub fn make_grid_and_dofs(&self) -> Result<LaplaceSystem> {
    let mut mesh = self.mesh_source.load()?;
    mesh.refine_global(self.nrefine);
    info!("Number of active cells: {}", mesh.n_active_cells());
    info!("Total number of cells: {}", mesh.n_cells());

    let dofh = DofHandler::distribute_dofs(&mesh, &self.fe);
    let ndofs = dofh.n_dofs();
    info!("Number of degrees of freedom: {ndofs}");

    Ok(LaplaceSystem {
      mesh,
      dofh,
      galmat: SparseMatrix::zeros(ndofs, ndofs),
      galvec: GalVec::zeros(ndofs),
      galsol: GalVec::zeros(ndofs),
    })
  }

  pub fn assemble_system(&self, sys: &mut LaplaceSystem) -> Result<()> {
    let quad = QuadRule2d::gauss(2 * self.degree());
    sys.galmat = assemble::assemble_galmat(
      &sys.mesh,
      &sys.dofh,
      &self.fe,
      &quad,
      assemble::laplace_elmat,
    )?;
    sys.galvec.fill(0.0);

    let boundary_values = sys.dofh.interpolate_boundary_values(&self.exact);
    assemble::apply_boundary_values(
      &boundary_values,
      &mut sys.galmat,
      &mut sys.galsol,
      &mut sys.galvec,
    );
    Ok(())
  }

  pub fn solve(&self, sys: &mut LaplaceSystem) -> Result<()> {
    let galmat = sys.galmat.to_nalgebra_csr();
    match self.solver {
      LinearSolver::Cg => {
        let precond = SsorPreconditioner::new(&galmat, self.ssor_relaxation)?;
        let iterations =
          linalg::solve_cg(&galmat, &mut sys.galsol, &sys.galvec, &precond, &self.control)?;
        info!("{iterations} CG iterations needed to obtain convergence.");
      }
      LinearSolver::Cholesky => {
        sys.galsol = FaerCholesky::new(galmat)?.solve(&sys.galvec);
        info!("solved by sparse Cholesky factorization");
      }
    }
    Ok(())
  }

  /// Writes the solution and the nodal error `u - u_h` as VTK.
  pub fn output_results(&self, sys: &LaplaceSystem) -> Result<()> {
    let Some(dir) = &self.output_dir else {
      return Ok(());
    };
    std::fs::create_dir_all(dir)?;
    let error = sys.dofh.interpolate(&self.exact) - &sys.galsol;
    let path = dir.join(format!("solution-{:02}.vtk", self.nrefine));
    vtk::write_vtk(
      &path,
      &sys.mesh,
      &sys.dofh,
      &self.fe,
      &[("solution", &sys.galsol), ("error", &error)],
    )?;
    info!("wrote {}", path.display());
    Ok(())
  }

  /// L2 norm and H1 seminorm of the discretization error.
  pub fn compute_error(&self, sys: &LaplaceSystem) -> Result<(f64, f64)> {
    let quad = QuadRule2d::gauss(2 * self.degree() + 1);
    let error = |norm| {
      norms::global_error(
        &sys.mesh,
        &sys.dofh,
        &self.fe,
        &sys.galsol,
        &self.exact,
        &quad,
        norm,
      )
    };
    Ok((error(NormType::L2Norm)?, error(NormType::H1Seminorm)?))
  }

  pub fn run(&self) -> Result<CycleSummary> {
    let mut sys = self.make_grid_and_dofs()?;
    self.assemble_system(&mut sys)?;
    self.solve(&mut sys)?;
    self.output_results(&sys)?;
    let (l2_error, h1_error) = self.compute_error(&sys)?;
    Ok(CycleSummary {
      ncells: sys.mesh.n_active_cells(),
      ndofs: sys.dofh.n_dofs(),
      l2_error,
      h1_error,
    })
  }
}
