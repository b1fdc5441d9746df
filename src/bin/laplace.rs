//! Laplace equation on the Gamma shaped domain with the singular exact
//! solution $r^(2/3) sin(2/3 theta)$, solved on a sequence of globally refined
//! meshes. Prints the convergence table and writes it to `error.tex`.

use reentrant::{
  convergence::{ConvergenceTable, RateMode, TexAlign},
  laplace::{LaplaceProblem, MeshSource},
  linalg::{LinearSolver, SolverControl},
};

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use std::{fs::File, io::BufWriter, path::PathBuf};

#[derive(Debug, StructOpt)]
#[structopt(name = "laplace", about = "FEM convergence study on the Gamma domain")]
struct Opt {
  /// Gmsh file with the coarse quadrilateral mesh.
  #[structopt(long, parse(from_os_str), default_value = "data/Gamma.msh")]
  mesh: PathBuf,
  /// Use the built-in coarse mesh instead of reading `--mesh`.
  #[structopt(long)]
  builtin: bool,
  #[structopt(long, default_value = "1")]
  degree: usize,
  /// Number of refinement cycles, starting with the coarse mesh.
  #[structopt(long, default_value = "5")]
  cycles: usize,
  #[structopt(long, parse(from_os_str), default_value = ".")]
  output_dir: PathBuf,
  /// `cg` or `cholesky`
  #[structopt(long, default_value = "cg")]
  solver: LinearSolver,
  /// SSOR relaxation parameter of the CG preconditioner, in (0, 2).
  #[structopt(long, default_value = "1.2")]
  ssor_relaxation: f64,
  #[structopt(long, default_value = "1000")]
  max_iterations: usize,
  /// Absolute CG residual tolerance.
  #[structopt(long, default_value = "1e-12")]
  tolerance: f64,
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let opt = Opt::from_args();
  if let Err(e) = run(opt) {
    tracing::error!("{e}");
    std::process::exit(1);
  }
}

fn run(opt: Opt) -> reentrant::Result<()> {
  let mesh_source = if opt.builtin {
    MeshSource::Builtin
  } else {
    MeshSource::File(opt.mesh.clone())
  };

  let mut table = ConvergenceTable::new();
  for nrefine in 0..opt.cycles {
    tracing::info!("Refinement cycle {nrefine}");
    let summary = LaplaceProblem::new(opt.degree, nrefine)?
      .with_mesh(mesh_source.clone())
      .with_output_dir(Some(opt.output_dir.clone()))
      .with_solver(opt.solver)
      .with_solver_control(SolverControl {
        max_iterations: opt.max_iterations,
        tolerance: opt.tolerance,
      })
      .with_ssor_relaxation(opt.ssor_relaxation)
      .run()?;

    table.add_value("cells", summary.ncells);
    table.add_value("dofs", summary.ndofs);
    table.add_value("L2", summary.l2_error);
    table.add_value("H1", summary.h1_error);
  }
  if table.nrows() == 0 {
    return Ok(());
  }

  table.set_precision("L2", 3);
  table.set_scientific("L2", true);
  table.set_precision("H1", 3);
  table.set_scientific("H1", true);

  table.set_tex_caption("cells", "\\# cells");
  table.set_tex_caption("dofs", "\\# dofs");
  table.set_tex_caption("L2", "$L^2$-error");
  table.set_tex_caption("H1", "$H^1$-error");

  table.set_tex_format("cells", TexAlign::Right);
  table.set_tex_format("dofs", TexAlign::Right);

  table.evaluate_convergence_rates("L2", RateMode::ReductionLog2);
  table.evaluate_convergence_rates("H1", RateMode::ReductionLog2);

  table.write_text(std::io::stdout().lock())?;

  std::fs::create_dir_all(&opt.output_dir)?;
  let path = opt.output_dir.join("error.tex");
  table.write_tex(BufWriter::new(File::create(&path)?))?;
  tracing::info!("wrote {}", path.display());
  Ok(())
}
