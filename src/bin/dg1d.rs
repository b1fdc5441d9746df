//! Modal DG solver for scalar conservation laws in one dimension.
//!
//! Usage: `dg1d <params.json>`. Without a parameter file the default
//! parameters are printed, showing all recognized keys.

use reentrant::dg::{DgParameters, ScalarProblem, TestCase};

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(name = "dg1d", about = "1D scalar DG solver")]
struct Opt {
  /// JSON parameter file.
  #[structopt(parse(from_os_str))]
  params: Option<PathBuf>,
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
  let Some(path) = opt.params else {
    println!("Specify input parameter file");
    println!("It should contain following parameters.\n");
    println!("{}", DgParameters::default().to_json()?);
    return Ok(());
  };

  let mut params = DgParameters::from_file(&path)?;
  println!("{}", params.to_json()?);

  let test_case = TestCase::new(params.test_case);
  params.xmin = test_case.xmin;
  params.xmax = test_case.xmax;

  let summary = ScalarProblem::new(params, test_case)?.run()?;
  match summary.l2_error {
    Some(err) => println!(
      "t = {}, steps = {}, L2 error = {err:.6e}",
      summary.final_time, summary.nsteps
    ),
    None => println!("t = {}, steps = {}", summary.final_time, summary.nsteps),
  }
  Ok(())
}
