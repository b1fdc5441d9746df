use reentrant::{
  convergence::{ConvergenceTable, RateMode, TableValue},
  laplace::{LaplaceProblem, MeshSource},
  util::algebraic_convergence_rate,
};

use std::path::PathBuf;

fn gamma_msh() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/Gamma.msh")
}

#[test]
fn gamma_singularity_limits_convergence() {
  let summaries: Vec<_> = (2..=4)
    .map(|nrefine| LaplaceProblem::new(1, nrefine).unwrap().run().unwrap())
    .collect();

  for pair in summaries.windows(2) {
    assert_eq!(pair[1].ncells, 4 * pair[0].ncells);
    assert!(pair[1].l2_error < pair[0].l2_error);
    assert!(pair[1].h1_error < pair[0].h1_error);
  }

  let [.., prev, next] = summaries.as_slice() else {
    unreachable!()
  };
  let h1_rate = algebraic_convergence_rate(next.h1_error, prev.h1_error);
  let l2_rate = algebraic_convergence_rate(next.l2_error, prev.l2_error);
  println!("H1 rate {h1_rate:.3}, L2 rate {l2_rate:.3}");
  // $h^(2/3)$ and $h^(4/3)$ instead of $h$ and $h^2$
  assert!((0.5..0.85).contains(&h1_rate), "H1 rate {h1_rate}");
  assert!((1.1..1.7).contains(&l2_rate), "L2 rate {l2_rate}");
}

#[test]
fn higher_degree_does_not_beat_the_singularity() {
  let coarse = LaplaceProblem::new(2, 2).unwrap().run().unwrap();
  let fine = LaplaceProblem::new(2, 3).unwrap().run().unwrap();
  let q1 = LaplaceProblem::new(1, 3).unwrap().run().unwrap();
  assert!(fine.h1_error < q1.h1_error);

  // far from the order two of a smooth solution
  let rate = algebraic_convergence_rate(fine.h1_error, coarse.h1_error);
  assert!(rate < 1.0, "Q2 H1 rate {rate}");
}

#[test]
fn mesh_file_matches_builtin_mesh() {
  let builtin = LaplaceProblem::new(1, 1).unwrap().run().unwrap();
  let from_file = LaplaceProblem::new(1, 1)
    .unwrap()
    .with_mesh(MeshSource::File(gamma_msh()))
    .run()
    .unwrap();
  assert_eq!(builtin.ncells, from_file.ncells);
  assert_eq!(builtin.ndofs, from_file.ndofs);
  assert!((builtin.l2_error - from_file.l2_error).abs() < 1e-12);
  assert!((builtin.h1_error - from_file.h1_error).abs() < 1e-12);
}

#[test]
fn vtk_output_per_cycle() {
  let dir = std::env::temp_dir().join(format!("reentrant-laplace-{}", std::process::id()));
  for nrefine in 0..2 {
    LaplaceProblem::new(1, nrefine)
      .unwrap()
      .with_output_dir(Some(dir.clone()))
      .run()
      .unwrap();
  }
  assert!(dir.join("solution-00.vtk").is_file());
  assert!(dir.join("solution-01.vtk").is_file());
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn convergence_table_of_cycles() {
  let mut table = ConvergenceTable::new();
  for nrefine in 0..3 {
    let summary = LaplaceProblem::new(1, nrefine).unwrap().run().unwrap();
    table.add_value("cells", summary.ncells);
    table.add_value("dofs", summary.ndofs);
    table.add_value("L2", summary.l2_error);
    table.add_value("H1", summary.h1_error);
  }
  table.set_scientific("L2", true);
  table.set_scientific("H1", true);
  table.evaluate_convergence_rates("L2", RateMode::ReductionLog2);
  table.evaluate_convergence_rates("H1", RateMode::ReductionLog2);

  assert_eq!(table.value("cells", 2), Some(TableValue::Int(48)));
  assert_eq!(table.value("dofs", 1), Some(TableValue::Int(21)));
  assert_eq!(
    table.keys().collect::<Vec<_>>(),
    ["cells", "dofs", "L2", "L2-rate", "H1", "H1-rate"]
  );
  let Some(TableValue::Float(rate)) = table.value("H1-rate", 2) else {
    panic!("missing rate");
  };
  assert!(rate > 0.3 && rate < 1.0, "H1 rate {rate}");

  let mut out = Vec::new();
  table.write_text(&mut out).unwrap();
  assert_eq!(String::from_utf8(out).unwrap().lines().count(), 4);
}
