//! Global numbering of the degrees of freedom of a continuous `Q_p` space.
//!
//! Vertex DoFs come first (and coincide with the vertex indices), followed by
//! the DoFs in the interior of the edges and finally those in the interior of
//! the cells. Edge DoFs are ordered from the lower to the higher vertex index,
//! so both neighbours of an edge agree on them.

use crate::{
  fe::FeQ,
  function::ScalarFunction,
  mesh::{MeshTopology, QuadMesh, CELL_EDGES},
  CellIdx, DofIdx, Point,
};

pub struct DofHandler {
  degree: usize,
  ndofs: usize,
  cell_dofs: Vec<Vec<DofIdx>>,
  support_points: Vec<Point>,
  boundary_dofs: Vec<DofIdx>,
}

impl DofHandler {
  pub fn distribute_dofs(mesh: &QuadMesh, fe: &FeQ) -> Self {
    let topology = mesh.topology();
    let p = fe.degree();
    let nvertices = mesh.nvertices();
    let nedge_dofs = p - 1;
    let ncell_dofs = (p - 1) * (p - 1);
    let edge_offset = nvertices;
    let cell_offset = edge_offset + topology.nedges() * nedge_dofs;
    let ndofs = cell_offset + mesh.n_active_cells() * ncell_dofs;

    let mut cell_dofs = Vec::with_capacity(mesh.n_active_cells());
    let mut support_points = vec![Point::zeros(); ndofs];
    for (icell, cell) in mesh.cells().iter().enumerate() {
      let geo = mesh.cell_geometry(icell);
      let iedges = topology.cell_edges(icell);

      let mut dofs = Vec::with_capacity(fe.dofs_per_cell());
      for ilocal in 0..fe.dofs_per_cell() {
        let (i, j) = fe.tensor_index(ilocal);
        let idof = match local_entity(p, i, j) {
          LocalEntity::Vertex(v) => cell[v],
          LocalEntity::Edge(e, t) => {
            let [a, b] = CELL_EDGES[e];
            // position along the edge, counted from the lower global vertex
            let k = if cell[a] < cell[b] { t - 1 } else { p - 1 - t };
            edge_offset + iedges[e] * nedge_dofs + k
          }
          LocalEntity::Interior => cell_offset + icell * ncell_dofs + (i - 1) + (p - 1) * (j - 1),
        };
        support_points[idof] = geo.map(&fe.support_point(ilocal));
        dofs.push(idof);
      }
      cell_dofs.push(dofs);
    }

    let boundary_dofs = boundary_dofs(&topology, nvertices, nedge_dofs);

    tracing::debug!(
      "distributed {ndofs} dofs ({} on the boundary)",
      boundary_dofs.len()
    );

    Self {
      degree: p,
      ndofs,
      cell_dofs,
      support_points,
      boundary_dofs,
    }
  }

  pub fn n_dofs(&self) -> usize {
    self.ndofs
  }
  pub fn degree(&self) -> usize {
    self.degree
  }
  pub fn cell_dofs(&self, icell: CellIdx) -> &[DofIdx] {
    &self.cell_dofs[icell]
  }
  pub fn support_points(&self) -> &[Point] {
    &self.support_points
  }
  /// Sorted DoFs located on the boundary.
  pub fn boundary_dofs(&self) -> &[DofIdx] {
    &self.boundary_dofs
  }

  /// Nodal interpolation of `f` into the FE space.
  pub fn interpolate(&self, f: &impl ScalarFunction) -> na::DVector<f64> {
    na::DVector::from_iterator(
      self.ndofs,
      self.support_points.iter().map(|p| f.value(p)),
    )
  }

  /// Values of `f` at the boundary DoFs.
  pub fn interpolate_boundary_values(&self, f: &impl ScalarFunction) -> Vec<(DofIdx, f64)> {
    self
      .boundary_dofs
      .iter()
      .map(|&idof| (idof, f.value(&self.support_points[idof])))
      .collect()
  }
}

enum LocalEntity {
  Vertex(usize),
  /// Local edge and the position along it, in `1..p`.
  Edge(usize, usize),
  Interior,
}

fn local_entity(p: usize, i: usize, j: usize) -> LocalEntity {
  let ibnd = i == 0 || i == p;
  let jbnd = j == 0 || j == p;
  match (ibnd, jbnd) {
    (true, true) => LocalEntity::Vertex(match (i == 0, j == 0) {
      (true, true) => 0,
      (false, true) => 1,
      (false, false) => 2,
      (true, false) => 3,
    }),
    (false, true) => LocalEntity::Edge(if j == 0 { 0 } else { 2 }, i),
    (true, false) => LocalEntity::Edge(if i == 0 { 3 } else { 1 }, j),
    (false, false) => LocalEntity::Interior,
  }
}

fn boundary_dofs(topology: &MeshTopology, edge_offset: usize, nedge_dofs: usize) -> Vec<DofIdx> {
  let mut dofs = topology.boundary_vertices();
  for iedge in topology.boundary_edges() {
    dofs.extend((0..nedge_dofs).map(|k| edge_offset + iedge * nedge_dofs + k));
  }
  dofs.sort_unstable();
  dofs
}

#[cfg(test)]
mod test {
  use super::DofHandler;
  use crate::{fe::FeQ, function::ScalarFunction, mesh::gen, Point};

  use approx::assert_relative_eq;

  #[test]
  fn q1_dofs_are_vertices() {
    let mut mesh = gen::gamma_mesh();
    let fe = FeQ::new(1);
    let expected = [8, 21, 65, 225];
    for ndofs in expected {
      let dofh = DofHandler::distribute_dofs(&mesh, &fe);
      assert_eq!(dofh.n_dofs(), ndofs);
      assert_eq!(dofh.n_dofs(), mesh.nvertices());
      mesh.refine_global(1);
    }
  }

  #[test]
  fn q2_dof_counts() {
    let mesh = gen::gamma_mesh();
    let dofh = DofHandler::distribute_dofs(&mesh, &FeQ::new(2));
    // 8 vertices, 10 edges, 3 cells
    assert_eq!(dofh.n_dofs(), 21);
    // 8 boundary vertices and 8 boundary edges
    assert_eq!(dofh.boundary_dofs().len(), 16);

    let dofh = DofHandler::distribute_dofs(&mesh, &FeQ::new(3));
    assert_eq!(dofh.n_dofs(), 8 + 2 * 10 + 4 * 3);
    assert_eq!(dofh.boundary_dofs().len(), 8 + 2 * 8);
  }

  #[test]
  fn shared_dofs_have_matching_support_points() {
    let mut mesh = gen::gamma_mesh();
    mesh.refine_global(1);
    let fe = FeQ::new(3);
    let dofh = DofHandler::distribute_dofs(&mesh, &fe);
    for icell in 0..mesh.n_active_cells() {
      let geo = mesh.cell_geometry(icell);
      for (ilocal, &idof) in dofh.cell_dofs(icell).iter().enumerate() {
        let local = geo.map(&fe.support_point(ilocal));
        assert_relative_eq!(local, dofh.support_points()[idof], epsilon = 1e-13);
      }
    }
  }

  #[test]
  fn boundary_dofs_lie_on_boundary() {
    let mut mesh = gen::gamma_mesh();
    mesh.refine_global(2);
    let dofh = DofHandler::distribute_dofs(&mesh, &FeQ::new(2));
    for &idof in dofh.boundary_dofs() {
      let p = dofh.support_points()[idof];
      let on_outer = (p.x.abs() - 1.0).abs() < 1e-12 || (p.y.abs() - 1.0).abs() < 1e-12;
      let on_corner = (p.x.abs() < 1e-12 && p.y <= 0.0) || (p.y.abs() < 1e-12 && p.x >= 0.0);
      assert!(on_outer || on_corner, "{p} is not on the boundary");
    }
  }

  struct Linear;
  impl ScalarFunction for Linear {
    fn value(&self, p: &Point) -> f64 {
      p.x + 2.0 * p.y
    }
    fn gradient(&self, _: &Point) -> na::Vector2<f64> {
      na::Vector2::new(1.0, 2.0)
    }
  }

  #[test]
  fn interpolation_at_support_points() {
    let mesh = gen::gamma_mesh();
    let dofh = DofHandler::distribute_dofs(&mesh, &FeQ::new(1));
    let coeffs = dofh.interpolate(&Linear);
    assert_relative_eq!(coeffs[2], 3.0);
    assert_relative_eq!(coeffs[6], -3.0);
    let bvals = dofh.interpolate_boundary_values(&Linear);
    assert_eq!(bvals.len(), 8);
  }
}
