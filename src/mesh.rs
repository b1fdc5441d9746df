//! Conforming quadrilateral meshes in two dimensions.
//!
//! A mesh stores the vertex coordinates and the cells as counter-clockwise
//! ordered vertex quadruples. Cells are mapped from the reference square
//! `[0,1]^2` by the bilinear map through their four vertices, where local
//! vertex `0,1,2,3` sits at reference position `(0,0),(1,0),(1,1),(0,1)`.
//! Edge topology is derived on demand.

pub mod gen;
pub mod gmsh;

use crate::{CellIdx, Error, Point, Result, VertexIdx};

use std::collections::HashMap;

pub type EdgeIdx = usize;
pub type CellVertices = [VertexIdx; 4];

/// Local vertices of the four cell edges, each oriented in the direction of the
/// increasing reference coordinate: bottom, right, top, left.
pub const CELL_EDGES: [[usize; 2]; 4] = [[0, 1], [1, 2], [3, 2], [0, 3]];

#[derive(Debug, Clone)]
pub struct QuadMesh {
  vertices: Vec<Point>,
  cells: Vec<CellVertices>,
  /// Number of cells on all coarser refinement levels.
  ncoarse_cells: usize,
  level: usize,
}

impl QuadMesh {
  /// Constructs a mesh from vertex coordinates and cells.
  ///
  /// Clockwise cells are reoriented; degenerate cells are rejected.
  pub fn new(vertices: Vec<Point>, mut cells: Vec<CellVertices>) -> Result<Self> {
    let nvertices = vertices.len();
    for (icell, cell) in cells.iter_mut().enumerate() {
      if let Some(&bad) = cell.iter().find(|&&v| v >= nvertices) {
        return Err(Error::MalformedMesh(format!(
          "cell {icell} references vertex {bad}, but there are only {nvertices} vertices"
        )));
      }

      let coords = cell.map(|v| vertices[v]);
      let det = QuadGeometry::new(coords).jacobian_det(&na::Vector2::new(0.5, 0.5));
      if det.abs() <= f64::EPSILON * bbox_area(&coords) {
        return Err(Error::DegenerateCell { cell: icell, det });
      }
      if det < 0.0 {
        cell.swap(1, 3);
      }
    }

    Ok(Self {
      vertices,
      cells,
      ncoarse_cells: 0,
      level: 0,
    })
  }

  pub fn nvertices(&self) -> usize {
    self.vertices.len()
  }
  /// Number of cells of the finest level.
  pub fn n_active_cells(&self) -> usize {
    self.cells.len()
  }
  /// Number of cells on all levels of the refinement hierarchy.
  pub fn n_cells(&self) -> usize {
    self.ncoarse_cells + self.cells.len()
  }
  pub fn level(&self) -> usize {
    self.level
  }

  pub fn vertices(&self) -> &[Point] {
    &self.vertices
  }
  pub fn cells(&self) -> &[CellVertices] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> &CellVertices {
    &self.cells[icell]
  }

  pub fn cell_geometry(&self, icell: CellIdx) -> QuadGeometry {
    QuadGeometry::new(self.cells[icell].map(|v| self.vertices[v]))
  }

  pub fn area(&self) -> f64 {
    (0..self.n_active_cells())
      .map(|icell| self.cell_geometry(icell).area())
      .sum()
  }

  pub fn topology(&self) -> MeshTopology {
    MeshTopology::new(self)
  }

  /// Refines every cell into four children, `nrefine` times.
  pub fn refine_global(&mut self, nrefine: usize) {
    for _ in 0..nrefine {
      self.refine_once();
    }
  }

  fn refine_once(&mut self) {
    let mut midpoints: HashMap<[VertexIdx; 2], VertexIdx> = HashMap::new();
    let mut fine_cells = Vec::with_capacity(4 * self.cells.len());

    for icell in 0..self.cells.len() {
      let [v0, v1, v2, v3] = self.cells[icell];

      let mut midpoint = |a: VertexIdx, b: VertexIdx| -> VertexIdx {
        let vertices = &mut self.vertices;
        *midpoints.entry(sorted_edge(a, b)).or_insert_with(|| {
          let mid = 0.5 * (vertices[a] + vertices[b]);
          vertices.push(mid);
          vertices.len() - 1
        })
      };
      let m01 = midpoint(v0, v1);
      let m12 = midpoint(v1, v2);
      let m23 = midpoint(v2, v3);
      let m30 = midpoint(v3, v0);

      let center = self.cells[icell]
        .iter()
        .map(|&v| self.vertices[v])
        .sum::<Point>()
        / 4.0;
      self.vertices.push(center);
      let c = self.vertices.len() - 1;

      fine_cells.push([v0, m01, c, m30]);
      fine_cells.push([m01, v1, m12, c]);
      fine_cells.push([c, m12, v2, m23]);
      fine_cells.push([m30, c, m23, v3]);
    }

    self.ncoarse_cells += self.cells.len();
    self.cells = fine_cells;
    self.level += 1;
  }
}

pub fn sorted_edge(a: VertexIdx, b: VertexIdx) -> [VertexIdx; 2] {
  if a < b {
    [a, b]
  } else {
    [b, a]
  }
}

fn bbox_area(coords: &[Point; 4]) -> f64 {
  let (mut min, mut max) = (coords[0], coords[0]);
  for c in &coords[1..] {
    min = min.inf(c);
    max = max.sup(c);
  }
  let diag = max - min;
  diag.x * diag.y
}

/// Edge topology of a [`QuadMesh`].
#[derive(Debug, Clone)]
pub struct MeshTopology {
  /// Edges by sorted vertex pair.
  edges: Vec<[VertexIdx; 2]>,
  /// Number of cells adjacent to each edge.
  edge_ncells: Vec<usize>,
  /// Global edges of each cell, in [`CELL_EDGES`] order.
  cell_edges: Vec<[EdgeIdx; 4]>,
}

impl MeshTopology {
  pub fn new(mesh: &QuadMesh) -> Self {
    let mut edge_map: HashMap<[VertexIdx; 2], EdgeIdx> = HashMap::new();
    let mut edges = Vec::new();
    let mut edge_ncells = Vec::new();
    let mut cell_edges = Vec::with_capacity(mesh.n_active_cells());

    for cell in mesh.cells() {
      let iedges = CELL_EDGES.map(|[a, b]| {
        let key = sorted_edge(cell[a], cell[b]);
        let iedge = *edge_map.entry(key).or_insert_with(|| {
          edges.push(key);
          edge_ncells.push(0);
          edges.len() - 1
        });
        edge_ncells[iedge] += 1;
        iedge
      });
      cell_edges.push(iedges);
    }

    Self {
      edges,
      edge_ncells,
      cell_edges,
    }
  }

  pub fn nedges(&self) -> usize {
    self.edges.len()
  }
  pub fn cell_edges(&self, icell: CellIdx) -> &[EdgeIdx; 4] {
    &self.cell_edges[icell]
  }

  pub fn is_boundary_edge(&self, iedge: EdgeIdx) -> bool {
    self.edge_ncells[iedge] == 1
  }

  pub fn boundary_edges(&self) -> Vec<EdgeIdx> {
    (0..self.nedges())
      .filter(|&iedge| self.is_boundary_edge(iedge))
      .collect()
  }

  /// Sorted and deduplicated vertices on the boundary.
  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    let mut vertices: Vec<_> = self
      .boundary_edges()
      .into_iter()
      .flat_map(|iedge| self.edges[iedge])
      .collect();
    vertices.sort_unstable();
    vertices.dedup();
    vertices
  }
}

/// Bilinear geometry of a single quadrilateral.
#[derive(Debug, Clone, Copy)]
pub struct QuadGeometry {
  coords: [Point; 4],
}

impl QuadGeometry {
  pub fn new(coords: [Point; 4]) -> Self {
    Self { coords }
  }

  pub fn coords(&self) -> &[Point; 4] {
    &self.coords
  }

  fn shape_values(xi: &na::Vector2<f64>) -> [f64; 4] {
    let (x, y) = (xi.x, xi.y);
    [(1.0 - x) * (1.0 - y), x * (1.0 - y), x * y, (1.0 - x) * y]
  }

  fn shape_grads(xi: &na::Vector2<f64>) -> [na::Vector2<f64>; 4] {
    let (x, y) = (xi.x, xi.y);
    [
      na::Vector2::new(-(1.0 - y), -(1.0 - x)),
      na::Vector2::new(1.0 - y, -x),
      na::Vector2::new(y, x),
      na::Vector2::new(-y, 1.0 - x),
    ]
  }

  /// Maps a reference point to physical coordinates.
  pub fn map(&self, xi: &na::Vector2<f64>) -> Point {
    Self::shape_values(xi)
      .iter()
      .zip(&self.coords)
      .map(|(n, x)| x * *n)
      .sum()
  }

  /// $J_(i j) = (partial x_i) / (partial xi_j)$
  pub fn jacobian(&self, xi: &na::Vector2<f64>) -> na::Matrix2<f64> {
    Self::shape_grads(xi)
      .iter()
      .zip(&self.coords)
      .map(|(g, x)| x * g.transpose())
      .sum()
  }

  pub fn jacobian_det(&self, xi: &na::Vector2<f64>) -> f64 {
    self.jacobian(xi).determinant()
  }

  /// Exact for any planar quadrilateral, since the determinant is bilinear.
  pub fn area(&self) -> f64 {
    let c = &self.coords;
    let cross = |a: Point, b: Point| a.x * b.y - a.y * b.x;
    0.5 * (cross(c[0], c[1]) + cross(c[1], c[2]) + cross(c[2], c[3]) + cross(c[3], c[0]))
  }
}

#[cfg(test)]
mod test {
  use super::{gen, QuadGeometry, QuadMesh};
  use crate::{Error, Point};

  use approx::assert_relative_eq;

  #[test]
  fn gamma_refinement_counts() {
    let mut mesh = gen::gamma_mesh();
    assert_eq!(mesh.nvertices(), 8);
    assert_eq!(mesh.n_active_cells(), 3);
    assert_eq!(mesh.topology().nedges(), 10);
    assert_eq!(mesh.topology().boundary_edges().len(), 8);

    mesh.refine_global(1);
    assert_eq!(mesh.nvertices(), 21);
    assert_eq!(mesh.n_active_cells(), 12);
    assert_eq!(mesh.n_cells(), 15);
    assert_eq!(mesh.topology().boundary_edges().len(), 16);

    mesh.refine_global(2);
    assert_eq!(mesh.n_active_cells(), 192);
    assert_eq!(mesh.n_cells(), 3 + 12 + 48 + 192);
    assert_eq!(mesh.nvertices(), 225);
    assert_eq!(mesh.level(), 3);
    assert_relative_eq!(mesh.area(), 3.0, epsilon = 1e-12);
  }

  #[test]
  fn refined_cells_stay_counter_clockwise() {
    let mut mesh = gen::gamma_mesh();
    mesh.refine_global(2);
    for icell in 0..mesh.n_active_cells() {
      let geo = mesh.cell_geometry(icell);
      assert!(geo.jacobian_det(&na::Vector2::new(0.5, 0.5)) > 0.0);
      assert_relative_eq!(geo.area(), 1.0 / 16.0, epsilon = 1e-14);
    }
  }

  #[test]
  fn clockwise_cell_is_reoriented() {
    let vertices = vec![
      Point::new(0.0, 0.0),
      Point::new(0.0, 1.0),
      Point::new(1.0, 1.0),
      Point::new(1.0, 0.0),
    ];
    let mesh = QuadMesh::new(vertices, vec![[0, 1, 2, 3]]).unwrap();
    assert_eq!(mesh.cell(0), &[0, 3, 2, 1]);
    assert!(mesh.cell_geometry(0).area() > 0.0);
  }

  #[test]
  fn degenerate_cell_is_rejected() {
    let vertices = vec![
      Point::new(0.0, 0.0),
      Point::new(1.0, 0.0),
      Point::new(2.0, 0.0),
      Point::new(3.0, 0.0),
    ];
    let err = QuadMesh::new(vertices.clone(), vec![[0, 1, 2, 3]]).unwrap_err();
    assert!(matches!(err, Error::DegenerateCell { cell: 0, .. }));

    let err = QuadMesh::new(vertices, vec![[0, 1, 2, 7]]).unwrap_err();
    assert!(matches!(err, Error::MalformedMesh(_)));
  }

  #[test]
  fn bilinear_map_and_jacobian() {
    let geo = QuadGeometry::new([
      Point::new(0.0, 0.0),
      Point::new(2.0, 0.0),
      Point::new(2.0, 1.0),
      Point::new(0.0, 1.0),
    ]);
    let xi = na::Vector2::new(0.25, 0.5);
    assert_relative_eq!(geo.map(&xi), Point::new(0.5, 0.5));
    assert_relative_eq!(geo.jacobian(&xi), na::Matrix2::new(2.0, 0.0, 0.0, 1.0));
    assert_relative_eq!(geo.area(), 2.0);
  }
}
