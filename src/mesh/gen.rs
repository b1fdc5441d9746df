use super::{CellVertices, QuadMesh};
use crate::Point;

/// The Gamma shaped domain $(-1,1)^2 without (0,1) times (-1,0)$,
/// meshed with three unit squares.
///
/// The re-entrant corner sits at the origin.
pub fn gamma_mesh() -> QuadMesh {
  let vertices = vec![
    Point::new(0.0, 0.0),
    Point::new(1.0, 0.0),
    Point::new(1.0, 1.0),
    Point::new(0.0, 1.0),
    Point::new(-1.0, 1.0),
    Point::new(-1.0, 0.0),
    Point::new(-1.0, -1.0),
    Point::new(0.0, -1.0),
  ];
  let cells = vec![[0, 1, 2, 3], [5, 0, 3, 4], [6, 7, 0, 5]];
  QuadMesh::new(vertices, cells).expect("hard-coded mesh is valid")
}

/// Structured mesh of the rectangle `[min, max]` with `nx` times `ny` cells.
pub fn rectangle(min: Point, max: Point, nx: usize, ny: usize) -> QuadMesh {
  assert!(nx > 0 && ny > 0);
  assert!(min.x < max.x && min.y < max.y);

  let h = (max - min).component_div(&Point::new(nx as f64, ny as f64));
  let nvertices_x = nx + 1;

  let mut vertices = Vec::with_capacity(nvertices_x * (ny + 1));
  for iy in 0..=ny {
    for ix in 0..=nx {
      vertices.push(min + Point::new(ix as f64 * h.x, iy as f64 * h.y));
    }
  }

  let mut cells: Vec<CellVertices> = Vec::with_capacity(nx * ny);
  for iy in 0..ny {
    for ix in 0..nx {
      let v0 = ix + iy * nvertices_x;
      cells.push([v0, v0 + 1, v0 + 1 + nvertices_x, v0 + nvertices_x]);
    }
  }
  QuadMesh::new(vertices, cells).expect("structured mesh is valid")
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn rectangle_counts() {
    let mesh = rectangle(Point::new(-1.0, 0.0), Point::new(1.0, 0.5), 4, 2);
    assert_eq!(mesh.nvertices(), 15);
    assert_eq!(mesh.n_active_cells(), 8);
    assert_eq!(mesh.topology().boundary_edges().len(), 12);
    approx::assert_relative_eq!(mesh.area(), 1.0, epsilon = 1e-14);
  }
}
