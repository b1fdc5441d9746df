//! Legacy VTK export of FE functions.
//!
//! Each cell is written as its own patch, subdivided `degree` times per
//! direction, so higher order functions are sampled at all their support
//! points and discontinuities across cells remain visible.

use crate::{dofs::DofHandler, fe::FeQ, mesh::QuadMesh, Error, Result};

use vtkio::{
  model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, ElementType,
    UnstructuredGridPiece, Version, VertexNumbers, Vtk,
  },
  IOBuffer,
};

use std::path::Path;

pub fn fe_functions_to_vtk(
  mesh: &QuadMesh,
  dofh: &DofHandler,
  fe: &FeQ,
  fields: &[(&str, &na::DVector<f64>)],
) -> Vtk {
  let nsub = fe.degree();
  let npatch_points = (nsub + 1) * (nsub + 1);
  let ncells = mesh.n_active_cells();

  let ref_points: Vec<na::Vector2<f64>> = (0..=nsub)
    .flat_map(|j| (0..=nsub).map(move |i| (i, j)))
    .map(|(i, j)| na::Vector2::new(i as f64 / nsub as f64, j as f64 / nsub as f64))
    .collect();
  let ref_values: Vec<Vec<f64>> = ref_points
    .iter()
    .map(|xi| (0..fe.dofs_per_cell()).map(|i| fe.shape_value(i, xi)).collect())
    .collect();

  let mut points = Vec::with_capacity(3 * ncells * npatch_points);
  let mut field_values = vec![Vec::with_capacity(ncells * npatch_points); fields.len()];
  let mut vertices = Vec::with_capacity(5 * ncells * nsub * nsub);

  for icell in 0..ncells {
    let geo = mesh.cell_geometry(icell);
    let dofs = dofh.cell_dofs(icell);
    let base = (icell * npatch_points) as u32;

    for (xi, shape_values) in ref_points.iter().zip(&ref_values) {
      let x = geo.map(xi);
      points.extend([x.x, x.y, 0.0]);
      for ((_, coeffs), values) in fields.iter().zip(field_values.iter_mut()) {
        let value: f64 = dofs
          .iter()
          .zip(shape_values)
          .map(|(&idof, phi)| coeffs[idof] * phi)
          .sum();
        values.push(value);
      }
    }

    let row = (nsub + 1) as u32;
    for j in 0..nsub as u32 {
      for i in 0..nsub as u32 {
        let v0 = base + i + row * j;
        vertices.extend([4, v0, v0 + 1, v0 + 1 + row, v0 + row]);
      }
    }
  }

  let npatches = ncells * nsub * nsub;
  let cells = Cells {
    cell_verts: VertexNumbers::Legacy {
      num_cells: npatches as u32,
      vertices,
    },
    types: vec![CellType::Quad; npatches],
  };

  let point_data = fields
    .iter()
    .zip(field_values)
    .map(|((name, _), values)| {
      Attribute::DataArray(DataArray {
        name: name.to_string(),
        elem: ElementType::Scalars {
          num_comp: 1,
          lookup_table: None,
        },
        data: IOBuffer::F64(values),
      })
    })
    .collect();

  let grid = UnstructuredGridPiece {
    points: IOBuffer::F64(points),
    cells,
    data: Attributes {
      point: point_data,
      cell: Vec::new(),
    },
  };

  Vtk {
    version: Version::new((3, 0)),
    title: String::from("Galerkin solution"),
    byte_order: ByteOrder::BigEndian,
    data: grid.into(),
    file_path: None,
  }
}

pub fn write_vtk(
  path: impl AsRef<Path>,
  mesh: &QuadMesh,
  dofh: &DofHandler,
  fe: &FeQ,
  fields: &[(&str, &na::DVector<f64>)],
) -> Result<()> {
  let path = path.as_ref();
  fe_functions_to_vtk(mesh, dofh, fe, fields)
    .export_ascii(path)
    .map_err(|e| Error::Vtk(format!("{}: {e:?}", path.display())))?;
  tracing::debug!("wrote {}", path.display());
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{function::GammaSolution, mesh::gen};

  use vtkio::model::DataSet;

  #[test]
  fn patches_per_cell() {
    let mesh = gen::gamma_mesh();
    let fe = FeQ::new(2);
    let dofh = DofHandler::distribute_dofs(&mesh, &fe);
    let u = dofh.interpolate(&GammaSolution);
    let vtk = fe_functions_to_vtk(&mesh, &dofh, &fe, &[("solution", &u)]);

    let DataSet::UnstructuredGrid { pieces, .. } = vtk.data else {
      panic!("expected unstructured grid");
    };
    let vtkio::model::Piece::Inline(piece) = &pieces[0] else {
      panic!("expected inline piece");
    };
    assert_eq!(piece.points.len(), 3 * 3 * 9);
    assert_eq!(piece.cells.types.len(), 3 * 4);
    assert_eq!(piece.data.point.len(), 1);
  }

  #[test]
  fn ascii_file_contains_fields() {
    let mesh = gen::gamma_mesh();
    let fe = FeQ::new(1);
    let dofh = DofHandler::distribute_dofs(&mesh, &fe);
    let u = dofh.interpolate(&GammaSolution);
    let e = na::DVector::zeros(dofh.n_dofs());

    let dir = std::env::temp_dir().join(format!("reentrant-vtk-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("solution-00.vtk");
    write_vtk(&path, &mesh, &dofh, &fe, &[("solution", &u), ("error", &e)]).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("POINT_DATA 12"));
    assert!(content.contains("solution"));
    assert!(content.contains("error"));
    std::fs::remove_dir_all(&dir).unwrap();
  }
}
