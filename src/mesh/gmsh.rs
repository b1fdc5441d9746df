use super::QuadMesh;
use crate::{Error, Point, Result, VertexIdx};

use std::{
  collections::{BTreeSet, HashMap},
  path::Path,
};

/// Reads a quadrilateral mesh from a gmsh `.msh` file (version 4.1).
pub fn read_gmsh_file(path: impl AsRef<Path>) -> Result<QuadMesh> {
  let path = path.as_ref();
  if !path.is_file() {
    return Err(Error::GridFileNotFound(path.to_path_buf()));
  }
  let bytes = std::fs::read(path)?;
  gmsh2quad_mesh(&bytes)
}

/// Load Gmesh `.msh` data (version 4.1).
///
/// Points and lines are ignored, only four-node quadrilaterals become cells.
/// Vertices are the nodes referenced by a quadrilateral, numbered by
/// ascending node tag.
pub fn gmsh2quad_mesh(bytes: &[u8]) -> Result<QuadMesh> {
  let msh = mshio::parse_msh_bytes(bytes).map_err(|e| Error::Gmsh(e.to_string()))?;

  let nodes = msh
    .data
    .nodes
    .ok_or_else(|| Error::Gmsh("missing $Nodes section".into()))?;

  // mshio drops the tags of dense numberings, so ASCII files are rescanned.
  let ascii_tags = match msh.header.file_type {
    0 => Some(ascii_node_tags(bytes)?),
    _ => None,
  };
  if ascii_tags
    .as_ref()
    .is_some_and(|tags| tags.len() != nodes.node_blocks.len())
  {
    return Err(Error::Gmsh("inconsistent number of node blocks".into()));
  }

  let mut tag2point: HashMap<u64, Point> = HashMap::new();
  let mut next_tag = nodes.min_node_tag;
  for (iblock, block) in nodes.node_blocks.iter().enumerate() {
    let nblock = block.nodes.len();
    let tags: Vec<u64> = match (&ascii_tags, &block.node_tags) {
      (Some(ascii_tags), _) => ascii_tags[iblock].clone(),
      (None, Some(tag_map)) => {
        let mut tags = vec![0; nblock];
        for (&tag, &i) in tag_map {
          tags[i] = tag;
        }
        tags
      }
      (None, None) => (next_tag..next_tag + nblock as u64).collect(),
    };
    if tags.len() != nblock {
      return Err(Error::Gmsh(format!(
        "node block {iblock} has {nblock} nodes but {} tags",
        tags.len()
      )));
    }
    next_tag += nblock as u64;

    for (tag, node) in tags.into_iter().zip(&block.nodes) {
      if node.z != 0.0 {
        tracing::warn!("dropping z coordinate {} of gmsh node {tag}", node.z);
      }
      if tag2point.insert(tag, Point::new(node.x, node.y)).is_some() {
        return Err(Error::Gmsh(format!("duplicate node tag {tag}")));
      }
    }
  }

  let elements = msh
    .data
    .elements
    .ok_or_else(|| Error::Gmsh("missing $Elements section".into()))?;

  let mut tag_cells = Vec::new();
  for block in elements.element_blocks {
    type ElType = mshio::ElementType;
    match block.element_type {
      ElType::Qua4 => {}
      ElType::Pnt | ElType::Lin2 => continue,
      other => {
        return Err(Error::MalformedMesh(format!(
          "unsupported gmsh element type {other:?}, only quadrilaterals are supported"
        )))
      }
    }
    for e in block.elements {
      let cell: [u64; 4] = e.nodes.as_slice().try_into().map_err(|_| {
        Error::Gmsh(format!(
          "quadrilateral {} has {} nodes",
          e.element_tag,
          e.nodes.len()
        ))
      })?;
      if let Some(tag) = cell.iter().find(|tag| !tag2point.contains_key(tag)) {
        return Err(Error::Gmsh(format!(
          "element {} references unknown node tag {tag}",
          e.element_tag
        )));
      }
      tag_cells.push(cell);
    }
  }

  if tag_cells.is_empty() {
    return Err(Error::MalformedMesh(
      "gmsh file contains no quadrilateral cells".into(),
    ));
  }

  let used_tags: BTreeSet<u64> = tag_cells.iter().flatten().copied().collect();
  let tag2vertex: HashMap<u64, VertexIdx> = used_tags
    .iter()
    .enumerate()
    .map(|(ivertex, &tag)| (tag, ivertex))
    .collect();
  let vertices = used_tags.iter().map(|tag| tag2point[tag]).collect();
  let cells = tag_cells
    .iter()
    .map(|cell| cell.map(|tag| tag2vertex[&tag]))
    .collect();
  QuadMesh::new(vertices, cells)
}

/// Node tags per node block of an ASCII `$Nodes` section.
fn ascii_node_tags(bytes: &[u8]) -> Result<Vec<Vec<u64>>> {
  let text = std::str::from_utf8(bytes).map_err(|e| Error::Gmsh(e.to_string()))?;
  let tokens: Vec<&str> = text
    .lines()
    .skip_while(|line| line.trim() != "$Nodes")
    .skip(1)
    .take_while(|line| line.trim() != "$EndNodes")
    .flat_map(str::split_whitespace)
    .collect();

  let int = |i: usize| -> Result<u64> {
    let token = tokens
      .get(i)
      .ok_or_else(|| Error::Gmsh("truncated $Nodes section".into()))?;
    token
      .parse()
      .map_err(|_| Error::Gmsh(format!("expected a node tag, found `{token}`")))
  };

  let nblocks = int(0)? as usize;
  let mut pos = 4;
  let mut blocks = Vec::with_capacity(nblocks);
  for _ in 0..nblocks {
    // entity dim, entity tag, parametric flag, number of nodes
    let nnodes = int(pos + 3)? as usize;
    pos += 4;
    let tags = (pos..pos + nnodes).map(&int).collect::<Result<Vec<_>>>()?;
    // tags followed by three coordinates per node
    pos += 4 * nnodes;
    blocks.push(tags);
  }
  Ok(blocks)
}
