//! Column text files readable by gnuplot, for one dimensional DG data.
//!
//! One line per sample point, cells separated by a blank line so that
//! `plot 'sol-0000.gpl' w l` draws the discontinuities between cells.

use crate::Result;

use itertools::Itertools;

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::Path,
};

/// Writes `cells`, each a list of sample rows, below a `#` header line
/// naming the `columns`.
pub fn write_gnuplot<W: Write>(
  mut writer: W,
  columns: &[&str],
  cells: &[Vec<Vec<f64>>],
) -> std::io::Result<()> {
  writeln!(writer, "# {}", columns.join(" "))?;
  for samples in cells {
    for row in samples {
      debug_assert_eq!(row.len(), columns.len());
      writeln!(writer, "{}", row.iter().map(|v| format!("{v:.10e}")).join(" "))?;
    }
    writeln!(writer)?;
  }
  Ok(())
}

pub fn write_gnuplot_file(
  path: impl AsRef<Path>,
  columns: &[&str],
  cells: &[Vec<Vec<f64>>],
) -> Result<()> {
  let path = path.as_ref();
  let file = File::create(path)?;
  let mut writer = BufWriter::new(file);
  write_gnuplot(&mut writer, columns, cells)?;
  writer.flush()?;
  tracing::debug!("wrote {}", path.display());
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn cells_are_separated_by_blank_lines() {
    let cells = vec![
      vec![vec![0.0, 1.0], vec![0.5, 2.0]],
      vec![vec![0.5, 3.0], vec![1.0, 4.0]],
    ];
    let mut out = Vec::new();
    write_gnuplot(&mut out, &["x", "u_h"], &cells).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines[0], "# x u_h");
    assert_eq!(lines.len(), 1 + 2 * 3);
    assert!(lines[3].is_empty());
    assert!(lines[6].is_empty());
    let values: Vec<f64> = lines[4]
      .split_whitespace()
      .map(|s| s.parse().unwrap())
      .collect();
    assert_eq!(values, vec![0.5, 3.0]);
  }
}
