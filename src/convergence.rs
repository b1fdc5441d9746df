//! Bookkeeping of error norms over a sequence of refinements.
//!
//! Values are collected column by column, one row per refinement level.
//! Convergence rates are derived from the data columns and the table can be
//! written as aligned plain text or as a LaTeX document.

use crate::util::algebraic_convergence_rate;

use itertools::Itertools;

use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableValue {
  Int(usize),
  Float(f64),
}
impl From<usize> for TableValue {
  fn from(v: usize) -> Self {
    Self::Int(v)
  }
}
impl From<f64> for TableValue {
  fn from(v: f64) -> Self {
    Self::Float(v)
  }
}
impl TableValue {
  fn as_f64(self) -> f64 {
    match self {
      Self::Int(v) => v as f64,
      Self::Float(v) => v,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
  /// $e_(k-1) / e_k$
  Reduction,
  /// $log_2(e_(k-1) / e_k)$, the order of convergence under mesh halving.
  ReductionLog2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexAlign {
  Left,
  Center,
  Right,
}
impl TexAlign {
  fn as_str(self) -> &'static str {
    match self {
      Self::Left => "l",
      Self::Center => "c",
      Self::Right => "r",
    }
  }
}

#[derive(Debug, Clone)]
struct Column {
  key: String,
  values: Vec<Option<TableValue>>,
  precision: usize,
  scientific: bool,
  tex_caption: String,
  tex_align: TexAlign,
}

impl Column {
  fn new(key: &str) -> Self {
    Self {
      key: key.to_string(),
      values: Vec::new(),
      precision: 4,
      scientific: false,
      tex_caption: key.to_string(),
      tex_align: TexAlign::Center,
    }
  }

  fn format(&self, irow: usize) -> String {
    match self.values.get(irow).copied().flatten() {
      None => "-".to_string(),
      Some(TableValue::Int(v)) => v.to_string(),
      Some(TableValue::Float(v)) if self.scientific => format_scientific(v, self.precision),
      Some(TableValue::Float(v)) => format!("{v:.*}", self.precision),
    }
  }
}

/// Scientific notation with a signed, at least two digit exponent: `1.234e-05`.
fn format_scientific(v: f64, precision: usize) -> String {
  let s = format!("{v:.precision$e}");
  match s.split_once('e') {
    Some((mantissa, exp)) => {
      let exp: i32 = exp.parse().unwrap_or(0);
      let sign = if exp < 0 { '-' } else { '+' };
      format!("{mantissa}e{sign}{:02}", exp.abs())
    }
    None => s,
  }
}

#[derive(Debug, Clone, Default)]
pub struct ConvergenceTable {
  columns: Vec<Column>,
}

impl ConvergenceTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn nrows(&self) -> usize {
    self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.key.as_str())
  }

  /// Appends `value` to column `key`, creating the column if necessary.
  pub fn add_value(&mut self, key: &str, value: impl Into<TableValue>) {
    let icol = match self.columns.iter().position(|c| c.key == key) {
      Some(icol) => icol,
      None => {
        self.columns.push(Column::new(key));
        self.columns.len() - 1
      }
    };
    self.columns[icol].values.push(Some(value.into()));
  }

  pub fn value(&self, key: &str, irow: usize) -> Option<TableValue> {
    self
      .columns
      .iter()
      .find(|c| c.key == key)
      .and_then(|c| c.values.get(irow).copied().flatten())
  }

  fn column_mut(&mut self, key: &str) -> &mut Column {
    match self.columns.iter().position(|c| c.key == key) {
      Some(icol) => &mut self.columns[icol],
      None => panic!("no column `{key}` in convergence table"),
    }
  }

  pub fn set_precision(&mut self, key: &str, precision: usize) {
    self.column_mut(key).precision = precision;
  }
  pub fn set_scientific(&mut self, key: &str, scientific: bool) {
    self.column_mut(key).scientific = scientific;
  }
  pub fn set_tex_caption(&mut self, key: &str, caption: &str) {
    self.column_mut(key).tex_caption = caption.to_string();
  }
  pub fn set_tex_format(&mut self, key: &str, align: TexAlign) {
    self.column_mut(key).tex_align = align;
  }

  /// Adds the column `{key}-rate` right after `key`, replacing an earlier
  /// rate column of the same name. The first row has no rate.
  pub fn evaluate_convergence_rates(&mut self, key: &str, mode: RateMode) {
    let data: Vec<Option<f64>> = self
      .column_mut(key)
      .values
      .iter()
      .map(|v| v.map(TableValue::as_f64))
      .collect();

    let mut rates = vec![None];
    for pair in data.windows(2) {
      let rate = match (pair[0], pair[1]) {
        (Some(prev), Some(next)) => Some(match mode {
          RateMode::Reduction => prev / next,
          RateMode::ReductionLog2 => algebraic_convergence_rate(next, prev),
        }),
        _ => None,
      };
      rates.push(rate.map(TableValue::Float));
    }
    rates.truncate(data.len());

    let rate_key = format!("{key}-rate");
    self.columns.retain(|c| c.key != rate_key);
    let mut column = Column::new(&rate_key);
    column.values = rates;
    column.precision = 2;
    column.tex_caption = "rate".to_string();

    let icol = self
      .columns
      .iter()
      .position(|c| c.key == key)
      .expect("data column was looked up above");
    self.columns.insert(icol + 1, column);
  }

  pub fn write_text<W: Write>(&self, mut writer: W) -> io::Result<()> {
    let nrows = self.nrows();
    let cells: Vec<Vec<String>> = self
      .columns
      .iter()
      .map(|c| (0..nrows).map(|irow| c.format(irow)).collect())
      .collect();
    let widths: Vec<usize> = self
      .columns
      .iter()
      .zip(&cells)
      .map(|(c, col)| col.iter().map(String::len).chain([c.key.len()]).max().unwrap_or(0))
      .collect();

    let header = self
      .columns
      .iter()
      .zip(&widths)
      .map(|(c, &w)| format!("{:<w$}", c.key))
      .join(" ");
    writeln!(writer, "{header}")?;

    for irow in 0..nrows {
      let row = cells
        .iter()
        .zip(&widths)
        .map(|(col, &w)| format!("{:>w$}", col[irow]))
        .join(" ");
      writeln!(writer, "{row}")?;
    }
    Ok(())
  }

  pub fn write_tex<W: Write>(&self, mut writer: W) -> io::Result<()> {
    let nrows = self.nrows();
    let columns: String = self
      .columns
      .iter()
      .map(|c| format!("{}|", c.tex_align.as_str()))
      .collect();

    writeln!(writer, "\\documentclass[10pt]{{report}}")?;
    writeln!(writer, "\\usepackage{{float}}")?;
    writeln!(writer)?;
    writeln!(writer, "\\begin{{document}}")?;
    writeln!(writer, "\\begin{{table}}[H]")?;
    writeln!(writer, "\\begin{{center}}")?;
    writeln!(writer, "\\begin{{tabular}}{{|{columns}}} \\hline")?;

    let captions = self.columns.iter().map(|c| &c.tex_caption).join(" & ");
    writeln!(writer, "{captions}\\\\ \\hline")?;

    for irow in 0..nrows {
      let row = self
        .columns
        .iter()
        .map(|c| {
          let s = c.format(irow);
          if c.scientific && s != "-" {
            format!("${s}$")
          } else {
            s
          }
        })
        .join(" & ");
      writeln!(writer, "{row}\\\\ \\hline")?;
    }

    writeln!(writer, "\\end{{tabular}}")?;
    writeln!(writer, "\\end{{center}}")?;
    writeln!(writer, "\\end{{table}}")?;
    writeln!(writer, "\\end{{document}}")?;
    Ok(())
  }
}
