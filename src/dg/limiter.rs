//! Cockburn-Shu slope limiter for modal DG solutions.
//!
//! A cell is flagged when one of its edge deviations from the cell average
//! is changed by the (TVB modified) minmod function applied together with the
//! forward and backward differences of the neighbouring averages. In flagged
//! cells the linear mode is limited and all higher modes are dropped.

use crate::util::minmod;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterKind {
  None,
  Tvd,
  /// TVD away from smooth extrema, controlled by the parameter $M$.
  Tvb,
}

/// Minmod function that leaves `a` untouched if $|a| <= M h^2$.
pub fn minmod_tvb(a: f64, b: f64, c: f64, mh2: f64) -> f64 {
  if a.abs() <= mh2 {
    a
  } else {
    minmod(a, b, c)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Limiter {
  kind: LimiterKind,
  /// $M h^2$
  threshold: f64,
}

impl Limiter {
  pub fn new(kind: LimiterKind, tvb_parameter: f64, h: f64) -> Self {
    let threshold = match kind {
      LimiterKind::Tvb => tvb_parameter * h * h,
      LimiterKind::None | LimiterKind::Tvd => 0.0,
    };
    Self { kind, threshold }
  }

  /// Limits the modal coefficients in place, one column per cell, on a
  /// periodic mesh. Returns the number of limited cells.
  pub fn apply(&self, modes: &mut na::DMatrix<f64>) -> usize {
    let nmodes = modes.nrows();
    let ncells = modes.ncols();
    if self.kind == LimiterKind::None || nmodes < 2 {
      return 0;
    }

    let averages: Vec<f64> = modes.row(0).iter().copied().collect();
    let mut nlimited = 0;
    for icell in 0..ncells {
      let prev = averages[(icell + ncells - 1) % ncells];
      let next = averages[(icell + 1) % ncells];
      let avg = averages[icell];
      let forward = next - avg;
      let backward = avg - prev;

      let coeffs = modes.column(icell);
      let right_dev: f64 = coeffs.iter().skip(1).sum();
      let left_dev: f64 = coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, c)| if k % 2 == 1 { *c } else { -c })
        .sum();

      let right_lim = minmod_tvb(right_dev, forward, backward, self.threshold);
      let left_lim = minmod_tvb(left_dev, forward, backward, self.threshold);
      if right_lim == right_dev && left_lim == left_dev {
        continue;
      }

      let slope = minmod_tvb(modes[(1, icell)], forward, backward, self.threshold);
      let mut column = modes.column_mut(icell);
      column[1] = slope;
      column.rows_mut(2, nmodes - 2).fill(0.0);
      nlimited += 1;
    }
    nlimited
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn modes(columns: &[[f64; 3]]) -> na::DMatrix<f64> {
    na::DMatrix::from_fn(3, columns.len(), |k, c| columns[c][k])
  }

  #[test]
  fn smooth_monotone_data_is_untouched() {
    // linear data with slope 1 per cell, except for the periodic wrap
    let mut u = modes(&[[1.0, 0.5, 0.0], [2.0, 0.5, 0.0], [3.0, 0.5, 0.0], [4.0, 0.5, 0.0]]);
    let before = u.clone();
    let nlimited = Limiter::new(LimiterKind::Tvd, 0.0, 0.25).apply(&mut u);
    // only the two cells next to the jump from 4 back to 1 are flagged
    assert_eq!(nlimited, 2);
    assert_eq!(u.column(1), before.column(1));
    assert_eq!(u.column(2), before.column(2));
  }

  #[test]
  fn extremum_is_flattened() {
    let mut u = modes(&[[0.0, 0.0, 0.0], [1.0, 0.4, 0.2], [0.0, 0.0, 0.0]]);
    let nlimited = Limiter::new(LimiterKind::Tvd, 0.0, 1.0).apply(&mut u);
    assert_eq!(nlimited, 1);
    assert_eq!(u[(0, 1)], 1.0);
    assert_eq!(u[(1, 1)], 0.0);
    assert_eq!(u[(2, 1)], 0.0);
  }

  #[test]
  fn tvb_threshold_keeps_small_extrema() {
    let mut u = modes(&[[0.0, 0.0, 0.0], [0.01, 0.005, 0.0], [0.0, 0.0, 0.0]]);
    let before = u.clone();
    let nlimited = Limiter::new(LimiterKind::Tvb, 10.0, 0.1).apply(&mut u);
    assert_eq!(nlimited, 0);
    assert_eq!(u, before);

    let nlimited = Limiter::new(LimiterKind::Tvd, 10.0, 0.1).apply(&mut u);
    assert_eq!(nlimited, 1);
  }

  #[test]
  fn averages_are_preserved() {
    let mut u = modes(&[[0.0, 1.0, 0.5], [2.0, -1.0, 0.3], [1.0, 0.7, -0.2], [-1.0, 0.1, 0.1]]);
    let averages: Vec<f64> = u.row(0).iter().copied().collect();
    Limiter::new(LimiterKind::Tvd, 0.0, 0.5).apply(&mut u);
    assert_eq!(u.row(0).iter().copied().collect::<Vec<_>>(), averages);
  }

  #[test]
  fn none_is_noop() {
    let mut u = modes(&[[0.0, 0.0, 0.0], [1.0, 0.4, 0.2], [0.0, 0.0, 0.0]]);
    let before = u.clone();
    assert_eq!(Limiter::new(LimiterKind::None, 0.0, 1.0).apply(&mut u), 0);
    assert_eq!(u, before);
  }
}
