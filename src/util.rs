pub fn sparse_to_dense_data<T>(sparse: Vec<(usize, T)>, len: usize) -> Vec<Option<T>> {
  let mut dense = Vec::from_iter((0..len).map(|_| None));
  sparse.into_iter().for_each(|(i, t)| dense[i] = Some(t));
  dense
}

/// Experimental order of convergence, assuming the mesh width halves
/// between `prev` and `next`.
pub fn algebraic_convergence_rate(next: f64, prev: f64) -> f64 {
  let quot: f64 = next / prev;
  -quot.log2()
}

pub fn minmod(a: f64, b: f64, c: f64) -> f64 {
  if a > 0.0 && b > 0.0 && c > 0.0 {
    a.min(b).min(c)
  } else if a < 0.0 && b < 0.0 && c < 0.0 {
    a.max(b).max(c)
  } else {
    0.0
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn halving_error_is_rate_one() {
    approx::assert_relative_eq!(algebraic_convergence_rate(0.5, 1.0), 1.0);
    approx::assert_relative_eq!(algebraic_convergence_rate(0.0625, 1.0), 4.0);
  }

  #[test]
  fn minmod_picks_smallest_of_equal_signs() {
    assert_eq!(minmod(1.0, 0.5, 2.0), 0.5);
    assert_eq!(minmod(-1.0, -0.5, -2.0), -0.5);
    assert_eq!(minmod(1.0, -0.5, 2.0), 0.0);
  }
}
