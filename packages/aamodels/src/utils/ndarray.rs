use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use num_traits::Float;

/// Finds index and value of the first maximum element. NaN elements are skipped.
pub fn argmax<'a, T: 'a + Float>(values: impl IntoIterator<Item = &'a T>) -> Option<(usize, T)> {
  values
    .into_iter()
    .enumerate()
    .filter(|(_, x)| !x.is_nan())
    .fold(None, |acc, (i, &x)| match acc {
      Some((_, x_max)) if x <= x_max => acc,
      _ => Some((i, x)),
    })
}

/// Clamp each element to at least `lower`
pub fn clamp_min<T: Copy + PartialOrd, D: Dimension>(a: &Array<T, D>, lower: T) -> Array<T, D> {
  a.mapv(|x| num_traits::clamp_min(x, lower))
}

/// Largest absolute element-wise difference between two arrays of the same shape. NaN if any difference is NaN.
pub fn max_abs_diff<T, S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> T
where
  T: Float,
  S1: Data<Elem = T>,
  S2: Data<Elem = T>,
  D: Dimension,
{
  assert_eq!(a.shape(), b.shape());
  Zip::from(a)
    .and(b)
    .fold(T::zero(), |acc, &x, &y| {
      let diff = (x - y).abs();
      if acc.is_nan() || diff.is_nan() {
        T::nan()
      } else {
        acc.max(diff)
      }
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_ulps_eq;
  use ndarray::{array, Array1, Array2};
  use rstest::rstest;

  #[rstest]
  fn finds_first_maximum() {
    let x: Array1<f64> = array![-3.0, 1e-17, -0.5, 1e-17, -2.0];
    assert_eq!(argmax(&x), Some((1, 1e-17)));
  }

  #[rstest]
  fn argmax_skips_nan() {
    let x: Array1<f64> = array![f64::NAN, -1.0, -2.0];
    assert_eq!(argmax(&x), Some((1, -1.0)));
  }

  #[rstest]
  fn argmax_of_empty_is_none() {
    let x = Array1::<f64>::zeros(0);
    assert_eq!(argmax(&x), None);
  }

  #[rstest]
  fn clamps_negative_values() {
    let a: Array2<f64> = array![[-1e-17, 0.5], [1.0, -0.25]];
    assert_ulps_eq!(clamp_min(&a, 0.0), array![[0.0, 0.5], [1.0, 0.0]]);
  }

  #[rstest]
  fn computes_max_abs_diff() {
    let a: Array2<f64> = array![[1.0, 2.0], [3.0, 4.0]];
    let b: Array2<f64> = array![[1.0, 2.5], [2.0, 4.0]];
    assert_ulps_eq!(max_abs_diff(&a, &b), 1.0);
    assert_ulps_eq!(max_abs_diff(&a, &a.view()), 0.0);
    assert!(max_abs_diff(&array![1.0, f64::INFINITY], &array![1.0, f64::INFINITY]).is_nan());
    assert!(max_abs_diff(&array![f64::NAN, 1.0], &array![0.0, 5.0]).is_nan());
  }
}
