//! Derivation of a normalized generator matrix and its eigendecomposition from a raw
//! (unnormalized) empirical rate matrix:
//!
//! raw matrix -> stationary frequencies -> diagonal fix-up -> rate normalization -> eigendecomposition

use crate::constants::{IMAGINARY_PART_TOLERANCE, MIN_EIGENVECTOR_SUM, RECONSTRUCTION_TOLERANCE};
use crate::gtr::error::RateMatrixError;
use crate::utils::ndarray::{argmax, clamp_min, max_abs_diff};
use itertools::Itertools;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_linalg::{Eig, Inverse};

/// Factorization `Q = V * diag(eigvals) * V^-1`
#[derive(Clone, Debug)]
pub struct EigenDecomposition {
  pub eigvals: Array1<f64>,
  /// Right eigenvectors, one per column
  pub v: Array2<f64>,
  pub v_inv: Array2<f64>,
}

/// Checks that the raw matrix is square, has one row per state and contains only finite numbers
pub fn validate_rate_matrix(Q: &Array2<f64>, n_states: usize) -> Result<(), RateMatrixError> {
  let (rows, cols) = Q.dim();
  if rows != n_states || cols != n_states {
    return Err(RateMatrixError::ShapeMismatch {
      expected: n_states,
      rows,
      cols,
    });
  }

  if let Some(((row, col), &value)) = Q.indexed_iter().find(|(_, x)| !x.is_finite()) {
    return Err(RateMatrixError::NonFinite { row, col, value });
  }

  Ok(())
}

/// Computes eigenvalues and right eigenvectors of a general real matrix, keeping real parts only
fn eig_real(Q: &ArrayView2<f64>) -> Result<(Array1<f64>, Array2<f64>), RateMatrixError> {
  let (eigvals, eigvecs) = Q.eig().map_err(|err| RateMatrixError::EigenSolver {
    reason: err.to_string(),
  })?;

  let max_imag = eigvals.iter().map(|z| z.im.abs()).fold(0.0, f64::max);
  if max_imag > IMAGINARY_PART_TOLERANCE {
    warn!("Rate matrix has complex eigenvalues (largest imaginary part: {max_imag:e}). Only real parts are retained.");
  }

  Ok((eigvals.mapv(|z| z.re), eigvecs.mapv(|z| z.re)))
}

/// Finds equilibrium frequencies `pi` such that `pi^T * Q = 0`.
///
/// These are given by the eigenvector of `Q^T` which corresponds to the (only) zero eigenvalue,
/// normalized to sum to one. For a generator matrix the zero eigenvalue is also the largest one.
pub fn stationary_distribution(Q: &Array2<f64>, zero_tolerance: f64) -> Result<Array1<f64>, RateMatrixError> {
  let (eigvals, eigvecs) = eig_real(&Q.t())?;

  let n_zero = eigvals.iter().filter(|x| x.abs() < zero_tolerance).count();

  let (izero, max_eigenvalue) = match argmax(&eigvals) {
    Some((izero, max_eigenvalue)) if max_eigenvalue.abs() < zero_tolerance && n_zero == 1 => {
      (izero, max_eigenvalue)
    }
    other => {
      return Err(RateMatrixError::InvalidMatrix {
        max_eigenvalue: other.map_or(f64::NAN, |(_, x)| x),
        n_zero,
        tolerance: zero_tolerance,
      })
    }
  };

  debug!("Zero eigenvalue of the transposed rate matrix: eigvals[{izero}] = {max_eigenvalue:e}");

  let eigvec = eigvecs.column(izero);
  let sum = eigvec.sum();
  if !sum.is_finite() || sum.abs() < MIN_EIGENVECTOR_SUM {
    return Err(RateMatrixError::DegenerateStationary { sum });
  }

  Ok(eigvec.mapv(|x| x / sum))
}

/// Rejects frequencies below `-tolerance`. Remaining small negative values are round-off and are set to zero.
pub fn check_frequencies(pi: &Array1<f64>, tolerance: f64) -> Result<Array1<f64>, RateMatrixError> {
  let negative = pi
    .iter()
    .enumerate()
    .filter(|(_, &p)| p < -tolerance)
    .map(|(i, &p)| (i, p))
    .collect_vec();

  if !negative.is_empty() {
    return Err(RateMatrixError::NegativeFrequencies { negative });
  }

  let pi = clamp_min(pi, 0.0);
  let sum = pi.sum();
  Ok(pi / sum)
}

/// Replaces the diagonal such that every row sums to zero, then scales the matrix such that the
/// expected number of substitutions per unit time at equilibrium is one.
///
/// Returns the normalized matrix and the average rate `-sum_i(pi_i * Q_ii)` it was divided by.
pub fn normalize_rate_matrix(Q: &Array2<f64>, pi: &Array1<f64>) -> Result<(Array2<f64>, f64), RateMatrixError> {
  let mut Q = Q.to_owned();
  Q.diag_mut().fill(0.0);
  let diag = -Q.sum_axis(Axis(1));
  Q.diag_mut().assign(&diag);

  let rate = -pi.dot(&Q.diag());
  if !rate.is_finite() || rate <= 0.0 {
    return Err(RateMatrixError::InvalidRate { rate });
  }

  debug!("Average substitution rate of the raw rate matrix: {rate}");

  Ok((Q / rate, rate))
}

/// Eigendecomposition of a generator matrix.
///
/// Fails if the eigenvector matrix cannot be inverted, or if the real factorization does not reproduce `Q`:
/// the latter happens for ill-conditioned eigenvectors and for non-reversible matrices with complex eigenvalues.
pub fn eigendecomposition(Q: &Array2<f64>) -> Result<EigenDecomposition, RateMatrixError> {
  let (eigvals, v) = eig_real(&Q.view())?;

  let v_inv = v.inv().map_err(|err| RateMatrixError::SingularEigenvectors {
    reason: err.to_string(),
  })?;

  let reconstructed = v.dot(&Array2::from_diag(&eigvals)).dot(&v_inv);
  let deviation = max_abs_diff(&reconstructed, Q);
  if deviation.is_nan() || deviation >= RECONSTRUCTION_TOLERANCE {
    return Err(RateMatrixError::SingularEigenvectors {
      reason: format!("eigendecomposition reproduces the rate matrix only up to {deviation:e}"),
    });
  }

  Ok(EigenDecomposition { eigvals, v, v_inv })
}
