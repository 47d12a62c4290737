/// Fatal failures when deriving a substitution model from a raw rate matrix.
///
/// None of these are recoverable: a model built on top of them would silently produce wrong likelihoods.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateMatrixError {
  /// The transposed raw matrix does not have exactly one eigenvalue at zero as its largest eigenvalue,
  /// or it has no positive exit rate at stationarity.
  #[error(
    "Invalid Q-Matrix: largest eigenvalue of the transposed rate matrix is {max_eigenvalue:e}, \
     {n_zero} eigenvalue(s) are zero within tolerance {tolerance:e}, expected exactly one"
  )]
  InvalidMatrix {
    max_eigenvalue: f64,
    n_zero: usize,
    tolerance: f64,
  },

  #[error("Invalid Q-Matrix: expected average substitution rate to be positive and finite, but found {rate}")]
  InvalidRate { rate: f64 },

  #[error("Rate matrix should be square and have {expected}x{expected} entries, but found shape {rows}x{cols}")]
  ShapeMismatch { expected: usize, rows: usize, cols: usize },

  #[error("Rate matrix contains non-finite entry {value} at [{row}, {col}]")]
  NonFinite { row: usize, col: usize, value: f64 },

  #[error("Eigenvector of the zero eigenvalue sums to {sum:e} and cannot be normalized to stationary frequencies")]
  DegenerateStationary { sum: f64 },

  #[error("Stationary frequencies contain negative entries: {}", format_negative(.negative))]
  NegativeFrequencies { negative: Vec<(usize, f64)> },

  #[error("Matrix of eigenvectors is singular: {reason}")]
  SingularEigenvectors { reason: String },

  #[error("Eigendecomposition failed: {reason}")]
  EigenSolver { reason: String },
}

fn format_negative(negative: &[(usize, f64)]) -> String {
  negative
    .iter()
    .map(|(i, p)| format!("pi[{i}]={p:e}"))
    .collect::<Vec<_>>()
    .join(", ")
}
