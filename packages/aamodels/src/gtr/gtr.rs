use crate::alphabet::alphabet::Alphabet;
use crate::constants::{NEGATIVE_FREQUENCY_TOLERANCE, ZERO_EIGENVALUE_TOLERANCE};
use crate::gtr::rate_matrix::{
  check_frequencies, eigendecomposition, normalize_rate_matrix, stationary_distribution, validate_rate_matrix,
  EigenDecomposition,
};
use crate::make_error;
use crate::utils::ndarray::clamp_min;
use eyre::{Report, WrapErr};
use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;
use smart_default::SmartDefault;
use std::fmt::Display;
use std::io::Write;

#[derive(Copy, Clone, Debug, SmartDefault)]
pub struct GTROptions {
  /// Largest magnitude of an eigenvalue which is still considered zero when looking for equilibrium
  #[default(ZERO_EIGENVALUE_TOLERANCE)]
  pub zero_eigenvalue_tolerance: f64,

  /// Reject equilibrium frequencies which are negative beyond round-off
  #[default = true]
  pub check_frequencies: bool,
}

#[derive(Clone, Debug)]
pub struct GTRParams {
  pub alphabet: Alphabet,
  /// Substitution rate
  pub mu: f64,
  /// Raw rate matrix: rates from state i (row) to state j (column). The diagonal is ignored.
  pub Q: Array2<f64>,
  pub options: GTROptions,
}

/// Continuous-time Markov model of character evolution, derived from an empirical rate matrix.
///
/// All quantities are computed once on construction and are read-only afterwards.
#[derive(Clone, Debug)]
pub struct GTR {
  alphabet: Alphabet,
  mu: f64,
  average_rate: f64,
  Q: Array2<f64>,
  pi: Array1<f64>,
  eigvals: Array1<f64>,
  v: Array2<f64>,
  v_inv: Array2<f64>,
}

impl GTR {
  pub fn new(
    GTRParams {
      alphabet,
      mu,
      Q,
      options,
    }: GTRParams,
  ) -> Result<Self, Report> {
    if !mu.is_finite() || mu <= 0.0 {
      return make_error!("Substitution rate (mu) should be positive and finite, but found mu={mu}");
    }

    validate_rate_matrix(&Q, alphabet.len())?;

    let pi = stationary_distribution(&Q, options.zero_eigenvalue_tolerance)
      .wrap_err("When computing equilibrium frequencies")?;

    let pi = if options.check_frequencies {
      check_frequencies(&pi, NEGATIVE_FREQUENCY_TOLERANCE).wrap_err("When checking equilibrium frequencies")?
    } else {
      pi
    };

    let (Q, average_rate) = normalize_rate_matrix(&Q, &pi).wrap_err("When normalizing rate matrix")?;

    let EigenDecomposition { eigvals, v, v_inv } =
      eigendecomposition(&Q).wrap_err("When computing eigendecomposition of the rate matrix")?;

    debug!("Eigenvalues of the normalized rate matrix: {eigvals:.6}");

    Ok(Self {
      alphabet,
      mu,
      average_rate,
      Q,
      pi,
      eigvals,
      v,
      v_inv,
    })
  }

  #[inline]
  pub const fn alphabet(&self) -> &Alphabet {
    &self.alphabet
  }

  #[inline]
  pub const fn mu(&self) -> f64 {
    self.mu
  }

  /// Average substitution rate of the raw matrix, which the normalized matrix was divided by
  #[inline]
  pub const fn average_rate(&self) -> f64 {
    self.average_rate
  }

  /// Normalized rate matrix: rows sum to zero and `-sum_i(pi_i * Q_ii) = 1`
  #[inline]
  pub const fn Q(&self) -> &Array2<f64> {
    &self.Q
  }

  /// Equilibrium frequencies
  #[inline]
  pub const fn pi(&self) -> &Array1<f64> {
    &self.pi
  }

  #[inline]
  pub const fn eigvals(&self) -> &Array1<f64> {
    &self.eigvals
  }

  /// Right eigenvectors of `Q`, one per column
  #[inline]
  pub const fn v(&self) -> &Array2<f64> {
    &self.v
  }

  #[inline]
  pub const fn v_inv(&self) -> &Array2<f64> {
    &self.v_inv
  }

  /// Compute the probability of the sequence state of the child
  /// at time t later, given the parent profile.
  ///
  /// `profile` has shape (L, a), where L is sequence length and a is alphabet size.
  /// Returns the profile after time t in the future, of the same shape.
  pub fn evolve(&self, profile: &Array2<f64>, t: f64, return_log: bool) -> Array2<f64> {
    let Qt = self.expQt(t);
    let res = profile.dot(&Qt);
    if return_log {
      res.mapv(f64::ln)
    } else {
      res
    }
  }

  /// Compute the probability of the sequence state of the parent
  /// at time (t+t0, backwards), given the sequence state of the
  /// child (profile) at time t0.
  ///
  /// `profile` has shape (L, a), where L is sequence length and a is alphabet size.
  pub fn propagate_profile(&self, profile: &Array2<f64>, t: f64, return_log: bool) -> Array2<f64> {
    let Qt = self.expQt(t);
    let res = profile.dot(&Qt.t());
    if return_log {
      res.mapv(f64::ln)
    } else {
      res
    }
  }

  /// Matrix exponential `exp(Q * mu * t)`. Element [i, j] is the probability to go from state i to state j.
  pub fn expQt(&self, t: f64) -> Array2<f64> {
    let eLambdaT: Array2<f64> = Array2::from_diag(&self.exp_lt(t));

    let eLambdaT_dot_v_inv: Array2<f64> = eLambdaT.dot(&self.v_inv);

    let Qt: Array2<f64> = self.v.dot(&eLambdaT_dot_v_inv);

    clamp_min(&Qt, 0.0)
  }

  fn exp_lt(&self, t: f64) -> Array1<f64> {
    (self.mu * t * &self.eigvals).mapv(f64::exp)
  }

  pub fn print<W: Write>(&self, w: &mut W) -> Result<(), Report> {
    writeln!(w, "Substitution rate (mu): {:.6}", self.mu)?;
    writeln!(w, "Average rate of the raw matrix: {:.6}", self.average_rate)?;

    writeln!(w, "\nEquilibrium frequencies (pi_i):")?;
    for (a, p) in self.alphabet.canonical().zip(&self.pi) {
      writeln!(w, "{a}:\t{p:.4}")?;
    }

    writeln!(w, "\nRates from i->j (Q_ij):")?;
    writeln!(w, "\t{}", self.alphabet.canonical().join("\t"))?;
    for (a, Qi) in self.alphabet.canonical().zip(self.Q.rows()) {
      writeln!(w, "{a}\t{}", Qi.iter().map(|Qij| format!("{Qij:.4}")).join("\t"))?;
    }

    writeln!(w, "\nEigenvalues:")?;
    writeln!(w, "{}", self.eigvals.iter().map(|x| format!("{x:.4}")).join("\t"))?;

    writeln!(w)?;
    Ok(())
  }
}

impl Display for GTR {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut buf = vec![];
    self.print(&mut buf).map_err(|_| std::fmt::Error)?;
    write!(f, "{}", String::from_utf8_lossy(&buf))
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::excessive_precision)]

  use super::*;
  use crate::alphabet::alphabet::AlphabetConfig;
  use crate::gtr::error::RateMatrixError;
  use crate::pretty_assert_ulps_eq;
  use approx::assert_abs_diff_eq;
  use eyre::Report;
  use indexmap::IndexMap;
  use lazy_static::lazy_static;
  use ndarray::array;
  use rstest::rstest;

  lazy_static! {
    static ref ALPHABET: Alphabet = Alphabet::with_config(&AlphabetConfig {
      canonical: vec!['A', 'C', 'G', 'T'],
      ambiguous: IndexMap::new(),
      unknown: 'N',
      gap: '-',
    })
    .unwrap();

    // Reversible 4-state model: Q_ij = S_ij * pi_j with symmetric S and pi = [0.1, 0.2, 0.3, 0.4]
    static ref RAW: Array2<f64> = array![
      [-2.0,  0.2,  0.6,  1.2],
      [ 0.1, -3.3,  1.2,  2.0],
      [ 0.2,  0.8, -3.4,  2.4],
      [ 0.3,  1.0,  1.8, -3.1],
    ];
  }

  fn create_gtr(Q: Array2<f64>, mu: f64) -> Result<GTR, Report> {
    GTR::new(GTRParams {
      alphabet: ALPHABET.clone(),
      mu,
      Q,
      options: GTROptions::default(),
    })
  }

  #[rstest]
  fn creates_gtr_from_raw_matrix() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;

    pretty_assert_ulps_eq!(gtr.pi(), &array![0.1, 0.2, 0.3, 0.4], epsilon = 1e-12);
    assert_abs_diff_eq!(gtr.average_rate(), 3.12, epsilon = 1e-12);
    pretty_assert_ulps_eq!(gtr.Q(), &(&*RAW / 3.12), epsilon = 1e-12);

    // Detailed balance
    let flux = &gtr.Q().t() * gtr.pi();
    assert_abs_diff_eq!(flux, flux.t(), epsilon = 1e-12);

    Ok(())
  }

  #[rstest]
  fn reconstructs_rate_matrix_from_eigendecomposition() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;
    let reconstructed = gtr.v().dot(&Array2::from_diag(gtr.eigvals())).dot(gtr.v_inv());
    assert_abs_diff_eq!(&reconstructed, gtr.Q(), epsilon = 1e-10);
    Ok(())
  }

  #[rstest]
  fn computes_identity_transition_at_zero_time() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;
    assert_abs_diff_eq!(gtr.expQt(0.0), Array2::<f64>::eye(4), epsilon = 1e-10);
    Ok(())
  }

  #[rstest]
  #[case(0.01)]
  #[case(0.1)]
  #[case(1.0)]
  #[case(10.0)]
  fn computes_transition_probabilities(#[case] t: f64) -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;
    let P = gtr.expQt(t);
    assert_abs_diff_eq!(P.sum_axis(Axis(1)), Array1::<f64>::ones(4), epsilon = 1e-9);
    assert!(P.iter().all(|&p| p >= 0.0));

    // Equilibrium is preserved
    assert_abs_diff_eq!(gtr.pi().dot(&P), *gtr.pi(), epsilon = 1e-9);
    Ok(())
  }

  #[rstest]
  fn transition_probabilities_are_consistent_with_rates() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;
    let dt = 1e-6;
    let derivative = (gtr.expQt(dt) - Array2::<f64>::eye(4)) / dt;
    assert_abs_diff_eq!(&derivative, gtr.Q(), epsilon = 1e-5);
    Ok(())
  }

  #[rstest]
  fn substitution_rate_scales_time() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;
    let gtr_fast = create_gtr(RAW.clone(), 2.5)?;
    assert_abs_diff_eq!(gtr_fast.expQt(0.2), gtr.expQt(0.5), epsilon = 1e-12);
    Ok(())
  }

  #[rstest]
  fn evolves_and_propagates_profiles() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;

    let profile = array![
      [1.0, 0.0, 0.0, 0.0],
      [0.0, 0.0, 1.0, 0.0],
      [0.0, 1.0, 1.0, 0.0],
      [1.0, 1.0, 1.0, 1.0],
    ];

    let P = gtr.expQt(0.3);

    let forward = gtr.evolve(&profile, 0.3, false);
    pretty_assert_ulps_eq!(forward.row(0), P.row(0), epsilon = 1e-14);
    pretty_assert_ulps_eq!(forward.row(1), P.row(2), epsilon = 1e-14);

    let backward = gtr.propagate_profile(&profile, 0.3, false);
    pretty_assert_ulps_eq!(backward.row(0), P.column(0), epsilon = 1e-14);
    pretty_assert_ulps_eq!(backward.row(2).to_owned(), &P.column(1) + &P.column(2), epsilon = 1e-14);
    // Fully ambiguous child is compatible with any parent
    assert_abs_diff_eq!(backward.row(3), Array1::<f64>::ones(4), epsilon = 1e-9);

    // Long times forget the initial state
    let forward = gtr.evolve(&profile.slice(s![0..2, ..]).to_owned(), 1000.0, false);
    assert_abs_diff_eq!(forward.row(0), *gtr.pi(), epsilon = 1e-9);
    assert_abs_diff_eq!(forward.row(1), *gtr.pi(), epsilon = 1e-9);

    let log_forward = gtr.evolve(&profile, 0.3, true);
    assert_abs_diff_eq!(log_forward.mapv(f64::exp), gtr.evolve(&profile, 0.3, false), epsilon = 1e-12);

    Ok(())
  }

  #[rstest]
  fn rejects_all_zero_matrix() {
    let report = create_gtr(Array2::<f64>::zeros((4, 4)), 1.0).unwrap_err();
    assert!(matches!(
      report.downcast_ref::<RateMatrixError>(),
      Some(RateMatrixError::InvalidMatrix { n_zero: 4, .. })
    ));
  }

  #[rstest]
  fn rejects_mismatched_alphabet() {
    let report = create_gtr(Array2::<f64>::zeros((20, 20)), 1.0).unwrap_err();
    assert!(matches!(
      report.downcast_ref::<RateMatrixError>(),
      Some(RateMatrixError::ShapeMismatch { expected: 4, .. })
    ));
  }

  #[rstest]
  #[case(0.0)]
  #[case(-1.0)]
  #[case(f64::NAN)]
  fn rejects_invalid_substitution_rate(#[case] mu: f64) {
    assert!(create_gtr(RAW.clone(), mu).is_err());
  }

  #[rstest]
  fn frequency_check_can_be_disabled() {
    let alphabet = Alphabet::with_config(&AlphabetConfig {
      canonical: vec!['0', '1'],
      ambiguous: IndexMap::new(),
      unknown: '?',
      gap: '-',
    })
    .unwrap();

    // Equilibrium of this matrix is [-1, 2]
    let Q = array![[-1.0, 1.0], [-0.5, 0.5]];

    let report = GTR::new(GTRParams {
      alphabet: alphabet.clone(),
      mu: 1.0,
      Q: Q.clone(),
      options: GTROptions::default(),
    })
    .unwrap_err();
    assert!(matches!(
      report.downcast_ref::<RateMatrixError>(),
      Some(RateMatrixError::NegativeFrequencies { .. })
    ));

    // Without the check, the negative frequencies make the average rate negative
    let report = GTR::new(GTRParams {
      alphabet,
      mu: 1.0,
      Q,
      options: GTROptions {
        check_frequencies: false,
        ..GTROptions::default()
      },
    })
    .unwrap_err();
    assert!(matches!(
      report.downcast_ref::<RateMatrixError>(),
      Some(RateMatrixError::InvalidRate { .. })
    ));
  }

  #[rstest]
  fn rejects_non_reversible_cyclic_model() {
    let alphabet = Alphabet::with_config(&AlphabetConfig {
      canonical: vec!['A', 'B', 'C'],
      ambiguous: IndexMap::new(),
      unknown: '?',
      gap: '-',
    })
    .unwrap();

    // Uniform equilibrium, but complex eigenvalues which a real factorization cannot represent
    let report = GTR::new(GTRParams {
      alphabet,
      mu: 1.0,
      Q: array![[-1.0, 1.0, 0.0], [0.0, -1.0, 1.0], [1.0, 0.0, -1.0]],
      options: GTROptions::default(),
    })
    .unwrap_err();
    assert!(matches!(
      report.downcast_ref::<RateMatrixError>(),
      Some(RateMatrixError::SingularEigenvectors { .. })
    ));
  }

  #[rstest]
  fn prints_model() -> Result<(), Report> {
    let gtr = create_gtr(RAW.clone(), 1.0)?;
    let text = gtr.to_string();
    assert!(text.starts_with("Substitution rate (mu): 1.000000\nAverage rate of the raw matrix: 3.120000\n"));
    assert!(text.contains("\nEquilibrium frequencies (pi_i):\nA:\t0.1000\nC:\t0.2000\nG:\t0.3000\nT:\t0.4000\n"));
    assert!(text.contains("\n\tA\tC\tG\tT\n"));
    Ok(())
  }
}
