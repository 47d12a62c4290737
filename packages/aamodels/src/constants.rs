/// Eigenvalues of the transposed raw rate matrix closer to zero than this are treated as zero
pub const ZERO_EIGENVALUE_TOLERANCE: f64 = 1e-8;

/// Stationary frequencies more negative than this are rejected, the rest are clamped to zero
pub const NEGATIVE_FREQUENCY_TOLERANCE: f64 = 1e-10;

/// Sums of the stationary eigenvector smaller than this cannot be normalized
pub const MIN_EIGENVECTOR_SUM: f64 = 1e-12;

/// Imaginary parts of eigenvalues larger than this are reported
pub const IMAGINARY_PART_TOLERANCE: f64 = 1e-8;

/// Maximum deviation of `V * diag(eigvals) * V^-1` from the decomposed matrix
pub const RECONSTRUCTION_TOLERANCE: f64 = 1e-6;
