pub mod error;
pub mod gtr;
pub mod rate_matrix;
