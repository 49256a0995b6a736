//! # Errors
//!
//! Failure modes of the portfolio kernel. None of them are fatal to the host
//! process; callers surface them as a message and do not retry.

use thiserror::Error;

/// Errors raised by the portfolio kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontierError {
  /// Missing or empty input data.
  #[error("no data: {0}")]
  NoData(String),

  /// Portfolio volatility is zero, so the Sharpe ratio is undefined.
  #[error("undefined Sharpe ratio: portfolio volatility is zero")]
  UndefinedSharpe,

  /// Not enough aligned observations for the requested statistic.
  #[error("insufficient data: need {required} observations, got {actual}")]
  InsufficientData { required: usize, actual: usize },

  /// Weight vector, mean vector and covariance matrix disagree in size.
  #[error("dimension mismatch: {0}")]
  DimensionMismatch(String),

  /// Weights are negative, non-finite or do not sum to one.
  #[error("invalid weights: {0}")]
  InvalidWeights(String),

  /// Malformed table input (duplicate symbols, unordered dates, bad shape).
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Regression could not be solved, e.g. the market series has zero variance.
  #[error("degenerate regression: {0}")]
  DegenerateRegression(String),
}

impl FrontierError {
  pub(crate) fn no_data(what: impl Into<String>) -> Self {
    Self::NoData(what.into())
  }
}

/// Result alias for the portfolio kernel.
pub type Result<T> = std::result::Result<T, FrontierError>;
