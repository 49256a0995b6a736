//! # Portfolio Types
//!
//! $$
//! S = \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums and result containers for frontier sampling and regression.

use std::str::FromStr;

use super::weights::Weights;
use crate::error::FrontierError;

/// How random weight vectors are drawn on the simplex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeightSampling {
  /// Independent uniforms on `[0, 1)` divided by their sum.
  #[default]
  NormalizedUniform,
  /// Unit exponentials divided by their sum, i.e. a flat Dirichlet draw.
  FlatDirichlet,
}

impl FromStr for WeightSampling {
  type Err = FrontierError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "uniform" | "normalized-uniform" => Ok(Self::NormalizedUniform),
      "dirichlet" | "flat-dirichlet" => Ok(Self::FlatDirichlet),
      other => Err(FrontierError::InvalidInput(format!(
        "unknown weight sampling scheme '{other}'"
      ))),
    }
  }
}

/// Annualized statistics of one weight vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioPerformance {
  /// Annualized expected return.
  pub expected_return: f64,
  /// Annualized volatility.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

/// One Monte-Carlo draw on the frontier.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierSample {
  pub weights: Weights,
  pub performance: PortfolioPerformance,
}

impl FrontierSample {
  pub fn expected_return(&self) -> f64 {
    self.performance.expected_return
  }

  pub fn volatility(&self) -> f64 {
    self.performance.volatility
  }

  pub fn sharpe(&self) -> f64 {
    self.performance.sharpe
  }
}

/// A sample picked out of a frontier together with its draw index.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedPortfolio {
  pub index: usize,
  pub sample: FrontierSample,
}

/// Maximum-Sharpe and minimum-variance picks of a frontier.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierSummary {
  /// Maximum Sharpe ratio ("optimized") portfolio.
  pub optimized: SelectedPortfolio,
  /// Minimum volatility portfolio.
  pub min_variance: SelectedPortfolio,
}

/// CAPM regression of a portfolio against a market index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaBeta {
  /// `(sum(R_p) - r_f) - beta * (sum(R_m) - r_f)`.
  pub alpha: f64,
  /// OLS slope of portfolio returns on market returns.
  pub beta: f64,
  /// OLS intercept.
  pub intercept: f64,
  /// Number of aligned dates used in the fit.
  pub observations: usize,
}

/// Mean per-period return of a single instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentReturn {
  pub symbol: String,
  pub mean_return: f64,
}
