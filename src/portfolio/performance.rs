//! # Portfolio Performance
//!
//! $$
//! \mu_p = 252\,\mathbf{w}^\top\mu,\quad
//! \sigma_p = \sqrt{252}\,\sqrt{\mathbf{w}^\top \Sigma \mathbf{w}},\quad
//! S = \frac{\mu_p - r_f}{\sigma_p}
//! $$
//!

use ndarray::Array1;
use ndarray::Array2;

use super::types::PortfolioPerformance;
use super::weights::Weights;
use crate::error::FrontierError;
use crate::error::Result;

/// Trading periods per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

const MIN_VOLATILITY: f64 = 1e-15;

pub(crate) fn check_dimensions(n: usize, mean_returns: &Array1<f64>, cov: &Array2<f64>) -> Result<()> {
  if mean_returns.len() != n || cov.dim() != (n, n) {
    return Err(FrontierError::DimensionMismatch(format!(
      "{n} weights, {} mean returns, {}x{} covariance",
      mean_returns.len(),
      cov.nrows(),
      cov.ncols()
    )));
  }
  Ok(())
}

/// Annualized return, volatility and Sharpe ratio of `weights`.
///
/// `mean_returns` and `cov` are per-period estimates; `risk_free` is annual.
pub fn portfolio_performance(
  weights: &Weights,
  mean_returns: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<PortfolioPerformance> {
  check_dimensions(weights.len(), mean_returns, cov)?;

  let w = weights.as_array();
  let expected_return = w.dot(mean_returns) * TRADING_DAYS_PER_YEAR;
  // Rounding can push the quadratic form of a PSD matrix slightly below zero.
  let variance = w.dot(&cov.dot(w)).max(0.0);
  let volatility = variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt();

  if !volatility.is_finite() || volatility < MIN_VOLATILITY {
    return Err(FrontierError::UndefinedSharpe);
  }

  Ok(PortfolioPerformance {
    expected_return,
    volatility,
    sharpe: (expected_return - risk_free) / volatility,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;
  use chrono::NaiveDate;
  use ndarray::array;

  use super::*;
  use crate::portfolio::data::ReturnTable;

  #[test]
  fn single_asset_return_is_mean_times_252() {
    let a = [0.01, 0.02, -0.01];
    let dates = (2..5)
      .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
      .collect();
    let table = ReturnTable::new(
      vec!["A".to_string()],
      dates,
      Array2::from_shape_vec((3, 1), a.to_vec()).unwrap(),
    )
    .unwrap();

    let perf = portfolio_performance(
      &Weights::new(vec![1.0]).unwrap(),
      &table.mean_returns(),
      &table.covariance().unwrap(),
      0.0,
    )
    .unwrap();

    let mean = a.iter().sum::<f64>() / 3.0;
    assert_relative_eq!(perf.expected_return, mean * 252.0, max_relative = 1e-12);
    assert_relative_eq!(perf.sharpe, perf.expected_return / perf.volatility);
  }

  #[test]
  fn two_asset_statistics() {
    let mu = array![0.001, 0.0005];
    let cov = array![[0.0004, 0.0001], [0.0001, 0.0009]];
    let w = Weights::new(vec![0.5, 0.5]).unwrap();

    let perf = portfolio_performance(&w, &mu, &cov, 0.02).unwrap();
    let var: f64 = 0.25 * 0.0004 + 0.25 * 0.0009 + 2.0 * 0.25 * 0.0001;
    assert_abs_diff_eq!(perf.expected_return, 0.00075 * 252.0, epsilon = 1e-12);
    assert_abs_diff_eq!(perf.volatility, var.sqrt() * 252f64.sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(
      perf.sharpe,
      (perf.expected_return - 0.02) / perf.volatility,
      epsilon = 1e-12
    );
  }

  #[test]
  fn zero_volatility_has_undefined_sharpe() {
    let mu = array![0.001, 0.002];
    let cov = Array2::zeros((2, 2));
    let w = Weights::equal(2).unwrap();
    assert_eq!(
      portfolio_performance(&w, &mu, &cov, 0.01).unwrap_err(),
      FrontierError::UndefinedSharpe
    );
  }

  #[test]
  fn volatility_is_non_negative_for_psd_covariance() {
    // Perfectly anti-correlated pair; the quadratic form stays non-negative.
    let mu = array![0.001, 0.001];
    let cov = array![[0.0004, -0.0004], [-0.0004, 0.0004]];
    let w = Weights::new(vec![0.6, 0.4]).unwrap();
    let perf = portfolio_performance(&w, &mu, &cov, 0.0).unwrap();
    assert!(perf.volatility >= 0.0);
  }

  #[test]
  fn rejects_mismatched_dimensions() {
    let w = Weights::equal(3).unwrap();
    let err = portfolio_performance(&w, &array![0.1, 0.2], &Array2::eye(2), 0.0).unwrap_err();
    assert!(matches!(err, FrontierError::DimensionMismatch(_)));
  }
}
