//! # CAPM
//!
//! $$
//! R_p = a + \beta R_m + \varepsilon,\qquad
//! \alpha = \Big(\sum R_p - r_f\Big) - \beta\Big(\sum R_m - r_f\Big)
//! $$
//!

use linreg::linear_regression;
use tracing::debug;

use super::data::DatedSeries;
use super::types::AlphaBeta;
use crate::error::FrontierError;
use crate::error::Result;

/// Minimum number of aligned dates for the regression.
pub const MIN_OBSERVATIONS: usize = 2;

/// Regress portfolio returns on market returns over their common dates.
///
/// Beta is the OLS slope. Alpha uses the summed returns over the window,
/// not the regression intercept.
pub fn alpha_beta(portfolio: &DatedSeries, market: &DatedSeries, risk_free: f64) -> Result<AlphaBeta> {
  let aligned = portfolio.align(market);
  if aligned.len() < MIN_OBSERVATIONS {
    return Err(FrontierError::InsufficientData {
      required: MIN_OBSERVATIONS,
      actual: aligned.len(),
    });
  }

  let (ys, xs): (Vec<f64>, Vec<f64>) = aligned.iter().map(|&(_, p, m)| (p, m)).unzip();
  let (beta, intercept): (f64, f64) = linear_regression(&xs, &ys)
    .map_err(|err| FrontierError::DegenerateRegression(format!("{err:?}")))?;
  if !beta.is_finite() || !intercept.is_finite() {
    return Err(FrontierError::DegenerateRegression(
      "market returns have zero variance".to_string(),
    ));
  }

  let portfolio_total: f64 = ys.iter().sum();
  let market_total: f64 = xs.iter().sum();
  let alpha = (portfolio_total - risk_free) - beta * (market_total - risk_free);

  debug!(observations = aligned.len(), alpha, beta, "fitted CAPM regression");
  Ok(AlphaBeta {
    alpha,
    beta,
    intercept,
    observations: aligned.len(),
  })
}
