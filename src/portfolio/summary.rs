//! # Frontier Summary
//!
//! $$
//! k_{S}=\arg\max_k S^{(k)},\qquad k_{\sigma}=\arg\min_k \sigma^{(k)}
//! $$
//!
//! Selection and ranking over sampled portfolios.

use ndarray::Array1;

use super::types::FrontierSample;
use super::types::FrontierSummary;
use super::types::InstrumentReturn;
use super::types::SelectedPortfolio;
use crate::error::FrontierError;
use crate::error::Result;

/// Maximum-Sharpe and minimum-volatility samples. Ties go to the earliest draw.
pub fn summarize(samples: &[FrontierSample]) -> Result<FrontierSummary> {
  let first = samples
    .first()
    .ok_or_else(|| FrontierError::no_data("frontier has no samples"))?;

  let mut best_sharpe = (0usize, first.sharpe());
  let mut min_vol = (0usize, first.volatility());
  for (i, s) in samples.iter().enumerate().skip(1) {
    if s.sharpe() > best_sharpe.1 {
      best_sharpe = (i, s.sharpe());
    }
    if s.volatility() < min_vol.1 {
      min_vol = (i, s.volatility());
    }
  }

  Ok(FrontierSummary {
    optimized: SelectedPortfolio {
      index: best_sharpe.0,
      sample: samples[best_sharpe.0].clone(),
    },
    min_variance: SelectedPortfolio {
      index: min_vol.0,
      sample: samples[min_vol.0].clone(),
    },
  })
}

/// Samples ordered by descending Sharpe ratio; equal ratios keep draw order.
pub fn rank_by_sharpe(samples: &[FrontierSample]) -> Vec<&FrontierSample> {
  let mut ranked: Vec<&FrontierSample> = samples.iter().collect();
  ranked.sort_by(|a, b| b.sharpe().total_cmp(&a.sharpe()));
  ranked
}

/// The `n` instruments with the highest mean return, best first.
pub fn top_performers(
  symbols: &[String],
  mean_returns: &Array1<f64>,
  n: usize,
) -> Result<Vec<InstrumentReturn>> {
  if symbols.len() != mean_returns.len() {
    return Err(FrontierError::DimensionMismatch(format!(
      "{} symbols for {} mean returns",
      symbols.len(),
      mean_returns.len()
    )));
  }

  let mut ranked: Vec<InstrumentReturn> = symbols
    .iter()
    .zip(mean_returns.iter())
    .map(|(symbol, &mean_return)| InstrumentReturn {
      symbol: symbol.clone(),
      mean_return,
    })
    .collect();
  ranked.sort_by(|a, b| b.mean_return.total_cmp(&a.mean_return));
  ranked.truncate(n);
  Ok(ranked)
}
