//! # Efficient Frontier Sampling
//!
//! $$
//! \mathbf{w}^{(k)} = \frac{\mathbf{u}^{(k)}}{\mathbf 1^\top \mathbf{u}^{(k)}},\quad
//! k = 1,\dots,N
//! $$
//!
//! Monte-Carlo random-weight search over the long-only simplex.

use ndarray::Array1;
use ndarray::Array2;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Exp1;
use rayon::prelude::*;
use tracing::debug;
use tracing::info;

use super::performance::check_dimensions;
use super::performance::portfolio_performance;
use super::summary::rank_by_sharpe;
use super::summary::summarize;
use super::types::FrontierSample;
use super::types::FrontierSummary;
use super::types::WeightSampling;
use super::weights::Weights;
use crate::error::FrontierError;
use crate::error::Result;

/// Configuration for [`sample_frontier`].
#[derive(Clone, Debug)]
pub struct FrontierConfig {
  /// Number of random portfolios to draw.
  pub samples: usize,
  /// Annual risk-free rate used in Sharpe ratios.
  pub risk_free: f64,
  /// Seed for reproducible draws. A random seed is picked when unset.
  pub seed: Option<u64>,
  /// Weight distribution on the simplex.
  pub sampling: WeightSampling,
  /// Evaluate draws on the rayon thread pool.
  pub parallel: bool,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      samples: 5000,
      risk_free: 0.01,
      seed: None,
      sampling: WeightSampling::NormalizedUniform,
      parallel: false,
    }
  }
}

/// Sampled portfolios in draw order.
#[derive(Clone, Debug)]
pub struct Frontier {
  samples: Vec<FrontierSample>,
  seed: u64,
}

impl Frontier {
  pub fn samples(&self) -> &[FrontierSample] {
    &self.samples
  }

  /// Seed that reproduces this frontier.
  pub fn seed(&self) -> u64 {
    self.seed
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn summary(&self) -> Result<FrontierSummary> {
    summarize(&self.samples)
  }

  pub fn ranked_by_sharpe(&self) -> Vec<&FrontierSample> {
    rank_by_sharpe(&self.samples)
  }
}

fn sample_rng(seed: u64, index: usize) -> StdRng {
  StdRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Draw one weight vector on the simplex.
pub fn draw_weights<R: Rng>(rng: &mut R, n: usize, sampling: WeightSampling) -> Result<Weights> {
  if n == 0 {
    return Err(FrontierError::no_data("cannot draw weights for zero instruments"));
  }

  let raw: Vec<f64> = match sampling {
    WeightSampling::NormalizedUniform => (0..n).map(|_| rng.random::<f64>()).collect(),
    WeightSampling::FlatDirichlet => (0..n).map(|_| rng.sample::<f64, _>(Exp1)).collect(),
  };

  // All-zero draws are possible in principle; fall back to equal weights.
  Weights::normalized(raw).or_else(|_| Weights::equal(n))
}

/// Draw `config.samples` random portfolios and evaluate each of them.
///
/// Sample `i` uses its own generator derived from the seed and `i`, so a fixed
/// seed gives identical frontiers in sequential and parallel mode.
pub fn sample_frontier(
  mean_returns: &Array1<f64>,
  cov: &Array2<f64>,
  config: &FrontierConfig,
) -> Result<Frontier> {
  let n_assets = mean_returns.len();
  if n_assets == 0 {
    return Err(FrontierError::no_data("no instruments to sample"));
  }
  check_dimensions(n_assets, mean_returns, cov)?;

  let seed = config.seed.unwrap_or_else(rand::random);
  debug!(
    samples = config.samples,
    n_assets,
    seed,
    sampling = ?config.sampling,
    parallel = config.parallel,
    "sampling efficient frontier"
  );

  let draw = |i: usize| -> Result<FrontierSample> {
    let mut rng = sample_rng(seed, i);
    let weights = draw_weights(&mut rng, n_assets, config.sampling)?;
    let performance = portfolio_performance(&weights, mean_returns, cov, config.risk_free)?;
    Ok(FrontierSample {
      weights,
      performance,
    })
  };

  let samples = if config.parallel {
    (0..config.samples)
      .into_par_iter()
      .map(draw)
      .collect::<Result<Vec<_>>>()?
  } else {
    (0..config.samples).map(draw).collect::<Result<Vec<_>>>()?
  };

  info!(samples = samples.len(), seed, "efficient frontier sampled");
  Ok(Frontier { samples, seed })
}
