//! # Portfolio Engine
//!
//! $$
//! p \mapsto r \mapsto (\mu, \Sigma) \mapsto \{\mathbf{w}^{(k)}\} \mapsto (\mathbf{w}_S, \mathbf{w}_\sigma)
//! $$
//!
//! High-level orchestration of a full portfolio analysis.

use ndarray::Array1;
use ndarray::Array2;
use tracing::info;

use super::backtest::BacktestComparison;
use super::capm::alpha_beta;
use super::data::DatedSeries;
use super::data::PriceTable;
use super::data::ReturnTable;
use super::frontier::Frontier;
use super::frontier::FrontierConfig;
use super::frontier::sample_frontier;
use super::performance::portfolio_performance;
use super::summary::top_performers;
use super::types::AlphaBeta;
use super::types::FrontierSummary;
use super::types::InstrumentReturn;
use super::types::PortfolioPerformance;
use super::weights::Allocation;
use super::weights::Weights;
use crate::error::Result;
use crate::market::MarketIndex;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Frontier sampling parameters, including the risk-free rate.
  pub frontier: FrontierConfig,
  /// Benchmark index for CAPM and backtests.
  pub market: MarketIndex,
  /// Share of the book allotted to the optimized sub-portfolio.
  pub sub_portfolio_fraction: f64,
  /// Number of instruments listed as top performers.
  pub top_performers: usize,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      frontier: FrontierConfig::default(),
      market: MarketIndex::SP500,
      sub_portfolio_fraction: 0.25,
      top_performers: 10,
    }
  }
}

/// Alpha/beta of the user's and the optimized portfolio.
#[derive(Clone, Debug)]
pub struct CapmReport {
  pub selected: AlphaBeta,
  pub optimized: AlphaBeta,
}

/// Everything a dashboard needs to render one analysis.
#[derive(Clone, Debug)]
pub struct PortfolioAnalysis {
  pub symbols: Vec<String>,
  pub mean_returns: Array1<f64>,
  pub covariance: Array2<f64>,
  pub correlation: Array2<f64>,
  pub selected_weights: Weights,
  pub selected: PortfolioPerformance,
  pub frontier: Frontier,
  pub summary: FrontierSummary,
  pub top_performers: Vec<InstrumentReturn>,
  pub sub_portfolio: Vec<Allocation>,
  pub capm: Option<CapmReport>,
  pub backtest: Option<BacktestComparison>,
}

/// Labels used for the backtest series.
pub const OPTIMIZED_LABEL: &str = "Optimized Portfolio";
pub const SELECTED_LABEL: &str = "Selected Portfolio";

/// Single entry point for frontier, CAPM and backtest workflows.
#[derive(Clone, Debug)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  fn risk_free(&self) -> f64 {
    self.config.frontier.risk_free
  }

  /// Performance of a fixed weight vector.
  pub fn evaluate(&self, returns: &ReturnTable, weights: &Weights) -> Result<PortfolioPerformance> {
    portfolio_performance(
      weights,
      &returns.mean_returns(),
      &returns.covariance()?,
      self.risk_free(),
    )
  }

  /// Sample the efficient frontier of `returns`.
  pub fn frontier(&self, returns: &ReturnTable) -> Result<Frontier> {
    sample_frontier(
      &returns.mean_returns(),
      &returns.covariance()?,
      &self.config.frontier,
    )
  }

  /// Alpha/beta of `weights` against market index returns.
  pub fn alpha_beta(
    &self,
    returns: &ReturnTable,
    weights: &Weights,
    market_returns: &DatedSeries,
  ) -> Result<AlphaBeta> {
    let portfolio = returns.portfolio_returns(weights)?;
    alpha_beta(&portfolio, market_returns, self.risk_free())
  }

  /// Full analysis of `selected` weights on `prices`.
  ///
  /// `market_prices` are closing prices of [`PortfolioEngineConfig::market`];
  /// without them the CAPM and backtest sections are skipped.
  pub fn analyze(
    &self,
    prices: &PriceTable,
    selected_weights: &Weights,
    market_prices: Option<&DatedSeries>,
  ) -> Result<PortfolioAnalysis> {
    let returns = prices.returns()?;
    let mean_returns = returns.mean_returns();
    let covariance = returns.covariance()?;
    let correlation = returns.correlation()?;

    let selected = portfolio_performance(
      selected_weights,
      &mean_returns,
      &covariance,
      self.risk_free(),
    )?;
    let frontier = sample_frontier(&mean_returns, &covariance, &self.config.frontier)?;
    let summary = frontier.summary()?;
    let optimized_weights = &summary.optimized.sample.weights;

    let top = top_performers(returns.symbols(), &mean_returns, self.config.top_performers)?;
    let sub_portfolio =
      optimized_weights.scaled_allocations(returns.symbols(), self.config.sub_portfolio_fraction)?;

    let (capm, backtest) = match market_prices {
      Some(market_prices) => {
        let market_returns = market_prices.pct_change();
        let selected_returns = returns.portfolio_returns(selected_weights)?;
        let optimized_returns = returns.portfolio_returns(optimized_weights)?;

        let capm = CapmReport {
          selected: alpha_beta(&selected_returns, &market_returns, self.risk_free())?,
          optimized: alpha_beta(&optimized_returns, &market_returns, self.risk_free())?,
        };
        let market_label = self.config.market.to_string();
        let backtest = BacktestComparison::new(&[
          (OPTIMIZED_LABEL, &optimized_returns),
          (SELECTED_LABEL, &selected_returns),
          (market_label.as_str(), &market_returns),
        ])?;
        (Some(capm), Some(backtest))
      }
      None => (None, None),
    };

    info!(
      instruments = returns.n_assets(),
      periods = returns.n_periods(),
      optimized_sharpe = summary.optimized.sample.sharpe(),
      min_volatility = summary.min_variance.sample.volatility(),
      "portfolio analysis complete"
    );

    Ok(PortfolioAnalysis {
      symbols: returns.symbols().to_vec(),
      mean_returns,
      covariance,
      correlation,
      selected_weights: selected_weights.clone(),
      selected,
      summary,
      frontier,
      top_performers: top,
      sub_portfolio,
      capm,
      backtest,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::Duration;
  use chrono::NaiveDate;
  use tracing_test::traced_test;

  use super::*;
  use crate::error::FrontierError;
  use crate::portfolio::data::PriceRecord;

  fn prices() -> (PriceTable, DatedSeries) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let moves = [
      (0.010, -0.004, 0.006),
      (-0.008, 0.007, -0.005),
      (0.012, 0.001, 0.009),
      (0.004, -0.006, 0.002),
      (-0.011, 0.009, -0.007),
      (0.007, 0.002, 0.004),
      (0.003, -0.001, 0.001),
    ];

    let mut records = Vec::new();
    let mut market = Vec::new();
    let (mut a, mut b, mut m) = (100.0, 40.0, 4000.0);
    for (t, &(ra, rb, rm)) in std::iter::once(&(0.0, 0.0, 0.0))
      .chain(moves.iter())
      .enumerate()
    {
      a *= 1.0 + ra;
      b *= 1.0 + rb;
      m *= 1.0 + rm;
      let date = start + Duration::days(t as i64);
      records.push(PriceRecord {
        date,
        symbol: "AAA".to_string(),
        close: a,
      });
      records.push(PriceRecord {
        date,
        symbol: "BBB".to_string(),
        close: b,
      });
      market.push((date, m));
    }

    (
      PriceTable::from_records(&records).unwrap(),
      market.into_iter().collect(),
    )
  }

  fn engine() -> PortfolioEngine {
    PortfolioEngine::new(PortfolioEngineConfig {
      frontier: FrontierConfig {
        samples: 300,
        risk_free: 0.01,
        seed: Some(11),
        ..FrontierConfig::default()
      },
      ..PortfolioEngineConfig::default()
    })
  }

  #[test]
  #[traced_test]
  fn runs_full_analysis() {
    let (prices, market) = prices();
    let weights = Weights::new(vec![0.7, 0.3]).unwrap();
    let analysis = engine().analyze(&prices, &weights, Some(&market)).unwrap();

    assert_eq!(analysis.frontier.len(), 300);
    let best = analysis.summary.optimized.sample.sharpe();
    assert!(analysis.frontier.samples().iter().all(|s| s.sharpe() <= best));
    assert_eq!(analysis.sub_portfolio.len(), 2);
    let sub_total: f64 = analysis.sub_portfolio.iter().map(|a| a.weight).sum();
    assert_abs_diff_eq!(sub_total, 0.25, epsilon = 1e-9);
    assert_eq!(analysis.top_performers.len(), 2);

    let capm = analysis.capm.unwrap();
    assert_eq!(capm.selected.observations, 7);
    let backtest = analysis.backtest.unwrap();
    assert_eq!(backtest.names()[2], "S&P 500");
    assert_eq!(backtest.dates().len(), 7);
    assert!(logs_contain("portfolio analysis complete"));
  }

  #[test]
  fn analysis_without_market_skips_capm() {
    let (prices, _) = prices();
    let analysis = engine()
      .analyze(&prices, &Weights::equal(2).unwrap(), None)
      .unwrap();
    assert!(analysis.capm.is_none());
    assert!(analysis.backtest.is_none());
  }

  #[test]
  fn zero_samples_surface_no_data() {
    let (prices, _) = prices();
    let engine = PortfolioEngine::new(PortfolioEngineConfig {
      frontier: FrontierConfig {
        samples: 0,
        ..FrontierConfig::default()
      },
      ..PortfolioEngineConfig::default()
    });
    let err = engine
      .analyze(&prices, &Weights::equal(2).unwrap(), None)
      .unwrap_err();
    assert!(matches!(err, FrontierError::NoData(_)));
  }

  #[test]
  fn evaluate_matches_frontier_statistics() {
    let (prices, market) = prices();
    let returns = prices.returns().unwrap();
    let engine = engine();
    let frontier = engine.frontier(&returns).unwrap();
    let first = &frontier.samples()[0];

    let perf = engine.evaluate(&returns, &first.weights).unwrap();
    assert_abs_diff_eq!(perf.sharpe, first.sharpe(), epsilon = 1e-12);

    let fit = engine
      .alpha_beta(&returns, &first.weights, &market.pct_change())
      .unwrap();
    assert!(fit.beta.is_finite());
  }
}
