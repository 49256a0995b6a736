//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Return series, portfolio evaluation, Monte-Carlo frontier sampling,
//! frontier summaries, CAPM regression and backtest comparison.

pub mod backtest;
pub mod capm;
pub mod data;
pub mod engine;
pub mod frontier;
pub mod performance;
pub mod summary;
pub mod types;
pub mod weights;

pub use backtest::BacktestComparison;
pub use backtest::cumulative_returns;
pub use capm::alpha_beta;
pub use data::DatedSeries;
pub use data::PriceRecord;
pub use data::PriceTable;
pub use data::ReturnTable;
pub use engine::CapmReport;
pub use engine::PortfolioAnalysis;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use frontier::Frontier;
pub use frontier::FrontierConfig;
pub use frontier::draw_weights;
pub use frontier::sample_frontier;
pub use performance::TRADING_DAYS_PER_YEAR;
pub use performance::portfolio_performance;
pub use summary::rank_by_sharpe;
pub use summary::summarize;
pub use summary::top_performers;
pub use types::AlphaBeta;
pub use types::FrontierSample;
pub use types::FrontierSummary;
pub use types::InstrumentReturn;
pub use types::PortfolioPerformance;
pub use types::SelectedPortfolio;
pub use types::WeightSampling;
pub use weights::Allocation;
pub use weights::Weights;
