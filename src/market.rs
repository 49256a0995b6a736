//! # Market Index
//!
//! Benchmark indices for CAPM regressions and backtests, keyed by their
//! ticker symbol on the price source.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::FrontierError;

/// Market index used as the CAPM and backtest benchmark.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MarketIndex {
  #[default]
  SP500,
  DJIA,
  Russell1000,
  Nasdaq,
}

impl MarketIndex {
  pub const ALL: [MarketIndex; 4] = [
    MarketIndex::SP500,
    MarketIndex::DJIA,
    MarketIndex::Russell1000,
    MarketIndex::Nasdaq,
  ];

  /// Ticker symbol of the index on the price source.
  pub fn symbol(&self) -> &'static str {
    match self {
      MarketIndex::SP500 => "^GSPC",
      MarketIndex::DJIA => "^DJI",
      MarketIndex::Russell1000 => "^RUI",
      MarketIndex::Nasdaq => "^IXIC",
    }
  }
}

impl Display for MarketIndex {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MarketIndex::SP500 => write!(f, "S&P 500"),
      MarketIndex::DJIA => write!(f, "DJIA"),
      MarketIndex::Russell1000 => write!(f, "Russell 1000"),
      MarketIndex::Nasdaq => write!(f, "NASDAQ"),
    }
  }
}

impl FromStr for MarketIndex {
  type Err = FrontierError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "sp500" | "s&p500" | "s&p 500" | "^gspc" | "gspc" => Ok(Self::SP500),
      "djia" | "dow" | "^dji" | "dji" => Ok(Self::DJIA),
      "russell1000" | "russell 1000" | "^rui" | "rui" => Ok(Self::Russell1000),
      "nasdaq" | "^ixic" | "ixic" => Ok(Self::Nasdaq),
      other => Err(FrontierError::InvalidInput(format!(
        "unknown market index '{other}'"
      ))),
    }
  }
}
