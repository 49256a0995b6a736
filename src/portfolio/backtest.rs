//! # Backtest Comparison
//!
//! $$
//! C_t = \prod_{s\le t}(1+r_s) - 1
//! $$
//!
//! Historical comparison of portfolios against a benchmark on common dates.

use chrono::NaiveDate;
use tracing::debug;

use super::data::DatedSeries;
use crate::error::FrontierError;
use crate::error::Result;

/// Running compounded return of a per-period return series.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
  returns
    .iter()
    .scan(1.0, |growth, &r| {
      *growth *= 1.0 + r;
      Some(*growth - 1.0)
    })
    .collect()
}

/// Named return series joined on the dates they all share.
#[derive(Clone, Debug)]
pub struct BacktestComparison {
  dates: Vec<NaiveDate>,
  names: Vec<String>,
  returns: Vec<Vec<f64>>,
}

impl BacktestComparison {
  /// Inner join of all series. Dates missing from any series are dropped.
  pub fn new(series: &[(&str, &DatedSeries)]) -> Result<Self> {
    let (_, first) = series
      .first()
      .ok_or_else(|| FrontierError::no_data("nothing to compare"))?;

    let dates: Vec<NaiveDate> = first
      .iter()
      .filter(|(d, _)| series.iter().all(|(_, s)| s.get(d).is_some_and(f64::is_finite)))
      .map(|(d, _)| d)
      .collect();
    if dates.is_empty() {
      return Err(FrontierError::no_data("series share no dates"));
    }

    let returns = series
      .iter()
      .map(|(_, s)| dates.iter().filter_map(|d| s.get(d)).collect())
      .collect();
    debug!(series = series.len(), periods = dates.len(), "aligned backtest series");

    Ok(Self {
      dates,
      names: series.iter().map(|(name, _)| name.to_string()).collect(),
      returns,
    })
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  /// Per-period returns of `name` on the common dates.
  pub fn returns(&self, name: &str) -> Option<&[f64]> {
    self
      .names
      .iter()
      .position(|n| n == name)
      .map(|i| self.returns[i].as_slice())
  }

  /// Cumulative return path of each series, in insertion order.
  pub fn cumulative(&self) -> Vec<(String, Vec<f64>)> {
    self
      .names
      .iter()
      .zip(self.returns.iter())
      .map(|(name, r)| (name.clone(), cumulative_returns(r)))
      .collect()
  }

  /// Total compounded return of each series over the window.
  pub fn total_returns(&self) -> Vec<(String, f64)> {
    self
      .cumulative()
      .into_iter()
      .map(|(name, path)| (name, path.last().copied().unwrap_or(0.0)))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn series(values: &[(u32, f64)]) -> DatedSeries {
    values
      .iter()
      .map(|&(d, v)| (NaiveDate::from_ymd_opt(2024, 5, d).unwrap(), v))
      .collect()
  }

  #[test]
  fn compounds_returns() {
    let path = cumulative_returns(&[0.1, -0.1]);
    assert_abs_diff_eq!(path[0], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(path[1], -0.01, epsilon = 1e-12);
    assert!(cumulative_returns(&[]).is_empty());
  }

  #[test]
  fn joins_on_shared_dates() {
    let a = series(&[(1, 0.01), (2, 0.02), (3, 0.03)]);
    let b = series(&[(2, 0.5), (3, f64::NAN), (4, 0.1)]);
    let m = series(&[(1, 0.0), (2, 0.0), (3, 0.0)]);

    let cmp = BacktestComparison::new(&[("A", &a), ("B", &b), ("Market", &m)]).unwrap();
    assert_eq!(cmp.dates().len(), 1);
    assert_eq!(cmp.returns("B"), Some(&[0.5][..]));
    assert_eq!(cmp.names(), &["A", "B", "Market"]);

    let totals = cmp.total_returns();
    assert_abs_diff_eq!(totals[0].1, 0.02, epsilon = 1e-12);
  }

  #[test]
  fn disjoint_series_have_no_data() {
    let a = series(&[(1, 0.01)]);
    let b = series(&[(2, 0.01)]);
    assert!(matches!(
      BacktestComparison::new(&[("A", &a), ("B", &b)]),
      Err(FrontierError::NoData(_))
    ));
    assert!(BacktestComparison::new(&[]).is_err());
  }
}
