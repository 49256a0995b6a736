//! # Portfolio Data
//!
//! $$
//! r_t = \frac{p_t}{p_{t-1}} - 1
//! $$
//!
//! Price tables, fractional return series and their moment estimates.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;
use tracing::debug;
use tracing::warn;

use super::weights::Weights;
use crate::error::FrontierError;
use crate::error::Result;

/// One closing price in long format.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRecord {
  pub date: NaiveDate,
  pub symbol: String,
  pub close: f64,
}

fn check_axes(symbols: &[String], dates: &[NaiveDate], shape: (usize, usize)) -> Result<()> {
  if symbols.is_empty() || dates.is_empty() {
    return Err(FrontierError::no_data("table has no instruments or no dates"));
  }
  if shape != (dates.len(), symbols.len()) {
    return Err(FrontierError::DimensionMismatch(format!(
      "matrix is {}x{} but table has {} dates and {} symbols",
      shape.0,
      shape.1,
      dates.len(),
      symbols.len()
    )));
  }

  let unique: BTreeSet<&str> = symbols.iter().map(String::as_str).collect();
  if unique.len() != symbols.len() {
    return Err(FrontierError::InvalidInput("duplicate symbols".to_string()));
  }
  if dates.windows(2).any(|w| w[0] >= w[1]) {
    return Err(FrontierError::InvalidInput(
      "dates must be strictly increasing".to_string(),
    ));
  }

  Ok(())
}

/// Closing prices, `dates x symbols`. Missing observations are `NaN`.
#[derive(Clone, Debug)]
pub struct PriceTable {
  symbols: Vec<String>,
  dates: Vec<NaiveDate>,
  closes: Array2<f64>,
}

impl PriceTable {
  pub fn new(symbols: Vec<String>, dates: Vec<NaiveDate>, closes: Array2<f64>) -> Result<Self> {
    check_axes(&symbols, &dates, closes.dim())?;
    Ok(Self {
      symbols,
      dates,
      closes,
    })
  }

  /// Pivot long-format records. Symbols keep first-seen order, dates are sorted.
  pub fn from_records(records: &[PriceRecord]) -> Result<Self> {
    if records.is_empty() {
      return Err(FrontierError::no_data("no price records"));
    }

    let mut symbols: Vec<String> = Vec::new();
    let mut column: HashMap<&str, usize> = HashMap::new();
    let mut dates = BTreeSet::new();
    for rec in records {
      if !column.contains_key(rec.symbol.as_str()) {
        column.insert(rec.symbol.as_str(), symbols.len());
        symbols.push(rec.symbol.clone());
      }
      dates.insert(rec.date);
    }

    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let row: HashMap<NaiveDate, usize> = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let mut closes = Array2::from_elem((dates.len(), symbols.len()), f64::NAN);
    let mut seen = vec![false; dates.len() * symbols.len()];

    for rec in records {
      let (i, j) = (row[&rec.date], column[rec.symbol.as_str()]);
      if std::mem::replace(&mut seen[i * symbols.len() + j], true) {
        return Err(FrontierError::InvalidInput(format!(
          "duplicate price for {} on {}",
          rec.symbol, rec.date
        )));
      }
      closes[[i, j]] = rec.close;
    }

    Self::new(symbols, dates, closes)
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn closes(&self) -> &Array2<f64> {
    &self.closes
  }

  /// Fractional returns on forward-filled closes.
  ///
  /// A missing close repeats the last known one, so the gap period has a zero
  /// return for that instrument. The first date and any date where an
  /// instrument has no earlier close (or a non-finite return) are dropped.
  pub fn returns(&self) -> Result<ReturnTable> {
    let n = self.symbols.len();
    let mut dates = Vec::with_capacity(self.dates.len().saturating_sub(1));
    let mut values = Vec::with_capacity(dates.capacity() * n);
    let mut last: Vec<f64> = self.closes.row(0).to_vec();
    let mut filled = 0usize;
    let mut dropped = 0usize;

    for t in 1..self.dates.len() {
      let mut row = Vec::with_capacity(n);
      for (j, &close) in self.closes.row(t).iter().enumerate() {
        let prev = last[j];
        if close.is_finite() {
          last[j] = close;
        } else if prev.is_finite() {
          filled += 1;
        }
        row.push(last[j] / prev - 1.0);
      }

      if row.iter().all(|r| r.is_finite()) {
        dates.push(self.dates[t]);
        values.extend(row);
      } else {
        dropped += 1;
      }
    }

    if filled > 0 {
      debug!(filled, "forward-filled missing closes");
    }
    if dropped > 0 {
      warn!(dropped, "dropped periods with missing or non-finite returns");
    }
    if dates.is_empty() {
      return Err(FrontierError::no_data("no complete return periods"));
    }

    let returns = Array2::from_shape_vec((dates.len(), n), values)
      .map_err(|e| FrontierError::InvalidInput(e.to_string()))?;
    ReturnTable::new(self.symbols.clone(), dates, returns)
  }
}

/// Per-period fractional returns, `periods x instruments`.
#[derive(Clone, Debug)]
pub struct ReturnTable {
  symbols: Vec<String>,
  dates: Vec<NaiveDate>,
  returns: Array2<f64>,
}

impl ReturnTable {
  pub fn new(symbols: Vec<String>, dates: Vec<NaiveDate>, returns: Array2<f64>) -> Result<Self> {
    check_axes(&symbols, &dates, returns.dim())?;
    Ok(Self {
      symbols,
      dates,
      returns,
    })
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn returns(&self) -> &Array2<f64> {
    &self.returns
  }

  pub fn n_periods(&self) -> usize {
    self.dates.len()
  }

  pub fn n_assets(&self) -> usize {
    self.symbols.len()
  }

  /// Arithmetic mean return per instrument.
  pub fn mean_returns(&self) -> Array1<f64> {
    self
      .returns
      .mean_axis(Axis(0))
      .unwrap_or_else(|| Array1::zeros(self.n_assets()))
  }

  fn require_periods(&self, required: usize) -> Result<()> {
    if self.n_periods() < required {
      return Err(FrontierError::InsufficientData {
        required,
        actual: self.n_periods(),
      });
    }
    Ok(())
  }

  /// Sample covariance matrix (`ddof = 1`).
  pub fn covariance(&self) -> Result<Array2<f64>> {
    self.require_periods(2)?;
    self
      .returns
      .t()
      .cov(1.0)
      .map_err(|_| FrontierError::no_data("empty return table"))
  }

  /// Pearson correlation matrix. Constant series yield `NaN` entries.
  pub fn correlation(&self) -> Result<Array2<f64>> {
    self.require_periods(2)?;
    self
      .returns
      .t()
      .pearson_correlation()
      .map_err(|_| FrontierError::no_data("empty return table"))
  }

  pub fn column(&self, symbol: &str) -> Result<DatedSeries> {
    let j = self
      .symbols
      .iter()
      .position(|s| s == symbol)
      .ok_or_else(|| FrontierError::no_data(format!("no returns for '{symbol}'")))?;
    DatedSeries::new(self.dates.clone(), self.returns.column(j).to_vec())
  }

  /// Weighted per-period portfolio return.
  pub fn portfolio_returns(&self, weights: &Weights) -> Result<DatedSeries> {
    if weights.len() != self.n_assets() {
      return Err(FrontierError::DimensionMismatch(format!(
        "{} weights for {} instruments",
        weights.len(),
        self.n_assets()
      )));
    }
    let values = self.returns.dot(weights.as_array());
    DatedSeries::new(self.dates.clone(), values.to_vec())
  }
}

/// A single series keyed by date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatedSeries {
  points: BTreeMap<NaiveDate, f64>,
}

impl DatedSeries {
  pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
    if dates.len() != values.len() {
      return Err(FrontierError::DimensionMismatch(format!(
        "{} dates for {} values",
        dates.len(),
        values.len()
      )));
    }

    let n = dates.len();
    let points: BTreeMap<NaiveDate, f64> = dates.into_iter().zip(values).collect();
    if points.len() != n {
      return Err(FrontierError::InvalidInput("duplicate dates".to_string()));
    }
    Ok(Self { points })
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn get(&self, date: &NaiveDate) -> Option<f64> {
    self.points.get(date).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    self.points.iter().map(|(d, v)| (*d, *v))
  }

  pub fn dates(&self) -> Vec<NaiveDate> {
    self.points.keys().copied().collect()
  }

  pub fn values(&self) -> Vec<f64> {
    self.points.values().copied().collect()
  }

  pub fn sum(&self) -> f64 {
    self.points.values().sum()
  }

  /// Fractional change between consecutive dates; non-finite changes are dropped.
  pub fn pct_change(&self) -> DatedSeries {
    let points: Vec<(NaiveDate, f64)> = self.iter().collect();
    points
      .windows(2)
      .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
      .filter(|(_, r)| r.is_finite())
      .collect()
  }

  /// Inner join on dates, keeping only pairs where both values are finite.
  pub fn align(&self, other: &DatedSeries) -> Vec<(NaiveDate, f64, f64)> {
    self
      .points
      .iter()
      .filter_map(|(d, &a)| other.get(d).map(|b| (*d, a, b)))
      .filter(|(_, a, b)| a.is_finite() && b.is_finite())
      .collect()
  }
}

impl FromIterator<(NaiveDate, f64)> for DatedSeries {
  fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
    Self {
      points: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
  }

  fn record(d: u32, symbol: &str, close: f64) -> PriceRecord {
    PriceRecord {
      date: day(d),
      symbol: symbol.to_string(),
      close,
    }
  }

  #[test]
  fn pivots_records_and_builds_returns() {
    let records = vec![
      record(2, "AAA", 100.0),
      record(2, "BBB", 50.0),
      record(3, "AAA", 110.0),
      record(3, "BBB", 55.0),
      record(4, "AAA", 99.0),
      record(4, "BBB", 55.0),
    ];
    let table = PriceTable::from_records(&records).unwrap();
    assert_eq!(table.symbols(), &["AAA".to_string(), "BBB".to_string()]);

    let returns = table.returns().unwrap();
    assert_eq!(returns.dates(), &[day(3), day(4)]);
    assert_abs_diff_eq!(returns.returns()[[0, 0]], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(returns.returns()[[1, 0]], -0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(returns.returns()[[1, 1]], 0.0, epsilon = 1e-12);
  }

  #[test]
  fn missing_close_carries_the_last_price_forward() {
    let records = vec![
      record(2, "AAA", 100.0),
      record(2, "BBB", 50.0),
      record(3, "AAA", 101.0),
      record(4, "AAA", 102.0),
      record(4, "BBB", 51.0),
      record(5, "AAA", 103.0),
      record(5, "BBB", 52.0),
    ];
    let returns = PriceTable::from_records(&records).unwrap().returns().unwrap();

    // Day 3 has no BBB close; both periods around the gap survive.
    assert_eq!(returns.dates(), &[day(3), day(4), day(5)]);
    assert_abs_diff_eq!(returns.returns()[[0, 1]], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(returns.returns()[[1, 1]], 0.02, epsilon = 1e-12);
    assert_abs_diff_eq!(returns.returns()[[1, 0]], 102.0 / 101.0 - 1.0, epsilon = 1e-12);
  }

  #[test]
  fn drops_periods_before_an_instrument_starts_trading() {
    let records = vec![
      record(2, "AAA", 100.0),
      record(3, "AAA", 101.0),
      record(3, "BBB", 50.0),
      record(4, "AAA", 102.0),
      record(4, "BBB", 51.0),
    ];
    let returns = PriceTable::from_records(&records).unwrap().returns().unwrap();

    assert_eq!(returns.dates(), &[day(4)]);
    assert_abs_diff_eq!(returns.returns()[[0, 1]], 0.02, epsilon = 1e-12);
  }

  #[test]
  fn rejects_duplicate_prices() {
    let records = vec![record(2, "AAA", 100.0), record(2, "AAA", 101.0)];
    assert!(matches!(
      PriceTable::from_records(&records),
      Err(FrontierError::InvalidInput(_))
    ));
  }

  #[test]
  fn single_price_row_has_no_returns() {
    let table = PriceTable::from_records(&[record(2, "AAA", 100.0)]).unwrap();
    assert!(matches!(table.returns(), Err(FrontierError::NoData(_))));
  }

  #[test]
  fn covariance_matches_sample_estimator() {
    let table = ReturnTable::new(
      vec!["A".to_string(), "B".to_string()],
      vec![day(2), day(3), day(4)],
      array![[0.01, 0.02], [0.02, 0.04], [-0.01, -0.02]],
    )
    .unwrap();

    let cov = table.covariance().unwrap();
    let mean_a: f64 = 0.02 / 3.0;
    let var_a = ((0.01 - mean_a).powi(2) + (0.02 - mean_a).powi(2) + (-0.01 - mean_a).powi(2)) / 2.0;
    assert_abs_diff_eq!(cov[[0, 0]], var_a, epsilon = 1e-15);
    assert_abs_diff_eq!(cov[[1, 1]], 4.0 * var_a, epsilon = 1e-15);
    assert_abs_diff_eq!(cov[[0, 1]], 2.0 * var_a, epsilon = 1e-15);

    let corr = table.correlation().unwrap();
    assert_abs_diff_eq!(corr[[0, 1]], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn covariance_needs_two_periods() {
    let table = ReturnTable::new(vec!["A".to_string()], vec![day(2)], array![[0.01]]).unwrap();
    assert_eq!(
      table.covariance().unwrap_err(),
      FrontierError::InsufficientData {
        required: 2,
        actual: 1
      }
    );
  }

  #[test]
  fn portfolio_returns_weight_each_period() {
    let table = ReturnTable::new(
      vec!["A".to_string(), "B".to_string()],
      vec![day(2), day(3)],
      array![[0.02, 0.0], [0.0, -0.04]],
    )
    .unwrap();
    let w = Weights::new(vec![0.5, 0.5]).unwrap();
    let series = table.portfolio_returns(&w).unwrap();
    assert_eq!(series.values(), vec![0.01, -0.02]);
  }

  #[test]
  fn pct_change_and_align() {
    let prices: DatedSeries = vec![(day(2), 100.0), (day(3), 102.0), (day(5), 51.0)]
      .into_iter()
      .collect();
    let returns = prices.pct_change();
    assert_eq!(returns.dates(), vec![day(3), day(5)]);
    assert_abs_diff_eq!(returns.get(&day(5)).unwrap(), -0.5, epsilon = 1e-12);

    let other: DatedSeries = vec![(day(3), 0.1), (day(4), 0.2)].into_iter().collect();
    let aligned = returns.align(&other);
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].0, day(3));
  }
}
