//! # Weights
//!
//! $$
//! \mathbf{w}\in\Delta^{n-1}=\{w_i\ge 0,\ \textstyle\sum_i w_i = 1\}
//! $$
//!
//! Validated long-only weight vectors.

use ndarray::Array1;

use crate::error::FrontierError;
use crate::error::Result;

/// Allowed deviation of the weight sum from one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Long-only weight vector that sums to one.
#[derive(Clone, Debug, PartialEq)]
pub struct Weights(Array1<f64>);

/// A weight attached to its instrument symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
  pub symbol: String,
  pub weight: f64,
}

impl Allocation {
  pub fn percent(&self) -> f64 {
    self.weight * 100.0
  }
}

fn check_entries(values: &[f64]) -> Result<()> {
  if values.is_empty() {
    return Err(FrontierError::no_data("weight vector is empty"));
  }
  if let Some((i, w)) = values
    .iter()
    .enumerate()
    .find(|(_, w)| !w.is_finite() || **w < 0.0)
  {
    return Err(FrontierError::InvalidWeights(format!(
      "weight[{i}] = {w} must be finite and non-negative"
    )));
  }
  Ok(())
}

impl Weights {
  /// Validate weights as given.
  pub fn new(values: Vec<f64>) -> Result<Self> {
    check_entries(&values)?;
    let sum: f64 = values.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(FrontierError::InvalidWeights(format!(
        "weights sum to {sum}, expected 1"
      )));
    }
    Ok(Self(Array1::from_vec(values)))
  }

  /// Divide non-negative values by their sum.
  pub fn normalized(values: Vec<f64>) -> Result<Self> {
    check_entries(&values)?;
    let sum: f64 = values.iter().sum();
    if sum <= 0.0 {
      return Err(FrontierError::InvalidWeights(
        "cannot normalize weights that sum to zero".to_string(),
      ));
    }
    Ok(Self(Array1::from_vec(values) / sum))
  }

  /// `1/n` in every instrument.
  pub fn equal(n: usize) -> Result<Self> {
    if n == 0 {
      return Err(FrontierError::no_data("cannot build weights for zero instruments"));
    }
    Ok(Self(Array1::from_elem(n, 1.0 / n as f64)))
  }

  pub fn as_array(&self) -> &Array1<f64> {
    &self.0
  }

  pub fn to_vec(&self) -> Vec<f64> {
    self.0.to_vec()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn sum(&self) -> f64 {
    self.0.sum()
  }

  pub fn iter(&self) -> impl Iterator<Item = &f64> {
    self.0.iter()
  }

  /// Pair each weight with its symbol.
  pub fn allocations(&self, symbols: &[String]) -> Result<Vec<Allocation>> {
    self.scaled_allocations(symbols, 1.0)
  }

  /// Allocations scaled down to `fraction` of the whole book (sub-portfolio).
  pub fn scaled_allocations(&self, symbols: &[String], fraction: f64) -> Result<Vec<Allocation>> {
    if symbols.len() != self.len() {
      return Err(FrontierError::DimensionMismatch(format!(
        "{} symbols for {} weights",
        symbols.len(),
        self.len()
      )));
    }
    if !fraction.is_finite() || fraction < 0.0 {
      return Err(FrontierError::InvalidInput(format!(
        "sub-portfolio fraction {fraction} must be finite and non-negative"
      )));
    }

    Ok(
      symbols
        .iter()
        .zip(self.0.iter())
        .map(|(symbol, &w)| Allocation {
          symbol: symbol.clone(),
          weight: w * fraction,
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn rejects_weights_that_do_not_sum_to_one() {
    let err = Weights::new(vec![0.5, 0.4]).unwrap_err();
    assert!(matches!(err, FrontierError::InvalidWeights(_)));
  }

  #[test]
  fn rejects_negative_and_nan_weights() {
    assert!(Weights::new(vec![1.5, -0.5]).is_err());
    assert!(Weights::normalized(vec![f64::NAN, 1.0]).is_err());
  }

  #[test]
  fn normalized_weights_sum_to_one() {
    let w = Weights::normalized(vec![2.0, 1.0, 1.0]).unwrap();
    assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(w.as_array()[0], 0.5, epsilon = 1e-12);
  }

  #[test]
  fn equal_weights_require_instruments() {
    assert!(matches!(Weights::equal(0), Err(FrontierError::NoData(_))));
    assert_abs_diff_eq!(Weights::equal(4).unwrap().as_array()[3], 0.25);
  }

  #[test]
  fn scaled_allocations_keep_symbol_order() {
    let w = Weights::new(vec![0.6, 0.4]).unwrap();
    let symbols = vec!["AAA".to_string(), "BBB".to_string()];
    let alloc = w.scaled_allocations(&symbols, 0.25).unwrap();

    assert_eq!(alloc[0].symbol, "AAA");
    assert_abs_diff_eq!(alloc[0].percent(), 15.0, epsilon = 1e-12);
    assert_abs_diff_eq!(alloc[1].percent(), 10.0, epsilon = 1e-12);
    assert!(w.allocations(&symbols[..1]).is_err());
  }
}
