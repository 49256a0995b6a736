//! # CSV I/O
//!
//! Fixed-schema CSV boundary. Every file must carry exactly the expected
//! columns (in any order); unknown or missing columns are rejected.
//!
//! | file          | columns                  |
//! |---------------|--------------------------|
//! | prices        | `date,symbol,close`      |
//! | market prices | `date,close`             |
//! | weights       | `symbol,weight`          |
//! | allocations   | `symbol,weight_pct`      |

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;
use serde::Deserialize;
use tracing::debug;

use crate::portfolio::Allocation;
use crate::portfolio::DatedSeries;
use crate::portfolio::PriceRecord;
use crate::portfolio::PriceTable;
use crate::portfolio::Weights;

pub const PRICE_COLUMNS: [&str; 3] = ["date", "symbol", "close"];
pub const MARKET_COLUMNS: [&str; 2] = ["date", "close"];
pub const WEIGHT_COLUMNS: [&str; 2] = ["symbol", "weight"];
pub const ALLOCATION_COLUMNS: [&str; 2] = ["symbol", "weight_pct"];

#[derive(Deserialize)]
struct PriceRow {
  date: NaiveDate,
  symbol: String,
  close: f64,
}

#[derive(Deserialize)]
struct MarketRow {
  date: NaiveDate,
  close: f64,
}

#[derive(Deserialize)]
struct WeightRow {
  symbol: String,
  weight: f64,
}

fn check_headers(headers: &StringRecord, expected: &[&str]) -> Result<()> {
  let found: Vec<&str> = headers.iter().collect();

  let unknown: Vec<&str> = found
    .iter()
    .copied()
    .filter(|h| !expected.contains(h))
    .collect();
  if !unknown.is_empty() {
    bail!(
      "unrecognized column(s) {unknown:?}; expected exactly {expected:?}"
    );
  }

  let missing: Vec<&str> = expected
    .iter()
    .copied()
    .filter(|e| !found.contains(e))
    .collect();
  if !missing.is_empty() {
    bail!("missing column(s) {missing:?}; expected exactly {expected:?}");
  }

  if found.len() != expected.len() {
    bail!("duplicate columns in header {found:?}");
  }
  Ok(())
}

fn rows<R: Read, T: for<'de> Deserialize<'de>>(reader: R, expected: &[&str]) -> Result<Vec<T>> {
  let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
  check_headers(rdr.headers().context("failed to read CSV header")?, expected)?;

  let mut out = Vec::new();
  for (i, row) in rdr.deserialize::<T>().enumerate() {
    // Line 1 is the header.
    out.push(row.with_context(|| format!("invalid record on line {}", i + 2))?);
  }
  Ok(out)
}

fn open(path: &Path) -> Result<File> {
  File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

/// Read long-format closing prices.
pub fn read_prices<R: Read>(reader: R) -> Result<PriceTable> {
  let records: Vec<PriceRecord> = rows::<R, PriceRow>(reader, &PRICE_COLUMNS)?
    .into_iter()
    .map(|r| PriceRecord {
      date: r.date,
      symbol: r.symbol,
      close: r.close,
    })
    .collect();
  debug!(records = records.len(), "read price records");
  Ok(PriceTable::from_records(&records)?)
}

pub fn read_prices_file(path: impl AsRef<Path>) -> Result<PriceTable> {
  let path = path.as_ref();
  read_prices(open(path)?).with_context(|| format!("failed to load prices from {}", path.display()))
}

/// Read closing prices of a market index.
pub fn read_market_prices<R: Read>(reader: R) -> Result<DatedSeries> {
  let (dates, closes): (Vec<NaiveDate>, Vec<f64>) = rows::<R, MarketRow>(reader, &MARKET_COLUMNS)?
    .into_iter()
    .map(|r| (r.date, r.close))
    .unzip();
  if dates.is_empty() {
    bail!("market price file has no rows");
  }
  Ok(DatedSeries::new(dates, closes)?)
}

pub fn read_market_prices_file(path: impl AsRef<Path>) -> Result<DatedSeries> {
  let path = path.as_ref();
  read_market_prices(open(path)?)
    .with_context(|| format!("failed to load market prices from {}", path.display()))
}

/// Read portfolio weights and order them like `symbols`.
///
/// Every symbol must appear exactly once and no other symbol may appear.
pub fn read_weights<R: Read>(reader: R, symbols: &[String]) -> Result<Weights> {
  let mut by_symbol: HashMap<String, f64> = HashMap::new();
  for row in rows::<R, WeightRow>(reader, &WEIGHT_COLUMNS)? {
    if !symbols.contains(&row.symbol) {
      bail!("weight given for unknown symbol '{}'", row.symbol);
    }
    if by_symbol.insert(row.symbol.clone(), row.weight).is_some() {
      bail!("duplicate weight for symbol '{}'", row.symbol);
    }
  }

  let values = symbols
    .iter()
    .map(|s| {
      by_symbol
        .get(s)
        .copied()
        .with_context(|| format!("no weight given for symbol '{s}'"))
    })
    .collect::<Result<Vec<f64>>>()?;
  Ok(Weights::new(values)?)
}

pub fn read_weights_file(path: impl AsRef<Path>, symbols: &[String]) -> Result<Weights> {
  let path = path.as_ref();
  read_weights(open(path)?, symbols)
    .with_context(|| format!("failed to load weights from {}", path.display()))
}

/// Write allocations as `symbol,weight_pct`.
pub fn write_allocations<W: Write>(writer: W, allocations: &[Allocation]) -> Result<()> {
  let mut wtr = csv::Writer::from_writer(writer);
  wtr
    .write_record(ALLOCATION_COLUMNS)
    .context("failed to write CSV header")?;
  for a in allocations {
    let pct = format!("{:.6}", a.percent());
    wtr
      .write_record([a.symbol.as_str(), pct.as_str()])
      .with_context(|| format!("failed to write allocation for {}", a.symbol))?;
  }
  wtr.flush().context("failed to flush CSV writer")?;
  Ok(())
}

pub fn write_allocations_file(path: impl AsRef<Path>, allocations: &[Allocation]) -> Result<()> {
  let path = path.as_ref();
  let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
  write_allocations(file, allocations)
}
