//! # frontier
//!
//! ```bash
//! # Equal-weighted portfolio, 5000 Monte-Carlo samples
//! frontier analyze --prices prices.csv
//!
//! # Custom weights against the S&P 500, with charts and exported allocations
//! frontier analyze -p prices.csv -w weights.csv --market-prices gspc.csv \
//!   --market sp500 --seed 42 --chart frontier.html --export-dir out
//!
//! # Supported benchmark indices
//! frontier indices
//! ```

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use frontier_rs::MarketIndex;
use frontier_rs::io;
use frontier_rs::portfolio::FrontierConfig;
use frontier_rs::portfolio::PortfolioAnalysis;
use frontier_rs::portfolio::PortfolioEngine;
use frontier_rs::portfolio::PortfolioEngineConfig;
use frontier_rs::portfolio::PortfolioPerformance;
use frontier_rs::portfolio::WeightSampling;
use frontier_rs::portfolio::Weights;
use frontier_rs::visualization::backtest_plot;
use frontier_rs::visualization::frontier_plot;
use frontier_rs::visualization::top_performers_plot;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;
use prettytable::row;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frontier")]
#[command(about = "Monte-Carlo efficient frontier, Sharpe selection and CAPM alpha/beta", long_about = None)]
#[command(version)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Analyze a portfolio of priced instruments
  Analyze(AnalyzeArgs),
  /// List supported benchmark indices
  Indices,
}

#[derive(Args)]
struct AnalyzeArgs {
  /// Closing prices (`date,symbol,close`)
  #[arg(short, long)]
  prices: PathBuf,

  /// Portfolio weights (`symbol,weight`); equal weights when omitted
  #[arg(short, long)]
  weights: Option<PathBuf>,

  /// Benchmark closing prices (`date,close`); enables CAPM and backtest
  #[arg(long)]
  market_prices: Option<PathBuf>,

  /// Benchmark index the market prices belong to
  #[arg(short, long, default_value = "sp500")]
  market: MarketIndex,

  /// Number of Monte-Carlo portfolios
  #[arg(short = 'n', long, default_value_t = 5000)]
  samples: usize,

  /// Annual risk-free rate
  #[arg(short, long, default_value_t = 0.01)]
  risk_free: f64,

  /// Seed for reproducible sampling
  #[arg(long)]
  seed: Option<u64>,

  /// Weight sampling scheme (uniform, dirichlet)
  #[arg(long, default_value = "uniform")]
  sampling: WeightSampling,

  /// Sample portfolios on the rayon thread pool
  #[arg(long)]
  parallel: bool,

  /// Share of the book allotted to the optimized sub-portfolio
  #[arg(long, default_value_t = 0.25)]
  sub_portfolio: f64,

  /// Number of top performers to list
  #[arg(long, default_value_t = 10)]
  top: usize,

  /// Print the N best sampled portfolios by Sharpe ratio
  #[arg(long, default_value_t = 5)]
  ranked: usize,

  /// Write the frontier chart as HTML, with top-performer and backtest charts beside it
  #[arg(long)]
  chart: Option<PathBuf>,

  /// Directory for exported allocation CSV files
  #[arg(long)]
  export_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  match Cli::parse().command {
    Commands::Analyze(args) => analyze(args),
    Commands::Indices => {
      print_indices();
      Ok(())
    }
  }
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
  let prices = io::read_prices_file(&args.prices)?;
  let weights = match &args.weights {
    Some(path) => io::read_weights_file(path, prices.symbols())?,
    None => Weights::equal(prices.symbols().len())?,
  };
  let market_prices = args
    .market_prices
    .as_ref()
    .map(io::read_market_prices_file)
    .transpose()?;

  let engine = PortfolioEngine::new(PortfolioEngineConfig {
    frontier: FrontierConfig {
      samples: args.samples,
      risk_free: args.risk_free,
      seed: args.seed,
      sampling: args.sampling,
      parallel: args.parallel,
    },
    market: args.market,
    sub_portfolio_fraction: args.sub_portfolio,
    top_performers: args.top,
  });
  let analysis = engine
    .analyze(&prices, &weights, market_prices.as_ref())
    .context("portfolio analysis failed")?;

  print_report(&analysis, args.market, args.ranked);

  if let Some(path) = &args.chart {
    write_charts(&analysis, path)?;
  }
  if let Some(dir) = &args.export_dir {
    export_allocations(&analysis, dir)?;
  }
  Ok(())
}

fn pct(x: f64) -> String {
  format!("{:.2}%", x * 100.0)
}

fn weights_cell(symbols: &[String], weights: &Weights) -> String {
  symbols
    .iter()
    .zip(weights.iter())
    .map(|(s, w)| format!("{s}: {}", pct(*w)))
    .collect::<Vec<_>>()
    .join("\n")
}

fn performance_row(label: &str, perf: &PortfolioPerformance, weights: String) -> Row {
  row![
    label,
    pct(perf.expected_return),
    pct(perf.volatility),
    format!("{:.2}", perf.sharpe),
    weights
  ]
}

fn print_report(analysis: &PortfolioAnalysis, market: MarketIndex, ranked: usize) {
  let symbols = &analysis.symbols;

  println!("Portfolio Performance Metrics (seed {})", analysis.frontier.seed());
  let mut table = Table::new();
  table.set_titles(row!["Portfolio", "Expected Annual Return", "Expected Volatility", "Sharpe Ratio", "Weights"]);
  table.add_row(performance_row(
    "Custom Portfolio",
    &analysis.selected,
    weights_cell(symbols, &analysis.selected_weights),
  ));
  for (label, pick) in [
    ("Optimized Portfolio (max Sharpe)", &analysis.summary.optimized),
    ("Minimum Variance Portfolio", &analysis.summary.min_variance),
  ] {
    table.add_row(performance_row(
      label,
      &pick.sample.performance,
      weights_cell(symbols, &pick.sample.weights),
    ));
  }
  table.printstd();

  if ranked > 0 {
    println!("\nTop {ranked} sampled portfolios by Sharpe ratio");
    let mut table = Table::new();
    table.set_titles(row!["Rank", "Expected Annual Return", "Expected Volatility", "Sharpe Ratio", "Weights"]);
    for (i, sample) in analysis.frontier.ranked_by_sharpe().into_iter().take(ranked).enumerate() {
      table.add_row(performance_row(
        &(i + 1).to_string(),
        &sample.performance,
        weights_cell(symbols, &sample.weights),
      ));
    }
    table.printstd();
  }

  println!("\nTop performers (mean daily return)");
  let mut table = Table::new();
  table.set_titles(row!["Ticker", "Mean Return"]);
  for perf in &analysis.top_performers {
    table.add_row(row![perf.symbol, format!("{:.4}%", perf.mean_return * 100.0)]);
  }
  table.printstd();

  println!("\nCorrelation matrix");
  let mut table = Table::new();
  let mut titles = vec![Cell::new("")];
  titles.extend(symbols.iter().map(|s| Cell::new(s)));
  table.set_titles(Row::new(titles));
  for (i, symbol) in symbols.iter().enumerate() {
    let mut cells = vec![Cell::new(symbol)];
    cells.extend(
      analysis
        .correlation
        .row(i)
        .iter()
        .map(|c| Cell::new(&format!("{c:.2}"))),
    );
    table.add_row(Row::new(cells));
  }
  table.printstd();

  println!("\nOptimized sub-portfolio allocation");
  let mut table = Table::new();
  table.set_titles(row!["Ticker", "Weight (%)"]);
  for alloc in &analysis.sub_portfolio {
    table.add_row(row![alloc.symbol, format!("{:.2}", alloc.percent())]);
  }
  table.printstd();

  if let Some(capm) = &analysis.capm {
    println!("\nAlpha and beta against {market} ({})", market.symbol());
    let mut table = Table::new();
    table.set_titles(row!["Portfolio", "Alpha", "Beta", "Observations"]);
    for (label, fit) in [("Optimized Portfolio", &capm.optimized), ("Custom Portfolio", &capm.selected)] {
      table.add_row(row![
        label,
        format!("{:.4}", fit.alpha),
        format!("{:.4}", fit.beta),
        fit.observations
      ]);
    }
    table.printstd();
  }

  if let Some(backtest) = &analysis.backtest {
    println!(
      "\nHistorical rate of return ({} to {})",
      backtest.dates().first().map(|d| d.to_string()).unwrap_or_default(),
      backtest.dates().last().map(|d| d.to_string()).unwrap_or_default()
    );
    let mut table = Table::new();
    table.set_titles(row!["Series", "Cumulative Return"]);
    for (name, total) in backtest.total_returns() {
      table.add_row(row![name, pct(total)]);
    }
    table.printstd();
  }
}

fn write_charts(analysis: &PortfolioAnalysis, path: &Path) -> Result<()> {
  let stem = path
    .file_stem()
    .and_then(|s| s.to_str())
    .context("chart path has no file name")?;

  frontier_plot(
    &analysis.frontier,
    &analysis.symbols,
    &analysis.selected_weights,
    &analysis.selected,
  )
  .write_html(path);
  info!(path = %path.display(), "wrote frontier chart");

  let top_path = path.with_file_name(format!("{stem}-top-performers.html"));
  top_performers_plot(&analysis.top_performers).write_html(&top_path);
  info!(path = %top_path.display(), "wrote top performers chart");

  if let Some(backtest) = &analysis.backtest {
    let backtest_path = path.with_file_name(format!("{stem}-backtest.html"));
    backtest_plot(backtest).write_html(&backtest_path);
    info!(path = %backtest_path.display(), "wrote backtest chart");
  }
  Ok(())
}

fn export_allocations(analysis: &PortfolioAnalysis, dir: &Path) -> Result<()> {
  fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

  let sub_path = dir.join("sub-portfolio.csv");
  io::write_allocations_file(&sub_path, &analysis.sub_portfolio)?;

  let optimized = analysis
    .summary
    .optimized
    .sample
    .weights
    .allocations(&analysis.symbols)?;
  let optimized_path = dir.join("optimized-portfolio.csv");
  io::write_allocations_file(&optimized_path, &optimized)?;

  info!(dir = %dir.display(), "exported allocations");
  Ok(())
}

fn print_indices() {
  let mut table = Table::new();
  table.set_titles(row!["Name", "Symbol", "Argument"]);
  for index in MarketIndex::ALL {
    table.add_row(row![index, index.symbol(), format!("{index:?}").to_lowercase()]);
  }
  table.printstd();
}
