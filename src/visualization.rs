//! # Visualization
//!
//! $$
//! \{(\sigma^{(k)}, \mu^{(k)})\}_{k=1}^N \mapsto \text{frontier scatter},\qquad
//! \{C_t\} \mapsto \text{cumulative return lines}
//! $$
//!
//! Plotly charts of the frontier, backtest and top performers.

use plotly::Bar;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::ColorBar;
use plotly::common::ColorScale;
use plotly::common::ColorScaleElement;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::layout::Margin;

use crate::portfolio::BacktestComparison;
use crate::portfolio::Frontier;
use crate::portfolio::InstrumentReturn;
use crate::portfolio::PortfolioPerformance;
use crate::portfolio::Weights;

fn weights_text(symbols: &[String], weights: &Weights) -> String {
  symbols
    .iter()
    .zip(weights.iter())
    .map(|(s, w)| format!("{s}: {:.2}%", w * 100.0))
    .collect::<Vec<_>>()
    .join("<br>")
}

fn performance_text(perf: &PortfolioPerformance) -> String {
  format!(
    "Return: {:.2}%<br>Volatility: {:.2}%<br>Sharpe Ratio: {:.2}",
    perf.expected_return * 100.0,
    perf.volatility * 100.0,
    perf.sharpe
  )
}

/// Scatter of sampled portfolios, coloured by Sharpe ratio, with the user's
/// portfolio drawn as a star.
pub fn frontier_plot(
  frontier: &Frontier,
  symbols: &[String],
  selected_weights: &Weights,
  selected: &PortfolioPerformance,
) -> Plot {
  let samples = frontier.samples();
  let hover: Vec<String> = samples
    .iter()
    .map(|s| {
      format!(
        "Portfolio Weights:<br>{}<br>{}",
        weights_text(symbols, &s.weights),
        performance_text(&s.performance)
      )
    })
    .collect();

  let cloud = Scatter::new(
    samples.iter().map(|s| s.volatility()).collect(),
    samples.iter().map(|s| s.expected_return()).collect(),
  )
  .mode(Mode::Markers)
  .marker(
    Marker::new()
      .size(5)
      .color_array(samples.iter().map(|s| s.sharpe()).collect::<Vec<f64>>())
      .show_scale(true)
      .color_bar(ColorBar::new().title("Sharpe Ratio")),
  )
  .name("Efficient Frontier")
  .hover_text_array(hover)
  .hover_template("%{hovertext}<extra></extra>");

  let custom = Scatter::new(vec![selected.volatility], vec![selected.expected_return])
    .mode(Mode::Markers)
    .marker(Marker::new().size(12).color("red").symbol(MarkerSymbol::Star))
    .name("Custom Portfolio")
    .hover_text_array(vec![format!(
      "Custom Portfolio:<br>{}<br>{}",
      weights_text(symbols, selected_weights),
      performance_text(selected)
    )])
    .hover_template("%{hovertext}<extra></extra>");

  let mut plot = Plot::new();
  plot.add_trace(cloud);
  plot.add_trace(custom);
  plot.set_layout(
    Layout::new()
      .title("Efficient Frontier with Custom Portfolio")
      .x_axis(Axis::new().title("Volatility (Std Dev)"))
      .y_axis(Axis::new().title("Return"))
      .show_legend(true)
      .margin(Margin::new().left(64).right(24).top(64).bottom(48)),
  );
  plot
}

/// Cumulative return (in percent) of every series in a backtest comparison.
pub fn backtest_plot(comparison: &BacktestComparison) -> Plot {
  let dates: Vec<String> = comparison.dates().iter().map(|d| d.to_string()).collect();

  let mut plot = Plot::new();
  for (name, path) in comparison.cumulative() {
    let trace = Scatter::new(dates.clone(), path.iter().map(|c| c * 100.0).collect())
      .mode(Mode::Lines)
      .line(Line::new().width(1.6))
      .name(name.as_str());
    plot.add_trace(trace);
  }
  plot.set_layout(
    Layout::new()
      .title("Historical Rate of Return (Cumulative Percentage)")
      .x_axis(Axis::new().title("Date"))
      .y_axis(Axis::new().title("Cumulative Return (%)"))
      .show_legend(true),
  );
  plot
}

/// Bar chart of the best instruments by mean return on a gold scale.
pub fn top_performers_plot(top: &[InstrumentReturn]) -> Plot {
  let gold = ColorScale::Vector(vec![
    ColorScaleElement(0.0, "rgb(204, 153, 0)".to_string()),
    ColorScaleElement(1.0, "rgb(255, 215, 0)".to_string()),
  ]);
  let bars = Bar::new(
    top.iter().map(|p| p.symbol.clone()).collect(),
    top.iter().map(|p| p.mean_return).collect(),
  )
  .name("Top Performers")
  .marker(
    Marker::new()
      .color_array(top.iter().map(|p| p.mean_return).collect::<Vec<f64>>())
      .color_scale(gold)
      .show_scale(true),
  );

  let mut plot = Plot::new();
  plot.add_trace(bars);
  plot.set_layout(
    Layout::new()
      .title(format!("Top {} Performers by Mean Return", top.len()))
      .x_axis(Axis::new().title("Ticker"))
      .y_axis(Axis::new().title("Expected Return")),
  );
  plot
}
