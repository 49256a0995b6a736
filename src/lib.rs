//! # frontier-rs
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}\in\Delta} \frac{252\,\mathbf{w}^\top\mu-r_f}{\sqrt{252\,\mathbf{w}^\top \Sigma \mathbf{w}}}
//! $$
//!
//! Portfolio statistics kernel: return series, Monte-Carlo efficient frontier,
//! maximum-Sharpe / minimum-variance selection and CAPM alpha/beta, plus the
//! CSV boundary and charts used by the `frontier` command-line tool.

pub mod error;
pub mod io;
pub mod market;
pub mod portfolio;
pub mod visualization;

pub use error::FrontierError;
pub use error::Result;
pub use market::MarketIndex;
