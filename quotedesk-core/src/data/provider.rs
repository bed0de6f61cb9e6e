//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the market-data source so the
//! fetch pass can run against Yahoo Finance in the apps and against a mock
//! in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::SectionValue;
use crate::section::Section;
use crate::table::Table;

/// Parameters of one fetch-and-render cycle. No identity beyond the cycle;
/// `start <= end` is not enforced here — the provider surfaces violations
/// as an empty result or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Request {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }
}

/// Structured error types for data operations.
///
/// Designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("section '{section}' unavailable: {reason}")]
    SectionUnavailable { section: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market-data sources (Yahoo Finance, mocks).
///
/// One method per distinct upstream surface: price history, named tabular
/// sections, the scalar attribute bag, and the options chain. All calls are
/// blocking; there is deliberately no retry or backoff layer.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Daily price history for a symbol over a date range.
    fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Table, DataError>;

    /// The raw value for one named section (dividends, holders, statements...).
    /// `HistoricalData`, `FinancialRatios`, `CompanyProfile`, and
    /// `OptionChain` are served by the dedicated methods instead.
    fn section_value(&self, symbol: &str, section: Section)
        -> Result<SectionValue, DataError>;

    /// Scalar attribute bag keyed by metric name (`trailingPE`, `marketCap`...).
    fn attribute_bag(&self, symbol: &str) -> Result<serde_json::Value, DataError>;

    /// Option expiry dates listed for a symbol. Empty if none are listed.
    fn option_expiries(&self, symbol: &str) -> Result<Vec<String>, DataError>;

    /// The (calls, puts) table pair for one expiry date string.
    fn option_chain(&self, symbol: &str, expiry: &str) -> Result<(Table, Table), DataError>;
}
