//! Yahoo Finance data provider.
//!
//! Three upstream surfaces back the dashboard:
//! - v8 chart API — daily OHLCV history plus dividend/split events
//! - v10 quoteSummary API — the attribute bag and every named module
//!   (fundamentals, holders, ESG, recommendations, calendar)
//! - v7 options API — expiry list and per-expiry call/put chains
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; unexpected shapes surface as `ResponseFormatChanged` rather
//! than panics. There is deliberately no retry/backoff layer and no
//! persistent cache — every call hits the wire.
//!
//! Exchange-suffixed symbols (`RELIANCE.NS`, `TCS.BO`) pass through
//! untouched; Yahoo resolves the suffix itself.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::provider::{DataError, DataProvider};
use crate::normalize::{tabulate_json, SectionValue};
use crate::section::Section;
use crate::table::{Cell, Table};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

/// Yahoo omits the arrays entirely for a window with no trading data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    dividends: Option<std::collections::BTreeMap<String, DividendEvent>>,
    splits: Option<std::collections::BTreeMap<String, SplitEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    #[serde(rename = "splitRatio")]
    split_ratio: String,
}

/// quoteSummary modules backing the attribute bag. Merged in order; the
/// first module to define a key wins.
const BAG_MODULES: &str = "summaryDetail,defaultKeyStatistics,financialData,assetProfile,price";

/// financialData keys shown in the analyst price target section.
const PRICE_TARGET_KEYS: &[&str] = &[
    "currentPrice",
    "targetHighPrice",
    "targetLowPrice",
    "targetMeanPrice",
    "targetMedianPrice",
    "numberOfAnalystOpinions",
    "recommendationKey",
    "recommendationMean",
];

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Chart API URL for a symbol and date range, optionally with
    /// dividend/split events.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate, events: bool) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        let events = if events { "&events=div%2Csplit" } else { "" };
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true{events}"
        )
    }

    fn quote_summary_url(symbol: &str, modules: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{symbol}\
             ?modules={modules}"
        )
    }

    fn options_url(symbol: &str, expiry_ts: Option<i64>) -> String {
        match expiry_ts {
            Some(ts) => {
                format!("https://query2.finance.yahoo.com/v7/finance/options/{symbol}?date={ts}")
            }
            None => format!("https://query2.finance.yahoo.com/v7/finance/options/{symbol}"),
        }
    }

    /// Execute one GET and classify HTTP-level failures.
    fn get_json(&self, symbol: &str, url: &str) -> Result<Value, DataError> {
        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DataError::NetworkUnreachable(e.to_string())
            } else {
                DataError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }

        resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })
    }

    fn fetch_chart(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        events: bool,
    ) -> Result<ChartData, DataError> {
        let url = Self::chart_url(symbol, start, end, events);
        let json = self.get_json(symbol, &url)?;
        let resp: ChartResponse = serde_json::from_value(json).map_err(|e| {
            DataError::ResponseFormatChanged(format!("chart response for {symbol}: {e}"))
        })?;
        chart_data(symbol, resp)
    }

    /// Fetch one quoteSummary module. `Ok(None)` when the module exists but
    /// carries no data for this symbol.
    fn fetch_module(&self, symbol: &str, module: &str) -> Result<Option<Value>, DataError> {
        let url = Self::quote_summary_url(symbol, module);
        let json = self.get_json(symbol, &url)?;
        let mut result = quote_summary_result(symbol, json)?;
        Ok(match result.get_mut(module) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.take()),
        })
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwrap `chart.result[0]`, mapping Yahoo's error envelope onto DataError.
fn chart_data(symbol: &str, resp: ChartResponse) -> Result<ChartData, DataError> {
    let result = resp.chart.result.ok_or_else(|| {
        if let Some(err) = resp.chart.error {
            if err.code == "Not Found" {
                DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
        } else {
            DataError::ResponseFormatChanged("empty result with no error".into())
        }
    })?;

    result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))
}

/// Turn chart data into the history table: Date index, OHLCV + Adj Close
/// columns. Rows where every field is null (holidays) are dropped. A valid
/// symbol over a non-trading window (weekend-only range, start past end)
/// yields an empty table, not an error — the pipeline classifies it as a
/// warning and the remaining sections still render. Unknown symbols never
/// reach here; the chart error envelope rejects them first.
fn history_table(data: ChartData) -> Result<Table, DataError> {
    let columns: Vec<String> = ["Open", "High", "Low", "Close", "Adj Close", "Volume"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let Some(timestamps) = data.timestamp else {
        return Ok(Table::empty("Date", columns));
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut index = Vec::with_capacity(timestamps.len());
    let mut rows = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = ts_to_date(ts)?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();
        let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none()
        {
            continue;
        }

        index.push(date.format("%Y-%m-%d").to_string());
        rows.push(vec![
            Cell::from(open),
            Cell::from(high),
            Cell::from(low),
            Cell::from(close),
            Cell::from(adj_close),
            volume.map(|v| Cell::Number(v as f64)).unwrap_or(Cell::Absent),
        ]);
    }

    Table::from_rows("Date", columns, index, rows)
        .map_err(|e| DataError::ResponseFormatChanged(e.to_string()))
}

/// Dividend events as a bare series — the pipeline wraps it (step 2).
fn dividend_series(data: ChartData) -> SectionValue {
    let Some(dividends) = data.events.and_then(|e| e.dividends) else {
        return SectionValue::Absent;
    };
    let mut events: Vec<DividendEvent> = dividends.into_values().collect();
    events.sort_by_key(|e| e.date);

    let mut index = Vec::with_capacity(events.len());
    let mut values = Vec::with_capacity(events.len());
    for ev in events {
        let Ok(date) = ts_to_date(ev.date) else { continue };
        index.push(date.format("%Y-%m-%d").to_string());
        values.push(Cell::Number(ev.amount));
    }
    SectionValue::Series {
        name: "Dividends".into(),
        index,
        values,
    }
}

fn split_series(data: ChartData) -> SectionValue {
    let Some(splits) = data.events.and_then(|e| e.splits) else {
        return SectionValue::Absent;
    };
    let mut events: Vec<SplitEvent> = splits.into_values().collect();
    events.sort_by_key(|e| e.date);

    let mut index = Vec::with_capacity(events.len());
    let mut values = Vec::with_capacity(events.len());
    for ev in events {
        let Ok(date) = ts_to_date(ev.date) else { continue };
        index.push(date.format("%Y-%m-%d").to_string());
        values.push(Cell::Text(ev.split_ratio));
    }
    SectionValue::Series {
        name: "Stock Splits".into(),
        index,
        values,
    }
}

fn ts_to_date(ts: i64) -> Result<NaiveDate, DataError> {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.naive_utc().date())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
}

/// Unwrap `quoteSummary.result[0]`, mapping the error envelope.
fn quote_summary_result(symbol: &str, json: Value) -> Result<Value, DataError> {
    let summary = json
        .get("quoteSummary")
        .ok_or_else(|| DataError::ResponseFormatChanged("no quoteSummary envelope".into()))?;

    if let Some(err) = summary.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_str).unwrap_or("");
        let desc = err.get("description").and_then(Value::as_str).unwrap_or("");
        if code == "Not Found" {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        return Err(DataError::ResponseFormatChanged(format!("{code}: {desc}")));
    }

    summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .cloned()
        .ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })
}

/// Dig a nested field out of a module value; missing/null becomes `Absent`.
fn nested(value: Option<Value>, path: &[&str]) -> SectionValue {
    let mut current = match value {
        Some(v) => v,
        None => return SectionValue::Absent,
    };
    for key in path {
        current = match current.get_mut(*key) {
            None | Some(Value::Null) => return SectionValue::Absent,
            Some(v) => v.take(),
        };
    }
    SectionValue::Raw(current)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Table, DataError> {
        let data = self.fetch_chart(symbol, start, end, false)?;
        history_table(data)
    }

    fn section_value(&self, symbol: &str, section: Section) -> Result<SectionValue, DataError> {
        // Event sections ride on the chart API over a wide fixed window;
        // everything else is one quoteSummary module.
        match section {
            Section::Dividends | Section::Splits => {
                let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
                let end = chrono::Local::now().date_naive();
                let data = self.fetch_chart(symbol, start, end, true)?;
                Ok(match section {
                    Section::Dividends => dividend_series(data),
                    _ => split_series(data),
                })
            }
            Section::Recommendations => Ok(nested(
                self.fetch_module(symbol, "recommendationTrend")?,
                &["trend"],
            )),
            Section::Sustainability => {
                Ok(nested(self.fetch_module(symbol, "esgScores")?, &[]))
            }
            Section::InstitutionalHolders => Ok(nested(
                self.fetch_module(symbol, "institutionOwnership")?,
                &["ownershipList"],
            )),
            Section::MutualFundHolders => Ok(nested(
                self.fetch_module(symbol, "fundOwnership")?,
                &["ownershipList"],
            )),
            Section::MajorHolders => Ok(nested(
                self.fetch_module(symbol, "majorHoldersBreakdown")?,
                &[],
            )),
            Section::Earnings => Ok(nested(
                self.fetch_module(symbol, "earnings")?,
                &["financialsChart", "yearly"],
            )),
            Section::QuarterlyEarnings => Ok(nested(
                self.fetch_module(symbol, "earnings")?,
                &["financialsChart", "quarterly"],
            )),
            Section::IncomeStatement => Ok(nested(
                self.fetch_module(symbol, "incomeStatementHistory")?,
                &["incomeStatementHistory"],
            )),
            Section::QuarterlyIncomeStatement => Ok(nested(
                self.fetch_module(symbol, "incomeStatementHistoryQuarterly")?,
                &["incomeStatementHistory"],
            )),
            Section::BalanceSheet => Ok(nested(
                self.fetch_module(symbol, "balanceSheetHistory")?,
                &["balanceSheetStatements"],
            )),
            Section::QuarterlyBalanceSheet => Ok(nested(
                self.fetch_module(symbol, "balanceSheetHistoryQuarterly")?,
                &["balanceSheetStatements"],
            )),
            Section::CashFlow => Ok(nested(
                self.fetch_module(symbol, "cashflowStatementHistory")?,
                &["cashflowStatements"],
            )),
            Section::QuarterlyCashFlow => Ok(nested(
                self.fetch_module(symbol, "cashflowStatementHistoryQuarterly")?,
                &["cashflowStatements"],
            )),
            Section::AnalystPriceTargets => {
                let Some(module) = self.fetch_module(symbol, "financialData")? else {
                    return Ok(SectionValue::Absent);
                };
                let mut picked = serde_json::Map::new();
                for key in PRICE_TARGET_KEYS {
                    if let Some(v) = module.get(*key) {
                        picked.insert((*key).to_string(), v.clone());
                    }
                }
                if picked.is_empty() {
                    return Ok(SectionValue::Absent);
                }
                Ok(SectionValue::Raw(Value::Object(picked)))
            }
            Section::CalendarEvents => {
                Ok(nested(self.fetch_module(symbol, "calendarEvents")?, &[]))
            }
            Section::HistoricalData
            | Section::FinancialRatios
            | Section::CompanyProfile
            | Section::OptionChain => Err(DataError::SectionUnavailable {
                section: section.label().to_string(),
                reason: "served by a dedicated accessor".into(),
            }),
        }
    }

    fn attribute_bag(&self, symbol: &str) -> Result<Value, DataError> {
        let url = Self::quote_summary_url(symbol, BAG_MODULES);
        let json = self.get_json(symbol, &url)?;
        let result = quote_summary_result(symbol, json)?;

        // Flatten the modules into one bag; first definition of a key wins.
        let mut bag = serde_json::Map::new();
        if let Value::Object(modules) = result {
            for (_, module) in modules {
                if let Value::Object(fields) = module {
                    for (key, value) in fields {
                        bag.entry(key).or_insert(value);
                    }
                }
            }
        }
        Ok(Value::Object(bag))
    }

    fn option_expiries(&self, symbol: &str) -> Result<Vec<String>, DataError> {
        let url = Self::options_url(symbol, None);
        let json = self.get_json(symbol, &url)?;
        let result = option_result(symbol, &json)?;

        let Some(dates) = result.get("expirationDates").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        let mut expiries = Vec::with_capacity(dates.len());
        for ts in dates {
            let Some(ts) = ts.as_i64() else { continue };
            expiries.push(ts_to_date(ts)?.format("%Y-%m-%d").to_string());
        }
        Ok(expiries)
    }

    fn option_chain(&self, symbol: &str, expiry: &str) -> Result<(Table, Table), DataError> {
        let date = NaiveDate::parse_from_str(expiry, "%Y-%m-%d")
            .map_err(|e| DataError::Other(format!("bad expiry '{expiry}': {e}")))?;
        let ts = date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();

        let url = Self::options_url(symbol, Some(ts));
        let json = self.get_json(symbol, &url)?;
        let result = option_result(symbol, &json)?;

        let chain = result
            .get("options")
            .and_then(Value::as_array)
            .and_then(|arr| arr.first())
            .ok_or_else(|| DataError::SectionUnavailable {
                section: Section::OptionChain.label().to_string(),
                reason: format!("no chain listed for {expiry}"),
            })?;

        let calls = chain_side(chain, "calls")?;
        let puts = chain_side(chain, "puts")?;
        Ok((calls, puts))
    }
}

fn option_result<'a>(symbol: &str, json: &'a Value) -> Result<&'a Value, DataError> {
    json.get("optionChain")
        .and_then(|c| c.get("result"))
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })
}

fn chain_side(chain: &Value, side: &str) -> Result<Table, DataError> {
    let contracts = chain
        .get(side)
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    tabulate_json(&contracts).map_err(DataError::ResponseFormatChanged)
}
