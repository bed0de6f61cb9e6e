//! Financial-ratio and company-profile tables.
//!
//! Both are a fixed, named list of metric keys pulled from the provider's
//! attribute bag, with `Absent` substituted for anything the bag lacks. The
//! result is an ordinary two-column table that enters the pipeline as
//! already-tabular — no special casing downstream.

use serde_json::Value;

use crate::normalize::scalar_cell;
use crate::table::{Cell, Table};

/// Display name → attribute-bag key for the ratio section.
const RATIO_KEYS: &[(&str, &str)] = &[
    ("Previous Close", "previousClose"),
    ("Open", "open"),
    ("Market Cap", "marketCap"),
    ("Trailing P/E", "trailingPE"),
    ("Forward P/E", "forwardPE"),
    ("PEG Ratio", "pegRatio"),
    ("Price to Book", "priceToBook"),
    ("Beta", "beta"),
    ("Dividend Yield", "dividendYield"),
    ("Return on Assets", "returnOnAssets"),
    ("Return on Equity", "returnOnEquity"),
    ("Profit Margins", "profitMargins"),
    ("Operating Margins", "operatingMargins"),
    ("Revenue Growth", "revenueGrowth"),
    ("Earnings Growth", "earningsGrowth"),
    ("Debt to Equity", "debtToEquity"),
];

/// Display name → attribute-bag key for the company profile section.
const PROFILE_KEYS: &[(&str, &str)] = &[
    ("Name", "longName"),
    ("Sector", "sector"),
    ("Industry", "industry"),
    ("Website", "website"),
    ("Country", "country"),
    ("Employees", "fullTimeEmployees"),
    ("Summary", "longBusinessSummary"),
];

fn bag_cell(bag: &Value, key: &str) -> Cell {
    bag.get(key)
        .and_then(scalar_cell)
        .unwrap_or(Cell::Absent)
}

fn pick(bag: &Value, keys: &[(&str, &str)], index_name: &str) -> Table {
    let pairs = keys
        .iter()
        .map(|(label, key)| ((*label).to_string(), bag_cell(bag, key)))
        .collect();
    Table::from_pairs(index_name, "Value", pairs)
}

/// The financial-ratio table: always one row per named metric, in order,
/// absent where the bag has no value.
pub fn ratio_table(bag: &Value) -> Table {
    pick(bag, RATIO_KEYS, "Ratio")
}

/// The company-profile table.
pub fn profile_table(bag: &Value) -> Table {
    pick(bag, PROFILE_KEYS, "Field")
}
