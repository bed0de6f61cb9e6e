//! Normalize-and-classify pipeline.
//!
//! A provider hands back a different shape per section: a full table for
//! price history, a bare series for dividends, a JSON attribute bag for ESG
//! scores, or nothing at all. `normalize` folds every shape into a uniform
//! `Outcome` so the rendering layer has exactly one code path.
//!
//! Rules, first match wins:
//! 1. absent value → `Missing`, no conversion attempted
//! 2. one-dimensional series → single-column table, index preserved
//! 3. anything not yet tabular → coerce to a `(key, value)` table; a coercion
//!    failure is caught and downgraded to `Unconvertible`, never propagated
//! 4. already tabular → used as-is
//!
//! A normalized table with zero rows classifies as `Empty`.

use serde_json::Value;

use crate::table::{Cell, Table};

/// The raw value a data provider returns for a named section.
#[derive(Debug, Clone)]
pub enum SectionValue {
    /// The provider had nothing for this section.
    Absent,
    /// A single named column of values with an index (dividends, splits).
    Series {
        name: String,
        index: Vec<String>,
        values: Vec<Cell>,
    },
    /// Explicit name/value pairs (ratios, company profile).
    Pairs(Vec<(String, Cell)>),
    /// Uninterpreted JSON straight off the wire.
    Raw(Value),
    /// Already tabular.
    Table(Table),
}

/// Classification of a section value before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A non-empty table, ready to render and export.
    Present(Table),
    /// Well-formed but zero rows.
    Empty,
    /// The provider returned no value.
    Missing,
    /// The value could not be coerced to tabular form.
    Unconvertible(String),
    /// Retrieval failed; the message is user-visible.
    Error(String),
}

impl Outcome {
    pub fn is_present(&self) -> bool {
        matches!(self, Outcome::Present(_))
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Outcome::Present(t) => Some(t),
            _ => None,
        }
    }

    /// The single warning/error line shown instead of a table, naming the
    /// section. `None` for `Present`.
    pub fn message(&self, label: &str) -> Option<String> {
        match self {
            Outcome::Present(_) => None,
            Outcome::Empty => Some(format!("No data available for {label}.")),
            Outcome::Missing => Some(format!("{label} is not available for this symbol.")),
            Outcome::Unconvertible(reason) => {
                Some(format!("Could not display {label}: {reason}"))
            }
            Outcome::Error(msg) => Some(format!("Error fetching {label}: {msg}")),
        }
    }
}

/// Classify one section value. Total: never panics, never returns an error —
/// the only fallible step (coercion) is caught and becomes `Unconvertible`.
pub fn normalize(value: SectionValue, label: &str) -> Outcome {
    let table = match value {
        SectionValue::Absent => return Outcome::Missing,
        SectionValue::Series {
            name,
            index,
            values,
        } => match Table::from_series("Date", name, index, values) {
            Ok(t) => t,
            Err(e) => return Outcome::Unconvertible(format!("{label}: {e}")),
        },
        SectionValue::Pairs(pairs) => Table::from_pairs("Key", "Value", pairs),
        SectionValue::Raw(Value::Null) => return Outcome::Missing,
        SectionValue::Raw(json) => match tabulate_json(&json) {
            Ok(t) => t,
            Err(reason) => return Outcome::Unconvertible(format!("{label}: {reason}")),
        },
        SectionValue::Table(t) => t,
    };

    if table.is_empty() {
        Outcome::Empty
    } else {
        Outcome::Present(table)
    }
}

/// Coerce a scalar JSON value to a cell. `None` if the value is structured.
///
/// Yahoo wraps most numerics as `{"raw": n, "fmt": "..."}`; the raw number
/// wins, the formatted string is the fallback.
pub(crate) fn scalar_cell(value: &Value) -> Option<Cell> {
    match value {
        Value::Null => Some(Cell::Absent),
        Value::Number(n) => n.as_f64().map(Cell::Number),
        Value::String(s) => Some(Cell::Text(s.clone())),
        Value::Bool(b) => Some(Cell::Text(b.to_string())),
        Value::Object(map) => {
            if let Some(raw) = map.get("raw") {
                return scalar_cell(raw);
            }
            if let Some(Value::String(fmt)) = map.get("fmt") {
                return Some(Cell::Text(fmt.clone()));
            }
            // An empty object is how Yahoo spells "no value" in some modules.
            if map.is_empty() {
                return Some(Cell::Absent);
            }
            None
        }
        Value::Array(_) => None,
    }
}

/// Attempt to coerce arbitrary JSON into a table.
pub(crate) fn tabulate_json(json: &Value) -> Result<Table, String> {
    match json {
        Value::Object(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (key, value) in map {
                let cell = scalar_cell(value)
                    .ok_or_else(|| format!("nested value under key '{key}'"))?;
                pairs.push((key.clone(), cell));
            }
            Ok(Table::from_pairs("Key", "Value", pairs))
        }
        Value::Array(items) => tabulate_array(items),
        Value::Null => Ok(Table::empty("Key", vec!["Value".into()])),
        other => Err(format!("scalar value is not tabular: {other}")),
    }
}

fn tabulate_array(items: &[Value]) -> Result<Table, String> {
    if items.is_empty() {
        return Ok(Table::empty("Key", vec!["Value".into()]));
    }

    // Array of objects: union of keys becomes the column set.
    if items.iter().all(|v| v.is_object()) {
        let mut columns: Vec<String> = Vec::new();
        for item in items {
            for key in item.as_object().unwrap().keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let mut index = Vec::with_capacity(items.len());
        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let obj = item.as_object().unwrap();
            let mut row = Vec::with_capacity(columns.len());
            for col in &columns {
                let cell = match obj.get(col) {
                    None => Cell::Absent,
                    Some(v) => scalar_cell(v)
                        .ok_or_else(|| format!("nested value under key '{col}' in row {i}"))?,
                };
                row.push(cell);
            }
            index.push(i.to_string());
            rows.push(row);
        }
        return Table::from_rows("Row", columns, index, rows).map_err(|e| e.to_string());
    }

    // Array of scalars: position/value pairs.
    if let Some(pairs) = items
        .iter()
        .enumerate()
        .map(|(i, v)| scalar_cell(v).map(|c| (i.to_string(), c)))
        .collect::<Option<Vec<_>>>()
    {
        return Ok(Table::from_pairs("Key", "Value", pairs));
    }

    Err("mixed or nested array shape".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_classifies_missing_without_conversion() {
        assert_eq!(normalize(SectionValue::Absent, "Dividends"), Outcome::Missing);
        assert_eq!(
            normalize(SectionValue::Raw(Value::Null), "Dividends"),
            Outcome::Missing
        );
    }

    #[test]
    fn series_wraps_into_single_column_table() {
        let outcome = normalize(
            SectionValue::Series {
                name: "Dividends".into(),
                index: vec!["2024-02-15".into(), "2024-05-15".into()],
                values: vec![Cell::Number(0.5), Cell::Number(0.55)],
            },
            "Dividends",
        );
        let table = outcome.table().expect("present");
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.index()[0], "2024-02-15");
    }

    #[test]
    fn pairs_become_two_column_table() {
        let outcome = normalize(
            SectionValue::Pairs(vec![
                ("Market Cap".into(), Cell::Number(1.0e12)),
                ("Beta".into(), Cell::Absent),
            ]),
            "Financial Ratios",
        );
        let table = outcome.table().expect("present");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns(), &["Value"]);
    }

    #[test]
    fn raw_object_coerces_to_pairs() {
        let json = json!({
            "totalEsg": {"raw": 21.5, "fmt": "21.5"},
            "esgPerformance": "AVG_PERF",
            "peerCount": 42,
        });
        let outcome = normalize(SectionValue::Raw(json), "Sustainability");
        let table = outcome.table().expect("present");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn raw_array_of_objects_coerces_to_table() {
        let json = json!([
            {"period": "0m", "strongBuy": 10, "buy": 20},
            {"period": "-1m", "strongBuy": 12, "buy": 18},
        ]);
        let outcome = normalize(SectionValue::Raw(json), "Recommendations");
        let table = outcome.table().expect("present");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.columns(), &["period", "strongBuy", "buy"]);
    }

    #[test]
    fn raw_array_of_scalars_coerces_to_key_value() {
        let json = json!(["2025-01-17", "2025-02-21"]);
        let outcome = normalize(SectionValue::Raw(json), "Expiries");
        let table = outcome.table().expect("present");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.index(), &["0", "1"]);
    }

    #[test]
    fn unconvertible_is_caught_and_names_the_section() {
        let json = json!({"earnings": {"chart": [1, 2]}});
        let outcome = normalize(SectionValue::Raw(json), "Earnings");
        match outcome {
            Outcome::Unconvertible(reason) => assert!(reason.contains("Earnings")),
            other => panic!("expected Unconvertible, got {other:?}"),
        }
    }

    #[test]
    fn scalar_json_is_unconvertible() {
        let outcome = normalize(SectionValue::Raw(json!(3.14)), "Oddball");
        assert!(matches!(outcome, Outcome::Unconvertible(_)));
    }

    #[test]
    fn zero_row_table_classifies_empty() {
        let outcome = normalize(
            SectionValue::Table(Table::empty("Date", vec!["Close".into()])),
            "Historical Data",
        );
        assert_eq!(outcome, Outcome::Empty);
        let outcome = normalize(SectionValue::Raw(json!([])), "Holders");
        assert_eq!(outcome, Outcome::Empty);
    }

    #[test]
    fn present_preserves_row_and_column_counts() {
        let table = Table::from_rows(
            "Date",
            vec!["Open".into(), "Close".into()],
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![Cell::Number(1.0), Cell::Number(2.0)],
                vec![Cell::Number(3.0), Cell::Number(4.0)],
                vec![Cell::Absent, Cell::Number(6.0)],
            ],
        )
        .unwrap();
        let outcome = normalize(SectionValue::Table(table.clone()), "Historical Data");
        let rendered = outcome.table().expect("present");
        assert_eq!(rendered.row_count(), table.row_count());
        assert_eq!(rendered.column_count(), table.column_count());
    }

    #[test]
    fn normalization_is_idempotent() {
        let value = SectionValue::Raw(json!([
            {"holder": "Vanguard", "pctHeld": {"raw": 0.08}},
            {"holder": "BlackRock", "pctHeld": {"raw": 0.07}},
        ]));
        let first = normalize(value.clone(), "Institutional Holders");
        let second = normalize(value, "Institutional Holders");
        assert_eq!(first, second);
    }

    #[test]
    fn messages_name_the_section() {
        assert_eq!(
            Outcome::Empty.message("Sustainability").unwrap(),
            "No data available for Sustainability."
        );
        assert!(Outcome::Missing
            .message("Calendar Events")
            .unwrap()
            .contains("Calendar Events"));
        assert!(Outcome::Present(Table::from_pairs(
            "Key",
            "Value",
            vec![("a".into(), Cell::Number(1.0))]
        ))
        .message("X")
        .is_none());
    }
}
