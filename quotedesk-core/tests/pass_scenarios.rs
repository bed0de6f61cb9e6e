//! End-to-end fetch-and-render pass scenarios against a mock provider.

use chrono::NaiveDate;
use serde_json::json;
use std::collections::BTreeMap;

use quotedesk_core::{
    export_filename, run_pass, Cell, DataError, DataProvider, Outcome, PassError, PassSink,
    Request, Section, SectionValue, Table,
};

/// Scripted provider: serves a fixed history table and per-section values.
struct MockProvider {
    known_symbol: String,
    history: Table,
    sections: BTreeMap<Section, SectionValue>,
    expiries: Vec<String>,
}

impl MockProvider {
    fn reliance() -> Self {
        Self {
            known_symbol: "RELIANCE.NS".into(),
            history: daily_history(140),
            sections: BTreeMap::new(),
            expiries: vec!["2024-08-29".into(), "2024-09-26".into()],
        }
    }
}

fn daily_history(rows: usize) -> Table {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut index = Vec::new();
    let mut data = Vec::new();
    for i in 0..rows {
        let date = start + chrono::Duration::days(i as i64);
        index.push(date.format("%Y-%m-%d").to_string());
        let base = 2800.0 + i as f64;
        data.push(vec![
            Cell::Number(base),
            Cell::Number(base + 10.0),
            Cell::Number(base - 10.0),
            Cell::Number(base + 5.0),
            Cell::Number(1_000_000.0),
        ]);
    }
    Table::from_rows(
        "Date",
        ["Open", "High", "Low", "Close", "Volume"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        index,
        data,
    )
    .unwrap()
}

impl DataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn history(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Table, DataError> {
        if symbol != self.known_symbol {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(self.history.clone())
    }

    fn section_value(&self, _symbol: &str, section: Section) -> Result<SectionValue, DataError> {
        Ok(self
            .sections
            .get(&section)
            .cloned()
            .unwrap_or(SectionValue::Absent))
    }

    fn attribute_bag(&self, _symbol: &str) -> Result<serde_json::Value, DataError> {
        Ok(json!({
            "previousClose": 2845.5,
            "marketCap": {"raw": 1.92e12, "fmt": "1.92T"},
            "trailingPE": 27.4,
            "longName": "Reliance Industries Limited",
            "sector": "Energy",
        }))
    }

    fn option_expiries(&self, _symbol: &str) -> Result<Vec<String>, DataError> {
        Ok(self.expiries.clone())
    }

    fn option_chain(&self, _symbol: &str, _expiry: &str) -> Result<(Table, Table), DataError> {
        let calls = Table::from_pairs(
            "Contract",
            "Last Price",
            vec![("C2900".into(), Cell::Number(12.5))],
        );
        let puts = Table::from_pairs(
            "Contract",
            "Last Price",
            vec![("P2700".into(), Cell::Number(8.0))],
        );
        Ok((calls, puts))
    }
}

/// Sink that records everything the pass reports.
#[derive(Default)]
struct RecordingSink {
    sections: Vec<(Section, Outcome)>,
    expiries: Option<Vec<String>>,
    chains: Vec<(String, Outcome, Outcome)>,
}

impl PassSink for RecordingSink {
    fn on_section(&mut self, section: Section, outcome: Outcome) {
        self.sections.push((section, outcome));
    }

    fn on_option_expiries(&mut self, expiries: &[String]) {
        self.expiries = Some(expiries.to_vec());
    }

    fn on_option_chain(&mut self, expiry: &str, calls: Outcome, puts: Outcome) {
        self.chains.push((expiry.to_string(), calls, puts));
    }
}

impl RecordingSink {
    fn outcome(&self, section: Section) -> &Outcome {
        &self
            .sections
            .iter()
            .find(|(s, _)| *s == section)
            .unwrap_or_else(|| panic!("no outcome recorded for {section:?}"))
            .1
    }
}

fn reliance_request() -> Request {
    Request::new(
        "RELIANCE.NS",
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
    )
}

#[test]
fn full_pass_renders_140_row_history_with_export_filename() {
    let provider = MockProvider::reliance();
    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    let history = sink.outcome(Section::HistoricalData);
    let table = history.table().expect("history should be Present");
    assert_eq!(table.row_count(), 140);
    assert_eq!(table.column_count(), 5);
    assert_eq!(
        export_filename(Section::HistoricalData.label()),
        "Historical_Data.csv"
    );
}

#[test]
fn empty_date_range_warns_on_history_and_still_renders_siblings() {
    // Valid symbol, window with no trading days: history is Empty, the
    // pass does not abort, and every other section still runs.
    let mut provider = MockProvider::reliance();
    provider.history = daily_history(0);

    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    let history = sink.outcome(Section::HistoricalData);
    assert_eq!(*history, Outcome::Empty);
    assert_eq!(
        history.message(Section::HistoricalData.label()).unwrap(),
        "No data available for Historical Data."
    );
    assert!(sink.outcome(Section::FinancialRatios).is_present());
    assert!(sink.outcome(Section::CompanyProfile).is_present());
}

#[test]
fn unknown_symbol_aborts_with_one_error_and_no_sections() {
    let provider = MockProvider::reliance();
    let mut sink = RecordingSink::default();
    let request = Request::new(
        "FAKE.NS",
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
    );

    let err = run_pass(&provider, &request, &mut sink).unwrap_err();
    assert!(matches!(err, PassError::Fetch(DataError::SymbolNotFound { .. })));
    assert!(sink.sections.is_empty(), "no section should render");
    assert!(sink.expiries.is_none());
}

#[test]
fn blank_symbol_is_rejected_before_any_fetch() {
    let provider = MockProvider::reliance();
    let mut sink = RecordingSink::default();
    let request = Request::new(
        "   ",
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
    );

    let err = run_pass(&provider, &request, &mut sink).unwrap_err();
    assert!(matches!(err, PassError::EmptySymbol));
    assert!(sink.sections.is_empty());
}

#[test]
fn empty_sustainability_warns_and_leaves_siblings_untouched() {
    let mut provider = MockProvider::reliance();
    provider.sections.insert(
        Section::Sustainability,
        SectionValue::Raw(json!([])), // zero rows
    );
    provider.sections.insert(
        Section::Recommendations,
        SectionValue::Raw(json!([
            {"period": "0m", "strongBuy": 10, "buy": 20},
        ])),
    );

    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    let sustainability = sink.outcome(Section::Sustainability);
    assert_eq!(*sustainability, Outcome::Empty);
    assert_eq!(
        sustainability.message("Sustainability").unwrap(),
        "No data available for Sustainability."
    );

    // siblings unaffected
    assert!(sink.outcome(Section::Recommendations).is_present());
    assert!(sink.outcome(Section::FinancialRatios).is_present());
}

#[test]
fn ratio_section_always_has_the_full_metric_list() {
    let provider = MockProvider::reliance();
    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    let ratios = sink.outcome(Section::FinancialRatios).table().unwrap();
    assert_eq!(ratios.row_count(), 16);
    assert_eq!(ratios.index()[0], "Previous Close");
    // metrics missing from the bag are absent, not dropped
    assert!(ratios
        .rows()
        .any(|(name, cells)| name == "Beta" && cells[0].is_absent()));
}

#[test]
fn missing_and_empty_sections_emit_exactly_one_message_and_no_export() {
    let provider = MockProvider::reliance();
    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    // Every section the mock has no data for classifies Missing with a
    // single warning line and no table to export.
    for (section, outcome) in &sink.sections {
        if let Outcome::Missing | Outcome::Empty = outcome {
            let msg = outcome.message(section.label());
            assert!(msg.is_some(), "{section:?} must carry a warning");
            assert!(outcome.table().is_none(), "{section:?} must not export");
        }
    }
}

#[test]
fn options_pass_reports_expiries_and_first_chain() {
    let provider = MockProvider::reliance();
    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    assert_eq!(
        sink.expiries.as_deref().unwrap(),
        ["2024-08-29".to_string(), "2024-09-26".to_string()].as_slice()
    );
    let (expiry, calls, puts) = &sink.chains[0];
    assert_eq!(expiry, "2024-08-29");
    assert!(calls.is_present());
    assert!(puts.is_present());
}

#[test]
fn no_listed_options_warns_without_expiry_selector() {
    let mut provider = MockProvider::reliance();
    provider.expiries.clear();

    let mut sink = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut sink).unwrap();

    assert!(sink.expiries.as_deref().unwrap().is_empty());
    assert!(sink.chains.is_empty(), "no chain fetched without expiries");
    assert_eq!(*sink.outcome(Section::OptionChain), Outcome::Missing);
}

#[test]
fn repeated_passes_are_idempotent() {
    let provider = MockProvider::reliance();

    let mut first = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut first).unwrap();
    let mut second = RecordingSink::default();
    run_pass(&provider, &reliance_request(), &mut second).unwrap();

    assert_eq!(first.sections.len(), second.sections.len());
    for ((s1, o1), (s2, o2)) in first.sections.iter().zip(second.sections.iter()) {
        assert_eq!(s1, s2);
        assert_eq!(
            o1.table().map(Table::row_count),
            o2.table().map(Table::row_count),
            "row count changed for {s1:?}"
        );
        assert_eq!(
            std::mem::discriminant(o1),
            std::mem::discriminant(o2),
            "classification changed for {s1:?}"
        );
    }
}
