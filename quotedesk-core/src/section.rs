//! Named data sections the dashboard offers.
//!
//! The original flat selectbox/if-elif dispatch is folded into one enum:
//! each variant maps to exactly one provider accessor (see
//! `FetchSession::section_value`), and the warning/empty handling lives in
//! the pipeline, not per branch.

use serde::{Deserialize, Serialize};

/// One selectable data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    HistoricalData,
    FinancialRatios,
    CompanyProfile,
    Dividends,
    Splits,
    Recommendations,
    Sustainability,
    InstitutionalHolders,
    MutualFundHolders,
    MajorHolders,
    Earnings,
    QuarterlyEarnings,
    IncomeStatement,
    QuarterlyIncomeStatement,
    BalanceSheet,
    QuarterlyBalanceSheet,
    CashFlow,
    QuarterlyCashFlow,
    AnalystPriceTargets,
    CalendarEvents,
    OptionChain,
}

impl Section {
    /// Display label; also the source of the CSV export filename.
    pub fn label(self) -> &'static str {
        match self {
            Section::HistoricalData => "Historical Data",
            Section::FinancialRatios => "Financial Ratios",
            Section::CompanyProfile => "Company Profile",
            Section::Dividends => "Dividends",
            Section::Splits => "Splits",
            Section::Recommendations => "Recommendations",
            Section::Sustainability => "Sustainability",
            Section::InstitutionalHolders => "Institutional Holders",
            Section::MutualFundHolders => "Mutual Fund Holders",
            Section::MajorHolders => "Major Holders",
            Section::Earnings => "Earnings",
            Section::QuarterlyEarnings => "Quarterly Earnings",
            Section::IncomeStatement => "Annual Income Statement",
            Section::QuarterlyIncomeStatement => "Quarterly Income Statement",
            Section::BalanceSheet => "Annual Balance Sheet",
            Section::QuarterlyBalanceSheet => "Quarterly Balance Sheet",
            Section::CashFlow => "Annual Cash Flow",
            Section::QuarterlyCashFlow => "Quarterly Cash Flow",
            Section::AnalystPriceTargets => "Analyst Price Targets",
            Section::CalendarEvents => "Calendar Events",
            Section::OptionChain => "Option Chain",
        }
    }

    /// All sections in browse order. Historical data and ratios first —
    /// they are the primary view; the rest follow the original menu order.
    pub fn all() -> &'static [Section] {
        &[
            Section::HistoricalData,
            Section::FinancialRatios,
            Section::CompanyProfile,
            Section::Dividends,
            Section::Splits,
            Section::Recommendations,
            Section::Sustainability,
            Section::InstitutionalHolders,
            Section::MutualFundHolders,
            Section::MajorHolders,
            Section::Earnings,
            Section::QuarterlyEarnings,
            Section::IncomeStatement,
            Section::QuarterlyIncomeStatement,
            Section::BalanceSheet,
            Section::QuarterlyBalanceSheet,
            Section::CashFlow,
            Section::QuarterlyCashFlow,
            Section::AnalystPriceTargets,
            Section::CalendarEvents,
            Section::OptionChain,
        ]
    }

    /// Look a section up by its display label (CLI `--section` flag).
    pub fn from_label(label: &str) -> Option<Section> {
        Section::all()
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sections_have_unique_labels() {
        let labels: Vec<&str> = Section::all().iter().map(|s| s.label()).collect();
        let mut dedup = labels.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(labels.len(), dedup.len());
    }

    #[test]
    fn browse_order_starts_with_primary_views() {
        let all = Section::all();
        assert_eq!(all[0], Section::HistoricalData);
        assert_eq!(all[1], Section::FinancialRatios);
        assert_eq!(all.len(), 21);
    }

    #[test]
    fn lookup_by_label_is_case_insensitive() {
        assert_eq!(
            Section::from_label("annual balance sheet"),
            Some(Section::BalanceSheet)
        );
        assert_eq!(Section::from_label("nope"), None);
    }
}
