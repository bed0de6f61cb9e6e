//! Request-scoped fetch session.
//!
//! A session memoizes shared provider results (the attribute bag) for
//! exactly one fetch-and-render pass. Constructing a fresh session per pass
//! is what guarantees a pass never observes another pass's stale values —
//! the cache lifetime is the session lifetime, nothing global.

use serde_json::Value;

use super::provider::{DataError, DataProvider, Request};
use crate::normalize::SectionValue;
use crate::ratios;
use crate::section::Section;
use crate::table::Table;

pub struct FetchSession<'a> {
    provider: &'a dyn DataProvider,
    request: Request,
    attribute_bag: Option<Value>,
}

impl<'a> FetchSession<'a> {
    pub fn new(provider: &'a dyn DataProvider, request: Request) -> Self {
        Self {
            provider,
            request,
            attribute_bag: None,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn history(&mut self) -> Result<Table, DataError> {
        self.provider
            .history(&self.request.symbol, self.request.start, self.request.end)
    }

    /// The scalar attribute bag, fetched at most once per session.
    pub fn attribute_bag(&mut self) -> Result<&Value, DataError> {
        if self.attribute_bag.is_none() {
            self.attribute_bag = Some(self.provider.attribute_bag(&self.request.symbol)?);
        }
        Ok(self.attribute_bag.as_ref().unwrap())
    }

    /// Uniform retrieval for every section: one lookup, one raw value.
    /// Option chains are served by `option_expiries`/`option_chain` because
    /// they need the expiry parameter.
    pub fn section_value(&mut self, section: Section) -> Result<SectionValue, DataError> {
        match section {
            Section::HistoricalData => self.history().map(SectionValue::Table),
            Section::FinancialRatios => {
                let bag = self.attribute_bag()?;
                Ok(SectionValue::Table(ratios::ratio_table(bag)))
            }
            Section::CompanyProfile => {
                let bag = self.attribute_bag()?;
                Ok(SectionValue::Table(ratios::profile_table(bag)))
            }
            Section::OptionChain => Err(DataError::SectionUnavailable {
                section: section.label().to_string(),
                reason: "requires an expiry date".into(),
            }),
            other => self.provider.section_value(&self.request.symbol, other),
        }
    }

    pub fn option_expiries(&mut self) -> Result<Vec<String>, DataError> {
        self.provider.option_expiries(&self.request.symbol)
    }

    pub fn option_chain(&mut self, expiry: &str) -> Result<(Table, Table), DataError> {
        self.provider.option_chain(&self.request.symbol, expiry)
    }
}
