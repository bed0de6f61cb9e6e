//! The fetch-and-render pass.
//!
//! One user action triggers one sequential, synchronous pass: history first,
//! then every section in registry order, each retrieval normalized and
//! reported through the sink. Sections fail independently — one section's
//! retrieval error never suppresses its siblings. Only a blank symbol or a
//! failed primary history fetch aborts the pass, because nothing downstream
//! can render for a symbol the provider does not know.

use thiserror::Error;

use crate::data::{DataError, DataProvider, FetchSession, Request};
use crate::normalize::{normalize, Outcome, SectionValue};
use crate::section::Section;

#[derive(Debug, Error)]
pub enum PassError {
    #[error("please enter a stock symbol")]
    EmptySymbol,

    #[error("error fetching data: {0}")]
    Fetch(#[from] DataError),
}

/// Receives the per-section results of a pass as they arrive.
///
/// Implemented over a channel by the TUI worker and over stdout/disk by
/// the CLI.
pub trait PassSink {
    fn on_section(&mut self, section: Section, outcome: Outcome);

    /// Expiry dates found for the option chain. Not called when the
    /// expiry list retrieval itself fails; called with an empty slice when
    /// the symbol has no listed options.
    fn on_option_expiries(&mut self, expiries: &[String]);

    /// Call/put tables for one expiry (the first, during a pass; others on
    /// demand via `fetch_option_chain`).
    fn on_option_chain(&mut self, expiry: &str, calls: Outcome, puts: Outcome);
}

/// Run one full pass. The session (and with it any memoized provider data)
/// lives exactly as long as this call.
pub fn run_pass(
    provider: &dyn DataProvider,
    request: &Request,
    sink: &mut dyn PassSink,
) -> Result<(), PassError> {
    if request.symbol.trim().is_empty() {
        return Err(PassError::EmptySymbol);
    }

    let mut session = FetchSession::new(provider, request.clone());

    // Primary fetch: a failure here aborts before any section renders.
    let history = session.section_value(Section::HistoricalData)?;
    let label = Section::HistoricalData.label();
    sink.on_section(Section::HistoricalData, normalize(history, label));

    for &section in Section::all() {
        match section {
            Section::HistoricalData => {} // already reported
            Section::OptionChain => run_options(&mut session, sink),
            _ => {
                let outcome = match session.section_value(section) {
                    Ok(value) => normalize(value, section.label()),
                    Err(e) => Outcome::Error(e.to_string()),
                };
                sink.on_section(section, outcome);
            }
        }
    }

    Ok(())
}

fn run_options(session: &mut FetchSession, sink: &mut dyn PassSink) {
    let expiries = match session.option_expiries() {
        Ok(expiries) => expiries,
        Err(e) => {
            sink.on_section(Section::OptionChain, Outcome::Error(e.to_string()));
            return;
        }
    };

    if expiries.is_empty() {
        sink.on_option_expiries(&expiries);
        sink.on_section(Section::OptionChain, Outcome::Missing);
        return;
    }

    sink.on_option_expiries(&expiries);
    let first = expiries[0].clone();
    let (calls, puts) = fetch_option_chain(session, &first);
    sink.on_option_chain(&first, calls, puts);
}

/// Fetch and classify the chain for one expiry. Failures stay local to the
/// options section.
pub fn fetch_option_chain(session: &mut FetchSession, expiry: &str) -> (Outcome, Outcome) {
    match session.option_chain(expiry) {
        Ok((calls, puts)) => (
            normalize(SectionValue::Table(calls), "Calls"),
            normalize(SectionValue::Table(puts), "Puts"),
        ),
        Err(e) => {
            let msg = e.to_string();
            (Outcome::Error(msg.clone()), Outcome::Error(msg))
        }
    }
}
