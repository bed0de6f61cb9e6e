//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDate;

use quotedesk_core::{Outcome, Request, Section};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Query,
    Sections,
    Table,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Query => 0,
            Panel::Sections => 1,
            Panel::Table => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Query),
            1 => Some(Panel::Sections),
            2 => Some(Panel::Table),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Query => "Query",
            Panel::Sections => "Sections",
            Panel::Table => "Table",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 4).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 3) % 4).unwrap()
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Which query field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Symbol,
    Start,
    End,
}

impl QueryField {
    pub fn next(self) -> QueryField {
        match self {
            QueryField::Symbol => QueryField::Start,
            QueryField::Start => QueryField::End,
            QueryField::End => QueryField::Symbol,
        }
    }

    pub fn prev(self) -> QueryField {
        match self {
            QueryField::Symbol => QueryField::End,
            QueryField::Start => QueryField::Symbol,
            QueryField::End => QueryField::Start,
        }
    }
}

/// The query form. Dates are edited as text and validated on submit.
#[derive(Debug)]
pub struct QueryState {
    pub symbol: String,
    pub start_input: String,
    pub end_input: String,
    pub focus: QueryField,
}

impl QueryState {
    fn new() -> Self {
        Self {
            symbol: "RELIANCE.NS".into(),
            start_input: "2024-01-01".into(),
            end_input: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            focus: QueryField::Symbol,
        }
    }

    pub fn focused_input_mut(&mut self) -> &mut String {
        match self.focus {
            QueryField::Symbol => &mut self.symbol,
            QueryField::Start => &mut self.start_input,
            QueryField::End => &mut self.end_input,
        }
    }

    /// Validate the form into a Request. Blank symbol and unparseable dates
    /// are input errors — no fetch is attempted for them.
    pub fn to_request(&self) -> Result<Request, String> {
        if self.symbol.trim().is_empty() {
            return Err("Please enter a valid stock symbol.".into());
        }
        let start = parse_date(&self.start_input, "start date")?;
        let end = parse_date(&self.end_input, "end date")?;
        Ok(Request::new(self.symbol.trim().to_uppercase(), start, end))
    }
}

fn parse_date(input: &str, what: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid {what} '{}' (expected YYYY-MM-DD).", input.trim()))
}

/// Option-chain browse state: the expiry selector plus the currently
/// fetched chain. An empty expiry list means no selector is shown.
#[derive(Debug, Default)]
pub struct OptionsState {
    pub expiries: Vec<String>,
    pub selected: usize,
    pub chain: Option<(String, Outcome, Outcome)>,
    pub chain_loading: bool,
}

impl OptionsState {
    pub fn selected_expiry(&self) -> Option<&str> {
        self.expiries.get(self.selected).map(String::as_str)
    }
}

/// Table view scroll position.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableScroll {
    pub row: usize,
    pub col: usize,
}

pub struct AppState {
    pub running: bool,
    pub active_panel: Panel,
    pub query: QueryState,

    /// Latest classification per section, from the most recent pass.
    pub outcomes: BTreeMap<Section, Outcome>,
    /// Cursor into `Section::all()` in the sections panel.
    pub cursor: usize,
    pub scroll: TableScroll,
    pub options: OptionsState,

    pub fetch_in_progress: bool,
    /// The request the current outcomes (and option expiries) belong to.
    /// Follow-up fetches like expiry cycling reuse this, not the live form,
    /// so editing the form can never mix symbols.
    pub fetched_request: Option<Request>,
    pub status_message: Option<(String, StatusLevel)>,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
}

impl AppState {
    pub fn new(worker_tx: Sender<WorkerCommand>, worker_rx: Receiver<WorkerResponse>) -> Self {
        Self {
            running: true,
            active_panel: Panel::Query,
            query: QueryState::new(),
            outcomes: BTreeMap::new(),
            cursor: 0,
            scroll: TableScroll::default(),
            options: OptionsState::default(),
            fetch_in_progress: false,
            fetched_request: None,
            status_message: None,
            worker_tx,
            worker_rx,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// The symbol the displayed outcomes were fetched for.
    pub fn fetched_symbol(&self) -> Option<&str> {
        self.fetched_request.as_ref().map(|r| r.symbol.as_str())
    }

    /// The section under the cursor.
    pub fn selected_section(&self) -> Section {
        Section::all()[self.cursor.min(Section::all().len() - 1)]
    }

    pub fn outcome_for(&self, section: Section) -> Option<&Outcome> {
        self.outcomes.get(&section)
    }

    /// Validate the form and kick off a fetch pass on the worker.
    pub fn start_fetch(&mut self) {
        if self.fetch_in_progress {
            self.set_warning("A fetch is already running.");
            return;
        }
        let request = match self.query.to_request() {
            Ok(r) => r,
            Err(msg) => {
                self.set_error(msg);
                return;
            }
        };

        // Fresh pass: clear every per-pass result so stale tables from the
        // previous symbol can never show through.
        self.outcomes.clear();
        self.options = OptionsState::default();
        self.scroll = TableScroll::default();
        self.fetch_in_progress = true;
        self.fetched_request = Some(request.clone());
        self.set_status(format!("Fetching {}...", request.symbol));

        let _ = self.worker_tx.send(WorkerCommand::RunPass { request });
    }

    /// Cycle the option expiry selector and request the chain for the new
    /// expiry. No-op when no options are listed. The chain request reuses
    /// the fetched pass's request: the expiry list belongs to that symbol,
    /// not to whatever is in the form right now.
    pub fn cycle_expiry(&mut self, forward: bool) {
        let n = self.options.expiries.len();
        if n == 0 || self.fetch_in_progress {
            return;
        }
        let Some(request) = self.fetched_request.clone() else {
            return;
        };
        self.options.selected = if forward {
            (self.options.selected + 1) % n
        } else {
            (self.options.selected + n - 1) % n
        };

        let expiry = self.options.expiries[self.options.selected].clone();
        self.options.chain_loading = true;
        self.set_status(format!("Loading option chain for {expiry}..."));
        let _ = self
            .worker_tx
            .send(WorkerCommand::FetchChain { request, expiry });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn test_app() -> (AppState, Receiver<WorkerCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        (AppState::new(cmd_tx, resp_rx), cmd_rx)
    }

    #[test]
    fn blank_symbol_is_an_input_error_with_no_fetch() {
        let (mut app, cmd_rx) = test_app();
        app.query.symbol = "   ".into();
        app.start_fetch();

        assert!(!app.fetch_in_progress);
        assert!(matches!(
            app.status_message,
            Some((_, StatusLevel::Error))
        ));
        assert!(cmd_rx.try_recv().is_err(), "no command may be sent");
    }

    #[test]
    fn bad_date_is_an_input_error() {
        let (mut app, cmd_rx) = test_app();
        app.query.start_input = "01/01/2024".into();
        app.start_fetch();

        assert!(!app.fetch_in_progress);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn valid_query_sends_run_pass_and_clears_stale_state() {
        let (mut app, cmd_rx) = test_app();
        app.outcomes
            .insert(Section::Dividends, quotedesk_core::Outcome::Empty);
        app.query.symbol = "tcs.bo".into();
        app.query.start_input = "2024-01-01".into();
        app.query.end_input = "2024-08-01".into();
        app.start_fetch();

        assert!(app.fetch_in_progress);
        assert!(app.outcomes.is_empty());
        match cmd_rx.try_recv().unwrap() {
            WorkerCommand::RunPass { request } => {
                assert_eq!(request.symbol, "TCS.BO");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn reliance_request() -> Request {
        Request::new(
            "RELIANCE.NS",
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        )
    }

    #[test]
    fn expiry_cycling_wraps_and_requests_chain() {
        let (mut app, cmd_rx) = test_app();
        app.fetched_request = Some(reliance_request());
        app.options.expiries = vec!["2024-08-29".into(), "2024-09-26".into()];
        app.cycle_expiry(true);
        assert_eq!(app.options.selected, 1);
        app.cycle_expiry(true);
        assert_eq!(app.options.selected, 0);

        match cmd_rx.try_recv().unwrap() {
            WorkerCommand::FetchChain { expiry, .. } => assert_eq!(expiry, "2024-09-26"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn expiry_cycling_keeps_the_fetched_symbol_after_form_edits() {
        let (mut app, cmd_rx) = test_app();
        app.fetched_request = Some(reliance_request());
        app.options.expiries = vec!["2024-08-29".into(), "2024-09-26".into()];

        // Retyping the form must not redirect the chain fetch: the expiry
        // list still belongs to the fetched symbol.
        app.query.symbol = "TCS.BO".into();
        app.cycle_expiry(true);

        match cmd_rx.try_recv().unwrap() {
            WorkerCommand::FetchChain { request, expiry } => {
                assert_eq!(request.symbol, "RELIANCE.NS");
                assert_eq!(expiry, "2024-09-26");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn expiry_cycling_is_a_noop_before_any_pass() {
        let (mut app, cmd_rx) = test_app();
        app.options.expiries = vec!["2024-08-29".into()];
        app.cycle_expiry(true);
        assert_eq!(app.options.selected, 0);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn expiry_cycling_is_a_noop_without_listed_options() {
        let (mut app, cmd_rx) = test_app();
        app.cycle_expiry(true);
        assert_eq!(app.options.selected, 0);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn panel_cycle_is_a_ring() {
        assert_eq!(Panel::Query.next(), Panel::Sections);
        assert_eq!(Panel::Help.next(), Panel::Query);
        assert_eq!(Panel::Query.prev(), Panel::Help);
    }
}
