//! QuoteDesk TUI — a terminal dashboard for equity market data.
//!
//! Panels:
//! 1. Query — symbol and date range, fetch trigger
//! 2. Sections — every data section with its classification
//! 3. Table — full table view with scrolling and CSV export
//! 4. Help — keyboard reference
//!
//! Fetching runs on a background worker thread; one button press triggers
//! one sequential pass over all sections.

mod app;
mod input;
mod save;
mod theme;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use quotedesk_core::{Outcome, Section};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx);

    let mut app = AppState::new(cmd_tx.clone(), resp_rx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    match resp {
        WorkerResponse::SectionDone { section, outcome } => {
            app.outcomes.insert(section, outcome);
        }
        WorkerResponse::OptionExpiries(expiries) => {
            app.options.expiries = expiries;
            app.options.selected = 0;
        }
        WorkerResponse::OptionChainDone {
            expiry,
            calls,
            puts,
        } => {
            // The section marker mirrors the calls side; the full pair
            // lives in the options state.
            app.outcomes
                .insert(Section::OptionChain, calls.clone());
            app.options.chain = Some((expiry, calls, puts));
            app.options.chain_loading = false;
            if !app.fetch_in_progress {
                app.set_status("Option chain loaded.");
            }
        }
        WorkerResponse::PassFinished => {
            app.fetch_in_progress = false;
            let with_data = app
                .outcomes
                .values()
                .filter(|o| matches!(o, Outcome::Present(_)))
                .count();
            let symbol = app.fetched_symbol().unwrap_or("?");
            app.set_status(format!(
                "Fetch complete for {symbol}: {with_data}/{} sections with data",
                app.outcomes.len()
            ));
        }
        WorkerResponse::PassFailed(error) => {
            app.fetch_in_progress = false;
            app.set_error(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::{Cell, Table};

    fn test_app() -> AppState {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        AppState::new(cmd_tx, resp_rx)
    }

    #[test]
    fn pass_failure_is_one_error_message_and_no_sections() {
        let mut app = test_app();
        app.fetch_in_progress = true;
        handle_worker_response(
            &mut app,
            WorkerResponse::PassFailed("symbol not found: FAKE.NS".into()),
        );
        assert!(!app.fetch_in_progress);
        assert!(app.outcomes.is_empty());
        let (msg, level) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("FAKE.NS"));
        assert_eq!(*level, crate::app::StatusLevel::Error);
    }

    #[test]
    fn section_results_accumulate_during_a_pass() {
        let mut app = test_app();
        let table = Table::from_pairs(
            "Date",
            "Close",
            vec![("2024-01-02".into(), Cell::Number(1.0))],
        );
        handle_worker_response(
            &mut app,
            WorkerResponse::SectionDone {
                section: Section::HistoricalData,
                outcome: Outcome::Present(table),
            },
        );
        handle_worker_response(
            &mut app,
            WorkerResponse::SectionDone {
                section: Section::Sustainability,
                outcome: Outcome::Empty,
            },
        );
        assert_eq!(app.outcomes.len(), 2);
        assert!(app
            .outcome_for(Section::HistoricalData)
            .unwrap()
            .is_present());
    }

    #[test]
    fn empty_expiry_list_shows_no_selector() {
        let mut app = test_app();
        handle_worker_response(&mut app, WorkerResponse::OptionExpiries(Vec::new()));
        handle_worker_response(
            &mut app,
            WorkerResponse::SectionDone {
                section: Section::OptionChain,
                outcome: Outcome::Missing,
            },
        );
        assert!(app.options.expiries.is_empty());
        assert!(app.options.selected_expiry().is_none());
        assert!(app.options.chain.is_none());
    }
}
