//! Saving the selected section's table as CSV.
//!
//! Missing/empty/unconvertible sections have nothing to export; the save
//! key reports that instead of writing a file.

use std::path::{Path, PathBuf};

use quotedesk_core::{write_table_csv, Section};

use crate::app::AppState;

/// Where exports land: the user's download directory, falling back to cwd.
pub fn export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Write the selected section's table(s) into `dir`. Returns a user-facing
/// status line; an Err is shown as a warning, not a crash.
pub fn save_selected(app: &AppState, dir: &Path) -> Result<String, String> {
    let section = app.selected_section();

    if section == Section::OptionChain {
        let Some((expiry, calls, puts)) = &app.options.chain else {
            return Err("No option chain loaded to export.".into());
        };
        let mut written = 0usize;
        for (side, outcome) in [("Calls", calls), ("Puts", puts)] {
            if let Some(table) = outcome.table() {
                let label = format!("{side} {expiry}");
                write_table_csv(dir, &label, table).map_err(|e| e.to_string())?;
                written += 1;
            }
        }
        if written == 0 {
            return Err("No option chain tables to export.".into());
        }
        return Ok(format!("Saved {written} file(s) to {}", dir.display()));
    }

    match app.outcome_for(section).and_then(|o| o.table()) {
        Some(table) => {
            let path = write_table_csv(dir, section.label(), table).map_err(|e| e.to_string())?;
            Ok(format!("Saved {}", path.display()))
        }
        None => Err(format!("No table to export for {}.", section.label())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::{Cell, Outcome, Table};
    use std::sync::mpsc;

    fn app_with_history() -> AppState {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let mut app = AppState::new(cmd_tx, resp_rx);
        let table = Table::from_pairs(
            "Date",
            "Close",
            vec![("2024-01-02".into(), Cell::Number(101.5))],
        );
        app.outcomes
            .insert(Section::HistoricalData, Outcome::Present(table));
        app
    }

    #[test]
    fn present_section_exports_under_derived_filename() {
        let app = app_with_history();
        let dir = tempfile::tempdir().unwrap();
        let msg = save_selected(&app, dir.path()).unwrap();
        assert!(msg.contains("Historical_Data.csv"));
        assert!(dir.path().join("Historical_Data.csv").exists());
    }

    #[test]
    fn section_without_table_offers_no_export() {
        let mut app = app_with_history();
        app.outcomes.insert(Section::Dividends, Outcome::Missing);
        app.cursor = Section::all()
            .iter()
            .position(|s| *s == Section::Dividends)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = save_selected(&app, dir.path()).unwrap_err();
        assert!(err.contains("Dividends"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn option_chain_exports_both_sides() {
        let mut app = app_with_history();
        app.cursor = Section::all()
            .iter()
            .position(|s| *s == Section::OptionChain)
            .unwrap();
        let calls = Table::from_pairs("Contract", "Last", vec![("C1".into(), Cell::Number(1.0))]);
        let puts = Table::from_pairs("Contract", "Last", vec![("P1".into(), Cell::Number(2.0))]);
        app.options.chain = Some((
            "2024-08-29".into(),
            Outcome::Present(calls),
            Outcome::Present(puts),
        ));

        let dir = tempfile::tempdir().unwrap();
        save_selected(&app, dir.path()).unwrap();
        assert!(dir.path().join("Calls_2024-08-29.csv").exists());
        assert!(dir.path().join("Puts_2024-08-29.csv").exists());
    }
}
