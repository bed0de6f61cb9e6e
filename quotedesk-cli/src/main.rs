//! QuoteDesk CLI — fetch market data sections and export them as CSV.
//!
//! Commands:
//! - `fetch` — run a full fetch pass for a symbol and print/export sections
//! - `sections` — list every section name the dashboard knows about

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use quotedesk_core::{
    export_filename, run_pass, write_table_csv, Outcome, PassSink, Request, Section,
    YahooProvider,
};

#[derive(Parser)]
#[command(
    name = "quotedesk",
    about = "QuoteDesk CLI — stock data sections and CSV export"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full fetch pass for a symbol.
    Fetch {
        /// Symbol to fetch (e.g., RELIANCE.NS, TCS.BO, AAPL).
        symbol: String,

        /// Start date (YYYY-MM-DD). Defaults to 1 year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Only fetch the named sections (repeatable; default is all).
        #[arg(long = "section")]
        sections: Vec<String>,

        /// Write each tabular section as CSV into this directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List every section name.
    Sections,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbol,
            start,
            end,
            sections,
            out,
        } => run_fetch(symbol, start, end, sections, out),
        Commands::Sections => {
            for section in Section::all() {
                println!("{}", section.label());
            }
            Ok(())
        }
    }
}

fn run_fetch(
    symbol: String,
    start: Option<String>,
    end: Option<String>,
    sections: Vec<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let start_date = start
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive() - chrono::Duration::days(365));

    let end_date = end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let filter = parse_section_filter(&sections)?;

    if let Some(dir) = &out {
        std::fs::create_dir_all(dir)?;
    }

    let provider = YahooProvider::new();
    let request = Request::new(symbol.trim().to_uppercase(), start_date, end_date);
    let mut sink = StdoutSink {
        filter,
        out,
        exported: 0,
        failures: 0,
    };

    println!("Fetching {} ({start_date} to {end_date})...", request.symbol);
    println!();

    if let Err(e) = run_pass(&provider, &request, &mut sink) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    println!();
    if sink.exported > 0 {
        println!("Exported {} CSV file(s).", sink.exported);
    }
    if sink.failures > 0 {
        println!("{} section(s) had errors.", sink.failures);
    }

    Ok(())
}

fn parse_section_filter(names: &[String]) -> Result<Option<Vec<Section>>> {
    if names.is_empty() {
        return Ok(None);
    }
    let mut filter = Vec::with_capacity(names.len());
    for name in names {
        match Section::from_label(name) {
            Some(s) => filter.push(s),
            None => bail!(
                "unknown section '{name}'. Run `quotedesk sections` for the full list."
            ),
        }
    }
    Ok(Some(filter))
}

/// PassSink that prints one line per section and optionally exports CSVs.
struct StdoutSink {
    filter: Option<Vec<Section>>,
    out: Option<PathBuf>,
    exported: usize,
    failures: usize,
}

impl StdoutSink {
    fn wanted(&self, section: Section) -> bool {
        match &self.filter {
            None => true,
            Some(list) => list.contains(&section),
        }
    }

    fn report(&mut self, label: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Present(table) => {
                println!(
                    "{label:<28} {} rows x {} cols",
                    table.row_count(),
                    table.column_count()
                );
                if let Some(dir) = &self.out {
                    match write_table_csv(dir, label, table) {
                        Ok(path) => {
                            println!("{:<28} -> {}", "", path.display());
                            self.exported += 1;
                        }
                        Err(e) => {
                            eprintln!("{:<28} export failed: {e}", "");
                            self.failures += 1;
                        }
                    }
                }
            }
            other => {
                let msg = other
                    .message(label)
                    .unwrap_or_else(|| "nothing to display".into());
                println!("{label:<28} {msg}");
                if matches!(other, Outcome::Error(_)) {
                    self.failures += 1;
                }
            }
        }
    }
}

impl PassSink for StdoutSink {
    fn on_section(&mut self, section: Section, outcome: Outcome) {
        if self.wanted(section) {
            self.report(section.label(), &outcome);
        }
    }

    fn on_option_expiries(&mut self, expiries: &[String]) {
        if self.wanted(Section::OptionChain) && !expiries.is_empty() {
            println!("{:<28} {} expiries listed", "Option Expiries", expiries.len());
        }
    }

    fn on_option_chain(&mut self, expiry: &str, calls: Outcome, puts: Outcome) {
        if self.wanted(Section::OptionChain) {
            self.report(&format!("Calls {expiry}"), &calls);
            self.report(&format!("Puts {expiry}"), &puts);
        }
    }
}
