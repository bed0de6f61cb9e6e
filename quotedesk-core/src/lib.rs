//! QuoteDesk Core — table model, normalize-and-classify pipeline, CSV
//! export, and the Yahoo Finance data layer.
//!
//! The crate is organized around one idea: a data provider hands back a
//! heterogeneous value per named section, the pipeline folds it into a
//! uniform `Outcome`, and the rendering layers (TUI, CLI) only ever deal
//! with outcomes.

pub mod data;
pub mod export;
pub mod normalize;
pub mod pass;
pub mod ratios;
pub mod section;
pub mod table;

pub use data::{DataError, DataProvider, FetchSession, Request, YahooProvider};
pub use export::{csv_to_table, export_filename, table_to_csv, write_table_csv};
pub use normalize::{normalize, Outcome, SectionValue};
pub use pass::{fetch_option_chain, run_pass, PassError, PassSink};
pub use section::Section;
pub use table::{Cell, Table};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the TUI worker channel
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Table>();
        require_sync::<Table>();
        require_send::<Cell>();
        require_sync::<Cell>();
        require_send::<Outcome>();
        require_sync::<Outcome>();
        require_send::<SectionValue>();
        require_sync::<SectionValue>();
        require_send::<Section>();
        require_sync::<Section>();
        require_send::<Request>();
        require_sync::<Request>();
        require_send::<DataError>();
        require_sync::<DataError>();
    }
}
