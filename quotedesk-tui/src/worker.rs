//! Background worker thread — all network fetching runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. A pass is
//! sequential and runs to completion; there is no cancellation mid-pass.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use quotedesk_core::{
    fetch_option_chain, run_pass, DataProvider, FetchSession, Outcome, PassSink, Request,
    Section, YahooProvider,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    RunPass { request: Request },
    FetchChain { request: Request, expiry: String },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    SectionDone {
        section: Section,
        outcome: Outcome,
    },
    OptionExpiries(Vec<String>),
    OptionChainDone {
        expiry: String,
        calls: Outcome,
        puts: Outcome,
    },
    PassFinished,
    PassFailed(String),
}

/// Spawn the background worker thread.
pub fn spawn_worker(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("quotedesk-worker".into())
        .spawn(move || {
            let provider = YahooProvider::new();
            worker_loop(&provider, rx, tx);
        })
        .expect("failed to spawn worker thread")
}

fn worker_loop(
    provider: &dyn DataProvider,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::RunPass { request }) => {
                let mut sink = ChannelSink { tx: tx.clone() };
                match run_pass(provider, &request, &mut sink) {
                    Ok(()) => {
                        let _ = tx.send(WorkerResponse::PassFinished);
                    }
                    Err(e) => {
                        let _ = tx.send(WorkerResponse::PassFailed(e.to_string()));
                    }
                }
            }
            Ok(WorkerCommand::FetchChain { request, expiry }) => {
                let mut session = FetchSession::new(provider, request);
                let (calls, puts) = fetch_option_chain(&mut session, &expiry);
                let _ = tx.send(WorkerResponse::OptionChainDone {
                    expiry,
                    calls,
                    puts,
                });
            }
        }
    }
}

/// PassSink implementation that forwards results through the channel.
struct ChannelSink {
    tx: Sender<WorkerResponse>,
}

impl PassSink for ChannelSink {
    fn on_section(&mut self, section: Section, outcome: Outcome) {
        let _ = self.tx.send(WorkerResponse::SectionDone { section, outcome });
    }

    fn on_option_expiries(&mut self, expiries: &[String]) {
        let _ = self
            .tx
            .send(WorkerResponse::OptionExpiries(expiries.to_vec()));
    }

    fn on_option_chain(&mut self, expiry: &str, calls: Outcome, puts: Outcome) {
        let _ = self.tx.send(WorkerResponse::OptionChainDone {
            expiry: expiry.to_string(),
            calls,
            puts,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(cmd_rx, resp_tx);
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn worker_exits_when_command_channel_drops() {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(cmd_rx, resp_tx);
        drop(cmd_tx);
        handle.join().expect("worker should join cleanly");
    }
}
