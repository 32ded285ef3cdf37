//! Background worker thread: every network call and file read runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Commands
//! are handled one at a time, in order; a newer run does not interrupt an
//! older one, the UI thread discards stale results by sequence number.
//! Once the cancel flag is raised the worker drops whatever is still queued.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tradeboard_core::gateway::{symbols_or_default, BackendGateway};
use tradeboard_core::pipeline::{run_action, Action};
use tradeboard_core::request::FormState;
use tradeboard_core::{BacktestResult, RunError};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    FetchSymbols,
    Run {
        seq: u64,
        action: Action,
        form: FormState,
        upload_path: Option<PathBuf>,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    SymbolsLoaded(Vec<String>),
    RunFinished {
        seq: u64,
        action: Action,
        outcome: Result<Box<BacktestResult>, RunError>,
    },
}

/// Spawn the background worker thread. It owns the gateway.
pub fn spawn_worker(
    gateway: Box<dyn BackendGateway>,
    candle_limit: usize,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    cancel: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tradeboard-worker".into())
        .spawn(move || worker_loop(gateway.as_ref(), candle_limit, rx, tx, &cancel))
}

/// Stop the worker without waiting behind queued runs.
///
/// Raises `cancel`, sends `Shutdown`, then waits at most `grace` for the
/// thread to finish. A request still blocked on the network is left to die
/// with the process. Returns whether the thread was joined.
pub fn stop_worker(
    handle: JoinHandle<()>,
    cancel: &AtomicBool,
    tx: &Sender<WorkerCommand>,
    grace: Duration,
) -> bool {
    cancel.store(true, Ordering::Relaxed);
    let _ = tx.send(WorkerCommand::Shutdown);

    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::warn!("worker still busy at exit, detaching");
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    let _ = handle.join();
    true
}

fn worker_loop(
    gateway: &dyn BackendGateway,
    candle_limit: usize,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    cancel: &AtomicBool,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(_) if cancel.load(Ordering::Relaxed) => {
                tracing::debug!("cancelled, dropping queued commands");
                break;
            }
            Ok(cmd) => {
                if handle_command(gateway, candle_limit, cmd, &tx).is_err() {
                    // UI side hung up.
                    break;
                }
            }
        }
    }
    tracing::debug!("worker stopped");
}

fn handle_command(
    gateway: &dyn BackendGateway,
    candle_limit: usize,
    cmd: WorkerCommand,
    tx: &Sender<WorkerResponse>,
) -> Result<(), std::sync::mpsc::SendError<WorkerResponse>> {
    match cmd {
        WorkerCommand::FetchSymbols => {
            tx.send(WorkerResponse::SymbolsLoaded(symbols_or_default(gateway)))
        }
        WorkerCommand::Run {
            seq,
            action,
            form,
            upload_path,
        } => {
            tracing::debug!(seq, ?action, mode = form.mode.label(), "worker run");
            let outcome = run_action(
                gateway,
                action,
                &form,
                upload_path.as_deref(),
                candle_limit,
            )
            .map(Box::new);
            tx.send(WorkerResponse::RunFinished {
                seq,
                action,
                outcome,
            })
        }
        WorkerCommand::Shutdown => Ok(()), // handled in loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Mutex};

    use tradeboard_core::domain::{Candle, Interval};
    use tradeboard_core::gateway::RawResponse;
    use tradeboard_core::request::BacktestRequest;
    use tradeboard_core::GatewayError;

    struct Offline;

    impl BackendGateway for Offline {
        fn submit(&self, _: &BacktestRequest) -> Result<RawResponse, GatewayError> {
            Err(GatewayError::Transport("connection refused".into()))
        }
        fn fetch_candles(&self, _: &str, _: Interval, _: usize) -> Result<Vec<Candle>, GatewayError> {
            Err(GatewayError::Transport("connection refused".into()))
        }
        fn fetch_symbols(&self) -> Result<Vec<String>, GatewayError> {
            Err(GatewayError::Transport("connection refused".into()))
        }
    }

    fn spawn() -> (Sender<WorkerCommand>, Receiver<WorkerResponse>, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let handle = spawn_worker(Box::new(Offline), 500, cmd_rx, resp_tx, cancel).unwrap();
        (cmd_tx, resp_rx, handle)
    }

    /// Every submit blocks for `delay` and reports that it started.
    struct Stalled {
        delay: Duration,
        started: Mutex<Sender<()>>,
    }

    impl BackendGateway for Stalled {
        fn submit(&self, _: &BacktestRequest) -> Result<RawResponse, GatewayError> {
            let _ = self.started.lock().unwrap().send(());
            thread::sleep(self.delay);
            Err(GatewayError::Timeout { secs: 30 })
        }
        fn fetch_candles(&self, _: &str, _: Interval, _: usize) -> Result<Vec<Candle>, GatewayError> {
            Ok(vec![])
        }
        fn fetch_symbols(&self) -> Result<Vec<String>, GatewayError> {
            Ok(vec![])
        }
    }

    fn run(seq: u64) -> WorkerCommand {
        WorkerCommand::Run {
            seq,
            action: Action::Run,
            form: FormState::default(),
            upload_path: None,
        }
    }

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, _rx, handle) = spawn();
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn symbols_fall_back_when_offline() {
        let (cmd_tx, rx, handle) = spawn();
        cmd_tx.send(WorkerCommand::FetchSymbols).unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerResponse::SymbolsLoaded(symbols) => assert_eq!(symbols, vec!["ETHUSDT"]),
            other => panic!("unexpected response: {other:?}"),
        }
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn run_reports_its_sequence() {
        let (cmd_tx, rx, handle) = spawn();
        cmd_tx.send(run(7)).unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerResponse::RunFinished { seq, outcome, .. } => {
                assert_eq!(seq, 7);
                assert!(matches!(outcome, Err(RunError::Gateway(GatewayError::Transport(_)))));
            }
            other => panic!("unexpected response: {other:?}"),
        }
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn queued_runs_are_dropped_on_quit() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let gateway = Stalled {
            delay: Duration::from_millis(500),
            started: Mutex::new(started_tx),
        };
        let handle = spawn_worker(Box::new(gateway), 500, cmd_rx, resp_tx, cancel.clone()).unwrap();

        for seq in 1..=3 {
            cmd_tx.send(run(seq)).unwrap();
        }
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let t0 = Instant::now();
        assert!(stop_worker(handle, &cancel, &cmd_tx, Duration::from_secs(5)));
        // Only the run already in flight is waited for.
        assert!(t0.elapsed() < Duration::from_millis(1200), "took {:?}", t0.elapsed());

        let finished: Vec<u64> = resp_rx
            .try_iter()
            .filter_map(|r| match r {
                WorkerResponse::RunFinished { seq, .. } => Some(seq),
                _ => None,
            })
            .collect();
        assert_eq!(finished, vec![1]);
        assert!(started_rx.try_recv().is_err());
    }

    #[test]
    fn stop_detaches_a_stuck_worker() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, _resp_rx) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let gateway = Stalled {
            delay: Duration::from_secs(3),
            started: Mutex::new(started_tx),
        };
        let handle = spawn_worker(Box::new(gateway), 500, cmd_rx, resp_tx, cancel.clone()).unwrap();

        cmd_tx.send(run(1)).unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let t0 = Instant::now();
        assert!(!stop_worker(handle, &cancel, &cmd_tx, Duration::from_millis(100)));
        assert!(t0.elapsed() < Duration::from_secs(1));
    }
}
