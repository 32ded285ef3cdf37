//! Application state: single-owner, main-thread only.
//!
//! All dashboard state lives here. The worker thread communicates via
//! channels; results come back tagged with the sequence number of the run
//! that produced them, and only the latest dispatched run may update the
//! display.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;

use tradeboard_core::ledger::{export_ledger_csv, ledger_rows, LedgerRow};
use tradeboard_core::pipeline::Action;
use tradeboard_core::request::{build_run_request, BackendMode, FormState};
use tradeboard_core::{BacktestResult, ErrorCategory, Locale, RunError, UserInputError};

use crate::chart_slot::ChartSlot;
use crate::worker::{WorkerCommand, WorkerResponse};

/// Most errors kept in the history overlay.
pub const MAX_ERROR_HISTORY: usize = 50;

/// Month choices offered by the form. Zero means "use an uploaded CSV".
pub const MONTH_CHOICES: [u32; 7] = [0, 1, 2, 3, 6, 9, 12];

/// Editable form rows. Which ones are shown depends on the backend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Mode,
    Symbol,
    Months,
    Interval,
    InitialBalance,
    KNeighbors,
    Lookback,
    StopAtrMult,
    RiskPct,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Mode => "Backend",
            FormField::Symbol => "Symbol",
            FormField::Months => "Months",
            FormField::Interval => "Interval",
            FormField::InitialBalance => "Balance",
            FormField::KNeighbors => "K",
            FormField::Lookback => "Lookback",
            FormField::StopAtrMult => "Stop ATR",
            FormField::RiskPct => "Risk %",
        }
    }

    /// Fields visible for a backend mode, in display order.
    pub fn for_mode(mode: BackendMode) -> &'static [FormField] {
        match mode {
            BackendMode::Symbol => &[
                FormField::Mode,
                FormField::Symbol,
                FormField::Months,
                FormField::Interval,
                FormField::InitialBalance,
            ],
            BackendMode::Params => &[
                FormField::Mode,
                FormField::InitialBalance,
                FormField::KNeighbors,
                FormField::Lookback,
                FormField::StopAtrMult,
                FormField::RiskPct,
            ],
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Busy,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Blocking message; any key dismisses it.
    Prompt(String),
    ErrorHistory,
    /// Path entry for the CSV file to upload.
    FileInput,
    Help,
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,
    pub locale: Locale,

    // Form
    pub form: FormState,
    pub field_cursor: usize,
    pub upload_path: Option<PathBuf>,
    pub symbols: Vec<String>,

    // Results
    pub result: Option<BacktestResult>,
    pub summary: Option<String>,
    pub ledger: Vec<LedgerRow>,
    pub ledger_scroll: usize,
    pub chart: ChartSlot,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    latest_seq: u64,
    in_flight: bool,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub path_input: String,

    /// Where `x` writes the ledger CSV.
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        form: FormState,
        locale: Locale,
        export_dir: PathBuf,
    ) -> Self {
        let symbols = vec![form.symbol.clone()];
        Self {
            running: true,
            locale,
            form,
            field_cursor: 0,
            upload_path: None,
            symbols,
            result: None,
            summary: None,
            ledger: Vec::new(),
            ledger_scroll: 0,
            chart: ChartSlot::new(),
            worker_tx,
            worker_rx,
            latest_seq: 0,
            in_flight: false,
            status_message: Some((locale.ready().to_string(), StatusLevel::Info)),
            error_history: VecDeque::with_capacity(MAX_ERROR_HISTORY),
            error_scroll: 0,
            overlay: Overlay::None,
            path_input: String::new(),
            export_dir,
        }
    }

    // ── Form ─────────────────────────────────────────────────────────

    pub fn visible_fields(&self) -> &'static [FormField] {
        FormField::for_mode(self.form.mode)
    }

    pub fn current_field(&self) -> FormField {
        let fields = self.visible_fields();
        fields[self.field_cursor.min(fields.len() - 1)]
    }

    pub fn next_field(&mut self) {
        let n = self.visible_fields().len();
        self.field_cursor = (self.field_cursor + 1) % n;
    }

    pub fn prev_field(&mut self) {
        let n = self.visible_fields().len();
        self.field_cursor = (self.field_cursor + n - 1) % n;
    }

    pub fn toggle_mode(&mut self) {
        self.form.mode = self.form.mode.toggled();
        self.field_cursor = 0;
        tracing::debug!(mode = self.form.mode.label(), "backend mode toggled");
    }

    /// Step the field under the cursor up (`+1`) or down (`-1`).
    pub fn adjust_field(&mut self, dir: i32) {
        let up = dir > 0;
        let field = self.current_field();
        if field == FormField::Mode {
            self.toggle_mode();
            return;
        }
        let form = &mut self.form;
        match field {
            FormField::Mode => {}
            FormField::Symbol => form.symbol = cycle(&self.symbols, &form.symbol, up),
            FormField::Months => form.months = cycle(&MONTH_CHOICES, &form.months, up),
            FormField::Interval => {
                form.interval = if up {
                    form.interval.next()
                } else {
                    form.interval.prev()
                };
            }
            FormField::InitialBalance => {
                let balance = match form.mode {
                    BackendMode::Symbol => &mut form.initial_balance,
                    BackendMode::Params => &mut form.params.initial_balance,
                };
                *balance = step_f64(*balance, 1.0, 1.0, up);
            }
            FormField::KNeighbors => {
                form.params.k_neighbors = step_u32(form.params.k_neighbors, 1, up);
            }
            FormField::Lookback => form.params.lookback = step_u32(form.params.lookback, 10, up),
            FormField::StopAtrMult => {
                form.params.stop_atr_mult = step_f64(form.params.stop_atr_mult, 0.1, 0.1, up);
            }
            FormField::RiskPct => {
                form.params.risk_pct = step_f64(form.params.risk_pct, 0.5, 0.5, up).min(100.0);
            }
        }
    }

    // ── Runs ─────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.in_flight
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Start a run or an upload.
    ///
    /// Input problems that need no file I/O are caught here and never reach
    /// the worker. Returns the sequence number of the dispatched run.
    pub fn dispatch(&mut self, action: Action) -> Option<u64> {
        if let Err(e) = self.precheck(action) {
            self.raise_prompt(&e);
            return None;
        }

        self.latest_seq += 1;
        let seq = self.latest_seq;
        let cmd = WorkerCommand::Run {
            seq,
            action,
            form: self.form.clone(),
            upload_path: self.upload_path.clone(),
        };
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Network,
                "worker thread is not running".into(),
                format!("{action:?}"),
            );
            return None;
        }
        self.in_flight = true;
        self.set_busy(self.locale.running());
        tracing::info!(seq, ?action, mode = self.form.mode.label(), "run dispatched");
        Some(seq)
    }

    fn precheck(&self, action: Action) -> Result<(), UserInputError> {
        match action {
            Action::Upload if self.upload_path.is_none() => Err(UserInputError::NoFileChosen),
            Action::Upload => Ok(()),
            // With no file attached this only validates the form.
            Action::Run => build_run_request(&self.form, None).map(drop),
        }
    }

    /// Apply a worker response. Returns `false` when it was stale and ignored.
    pub fn handle_response(&mut self, resp: WorkerResponse) -> bool {
        match resp {
            WorkerResponse::SymbolsLoaded(symbols) => {
                self.symbols_loaded(symbols);
                true
            }
            WorkerResponse::RunFinished {
                seq,
                action,
                outcome,
            } => self.apply_outcome(seq, action, outcome.map(|b| *b)),
        }
    }

    pub fn apply_outcome(
        &mut self,
        seq: u64,
        action: Action,
        outcome: Result<BacktestResult, RunError>,
    ) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "discarding stale result");
            return false;
        }
        self.in_flight = false;

        match outcome {
            Ok(result) => self.show_result(action, result),
            Err(RunError::Input(e)) => self.raise_prompt(&e),
            Err(e) => {
                let status = self.locale.error_status(&e);
                self.push_error(e.category(), status, format!("{action:?}"));
            }
        }
        true
    }

    fn show_result(&mut self, action: Action, result: BacktestResult) {
        let summary = self.locale.summary_line(&result.stats);
        self.ledger = ledger_rows(&result.trades);
        self.ledger_scroll = 0;
        self.chart.render(&result);
        self.summary = Some(format!(
            "{}  {}",
            summary,
            self.locale.balance_line(&result.stats)
        ));
        self.result = Some(result);

        match action {
            Action::Run => self.set_status(summary),
            Action::Upload => {
                self.set_status(self.locale.upload_done());
                self.overlay = Overlay::Prompt(self.locale.upload_done().to_string());
            }
        }
    }

    /// Block on a prompt; the status line shows the same text.
    pub fn raise_prompt(&mut self, err: &UserInputError) {
        let text = self.locale.prompt_text(err);
        tracing::info!(error = %err, "input prompt");
        self.overlay = Overlay::Prompt(text.clone());
        self.status_message = Some((text, StatusLevel::Warning));
    }

    pub fn symbols_loaded(&mut self, symbols: Vec<String>) {
        if symbols.is_empty() {
            return;
        }
        if !symbols.contains(&self.form.symbol) {
            self.form.symbol = symbols[0].clone();
        }
        tracing::info!(count = symbols.len(), "symbols loaded");
        self.symbols = symbols;
    }

    pub fn choose_file(&mut self, path: PathBuf) {
        self.set_status(format!("CSV: {}", path.display()));
        self.upload_path = Some(path);
    }

    /// Write every trade of the current result to `trades.csv`.
    pub fn export_ledger(&mut self) {
        let Some(result) = &self.result else {
            self.set_warning("nothing to export");
            return;
        };
        let path = self.export_dir.join("trades.csv");
        match export_ledger_csv(&result.trades)
            .and_then(|csv| std::fs::write(&path, csv).map_err(Into::into))
        {
            Ok(()) => self.set_status(format!("exported {}", path.display())),
            Err(e) => self.push_error(
                ErrorCategory::Input,
                format!("export failed: {e}"),
                path.display().to_string(),
            ),
        }
    }

    pub fn scroll_ledger(&mut self, delta: isize) {
        let max = self.ledger.len().saturating_sub(1);
        self.ledger_scroll = self.ledger_scroll.saturating_add_signed(delta).min(max);
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Push an error to the history, capping at [`MAX_ERROR_HISTORY`].
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        tracing::warn!(category = category.label(), %message, "dashboard error");
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > MAX_ERROR_HISTORY {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_busy(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Busy));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

fn cycle<T: Clone + PartialEq>(choices: &[T], current: &T, forward: bool) -> T {
    if choices.is_empty() {
        return current.clone();
    }
    let n = choices.len();
    let next = match choices.iter().position(|c| c == current) {
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
        None => 0,
    };
    choices[next].clone()
}

fn step_f64(value: f64, step: f64, min: f64, up: bool) -> f64 {
    let next = if up { value + step } else { value - step };
    // Keep one decimal so repeated steps do not accumulate float noise.
    ((next * 10.0).round() / 10.0).max(min)
}

fn step_u32(value: u32, step: u32, up: bool) -> u32 {
    if up {
        value.saturating_add(step)
    } else {
        value.saturating_sub(step).max(1)
    }
}
