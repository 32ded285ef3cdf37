//! TradeBoard TUI: backtest form, summary, trade ledger and chart.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use tradeboard_core::logging::{init_logging, LogTarget};
use tradeboard_core::{HttpGateway, TradeboardConfig};
use tradeboard_tui::worker::{self, WorkerCommand};
use tradeboard_tui::{input, persistence, ui, AppState};

/// How long quitting waits for an in-flight request.
const WORKER_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradeboard");
    let config_path = config_dir.join("config.toml");
    let state_path = config_dir.join("state.json");

    let config = TradeboardConfig::load_or_default(&config_path)?;
    let log_path = config
        .ui
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("tradeboard.log"));
    init_logging(&config.ui.log_level, LogTarget::File(log_path))?;
    tracing::info!(
        server = %config.server.base_url,
        config = %config_path.display(),
        config_found = config_path.exists(),
        "starting dashboard"
    );

    let gateway = HttpGateway::new(&config.server.base_url, config.server.timeout())?;

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_handle = worker::spawn_worker(
        Box::new(gateway),
        config.defaults.candle_limit,
        cmd_rx,
        resp_tx,
        cancel.clone(),
    )
    .context("spawn worker thread")?;

    let export_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut app = AppState::new(
        cmd_tx.clone(),
        resp_rx,
        config.initial_form(),
        config.ui.locale,
        export_dir,
    );
    persistence::apply(&mut app, persistence::load(&state_path));

    // Populate the symbol list in the background.
    let _ = cmd_tx.send(WorkerCommand::FetchSymbols);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "could not save dashboard state");
    }

    // Restore terminal before waiting on the worker.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Queued runs are dropped; a request still on the wire is not waited for.
    worker::stop_worker(worker_handle, &cancel, &cmd_tx, WORKER_GRACE);

    tracing::info!("dashboard closed");
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
            app.handle_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
