//! Top-level UI layout: form, summary, chart + ledger, status bar.

pub mod form_panel;
pub mod overlays;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use tradeboard_core::chart::ChartSeries;

use crate::app::{AppState, Overlay};
use crate::panels::{CandleChartPanel, EquityChartPanel, TradeLedgerPanel};
use crate::theme::{self, Theme};

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());
    let main_area = chunks[0];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(main_area);

    form_panel::render(f, columns[0], app);
    draw_results(f, columns[1], app);
    draw_summary(f, chunks[1], app);
    status_bar::render(f, chunks[2], app);

    match &app.overlay {
        Overlay::Prompt(text) => overlays::render_prompt(f, main_area, text),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::FileInput => overlays::render_file_input(f, main_area, &app.path_input),
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::None => {}
    }
}

/// Chart on top, ledger below.
fn draw_results(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let theme = Theme::default();

    match app.chart.instance() {
        Some(chart) => match &chart.series {
            ChartSeries::Candles(candles) => f.render_widget(
                CandleChartPanel::new(candles, &chart.title, &theme),
                rows[0],
            ),
            ChartSeries::Equity(points) => f.render_widget(
                EquityChartPanel::new(points, &chart.title, &theme),
                rows[0],
            ),
            ChartSeries::Empty => draw_placeholder(f, rows[0]),
        },
        None => draw_placeholder(f, rows[0]),
    }

    f.render_widget(
        TradeLedgerPanel::new(&app.ledger, app.ledger_scroll, &theme),
        rows[1],
    );
}

fn draw_placeholder(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Chart ")
        .title_style(theme::panel_title(false));
    let para = Paragraph::new(Span::styled("No chart data.", theme::muted())).block(block);
    f.render_widget(para, area);
}

fn draw_summary(f: &mut Frame, area: Rect, app: &AppState) {
    let text = app.summary.as_deref().unwrap_or("-");
    f.render_widget(Paragraph::new(Span::styled(text, theme::accent_bold())), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
