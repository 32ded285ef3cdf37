//! Run form: backend mode, market or strategy fields, chosen CSV.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use tradeboard_core::request::{BackendMode, FormState};

use crate::app::{AppState, FormField};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let busy = app.is_running();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(!busy))
        .title(" Backtest ")
        .title_style(theme::panel_title(!busy));

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        "[j/k]field [h/l]change",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    let current = app.current_field();
    for &field in app.visible_fields() {
        let selected = field == current;
        lines.push(Line::from(vec![
            Span::styled(format!("{:>9}: ", field.label()), theme::muted()),
            Span::styled(
                format!("< {} >", field_value(&app.form, field)),
                theme::selected_field(selected),
            ),
        ]));
    }

    lines.push(Line::from(""));
    let file = app
        .upload_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    lines.push(Line::from(vec![
        Span::styled("      CSV: ", theme::muted()),
        Span::styled(file, theme::neutral()),
    ]));

    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

/// Display text for one form field.
pub fn field_value(form: &FormState, field: FormField) -> String {
    match field {
        FormField::Mode => form.mode.label().to_string(),
        FormField::Symbol => form.symbol.clone(),
        FormField::Months if form.months == 0 => "CSV".to_string(),
        FormField::Months => form.months.to_string(),
        FormField::Interval => form.interval.as_str().to_string(),
        FormField::InitialBalance => {
            let balance = match form.mode {
                BackendMode::Symbol => form.initial_balance,
                BackendMode::Params => form.params.initial_balance,
            };
            format!("{balance:.1}")
        }
        FormField::KNeighbors => form.params.k_neighbors.to_string(),
        FormField::Lookback => form.params.lookback.to_string(),
        FormField::StopAtrMult => format!("{:.1}", form.params.stop_atr_mult),
        FormField::RiskPct => format!("{:.1}", form.params.risk_pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_zero_reads_as_csv() {
        let mut form = FormState::default();
        form.months = 0;
        assert_eq!(field_value(&form, FormField::Months), "CSV");
        form.months = 3;
        assert_eq!(field_value(&form, FormField::Months), "3");
    }

    #[test]
    fn balance_follows_mode() {
        let mut form = FormState::default();
        form.initial_balance = 10.0;
        form.params.initial_balance = 25.0;
        assert_eq!(field_value(&form, FormField::InitialBalance), "10.0");
        form.mode = BackendMode::Params;
        assert_eq!(field_value(&form, FormField::InitialBalance), "25.0");
    }
}
