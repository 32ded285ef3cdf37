//! Trade ledger panel: the most recent trades, newest first.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use tradeboard_core::ledger::{LedgerRow, LEDGER_COLUMNS};

use crate::theme::Theme;

pub struct TradeLedgerPanel<'a> {
    rows: &'a [LedgerRow],
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> TradeLedgerPanel<'a> {
    pub fn new(rows: &'a [LedgerRow], scroll: usize, theme: &'a Theme) -> Self {
        Self {
            rows,
            scroll,
            theme,
        }
    }
}

impl<'a> Widget for TradeLedgerPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" Trades ({}) ", self.rows.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let header_cells = LEDGER_COLUMNS.iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
        });
        let header = Row::new(header_cells).height(1);

        let start = self.scroll.min(self.rows.len());
        let rows = self.rows[start..].iter().map(|row| {
            let [time, entry, exit, profit, balance, reason] = row.cells();
            let cells = vec![
                Cell::from(time.to_string()),
                Cell::from(entry.to_string()),
                Cell::from(exit.to_string()),
                Cell::from(profit.to_string())
                    .style(Style::default().fg(self.theme.tone_color(row.tone))),
                Cell::from(balance.to_string()),
                Cell::from(reason.to_string()),
            ];
            Row::new(cells)
                .style(Style::default().fg(self.theme.text_primary))
                .height(1)
        });

        let widths = [
            Constraint::Length(19),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(8),
        ];

        Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::buffer_text;
    use chrono::DateTime;
    use ratatui::style::Color;
    use tradeboard_core::ledger::ledger_rows;
    use tradeboard_core::Trade;

    fn trade(minute: i64, profit: Option<f64>) -> Trade {
        Trade {
            time: DateTime::from_timestamp_millis(minute * 60_000).unwrap(),
            display_time: None,
            entry: Some(100.0),
            exit: Some(101.0),
            profit,
            balance_after: Some(10.0),
            reason: "tp".into(),
        }
    }

    /// Cell position where `needle` starts, scanning row by row.
    fn find(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
        let area = buf.area;
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let rest: String = (x..area.right())
                    .filter_map(|cx| buf.cell((cx, y)).map(|c| c.symbol().to_string()))
                    .collect();
                if rest.starts_with(needle) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    #[test]
    fn header_and_count() {
        let theme = Theme::default();
        let rows = ledger_rows(&[trade(1, Some(0.5)), trade(2, Some(-0.5))]);
        let area = Rect::new(0, 0, 100, 10);
        let mut buf = Buffer::empty(area);
        TradeLedgerPanel::new(&rows, 0, &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Trades (2)"));
        assert!(text.contains("balance_after"));
        assert!(text.contains("reason"));
    }

    #[test]
    fn loss_is_colored_negative() {
        let theme = Theme::default();
        let rows = ledger_rows(&[trade(1, Some(-0.25))]);
        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        TradeLedgerPanel::new(&rows, 0, &theme).render(area, &mut buf);

        let (x, y) = find(&buf, "-0.250000").expect("profit cell rendered");
        assert_eq!(buf.cell((x, y)).unwrap().fg, theme.negative);
    }

    #[test]
    fn missing_profit_is_plain() {
        let theme = Theme::default();
        let rows = ledger_rows(&[trade(1, None)]);
        assert_eq!(rows[0].tone, None);
        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        TradeLedgerPanel::new(&rows, 0, &theme).render(area, &mut buf);
        let (x, y) = find(&buf, "tp").expect("reason cell rendered");
        assert_eq!(buf.cell((x, y)).unwrap().fg, Color::White);
    }

    #[test]
    fn scroll_past_end_renders_empty_table() {
        let theme = Theme::default();
        let rows = ledger_rows(&[trade(1, Some(1.0))]);
        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        TradeLedgerPanel::new(&rows, 50, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Trades (1)"));
    }
}
