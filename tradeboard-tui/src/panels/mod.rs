//! Dashboard panels. Each one is a ratatui `Widget` over borrowed data.

pub mod candle_chart;
pub mod equity_chart;
pub mod trade_ledger;

pub use candle_chart::CandleChartPanel;
pub use equity_chart::EquityChartPanel;
pub use trade_ledger::TradeLedgerPanel;

#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell((x, y)) {
                content.push_str(cell.symbol());
            }
        }
        content.push('\n');
    }
    content
}
