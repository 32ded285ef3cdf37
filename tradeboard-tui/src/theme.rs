//! Parrot/neon theme tokens for the TradeBoard dashboard.
//!
//! # Color Palette
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (focus, titles)
//! - **Positive**: neon green (non-losing trades, up candles)
//! - **Negative**: hot pink (losses, down candles, errors)
//! - **Warning**: neon orange (running state, stale notices)
//! - **Muted**: steel blue (labels, hints)
//!
//! Widgets that take a `&Theme` read colors from it; the free functions below
//! are ready-made styles for the frame-level UI code.

use ratatui::style::{Color, Modifier, Style};

use tradeboard_core::ledger::ProfitTone;

/// Parrot/neon theme
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Profit cell color. Trades without a profit figure use plain text.
    pub fn tone_color(&self, tone: Option<ProfitTone>) -> Color {
        match tone {
            Some(ProfitTone::NonLoss) => self.positive,
            Some(ProfitTone::Loss) => self.negative,
            None => self.text_primary,
        }
    }

    /// Candle color: up (close ≥ open) is positive.
    pub fn candle_color(&self, is_up: bool) -> Color {
        if is_up {
            self.positive
        } else {
            self.negative
        }
    }
}

fn palette() -> Theme {
    Theme::parrot_neon()
}

pub fn accent() -> Style {
    Style::default().fg(palette().accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(palette().muted)
}

pub fn neutral() -> Style {
    Style::default().fg(palette().neutral)
}

pub fn warning() -> Style {
    Style::default().fg(palette().warning)
}

pub fn negative() -> Style {
    Style::default().fg(palette().negative)
}

pub fn positive() -> Style {
    Style::default().fg(palette().positive)
}

pub fn text() -> Style {
    Style::default().fg(palette().text_primary)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Highlight for the form field under the cursor.
pub fn selected_field(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(palette().text_primary)
            .bg(palette().neutral)
            .add_modifier(Modifier::BOLD)
    } else {
        text()
    }
}
