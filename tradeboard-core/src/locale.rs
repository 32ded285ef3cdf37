//! User-facing strings. Arabic is the default, matching the dashboard's
//! original audience; English is available for logs-as-UI and scripting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Stats;
use crate::error::{RunError, UserInputError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ar,
    En,
}

impl Locale {
    /// Status text while a run is in flight.
    pub fn running(self) -> &'static str {
        match self {
            Locale::Ar => "جاري المحاكاة...",
            Locale::En => "Running backtest...",
        }
    }

    /// Prepended to every gateway/schema error on the status line.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Locale::Ar => "خطأ: ",
            Locale::En => "Error: ",
        }
    }

    pub fn upload_required(self) -> &'static str {
        match self {
            Locale::Ar => "اختر ملف CSV ثم اضغط رفع CSV ثم نفّذ المحاكاة.",
            Locale::En => "Choose a CSV file, upload it, then run the backtest.",
        }
    }

    pub fn upload_done(self) -> &'static str {
        match self {
            Locale::Ar => "تم رفع ملف CSV وتنفيذ المحاكاة. النتائج معروضة.",
            Locale::En => "CSV uploaded and simulated. See results in UI.",
        }
    }

    pub fn ready(self) -> &'static str {
        match self {
            Locale::Ar => "جاهز",
            Locale::En => "Ready",
        }
    }

    /// Text for the blocking prompt raised by an input problem.
    pub fn prompt_text(self, err: &UserInputError) -> String {
        match err {
            UserInputError::UploadRequired => self.upload_required().to_string(),
            other => other.to_string(),
        }
    }

    /// Status line for a failed run.
    pub fn error_status(self, err: &RunError) -> String {
        match err {
            RunError::Input(e) => self.prompt_text(e),
            other => format!("{}{}", self.error_prefix(), other.user_message()),
        }
    }

    /// One-line run summary.
    pub fn summary_line(self, stats: &Stats) -> String {
        let win_rate = stats
            .win_rate_pct
            .map(|w| format!("{w:.2}%"))
            .unwrap_or_else(|| "-".to_string());
        match self {
            Locale::Ar => format!(
                "البداية ${} | النهاية ${} | صفقات: {} | فوز: {} | خسارة: {} | نسبة فوز: {}",
                stats.initial_balance,
                stats.final_balance,
                stats.trade_count,
                stats.wins,
                stats.losses,
                win_rate
            ),
            Locale::En => format!(
                "Start ${} | End ${} | Trades: {} | Wins: {} | Losses: {} | Win rate: {}",
                stats.initial_balance,
                stats.final_balance,
                stats.trade_count,
                stats.wins,
                stats.losses,
                win_rate
            ),
        }
    }

    pub fn balance_line(self, stats: &Stats) -> String {
        match self {
            Locale::Ar => format!("الرصيد: ${}", stats.final_balance),
            Locale::En => format!("Balance: ${}", stats.final_balance),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::Ar => "ar",
            Locale::En => "en",
        })
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ar" => Ok(Locale::Ar),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}
