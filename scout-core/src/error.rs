//! Recoverable per-ticker errors raised by the engine.

use thiserror::Error;

/// A ticker cannot be evaluated from its price history. The ticker is skipped
/// and counted; it is never given a default value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsufficientData {
    #[error("only {have} bars of history, need {need}")]
    TooFewBars { have: usize, need: usize },

    #[error("{name} is undefined at the latest bar")]
    UndefinedIndicator { name: &'static str },
}

impl InsufficientData {
    /// Short label for grouping skip counts.
    pub fn kind(&self) -> &'static str {
        match self {
            InsufficientData::TooFewBars { .. } => "too_few_bars",
            InsufficientData::UndefinedIndicator { .. } => "undefined_indicator",
        }
    }
}
