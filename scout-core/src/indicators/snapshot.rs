//! IndicatorSnapshot: the four values classification reads, taken at the
//! most recent bar of one series.

use serde::{Deserialize, Serialize};

use super::{Adx, Indicator, Rsi, Sma};
use crate::domain::{Bar, PriceSeries};
use crate::error::InsufficientData;

pub const RSI_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const TREND_SMA_PERIOD: usize = 200;

/// Bars required before a series is evaluated at all.
pub const MIN_HISTORY: usize = 205;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub rsi: f64,
    pub adx: f64,
    pub sma200: f64,
}

impl IndicatorSnapshot {
    /// Evaluate every indicator over the full history and keep the last point.
    ///
    /// Fails when the series is shorter than `min_history` or any of the four
    /// values is undefined at the latest bar.
    pub fn from_series(series: &PriceSeries, min_history: usize) -> Result<Self, InsufficientData> {
        let need = min_history.max(TREND_SMA_PERIOD);
        if series.len() < need {
            return Err(InsufficientData::TooFewBars {
                have: series.len(),
                need,
            });
        }

        let bars = series.bars();
        let price = series
            .last()
            .map(|b| b.close)
            .filter(|v| v.is_finite())
            .ok_or(InsufficientData::UndefinedIndicator { name: "price" })?;

        Ok(Self {
            price,
            rsi: latest_defined("rsi", &Rsi::new(RSI_PERIOD), bars)?,
            adx: latest_defined("adx", &Adx::new(ADX_PERIOD), bars)?,
            sma200: latest_defined("sma200", &Sma::new(TREND_SMA_PERIOD), bars)?,
        })
    }
}

fn latest_defined(
    name: &'static str,
    indicator: &dyn Indicator,
    bars: &[Bar],
) -> Result<f64, InsufficientData> {
    indicator
        .latest(bars)
        .filter(|v| v.is_finite())
        .ok_or(InsufficientData::UndefinedIndicator { name })
}
