//! Indicator library: SMA, RSI, ATR, ADX.
//!
//! Every indicator exists in two forms:
//! - a free function over column slices (`sma(&closes, 200)`), and
//! - a named struct implementing [`Indicator`] over a bar history.
//!
//! Output series have the same length as the input. Warmup positions and
//! points where a division guard fired are `f64::NAN` ("undefined"); callers
//! must check `is_nan()` rather than assume a value exists.
//!
//! Smoothing is an exponential average with factor `1/period`, seeded with the
//! first defined input and run from the first bar. Values inside the warmup
//! window are masked as undefined.

pub mod adx;
pub mod atr;
pub mod rsi;
pub mod sma;
pub mod snapshot;

pub use adx::{adx, Adx};
pub use atr::{atr, true_range, wilder_smooth, Atr};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};
pub use snapshot::{IndicatorSnapshot, ADX_PERIOD, MIN_HISTORY, RSI_PERIOD, TREND_SMA_PERIOD};

use crate::domain::Bar;

/// Trait for indicators computed over a full bar history.
///
/// No value at bar t may depend on data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_200", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars whose output is undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Value at the most recent bar, if defined.
    fn latest(&self, bars: &[Bar]) -> Option<f64> {
        self.compute(bars).last().copied().filter(|v| !v.is_nan())
    }
}

/// Overwrite the first `lookback` values with NaN.
pub(crate) fn mask_warmup(values: &mut [f64], lookback: usize) {
    for v in values.iter_mut().take(lookback) {
        *v = f64::NAN;
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
