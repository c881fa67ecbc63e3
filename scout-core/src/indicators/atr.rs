//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first
//! bar has no previous close and uses high-low.
//! ATR is the true range smoothed with alpha = 1/period.
//! Lookback: period.

use super::{mask_warmup, Indicator};
use crate::domain::Bar;

/// Exponential smoothing with alpha = 1/period, seeded with the first defined value.
///
/// NaN inputs leave the running average untouched; the output at such a point
/// carries the previous average (or NaN before the seed). The average does not
/// decay across a gap: the next defined value is blended with the last state
/// at weight alpha, however many points were skipped. Only ADX sees gaps, after
/// stretches where DX is undefined.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 {
        return result;
    }

    let alpha = 1.0 / period as f64;
    let mut state: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if !v.is_nan() {
            state = Some(match state {
                None => v,
                Some(prev) => alpha * v + (1.0 - alpha) * prev,
            });
        }
        if let Some(s) = state {
            result[i] = s;
        }
    }

    result
}

/// Compute the True Range series from high/low/close columns.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = high[0] - low[0];
    for i in 1..n {
        let (h, l, pc) = (high[i], low[i], close[i - 1]);
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Smoothed true range without warmup masking. ADX divides by this series.
pub(crate) fn smoothed_true_range(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Vec<f64> {
    wilder_smooth(&true_range(high, low, close), period)
}

/// Average True Range over `period` bars.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let mut result = smoothed_true_range(high, low, close, period);
    mask_warmup(&mut result, period);
    result
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        atr(&high, &low, &close, self.period)
    }
}
