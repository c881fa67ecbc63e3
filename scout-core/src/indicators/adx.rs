//! ADX: Average Directional Index.
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars, keeping only the dominant one
//! 2. Smooth +DM, -DM, and TR with alpha = 1/period
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = smoothed DX
//!
//! DX is undefined where smoothed TR is zero or +DI + -DI is zero; the ADX
//! smoother skips those points.
//!
//! Lookback: 2 * period.

use super::atr::{smoothed_true_range, wilder_smooth};
use super::{mask_warmup, Indicator};
use crate::domain::Bar;

/// ADX over high/low/close columns.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    if n < 2 || period == 0 {
        return vec![f64::NAN; n];
    }

    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let atr = smoothed_true_range(&high[..n], &low[..n], &close[..n], period);
    let plus_avg = wilder_smooth(&plus_dm, period);
    let minus_avg = wilder_smooth(&minus_dm, period);

    let dx: Vec<f64> = (0..n)
        .map(|i| directional_index(atr[i], plus_avg[i], minus_avg[i]))
        .collect();

    let mut result = wilder_smooth(&dx, period);
    mask_warmup(&mut result, 2 * period);
    result
}

fn directional_index(atr: f64, plus_avg: f64, minus_avg: f64) -> f64 {
    if atr.is_nan() || plus_avg.is_nan() || minus_avg.is_nan() || atr == 0.0 {
        return f64::NAN;
    }
    let plus_di = 100.0 * plus_avg / atr;
    let minus_di = 100.0 * minus_avg / atr;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return f64::NAN;
    }
    100.0 * (plus_di - minus_di).abs() / di_sum
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        adx(&high, &low, &close, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn adx_lookback() {
        assert_eq!(Adx::new(14).lookback(), 28);
        assert_eq!(Adx::new(14).name(), "adx_14");
    }

    #[test]
    fn adx_steady_uptrend_is_100() {
        // every bar: up move 1, down move -1 → only +DM, DX = 100 throughout
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let result = Adx::new(14).compute(&bars);
        for v in result.iter().take(28) {
            assert!(v.is_nan());
        }
        assert_approx(result[79], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn adx_flat_bars_are_undefined_not_panic() {
        // zero range and no directional movement → ATR 0, DX undefined everywhere
        let flat = vec![100.0; 40];
        let result = adx(&flat, &flat, &flat, 14);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn adx_no_direction_with_range_is_undefined() {
        // constant range 99..101, no highs/lows change → DI sum 0
        let high = vec![101.0; 40];
        let low = vec![99.0; 40];
        let close = vec![100.0; 40];
        let result = adx(&high, &low, &close, 14);
        assert!(result[39].is_nan());
    }

    #[test]
    fn adx_defined_after_trend_pauses() {
        // trend, then a flat stretch with no directional movement
        let mut high: Vec<f64> = (0..40).map(|i| 101.0 + i as f64).collect();
        let mut low: Vec<f64> = (0..40).map(|i| 99.0 + i as f64).collect();
        high.extend(std::iter::repeat(140.0).take(5));
        low.extend(std::iter::repeat(138.0).take(5));
        let close: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        let result = adx(&high, &low, &close, 14);
        assert!(!result[44].is_nan());
    }

    #[test]
    fn adx_bounded() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 8.0)
            .collect();
        let bars = make_bars(&closes);
        for v in Adx::new(14).compute(&bars).iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "adx out of range: {v}");
        }
    }
}
