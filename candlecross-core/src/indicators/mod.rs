//! Indicator implementations.
//!
//! Indicators here are pure functions of a bar series. They read only the most
//! recent suffix of the series and never mutate it.

pub mod sma;

pub use sma::{average, Sma};

use thiserror::Error;

/// Errors from indicator computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// Not enough history for the requested window. Not transient: wait for more bars.
    #[error("insufficient data: window {window} needs {window} bars, {available} available")]
    InsufficientData { window: usize, available: usize },

    #[error("window must be at least 1")]
    ZeroWindow,
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, one bar per day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "TEST".to_string(),
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
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
