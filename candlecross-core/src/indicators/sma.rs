//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the closing prices of the most recent `window` bars.

use super::IndicatorError;
use crate::domain::Bar;
use crate::metrics::metric_key;

/// Mean close of the last `window` bars of `bars` (the window nearest "now").
///
/// Fails with [`IndicatorError::InsufficientData`] when `bars.len() < window`.
pub fn average(window: usize, bars: &[Bar]) -> Result<f64, IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::ZeroWindow);
    }
    if bars.len() < window {
        return Err(IndicatorError::InsufficientData {
            window,
            available: bars.len(),
        });
    }

    let recent = &bars[bars.len() - window..];
    let sum: f64 = recent.iter().map(|b| b.close).sum();
    Ok(sum / window as f64)
}

/// A configured SMA: window size plus the metric key its values are recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sma {
    window: usize,
    key: String,
}

impl Sma {
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        if window == 0 {
            return Err(IndicatorError::ZeroWindow);
        }
        Ok(Self {
            window,
            key: metric_key(window),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Metrics key, e.g. `SMA20`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value at the end of `bars`.
    pub fn value(&self, bars: &[Bar]) -> Result<f64, IndicatorError> {
        average(self.window, bars)
    }
}
