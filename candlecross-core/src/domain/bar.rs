//! Bar — the fundamental market data unit, plus the event wrapper the engine evaluates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when constructing a bar from raw values.
#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bar for '{symbol}' at {timestamp} has a non-finite {field}: {value}")]
    NonFinite {
        symbol: String,
        timestamp: DateTime<Utc>,
        field: &'static str,
        value: f64,
    },
}

/// OHLC bar for a single symbol at a single timestamp.
///
/// Immutable once produced by the data source. Derived indicator values live on
/// [`BarEvent`], never on the bar itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// Build a bar, rejecting NaN and infinite prices.
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Result<Self, BarError> {
        let bar = Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
        };
        bar.check_finite()?;
        Ok(bar)
    }

    /// Fail with the first non-finite OHLC field, if any.
    pub fn check_finite(&self) -> Result<(), BarError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        match fields.into_iter().find(|(_, v)| !v.is_finite()) {
            Some((field, value)) => Err(BarError::NonFinite {
                symbol: self.symbol.clone(),
                timestamp: self.timestamp,
                field,
                value,
            }),
            None => Ok(()),
        }
    }

    /// Basic OHLC sanity check: the high/low range contains the body.
    pub fn is_sane(&self) -> bool {
        if self.check_finite().is_err() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// Rising bar: close strictly above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Falling bar: close strictly below open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn body_low(&self) -> f64 {
        self.open.min(self.close)
    }

    pub fn body_high(&self) -> f64 {
        self.open.max(self.close)
    }
}

/// The triggering input of one evaluation: a bar plus a writable metrics annotation.
///
/// The engine records derived indicator values (e.g. `SMA10`) here. Keys are kept
/// in a `BTreeMap` so exports list them in a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEvent {
    pub bar: Bar,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl BarEvent {
    pub fn new(bar: Bar) -> Self {
        Self {
            bar,
            metrics: BTreeMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.bar.symbol
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.bar.timestamp
    }

    /// Look up a recorded metric by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

impl From<Bar> for BarEvent {
    fn from(bar: Bar) -> Self {
        Self::new(bar)
    }
}
