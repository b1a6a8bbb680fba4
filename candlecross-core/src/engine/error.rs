//! Errors returned by one signal evaluation.

use std::fmt;

use thiserror::Error;

use crate::indicators::IndicatorError;
use crate::providers::HistoryError;

/// Which way the crossover contradicted the position flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InconsistencyKind {
    /// Short average above long average while already holding a long.
    BuyWhileInvested,
    /// Short average at or below long average while holding nothing.
    SellWhileNotInvested,
}

impl fmt::Display for InconsistencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InconsistencyKind::BuyWhileInvested => f.write_str("buy signal but already invested"),
            InconsistencyKind::SellWhileNotInvested => f.write_str("sell signal but not invested"),
        }
    }
}

/// Failure of a single evaluation. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("insufficient data for '{symbol}': window {window} needs {window} bars, {available} available")]
    InsufficientData {
        symbol: String,
        window: usize,
        available: usize,
    },

    #[error("{kind} in {symbol}, no signal created (sma_short={sma_short}, sma_long={sma_long})")]
    StateInconsistency {
        symbol: String,
        kind: InconsistencyKind,
        sma_short: f64,
        sma_long: f64,
    },

    #[error("indicator error for '{symbol}': {source}")]
    Indicator {
        symbol: String,
        #[source]
        source: IndicatorError,
    },

    #[error("history provider failed for '{symbol}': {source}")]
    History {
        symbol: String,
        #[source]
        source: HistoryError,
    },
}

impl SignalError {
    /// Attach the symbol to an indicator failure.
    pub(crate) fn from_indicator(symbol: &str, err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { window, available } => {
                SignalError::InsufficientData {
                    symbol: symbol.to_string(),
                    window,
                    available,
                }
            }
            other => SignalError::Indicator {
                symbol: symbol.to_string(),
                source: other,
            },
        }
    }

    /// True when waiting for more bars will make the evaluation valid.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SignalError::InsufficientData { .. })
    }

    pub fn is_inconsistency(&self) -> bool {
        matches!(self, SignalError::StateInconsistency { .. })
    }

    pub fn symbol(&self) -> &str {
        match self {
            SignalError::InsufficientData { symbol, .. }
            | SignalError::StateInconsistency { symbol, .. }
            | SignalError::Indicator { symbol, .. }
            | SignalError::History { symbol, .. } => symbol,
        }
    }
}
