//! Collaborator traits the engine consumes.
//!
//! The engine never owns bar history or position state. It reads both through
//! these traits once per evaluation and treats a provider failure as its own.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Bar;

/// Errors from a history provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("no history for symbol '{symbol}'")]
    UnknownSymbol { symbol: String },

    #[error("bar for '{symbol}' at {incoming} is not after the last stored bar at {last}")]
    OutOfOrder {
        symbol: String,
        last: DateTime<Utc>,
        incoming: DateTime<Utc>,
    },

    #[error("history unavailable: {0}")]
    Unavailable(String),
}

/// Source of per-symbol bar history.
///
/// `list` returns every bar seen so far for `symbol`, oldest first, including
/// the bar currently being evaluated. Blocking is allowed.
pub trait HistoryProvider {
    fn list(&self, symbol: &str) -> Result<Cow<'_, [Bar]>, HistoryError>;
}

/// Current position flag per symbol, owned by the portfolio layer.
///
/// Read once per evaluation; callers must not assume it is stable between calls.
pub trait PortfolioState {
    fn is_invested(&self, symbol: &str) -> bool;
}
