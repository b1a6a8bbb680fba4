//! In-memory collaborators: per-symbol bar history and a position-flag portfolio.
//!
//! These back the replay driver and the tests. A live deployment would put a
//! database or broker behind the same traits.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use crate::domain::{Bar, Signal, SignalDirection, Symbol};
use crate::providers::{HistoryError, HistoryProvider, PortfolioState};

/// Append-only bar series per symbol, oldest first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    series: HashMap<Symbol, Vec<Bar>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bar. Timestamps must be strictly increasing per symbol.
    pub fn push(&mut self, bar: Bar) -> Result<(), HistoryError> {
        let series = self.series.entry(bar.symbol.clone()).or_default();
        if let Some(last) = series.last() {
            if bar.timestamp <= last.timestamp {
                return Err(HistoryError::OutOfOrder {
                    symbol: bar.symbol,
                    last: last.timestamp,
                    incoming: bar.timestamp,
                });
            }
        }
        series.push(bar);
        Ok(())
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, Vec::len)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl HistoryProvider for InMemoryHistory {
    fn list(&self, symbol: &str) -> Result<Cow<'_, [Bar]>, HistoryError> {
        self.series
            .get(symbol)
            .map(|bars| Cow::Borrowed(bars.as_slice()))
            .ok_or_else(|| HistoryError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }
}

/// Long-only position flags.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortfolio {
    invested: HashSet<Symbol>,
}

impl InMemoryPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_invested(&mut self, symbol: &str, invested: bool) {
        if invested {
            self.invested.insert(symbol.to_string());
        } else {
            self.invested.remove(symbol);
        }
    }

    /// Treat a signal as filled: entries open the position, exits close it.
    pub fn apply(&mut self, signal: &Signal) {
        match signal.direction {
            SignalDirection::LongEntry => self.set_invested(&signal.symbol, true),
            SignalDirection::LongExit => self.set_invested(&signal.symbol, false),
            SignalDirection::None => {}
        }
    }

    pub fn open_positions(&self) -> usize {
        self.invested.len()
    }
}

impl PortfolioState for InMemoryPortfolio {
    fn is_invested(&self, symbol: &str) -> bool {
        self.invested.contains(symbol)
    }
}
