//! Signal — the directional intent handed to the execution layer.
//!
//! A signal describes what the strategy wants to do with one symbol at one bar.
//! It carries no size and no order type: turning it into an order belongs to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directional intent of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    /// Nothing to do on this bar.
    #[default]
    None,
    /// Open a long position.
    LongEntry,
    /// Close the open long position.
    LongExit,
}

impl SignalDirection {
    /// Whether this direction asks the execution layer to act.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalDirection::None)
    }

    /// Check the direction against the current position flag.
    ///
    /// Entries are only valid while flat, exits only while invested.
    pub fn is_consistent_with(&self, invested: bool) -> bool {
        match self {
            SignalDirection::None => true,
            SignalDirection::LongEntry => !invested,
            SignalDirection::LongExit => invested,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::None => "none",
            SignalDirection::LongEntry => "long_entry",
            SignalDirection::LongExit => "long_exit",
        }
    }
}

impl std::fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluation's output. Produced fresh per bar; ownership passes to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub direction: SignalDirection,
}

impl Signal {
    /// A signal with no direction for the given bar.
    pub fn none(symbol: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            direction: SignalDirection::None,
        }
    }

    pub fn with_direction(mut self, direction: SignalDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn is_entry(&self) -> bool {
        self.direction == SignalDirection::LongEntry
    }

    pub fn is_exit(&self) -> bool {
        self.direction == SignalDirection::LongExit
    }
}
