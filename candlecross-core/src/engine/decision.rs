//! Crossover-vs-position decision table.
//!
//! A pure function of the averages' relationship, the position flag and two
//! lazily evaluated pattern predicates. Predicates run only in the branches that
//! read them.

use super::error::InconsistencyKind;
use crate::domain::SignalDirection;

/// Relationship between the short and long moving averages on the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    ShortAboveLong,
    ShortAtOrBelowLong,
}

impl Trend {
    pub fn from_averages(sma_short: f64, sma_long: f64) -> Self {
        if sma_short > sma_long {
            Trend::ShortAboveLong
        } else {
            Trend::ShortAtOrBelowLong
        }
    }
}

/// Gates applied on top of the base table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRules {
    pub require_ma_cross_for_entry: bool,
    pub require_weak_candle_for_exit: bool,
}

impl Default for DecisionRules {
    fn default() -> Self {
        Self {
            require_ma_cross_for_entry: true,
            require_weak_candle_for_exit: true,
        }
    }
}

/// Outcome of the table before it is turned into a `Signal` or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Direction(SignalDirection),
    Inconsistent(InconsistencyKind),
}

/// Apply the decision table.
///
/// | trend | invested | result |
/// |---|---|---|
/// | above | yes | inconsistent (buy while invested) |
/// | above | no | entry if `entry_confirmed` |
/// | at/below | yes | exit if `weakness_confirmed`, else hold |
/// | at/below | no | inconsistent (sell while not invested) |
///
/// Without `require_ma_cross_for_entry` the flat rows ignore the trend and follow
/// `entry_confirmed` alone. Without `require_weak_candle_for_exit` the exit row
/// fires on the trend alone.
pub fn decide(
    trend: Trend,
    invested: bool,
    rules: DecisionRules,
    entry_confirmed: impl FnOnce() -> bool,
    weakness_confirmed: impl FnOnce() -> bool,
) -> Decision {
    match (trend, invested) {
        (Trend::ShortAboveLong, true) => Decision::Inconsistent(InconsistencyKind::BuyWhileInvested),
        (Trend::ShortAtOrBelowLong, true) => {
            if !rules.require_weak_candle_for_exit || weakness_confirmed() {
                Decision::Direction(SignalDirection::LongExit)
            } else {
                Decision::Direction(SignalDirection::None)
            }
        }
        (Trend::ShortAtOrBelowLong, false) if rules.require_ma_cross_for_entry => {
            Decision::Inconsistent(InconsistencyKind::SellWhileNotInvested)
        }
        (_, false) => {
            if entry_confirmed() {
                Decision::Direction(SignalDirection::LongEntry)
            } else {
                Decision::Direction(SignalDirection::None)
            }
        }
    }
}
