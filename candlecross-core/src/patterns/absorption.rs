//! Bullish absorption (engulfing) confirmation.
//!
//! Reads only the last two bars of a series. The latest bar must rise
//! (close > open); with `require_engulfing` its body must also cover the
//! previous bar's body: `latest.open <= previous.close && latest.close >= previous.open`.
//!
//! Both checks sit behind switches so either historical behaviour is selectable:
//! `strict_bullish_check = false` treats every latest bar as rising.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Bar;

/// Switches controlling how strict the confirmation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Require close > open on the latest bar. When false, every bar counts as rising.
    pub strict_bullish_check: bool,
    /// Additionally require the latest body to engulf the previous body.
    pub require_engulfing: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            strict_bullish_check: true,
            require_engulfing: false,
        }
    }
}

/// Pure classifier over the tail of a bar series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandlePatternClassifier {
    config: PatternConfig,
}

impl CandlePatternClassifier {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Whether `bar` counts as rising under the current switches.
    pub fn is_bullish(&self, bar: &Bar) -> bool {
        !self.config.strict_bullish_check || bar.is_bullish()
    }

    /// Latest body engulfs the previous body in the bullish direction.
    pub fn is_engulfing(previous: &Bar, latest: &Bar) -> bool {
        latest.open <= previous.close && latest.close >= previous.open
    }

    /// Entry confirmation: rising latest bar, plus engulfing when required.
    ///
    /// Fewer than two bars is not an error, the pattern simply does not apply.
    pub fn is_bullish_confirmation(&self, bars: &[Bar]) -> bool {
        let Some((previous, latest)) = last_two(bars) else {
            return false;
        };

        if !self.is_bullish(latest) {
            return false;
        }

        if !self.config.require_engulfing {
            return true;
        }

        let engulfing = Self::is_engulfing(previous, latest);
        if engulfing {
            debug!(
                symbol = %latest.symbol,
                previous_ts = %previous.timestamp,
                latest_ts = %latest.timestamp,
                latest_open = latest.open,
                previous_close = previous.close,
                latest_close = latest.close,
                previous_open = previous.open,
                "bullish absorption detected"
            );
        }
        engulfing
    }

    /// Exit confirmation: the latest bar is not rising.
    ///
    /// Needs two bars like the entry check; on shorter history weakness is unconfirmed.
    pub fn is_weakness_confirmed(&self, bars: &[Bar]) -> bool {
        match last_two(bars) {
            Some((_, latest)) => !self.is_bullish(latest),
            None => false,
        }
    }
}

fn last_two(bars: &[Bar]) -> Option<(&Bar, &Bar)> {
    match bars {
        [.., previous, latest] => Some((previous, latest)),
        _ => None,
    }
}
