//! Moving-average crossover engine with candle-pattern confirmation.
//!
//! One evaluation per bar event:
//! 1. SMA(short) over the symbol's history, recorded on the event.
//! 2. SMA(long), recorded on the event.
//! 3. Position flag read from the portfolio.
//! 4. Decision table, consulting the classifier only where needed.
//!
//! The engine holds configuration only. Concurrent evaluations for different
//! symbols are safe; same-symbol evaluations must be serialized by the caller.

use tracing::trace;

use super::decision::{decide, Decision, DecisionRules, Trend};
use super::error::SignalError;
use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{BarEvent, Signal};
use crate::indicators::Sma;
use crate::metrics::MetricsSink;
use crate::patterns::CandlePatternClassifier;
use crate::providers::{HistoryProvider, PortfolioState};

#[derive(Debug, Clone)]
pub struct CrossoverSignalEngine {
    config: StrategyConfig,
    short: Sma,
    long: Sma,
    classifier: CandlePatternClassifier,
}

impl CrossoverSignalEngine {
    /// Validate `config` and build the engine.
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let short = Sma::new(config.short_window).map_err(|_| ConfigError::ZeroWindow {
            field: "short_window",
        })?;
        let long = Sma::new(config.long_window).map_err(|_| ConfigError::ZeroWindow {
            field: "long_window",
        })?;
        let classifier = CandlePatternClassifier::new(config.pattern);
        Ok(Self {
            config,
            short,
            long,
            classifier,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Metrics keys this engine writes, short first.
    pub fn metric_keys(&self) -> [&str; 2] {
        [self.short.key(), self.long.key()]
    }

    /// Bars of history needed before an evaluation can succeed.
    pub fn warmup_bars(&self) -> usize {
        self.long.window()
    }

    fn rules(&self) -> DecisionRules {
        DecisionRules {
            require_ma_cross_for_entry: self.config.require_ma_cross_for_entry,
            require_weak_candle_for_exit: self.config.require_weak_candle_for_exit,
        }
    }

    /// Evaluate one bar event.
    ///
    /// `history` must already contain the event's bar. The short-window metric is
    /// written before the long window is computed, so an insufficient-data failure
    /// on the long window leaves the short metric in place.
    pub fn evaluate(
        &self,
        event: &mut BarEvent,
        history: &dyn HistoryProvider,
        portfolio: &dyn PortfolioState,
    ) -> Result<Signal, SignalError> {
        let symbol = event.bar.symbol.clone();
        let bars = history
            .list(&symbol)
            .map_err(|source| SignalError::History {
                symbol: symbol.clone(),
                source,
            })?;

        let sma_short = self
            .short
            .value(&bars)
            .map_err(|e| SignalError::from_indicator(&symbol, e))?;
        event.record(self.short.key(), sma_short);

        let sma_long = self
            .long
            .value(&bars)
            .map_err(|e| SignalError::from_indicator(&symbol, e))?;
        event.record(self.long.key(), sma_long);

        let invested = portfolio.is_invested(&symbol);
        let trend = Trend::from_averages(sma_short, sma_long);
        trace!(%symbol, sma_short, sma_long, invested, ?trend, "evaluating bar");

        let decision = decide(
            trend,
            invested,
            self.rules(),
            || self.classifier.is_bullish_confirmation(&bars),
            || self.classifier.is_weakness_confirmed(&bars),
        );

        match decision {
            Decision::Direction(direction) => {
                Ok(Signal::none(symbol, event.bar.timestamp).with_direction(direction))
            }
            Decision::Inconsistent(kind) => Err(SignalError::StateInconsistency {
                symbol,
                kind,
                sma_short,
                sma_long,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, SignalDirection};
    use crate::engine::InconsistencyKind;
    use crate::memory::{InMemoryHistory, InMemoryPortfolio};
    use crate::providers::HistoryError;
    use chrono::{Duration, TimeZone, Utc};
    use std::borrow::Cow;

    /// Bars from explicit (open, close) pairs, one per day.
    fn bars(pairs: &[(f64, f64)]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(open, close))| {
                Bar::new(
                    "TEST",
                    base + Duration::days(i as i64),
                    open,
                    open.max(close) + 1.0,
                    open.min(close) - 1.0,
                    close,
                )
                .unwrap()
            })
            .collect()
    }

    fn setup(pairs: &[(f64, f64)]) -> (InMemoryHistory, BarEvent) {
        let series = bars(pairs);
        let mut history = InMemoryHistory::new();
        for bar in &series {
            history.push(bar.clone()).unwrap();
        }
        let event = BarEvent::new(series.last().unwrap().clone());
        (history, event)
    }

    fn engine(config: StrategyConfig) -> CrossoverSignalEngine {
        CrossoverSignalEngine::new(config).unwrap()
    }

    fn portfolio(invested: bool) -> InMemoryPortfolio {
        let mut p = InMemoryPortfolio::new();
        p.set_invested("TEST", invested);
        p
    }

    // closes [10, 11, 9, 12, 14], last bar rising
    const RISING_TAIL: [(f64, f64); 5] = [
        (10.0, 10.0),
        (10.0, 11.0),
        (11.0, 9.0),
        (9.0, 12.0),
        (12.0, 14.0),
    ];

    // closes [14, 12, 13, 10, 9], last bar falling
    const FALLING_TAIL: [(f64, f64); 5] = [
        (14.0, 14.0),
        (14.0, 12.0),
        (12.0, 13.0),
        (13.0, 10.0),
        (10.0, 9.0),
    ];

    // closes [14, 12, 13, 10, 10.5], last bar rising, short still below long
    const RECOVERING_TAIL: [(f64, f64); 5] = [
        (14.0, 14.0),
        (14.0, 12.0),
        (12.0, 13.0),
        (13.0, 10.0),
        (10.0, 10.5),
    ];

    #[test]
    fn new_rejects_invalid_config() {
        assert!(CrossoverSignalEngine::new(StrategyConfig::with_windows(3, 2)).is_err());
        assert!(CrossoverSignalEngine::new(StrategyConfig::with_windows(0, 2)).is_err());
    }

    #[test]
    fn entry_on_cross_with_bullish_bar() {
        let (history, mut event) = setup(&RISING_TAIL);
        let signal = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(false))
            .unwrap();

        assert_eq!(signal.direction, SignalDirection::LongEntry);
        assert_eq!(signal.symbol, "TEST");
        assert_eq!(signal.timestamp, event.bar.timestamp);
        assert_eq!(event.metric("SMA2"), Some(13.0));
        let sma3 = event.metric("SMA3").unwrap();
        assert!((sma3 - 35.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn no_entry_when_pattern_absent() {
        let mut pairs = RISING_TAIL;
        // Last bar still closes at 14 but opens above it.
        pairs[4] = (15.0, 14.0);
        let (history, mut event) = setup(&pairs);
        let signal = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(false))
            .unwrap();
        assert_eq!(signal.direction, SignalDirection::None);
    }

    #[test]
    fn buy_while_invested_is_error() {
        let (history, mut event) = setup(&RISING_TAIL);
        let err = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(true))
            .unwrap_err();
        match err {
            SignalError::StateInconsistency {
                symbol,
                kind,
                sma_short,
                ..
            } => {
                assert_eq!(symbol, "TEST");
                assert_eq!(kind, InconsistencyKind::BuyWhileInvested);
                assert_eq!(sma_short, 13.0);
            }
            other => panic!("expected inconsistency, got {other:?}"),
        }
        // Metrics are recorded before the decision.
        assert!(event.metric("SMA2").is_some());
        assert!(event.metric("SMA3").is_some());
    }

    #[test]
    fn exit_on_bearish_bar_below_long() {
        let (history, mut event) = setup(&FALLING_TAIL);
        let signal = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(true))
            .unwrap();
        assert_eq!(signal.direction, SignalDirection::LongExit);
    }

    #[test]
    fn hold_on_bullish_bar_below_long() {
        let (history, mut event) = setup(&RECOVERING_TAIL);
        let cfg = StrategyConfig::with_windows(2, 3);
        // mean(10, 10.5) = 10.25 <= mean(13, 10, 10.5) = 11.17
        let signal = engine(cfg.clone())
            .evaluate(&mut event, &history, &portfolio(true))
            .unwrap();
        assert_eq!(signal.direction, SignalDirection::None);

        // MA-only exit variant ignores the candle.
        let mut ma_only = cfg;
        ma_only.require_weak_candle_for_exit = false;
        let signal = engine(ma_only)
            .evaluate(&mut event, &history, &portfolio(true))
            .unwrap();
        assert_eq!(signal.direction, SignalDirection::LongExit);
    }

    #[test]
    fn sell_while_flat_is_error() {
        let (history, mut event) = setup(&FALLING_TAIL);
        let err = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(false))
            .unwrap_err();
        assert!(matches!(
            err,
            SignalError::StateInconsistency {
                kind: InconsistencyKind::SellWhileNotInvested,
                ..
            }
        ));
    }

    #[test]
    fn pattern_only_entry_below_long() {
        let (history, mut event) = setup(&RECOVERING_TAIL);
        let mut cfg = StrategyConfig::with_windows(2, 3);
        cfg.require_ma_cross_for_entry = false;
        let signal = engine(cfg)
            .evaluate(&mut event, &history, &portfolio(false))
            .unwrap();
        assert_eq!(signal.direction, SignalDirection::LongEntry);
    }

    #[test]
    fn relaxed_bullish_check_never_exits_on_candle() {
        let (history, mut event) = setup(&FALLING_TAIL);
        let mut cfg = StrategyConfig::with_windows(2, 3);
        cfg.pattern.strict_bullish_check = false;
        let signal = engine(cfg)
            .evaluate(&mut event, &history, &portfolio(true))
            .unwrap();
        assert_eq!(signal.direction, SignalDirection::None);
    }

    #[test]
    fn long_window_failure_keeps_short_metric() {
        let (history, mut event) = setup(&RISING_TAIL[..2]);
        let err = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(false))
            .unwrap_err();
        match err {
            SignalError::InsufficientData {
                window, available, ..
            } => {
                assert_eq!(window, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
        assert_eq!(event.metric("SMA2"), Some(10.5));
        assert_eq!(event.metric("SMA3"), None);
    }

    #[test]
    fn short_window_failure_records_nothing() {
        let (history, mut event) = setup(&RISING_TAIL[..1]);
        let err = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &history, &portfolio(false))
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(event.metrics.is_empty());
    }

    #[test]
    fn history_failure_is_propagated() {
        struct Broken;
        impl HistoryProvider for Broken {
            fn list(&self, _symbol: &str) -> Result<Cow<'_, [Bar]>, HistoryError> {
                Err(HistoryError::Unavailable("disk gone".into()))
            }
        }

        let (_, mut event) = setup(&RISING_TAIL);
        let err = engine(StrategyConfig::with_windows(2, 3))
            .evaluate(&mut event, &Broken, &portfolio(false))
            .unwrap_err();
        assert!(matches!(err, SignalError::History { .. }));
        assert!(event.metrics.is_empty());
    }

    #[test]
    fn repeated_evaluation_overwrites_metrics() {
        let (history, mut event) = setup(&RISING_TAIL);
        let eng = engine(StrategyConfig::with_windows(2, 3));
        let first = eng.evaluate(&mut event, &history, &portfolio(false)).unwrap();
        let metrics_after_first = event.metrics.clone();
        let second = eng.evaluate(&mut event, &history, &portfolio(false)).unwrap();
        assert_eq!(first, second);
        assert_eq!(event.metrics, metrics_after_first);
        assert_eq!(event.metrics.len(), 2);
    }

    #[test]
    fn metric_keys_and_warmup() {
        let eng = engine(StrategyConfig::with_windows(5, 20));
        assert_eq!(eng.metric_keys(), ["SMA5", "SMA20"]);
        assert_eq!(eng.warmup_bars(), 20);
    }
}
