//! Replay driver — feeds a bar stream through the engine bar by bar.
//!
//! For each bar: append to history, evaluate, apply the signal to the portfolio.
//! Per-bar policy:
//! - insufficient data counts as warm-up and the replay continues;
//! - a state inconsistency is logged, recorded and the replay continues;
//! - any other failure (history, indicator) aborts the replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Bar, BarEvent, SignalDirection};
use crate::engine::{CrossoverSignalEngine, SignalError};
use crate::memory::{InMemoryHistory, InMemoryPortfolio};
use crate::metrics::MetricsJournal;
use crate::providers::{HistoryError, PortfolioState};

/// Failures that stop a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("history rejected bar {index}: {source}")]
    History {
        index: usize,
        #[source]
        source: HistoryError,
    },

    #[error("evaluation failed at bar {index}: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: SignalError,
    },
}

/// What happened on one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Not enough history yet.
    Warmup,
    Signal { direction: SignalDirection },
    Inconsistency { message: String },
}

/// One replayed bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub index: usize,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub invested_before: bool,
    pub outcome: StepOutcome,
    pub metrics: BTreeMap<String, f64>,
}

/// Aggregate counts over a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub bars: usize,
    pub warmup: usize,
    pub entries: usize,
    pub exits: usize,
    pub holds: usize,
    pub inconsistencies: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayReport {
    pub summary: ReplaySummary,
    pub steps: Vec<ReplayStep>,
}

impl ReplayReport {
    /// Steps whose signal asks the execution layer to act.
    pub fn actionable(&self) -> impl Iterator<Item = &ReplayStep> {
        self.steps.iter().filter(|s| {
            matches!(s.outcome, StepOutcome::Signal { direction } if direction.is_actionable())
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Owns the in-memory collaborators and drives the engine over a bar stream.
#[derive(Debug)]
pub struct Replay {
    engine: CrossoverSignalEngine,
    history: InMemoryHistory,
    portfolio: InMemoryPortfolio,
    journal: MetricsJournal,
}

impl Replay {
    pub fn new(engine: CrossoverSignalEngine) -> Self {
        Self {
            engine,
            history: InMemoryHistory::new(),
            portfolio: InMemoryPortfolio::new(),
            journal: MetricsJournal::new(),
        }
    }

    /// Start from an existing portfolio, e.g. with positions carried over.
    pub fn with_portfolio(mut self, portfolio: InMemoryPortfolio) -> Self {
        self.portfolio = portfolio;
        self
    }

    pub fn portfolio(&self) -> &InMemoryPortfolio {
        &self.portfolio
    }

    pub fn history(&self) -> &InMemoryHistory {
        &self.history
    }

    pub fn journal(&self) -> &MetricsJournal {
        &self.journal
    }

    /// Process one bar to completion.
    pub fn step(&mut self, index: usize, bar: Bar) -> Result<ReplayStep, ReplayError> {
        self.history
            .push(bar.clone())
            .map_err(|source| ReplayError::History { index, source })?;

        let mut event = BarEvent::new(bar);
        let invested_before = self.portfolio.is_invested(event.symbol());

        let outcome = match self.engine.evaluate(&mut event, &self.history, &self.portfolio) {
            Ok(signal) => {
                if signal.direction.is_actionable() {
                    debug!(symbol = %signal.symbol, ts = %signal.timestamp, direction = %signal.direction, "signal");
                }
                self.portfolio.apply(&signal);
                StepOutcome::Signal {
                    direction: signal.direction,
                }
            }
            Err(err) if err.is_recoverable() => StepOutcome::Warmup,
            Err(err) if err.is_inconsistency() => {
                warn!(error = %err, "state inconsistency");
                StepOutcome::Inconsistency {
                    message: err.to_string(),
                }
            }
            Err(source) => return Err(ReplayError::Evaluation { index, source }),
        };

        self.journal.capture(&event);

        Ok(ReplayStep {
            index,
            symbol: event.bar.symbol,
            timestamp: event.bar.timestamp,
            close: event.bar.close,
            invested_before,
            outcome,
            metrics: event.metrics,
        })
    }

    /// Replay every bar in order and summarise.
    pub fn run(&mut self, bars: impl IntoIterator<Item = Bar>) -> Result<ReplayReport, ReplayError> {
        let mut report = ReplayReport::default();
        for (index, bar) in bars.into_iter().enumerate() {
            let step = self.step(index, bar)?;
            tally(&mut report.summary, &step.outcome);
            report.steps.push(step);
        }
        info!(
            bars = report.summary.bars,
            entries = report.summary.entries,
            exits = report.summary.exits,
            inconsistencies = report.summary.inconsistencies,
            "replay finished"
        );
        Ok(report)
    }
}

fn tally(summary: &mut ReplaySummary, outcome: &StepOutcome) {
    summary.bars += 1;
    match outcome {
        StepOutcome::Warmup => summary.warmup += 1,
        StepOutcome::Inconsistency { .. } => summary.inconsistencies += 1,
        StepOutcome::Signal { direction } => match direction {
            SignalDirection::LongEntry => summary.entries += 1,
            SignalDirection::LongExit => summary.exits += 1,
            SignalDirection::None => summary.holds += 1,
        },
    }
}
