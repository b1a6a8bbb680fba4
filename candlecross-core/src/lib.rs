//! candlecross core — moving-average crossover signals with candle confirmation.
//!
//! This crate contains the decision logic of the strategy:
//! - Domain types (bars, bar events, signals)
//! - Simple moving average over the tail of a price series
//! - Bullish absorption classifier with explicit strictness switches
//! - Metrics sink that annotates each evaluated bar
//! - Crossover engine: averages × position flag × pattern → signal or inconsistency
//! - Collaborator traits (history, portfolio) with in-memory implementations
//! - Replay driver for running a bar file end to end

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod memory;
pub mod metrics;
pub mod patterns;
pub mod providers;
pub mod replay;

pub use config::{ConfigError, StrategyConfig};
pub use domain::{Bar, BarEvent, Signal, SignalDirection};
pub use engine::{CrossoverSignalEngine, SignalError};
