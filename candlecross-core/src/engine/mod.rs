//! Signal engine: decision table, crossover evaluation and its error type.

pub mod crossover;
pub mod decision;
pub mod error;

pub use crossover::CrossoverSignalEngine;
pub use decision::{decide, Decision, DecisionRules, Trend};
pub use error::{InconsistencyKind, SignalError};
