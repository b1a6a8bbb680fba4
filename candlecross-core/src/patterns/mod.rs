//! Candle pattern confirmation filters.

pub mod absorption;

pub use absorption::{CandlePatternClassifier, PatternConfig};
