//! Serializable strategy configuration.
//!
//! Every behavioural switch of the crossover strategy is a named field here so a
//! run is reproducible from its TOML file alone. All fields have defaults; a
//! partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::patterns::PatternConfig;

/// Errors from loading or validating a strategy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field} must be at least 1")]
    ZeroWindow { field: &'static str },

    #[error("short_window ({short}) must be smaller than long_window ({long})")]
    WindowOrder { short: usize, long: usize },
}

/// Configuration of one moving-average crossover strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Bars in the fast moving average.
    pub short_window: usize,
    /// Bars in the slow moving average.
    pub long_window: usize,
    /// Entry requires the fast average above the slow one. When false the
    /// flat-side decision is made by the candle pattern alone.
    pub require_ma_cross_for_entry: bool,
    /// Exit waits for a non-bullish latest bar. When false the exit fires as
    /// soon as the fast average is at or below the slow one.
    pub require_weak_candle_for_exit: bool,
    pub pattern: PatternConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            short_window: 10,
            long_window: 30,
            require_ma_cross_for_entry: true,
            require_weak_candle_for_exit: true,
            pattern: PatternConfig::default(),
        }
    }
}

impl StrategyConfig {
    /// Convenience constructor with default switches.
    pub fn with_windows(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_window == 0 {
            return Err(ConfigError::ZeroWindow {
                field: "short_window",
            });
        }
        if self.long_window == 0 {
            return Err(ConfigError::ZeroWindow {
                field: "long_window",
            });
        }
        if self.short_window >= self.long_window {
            return Err(ConfigError::WindowOrder {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }
}
