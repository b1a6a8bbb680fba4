//! Metrics sink — records computed indicator values against the originating bar.
//!
//! The engine writes through the [`MetricsSink`] trait so the same evaluation can
//! annotate a [`BarEvent`] or any other recorder. Writes overwrite: recording the
//! same key twice keeps the last value.

use crate::domain::BarEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Metric name for a moving average over `window` bars, e.g. `SMA20`.
pub fn metric_key(window: usize) -> String {
    format!("SMA{window}")
}

/// Anything that can store a named value for the bar under evaluation.
pub trait MetricsSink {
    fn record(&mut self, name: &str, value: f64);
}

impl MetricsSink for BarEvent {
    fn record(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }
}

/// One exported metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub value: f64,
}

/// Append-only collection of metric rows across many evaluated bars.
///
/// Used by drivers for downstream inspection; the engine itself never reads it.
#[derive(Debug, Clone, Default)]
pub struct MetricsJournal {
    rows: Vec<MetricRow>,
}

impl MetricsJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every metric recorded on `event` into the journal.
    pub fn capture(&mut self, event: &BarEvent) {
        self.rows
            .extend(event.metrics.iter().map(|(name, &value)| MetricRow {
                symbol: event.bar.symbol.clone(),
                timestamp: event.bar.timestamp,
                name: name.clone(),
                value,
            }));
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write all rows as CSV with a `symbol,timestamp,name,value` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
