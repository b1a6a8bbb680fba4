//! Domain types for candlecross

pub mod bar;
pub mod signal;

pub use bar::{Bar, BarError, BarEvent};
pub use signal::{Signal, SignalDirection};

/// Symbol type alias
pub type Symbol = String;
