//! # wasmwirt-observability
//!
//! Structured Logging fuer Wasmwirt via tracing-subscriber (Text oder JSON).

pub mod logging;

pub use logging::{logging_initialisieren, LogEinstellungen};
