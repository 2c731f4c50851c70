//! macropanel
//!
//! Batch pipeline that normalizes heterogeneous macroeconomic series into
//! one aligned monthly panel, makes it stationary by differencing and picks
//! a forecaster for a target series.
//!
//! ```text
//! raw files -> loader -> combine -> panel::differ -> train -> experiment
//! ```

#![allow(clippy::too_many_arguments)]

pub mod combine;
pub mod config;
pub mod error;
pub mod experiment;
pub mod forecast;
pub mod io;
pub mod loader;
pub mod ml;
pub mod panel;
pub mod pipeline;
pub mod series;
pub mod temporal;
pub mod train;

// Re-export commonly used types
pub use combine::{build_panel, CombinedPanel, Registry, RegistryEntry, SeriesCombiner};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use experiment::{
    ExperimentRecorder, ExperimentRun, FileRecorder, MemoryRecorder, ModelSignature, RunStatus,
};
pub use loader::{load_series, DatasetDescriptor, LoadReport, MonthLocale, SeriesLoader};
pub use panel::{differ, Panel, StationaryPanel};
pub use series::CanonicalSeries;
pub use temporal::MonthPeriod;
pub use train::{FittedModel, Trainer, TrainingConfig};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
