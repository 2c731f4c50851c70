//! Pipeline entry points
//!
//! Every entry point rebuilds the combined panel from the raw files and
//! persists it under `data.processed_path` before going further, so each
//! invocation leaves the panel it worked on next to its outputs.

use crate::combine::CombinedPanel;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::experiment::ExperimentRun;
use crate::panel::{differ, StationaryPanel};

/// Build, persist and report the combined panel
pub fn process(config: &PipelineConfig) -> Result<CombinedPanel> {
    let combined = config
        .combiner()?
        .build_and_persist(&config.data.processed_path)?;
    for (label, report) in &combined.reports {
        log::info!(
            "{}: {} rows read, {} kept, {} bad dates, {} duplicates",
            label,
            report.rows_read,
            report.rows_kept,
            report.unparseable_dates,
            report.duplicate_dates
        );
    }
    Ok(combined)
}

/// Persisted panel after first-order differencing
pub fn features(config: &PipelineConfig) -> Result<(CombinedPanel, StationaryPanel)> {
    let combined = process(config)?;
    let stationary = differ(&combined.panel)?;
    Ok((combined, stationary))
}

/// Full run: persisted panel, differencing, selection and recording
pub fn train(config: &PipelineConfig) -> Result<(CombinedPanel, ExperimentRun)> {
    let (combined, stationary) = features(config)?;
    let mut recorder = config.recorder();
    let run = config.trainer()?.train(&stationary, &mut recorder)?;
    Ok((combined, run))
}
