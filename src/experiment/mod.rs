//! Experiment tracking
//!
//! A training run records its parameters, the error metric of every
//! candidate model and the winning model with its signature through an
//! [`ExperimentRecorder`]. The winning model is retrievable afterwards by
//! its `runs:/{run_id}/{artifact_path}` URI.

mod recorder;
mod run;
mod signature;

pub use recorder::{artifact_uri, ExperimentRecorder, FileRecorder, MemoryRecorder, StoredModel};
pub use run::{ExperimentRun, RunRecord, RunStatus};
pub use signature::{ColumnSpec, ModelSignature};
