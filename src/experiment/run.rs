//! Run records and the outcome of a training run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    /// Run is currently executing.
    Running,
    /// Run completed successfully.
    Finished,
    /// Run failed with an error.
    Failed,
}

/// Bookkeeping for one run inside a recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    run_id: String,
    experiment: String,
    status: RunStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    params: BTreeMap<String, String>,
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
    #[serde(default)]
    artifacts: Vec<String>,
}

impl RunRecord {
    /// Create a running record stamped with the current time.
    #[must_use]
    pub fn start(run_id: impl Into<String>, experiment: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            experiment: experiment.into(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the end timestamp, if the run has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Latest value of every metric
    #[must_use]
    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    /// Artifact URIs in logging order
    #[must_use]
    pub fn artifacts(&self) -> &[String] {
        &self.artifacts
    }

    pub(crate) fn set_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    pub(crate) fn set_metric(&mut self, key: &str, value: f64) {
        self.metrics.insert(key.to_string(), value);
    }

    pub(crate) fn add_artifact(&mut self, uri: String) {
        self.artifacts.push(uri);
    }

    /// Complete the run with the given final status.
    pub fn complete(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}

/// Immutable summary of a finished training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRun {
    run_id: String,
    params: BTreeMap<String, String>,
    metrics: BTreeMap<String, f64>,
    selected_model: String,
    artifact_uri: String,
}

impl ExperimentRun {
    pub(crate) fn new(
        run_id: String,
        params: BTreeMap<String, String>,
        metrics: BTreeMap<String, f64>,
        selected_model: String,
        artifact_uri: String,
    ) -> Self {
        ExperimentRun {
            run_id,
            params,
            metrics,
            selected_model,
            artifact_uri,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Name of the winning model
    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// `runs:/{run_id}/{artifact_path}` reference to the logged model
    pub fn artifact_uri(&self) -> &str {
        &self.artifact_uri
    }
}
