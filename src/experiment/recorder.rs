//! Experiment recorders
//!
//! [`FileRecorder`] lays runs out on disk as
//! `{root}/{experiment}/{run_id}/` with `meta.yaml`, one file per param
//! under `params/`, one append-only file per metric under `metrics/`, and
//! model artifacts under `artifacts/{artifact_path}/`.
//! [`MemoryRecorder`] keeps the same information in memory.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use super::run::{RunRecord, RunStatus};
use super::signature::ModelSignature;
use crate::error::{Error, Result};
use crate::train::FittedModel;

/// Build the `runs:/{run_id}/{artifact_path}` reference of a logged artifact
pub fn artifact_uri(run_id: &str, artifact_path: &str) -> String {
    format!("runs:/{}/{}", run_id, artifact_path.trim_matches('/'))
}

/// Tracking boundary of a training run
///
/// One run is active between `start_run` and `end_run`; logging without an
/// active run is an error.
pub trait ExperimentRecorder {
    /// Open a run and return its identifier
    fn start_run(&mut self) -> Result<String>;

    fn log_param(&mut self, name: &str, value: &str) -> Result<()>;

    fn log_metric(&mut self, name: &str, value: f64) -> Result<()>;

    /// Store a fitted model with its signature and return its artifact URI
    fn log_model(
        &mut self,
        model: &FittedModel,
        artifact_path: &str,
        signature: &ModelSignature,
    ) -> Result<String>;

    /// Close the active run with a final status
    fn end_run(&mut self, status: RunStatus) -> Result<()>;
}

fn no_active_run() -> Error {
    Error::Tracking("no active run".to_string())
}

fn new_run_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Artifact stored by [`MemoryRecorder`]
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub model: FittedModel,
    pub signature: ModelSignature,
}

/// In-memory recorder
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    experiment: String,
    active: Option<RunRecord>,
    runs: Vec<RunRecord>,
    models: BTreeMap<String, StoredModel>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new(experiment: impl Into<String>) -> Self {
        Self {
            experiment: experiment.into(),
            ..Self::default()
        }
    }

    /// Completed runs, oldest first
    #[must_use]
    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    /// Get a completed run by ID.
    #[must_use]
    pub fn get_run(&self, run_id: &str) -> Option<&RunRecord> {
        self.runs.iter().find(|r| r.run_id() == run_id)
    }

    /// Resolve an artifact URI to the stored model
    #[must_use]
    pub fn load_model(&self, uri: &str) -> Option<&StoredModel> {
        self.models.get(uri)
    }

    #[must_use]
    pub fn has_active_run(&self) -> bool {
        self.active.is_some()
    }
}

impl ExperimentRecorder for MemoryRecorder {
    fn start_run(&mut self) -> Result<String> {
        if let Some(run) = &self.active {
            return Err(Error::Tracking(format!("run {} is still active", run.run_id())));
        }
        let run_id = new_run_id();
        self.active = Some(RunRecord::start(run_id.clone(), self.experiment.clone()));
        Ok(run_id)
    }

    fn log_param(&mut self, name: &str, value: &str) -> Result<()> {
        self.active.as_mut().ok_or_else(no_active_run)?.set_param(name, value);
        Ok(())
    }

    fn log_metric(&mut self, name: &str, value: f64) -> Result<()> {
        self.active.as_mut().ok_or_else(no_active_run)?.set_metric(name, value);
        Ok(())
    }

    fn log_model(
        &mut self,
        model: &FittedModel,
        artifact_path: &str,
        signature: &ModelSignature,
    ) -> Result<String> {
        let run = self.active.as_mut().ok_or_else(no_active_run)?;
        let uri = artifact_uri(run.run_id(), artifact_path);
        run.add_artifact(uri.clone());
        self.models.insert(
            uri.clone(),
            StoredModel {
                model: model.clone(),
                signature: signature.clone(),
            },
        );
        Ok(uri)
    }

    fn end_run(&mut self, status: RunStatus) -> Result<()> {
        let mut run = self.active.take().ok_or_else(no_active_run)?;
        run.complete(status);
        self.runs.push(run);
        Ok(())
    }
}

/// File-backed recorder rooted at a tracking directory
#[derive(Debug)]
pub struct FileRecorder {
    root: PathBuf,
    experiment: String,
    active: Option<RunRecord>,
}

impl FileRecorder {
    pub fn new(root: impl Into<PathBuf>, experiment: impl Into<String>) -> Self {
        FileRecorder {
            root: root.into(),
            experiment: experiment.into(),
            active: None,
        }
    }

    /// Directory holding every run of the experiment
    pub fn experiment_dir(&self) -> PathBuf {
        self.root.join(&self.experiment)
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.experiment_dir().join(run_id)
    }

    /// Read back a run's metadata
    pub fn load_run(&self, run_id: &str) -> Result<RunRecord> {
        let path = self.run_dir(run_id).join("meta.yaml");
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::Tracking(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Latest logged value of a metric
    pub fn load_metric(&self, run_id: &str, name: &str) -> Result<f64> {
        let path = self.run_dir(run_id).join("metrics").join(name);
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::Tracking(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let last = text
            .lines()
            .last()
            .ok_or_else(|| Error::Tracking(format!("metric '{}' has no entries", name)))?;
        // "{timestamp} {value} {step}"
        last.split_whitespace()
            .nth(1)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| Error::Tracking(format!("malformed metric entry '{}'", last)))
    }

    /// Resolve an artifact URI to its directory
    pub fn artifact_dir(&self, uri: &str) -> Result<PathBuf> {
        let rest = uri
            .strip_prefix("runs:/")
            .ok_or_else(|| Error::Tracking(format!("not a run artifact URI: '{}'", uri)))?;
        let (run_id, artifact_path) = rest
            .split_once('/')
            .ok_or_else(|| Error::Tracking(format!("artifact URI has no path: '{}'", uri)))?;
        Ok(self.run_dir(run_id).join("artifacts").join(artifact_path))
    }

    /// Load a logged model back from its artifact URI
    pub fn load_model(&self, uri: &str) -> Result<FittedModel> {
        let path = self.artifact_dir(uri)?.join("model.json");
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::Tracking(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn active_dir(&self) -> Result<PathBuf> {
        let run = self.active.as_ref().ok_or_else(no_active_run)?;
        Ok(self.run_dir(run.run_id()))
    }

    fn write_meta(&self, run: &RunRecord) -> Result<()> {
        let path = self.run_dir(run.run_id()).join("meta.yaml");
        fs::write(&path, serde_yaml::to_string(run)?).map_err(|e| Error::file(&path, e))
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::file(dir, e))?;
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|e| Error::file(&path, e))
}

impl ExperimentRecorder for FileRecorder {
    fn start_run(&mut self) -> Result<String> {
        if let Some(run) = &self.active {
            return Err(Error::Tracking(format!("run {} is still active", run.run_id())));
        }
        let run_id = new_run_id();
        let run = RunRecord::start(run_id.clone(), self.experiment.clone());
        let dir = self.run_dir(&run_id);
        for sub in ["params", "metrics", "artifacts"] {
            let sub_dir = dir.join(sub);
            fs::create_dir_all(&sub_dir).map_err(|e| Error::file(&sub_dir, e))?;
        }
        self.write_meta(&run)?;
        log::info!("started run {} in '{}'", run_id, dir.display());
        self.active = Some(run);
        Ok(run_id)
    }

    fn log_param(&mut self, name: &str, value: &str) -> Result<()> {
        let dir = self.active_dir()?.join("params");
        write_file(&dir, name, value)?;
        if let Some(run) = self.active.as_mut() {
            run.set_param(name, value);
        }
        Ok(())
    }

    fn log_metric(&mut self, name: &str, value: f64) -> Result<()> {
        let dir = self.active_dir()?.join("metrics");
        fs::create_dir_all(&dir).map_err(|e| Error::file(&dir, e))?;
        let path = dir.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::file(&path, e))?;
        writeln!(file, "{} {} 0", Utc::now().timestamp_millis(), value)
            .map_err(|e| Error::file(&path, e))?;
        if let Some(run) = self.active.as_mut() {
            run.set_metric(name, value);
        }
        Ok(())
    }

    fn log_model(
        &mut self,
        model: &FittedModel,
        artifact_path: &str,
        signature: &ModelSignature,
    ) -> Result<String> {
        let run_dir = self.active_dir()?;
        let run = self.active.as_mut().ok_or_else(no_active_run)?;
        let uri = artifact_uri(run.run_id(), artifact_path);

        let dir = run_dir.join("artifacts").join(artifact_path.trim_matches('/'));
        write_file(&dir, "model.json", &serde_json::to_string_pretty(model)?)?;
        write_file(&dir, "signature.json", &serde_json::to_string_pretty(signature)?)?;

        run.add_artifact(uri.clone());
        log::info!("logged model '{}' as {}", model.name(), uri);
        Ok(uri)
    }

    fn end_run(&mut self, status: RunStatus) -> Result<()> {
        let mut run = self.active.take().ok_or_else(no_active_run)?;
        run.complete(status);
        self.write_meta(&run)?;
        log::info!("run {} ended with status {:?}", run.run_id(), status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::LinearRegression;
    use tempfile::tempdir;

    fn signature() -> ModelSignature {
        ModelSignature {
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[test]
    fn test_artifact_uri_shape() {
        assert_eq!(artifact_uri("abc", "model"), "runs:/abc/model");
        assert_eq!(artifact_uri("abc", "/model/"), "runs:/abc/model");
    }

    #[test]
    fn test_memory_recorder_lifecycle() {
        let mut recorder = MemoryRecorder::new("macro");
        assert!(recorder.log_param("a", "1").is_err());

        let run_id = recorder.start_run().unwrap();
        assert!(recorder.start_run().is_err());
        recorder.log_param("target", "Inflation").unwrap();
        recorder.log_metric("rmse_arima", f64::INFINITY).unwrap();
        let uri = recorder
            .log_model(&FittedModel::Linear(LinearRegression::new()), "model", &signature())
            .unwrap();
        recorder.end_run(RunStatus::Finished).unwrap();

        assert_eq!(uri, format!("runs:/{}/model", run_id));
        let run = recorder.get_run(&run_id).unwrap();
        assert_eq!(run.status(), RunStatus::Finished);
        assert_eq!(run.params()["target"], "Inflation");
        assert!(run.metrics()["rmse_arima"].is_infinite());
        assert!(recorder.load_model(&uri).is_some());
        assert!(!recorder.has_active_run());
    }

    #[test]
    fn test_file_recorder_layout() {
        let dir = tempdir().unwrap();
        let mut recorder = FileRecorder::new(dir.path(), "macro");

        let run_id = recorder.start_run().unwrap();
        recorder.log_param("m", "12").unwrap();
        recorder.log_metric("rmse_linear_regression", 0.5).unwrap();
        recorder.log_metric("rmse_arima", f64::INFINITY).unwrap();
        let model = FittedModel::Linear(LinearRegression::new());
        let uri = recorder.log_model(&model, "model", &signature()).unwrap();
        recorder.end_run(RunStatus::Finished).unwrap();

        let run_dir = dir.path().join("macro").join(&run_id);
        assert_eq!(fs::read_to_string(run_dir.join("params/m")).unwrap(), "12");
        assert!(run_dir.join("artifacts/model/model.json").exists());
        assert!(run_dir.join("artifacts/model/signature.json").exists());

        assert_eq!(recorder.load_metric(&run_id, "rmse_linear_regression").unwrap(), 0.5);
        assert!(recorder.load_metric(&run_id, "rmse_arima").unwrap().is_infinite());
        assert_eq!(recorder.load_run(&run_id).unwrap().status(), RunStatus::Finished);
        assert_eq!(recorder.load_model(&uri).unwrap(), model);
    }

    #[test]
    fn test_end_without_run() {
        let dir = tempdir().unwrap();
        let mut recorder = FileRecorder::new(dir.path(), "macro");
        assert!(matches!(recorder.end_run(RunStatus::Failed), Err(Error::Tracking(_))));
    }
}
