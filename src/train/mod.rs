//! Model Trainer & Selector
//!
//! Splits a stationary panel chronologically, scores an auto-order ARIMA on
//! the target alone and a linear regression of the target on every other
//! column, keeps the candidate with the lower RMSE and records the run.

mod selection;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::experiment::{ExperimentRecorder, ExperimentRun, ModelSignature, RunStatus};
use crate::forecast::{ArimaSearch, AutoArima, Forecaster};
use crate::ml::{
    mean_absolute_error, r2_score, root_mean_squared_error, LinearRegression, SupervisedModel,
};
use crate::panel::{Panel, StationaryPanel};

pub use self::selection::{
    select, CandidateOutcome, FittedModel, Selection, ARIMA, LINEAR_REGRESSION,
};

/// Artifact path of the logged model inside its run
pub const MODEL_ARTIFACT_PATH: &str = "model";

/// Metric names recorded for each candidate
pub const RMSE_ARIMA: &str = "rmse_arima";
pub const RMSE_LINEAR_REGRESSION: &str = "rmse_linear_regression";

/// Confidence level of the classical forecast intervals
const CONFIDENCE_LEVEL: f64 = 0.95;

/// Training parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Label of the series to forecast
    pub target: String,
    /// Fraction of rows held out for testing, taken from the end
    pub test_size: f64,
    /// Whether the ARIMA search includes seasonal orders
    pub seasonal: bool,
    /// Seasonal period
    pub m: usize,
    /// Recorded as a parameter; splitting never shuffles
    #[serde(default)]
    pub random_state: Option<u64>,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(Error::Config("training.target must not be empty".to_string()));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::Config(format!(
                "training.test_size must lie in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.seasonal && self.m < 2 {
            return Err(Error::Config(format!(
                "training.m must be at least 2 for a seasonal search, got {}",
                self.m
            )));
        }
        Ok(())
    }

    /// Seasonal period handed to the ARIMA search; 0 when non-seasonal
    pub fn seasonal_period(&self) -> usize {
        if self.seasonal {
            self.m
        } else {
            0
        }
    }
}

/// Row counts of a chronological split: `(n_train, n_test)`
///
/// The test side takes `ceil(test_size * n)` rows from the end.
pub fn split_sizes(n: usize, test_size: f64) -> (usize, usize) {
    let n_test = ((test_size * n as f64).ceil() as usize).min(n);
    (n - n_test, n_test)
}

/// Split rows in time order; the earliest rows train, the latest test
pub fn chronological_split(panel: &Panel, test_size: f64) -> Result<(Panel, Panel)> {
    let (n_train, _) = split_sizes(panel.nrows(), test_size);
    let train = panel.slice_rows(0..n_train)?;
    let test = panel.slice_rows(n_train..panel.nrows())?;
    Ok((train, test))
}

/// Fits both candidates and records the selection
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    search: ArimaSearch,
}

impl Trainer {
    pub fn new(config: TrainingConfig, search: ArimaSearch) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config, search })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train, select and record one run
    ///
    /// The run is always closed: `Finished` on success, `Failed` otherwise.
    pub fn train(
        &self,
        data: &StationaryPanel,
        recorder: &mut dyn ExperimentRecorder,
    ) -> Result<ExperimentRun> {
        let target = self.config.target.as_str();
        if !data.has_column(target) {
            return Err(Error::Config(format!(
                "target '{}' is not a panel column (columns: {:?})",
                target,
                data.column_names()
            )));
        }

        let run_id = recorder.start_run()?;
        match self.run(&run_id, data, recorder) {
            Ok(run) => {
                recorder.end_run(RunStatus::Finished)?;
                Ok(run)
            }
            Err(e) => {
                if let Err(end_err) = recorder.end_run(RunStatus::Failed) {
                    log::error!("could not close run {}: {}", run_id, end_err);
                }
                Err(e)
            }
        }
    }

    fn run(
        &self,
        run_id: &str,
        data: &StationaryPanel,
        recorder: &mut dyn ExperimentRecorder,
    ) -> Result<ExperimentRun> {
        let target = self.config.target.as_str();
        let features: Vec<&str> = data
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|c| *c != target)
            .collect();

        let mut params = BTreeMap::new();
        params.insert("target".to_string(), target.to_string());
        params.insert("test_size".to_string(), self.config.test_size.to_string());
        params.insert("seasonal".to_string(), self.config.seasonal.to_string());
        params.insert("m".to_string(), self.config.m.to_string());
        params.insert(
            "random_state".to_string(),
            self.config
                .random_state
                .map_or_else(|| "None".to_string(), |s| s.to_string()),
        );
        for (key, value) in &params {
            recorder.log_param(key, value)?;
        }

        let (train, test) = chronological_split(data, self.config.test_size)?;
        log::info!(
            "training on {} rows, testing on {} rows, target '{}' with {} features",
            train.nrows(),
            test.nrows(),
            target,
            features.len()
        );

        let classical =
            CandidateOutcome::from_attempt(ARIMA, self.fit_classical(&train, &test, target));
        let linear = CandidateOutcome::from_attempt(
            LINEAR_REGRESSION,
            self.fit_linear(&train, &test, target, &features),
        );

        let mut metrics = BTreeMap::new();
        metrics.insert(RMSE_ARIMA.to_string(), classical.rmse());
        metrics.insert(RMSE_LINEAR_REGRESSION.to_string(), linear.rmse());
        for (key, value) in &metrics {
            recorder.log_metric(key, *value)?;
        }

        let selection = select(classical, linear)?;
        log::info!(
            "selected {} (RMSE ARIMA {}, RMSE linear regression {})",
            selection.selected_name(),
            selection.rmse_arima,
            selection.rmse_linear
        );
        recorder.log_param("selected_model", selection.selected_name())?;

        let signature = ModelSignature::infer(&train, target, &features)?;
        let artifact_uri = recorder.log_model(&selection.model, MODEL_ARTIFACT_PATH, &signature)?;

        Ok(ExperimentRun::new(
            run_id.to_string(),
            params,
            metrics,
            selection.selected_name().to_string(),
            artifact_uri,
        ))
    }

    /// Auto ARIMA on the target alone, forecasting the test horizon
    fn fit_classical(&self, train: &Panel, test: &Panel, target: &str) -> Result<(FittedModel, f64)> {
        let (y_train, y_test) = target_slices(train, test, target)?;

        let mut auto = AutoArima::with_search(self.search.clone())
            .seasonal(self.config.seasonal_period());
        auto.fit(y_train)?;
        log::debug!("{}", auto.summary());

        let forecast = auto.forecast(y_test.len(), CONFIDENCE_LEVEL)?;
        let rmse = holdout_rmse(ARIMA, y_test, &forecast.forecast)?;
        let model = auto
            .into_best_model()
            .ok_or_else(|| Error::InvalidOperation("No model fitted".to_string()))?;

        Ok((FittedModel::Arima(model), rmse))
    }

    /// Linear regression of the target on the remaining columns
    fn fit_linear(
        &self,
        train: &Panel,
        test: &Panel,
        target: &str,
        features: &[&str],
    ) -> Result<(FittedModel, f64)> {
        let (_, y_test) = target_slices(train, test, target)?;

        let mut model = LinearRegression::new();
        model.fit(train, target, features)?;
        let predictions = model.predict(test)?;
        let rmse = holdout_rmse(LINEAR_REGRESSION, y_test, &predictions)?;

        Ok((FittedModel::Linear(model), rmse))
    }
}

/// RMSE on the held-out rows; MAE and R² are only logged
fn holdout_rmse(name: &str, actual: &[f64], predicted: &[f64]) -> Result<f64> {
    let rmse = root_mean_squared_error(actual, predicted)?;
    log::debug!(
        "{} holdout: RMSE {:.6}, MAE {:.6}, R2 {:.6}",
        name,
        rmse,
        mean_absolute_error(actual, predicted)?,
        r2_score(actual, predicted)?
    );
    Ok(rmse)
}

fn target_slices<'a>(train: &'a Panel, test: &'a Panel, target: &str) -> Result<(&'a [f64], &'a [f64])> {
    if train.is_empty() {
        return Err(Error::InsufficientData("training slice is empty".to_string()));
    }
    if test.is_empty() {
        return Err(Error::InsufficientData("test slice is empty".to_string()));
    }
    let missing = || Error::Data(format!("target column '{}' not found", target));
    Ok((
        train.column(target).ok_or_else(missing)?,
        test.column(target).ok_or_else(missing)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(test_size: f64) -> TrainingConfig {
        TrainingConfig {
            target: "Inflation".to_string(),
            test_size,
            seasonal: false,
            m: 12,
            random_state: Some(42),
        }
    }

    #[test]
    fn test_split_sizes() {
        assert_eq!(split_sizes(10, 0.2), (8, 2));
        assert_eq!(split_sizes(3, 0.2), (2, 1));
        assert_eq!(split_sizes(1, 0.5), (0, 1));
        assert_eq!(split_sizes(0, 0.5), (0, 0));
    }

    #[test]
    fn test_chronological_split_keeps_order() {
        let start = crate::temporal::MonthPeriod::new(2020, 1).unwrap();
        let mut index = vec![start];
        for _ in 1..5 {
            let next = index[index.len() - 1].succ();
            index.push(next);
        }
        let panel = Panel::new(
            index.clone(),
            vec![("Inflation".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0])],
        )
        .unwrap();

        let (train, test) = chronological_split(&panel, 0.2).unwrap();
        assert_eq!(train.index(), &index[..4]);
        assert_eq!(test.index(), &index[4..]);
        assert_eq!(test.column("Inflation").unwrap(), &[5.0]);
    }

    #[test]
    fn test_holdout_rmse() {
        assert_eq!(holdout_rmse(ARIMA, &[1.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
        assert_eq!(holdout_rmse(ARIMA, &[2.0, 2.0], &[0.0, 0.0]).unwrap(), 2.0);
        assert!(matches!(
            holdout_rmse(LINEAR_REGRESSION, &[1.0], &[1.0, 2.0]),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(config(0.2).validate().is_ok());
        assert!(matches!(config(0.0).validate(), Err(Error::Config(_))));
        assert!(matches!(config(1.0).validate(), Err(Error::Config(_))));

        let mut seasonal = config(0.2);
        seasonal.seasonal = true;
        seasonal.m = 1;
        assert!(matches!(seasonal.validate(), Err(Error::Config(_))));
        assert_eq!(config(0.2).seasonal_period(), 0);
    }
}
