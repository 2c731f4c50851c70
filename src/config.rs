//! Pipeline configuration
//!
//! One YAML document deserialized into [`PipelineConfig`] and passed
//! explicitly to the combiner and the trainer.
//!
//! ```yaml
//! data:
//!   raw_dir: data/raw
//!   processed_path: data/processed/combined_cleaned_data.csv
//! training:
//!   target: Inflation
//!   test_size: 0.2
//!   seasonal: true
//!   m: 12
//!   random_state: 42
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::combine::{Registry, RegistryEntry, SeriesCombiner};
use crate::error::{Error, Result};
use crate::experiment::FileRecorder;
use crate::forecast::ArimaSearch;
use crate::loader::{MonthLocale, SeriesLoader};
use crate::train::{Trainer, TrainingConfig};

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory the dataset paths are relative to
    pub raw_dir: PathBuf,
    /// Where the combined panel is written
    pub processed_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            raw_dir: PathBuf::from("data/raw"),
            processed_path: PathBuf::from("data/processed/combined_cleaned_data.csv"),
        }
    }
}

/// Experiment store location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub root: PathBuf,
    pub experiment_name: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            root: PathBuf::from("mlruns"),
            experiment_name: "macro_forecasting".to_string(),
        }
    }
}

/// Extra month-abbreviation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub name: String,
    /// Token -> English abbreviation
    pub months: BTreeMap<String, String>,
}

/// Everything one pipeline invocation needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataConfig,
    pub training: TrainingConfig,
    #[serde(default)]
    pub arima: ArimaSearch,
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Appended after the built-in Spanish table
    #[serde(default)]
    pub locales: Vec<LocaleConfig>,
    /// Datasets of the panel; the nine macroeconomic series when absent
    #[serde(default)]
    pub datasets: Option<Vec<RegistryEntry>>,
}

impl PipelineConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config: PipelineConfig = serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::info!("loaded configuration from '{}'", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        if self.tracking.experiment_name.trim().is_empty() {
            return Err(Error::Config("tracking.experiment_name must not be empty".to_string()));
        }
        if let Some(datasets) = &self.datasets {
            Registry::new(datasets.clone()).map_err(|e| Error::Config(e.to_string()))?;
        }
        Ok(())
    }

    /// Dataset registry with paths resolved against `data.raw_dir`
    pub fn registry(&self) -> Result<Registry> {
        let registry = match &self.datasets {
            Some(entries) => Registry::new(entries.clone())?,
            None => Registry::macro_default(),
        };
        Ok(registry.resolved(&self.data.raw_dir))
    }

    /// Loader with the built-in locale followed by the configured ones
    pub fn loader(&self) -> Result<SeriesLoader> {
        let mut loader = SeriesLoader::with_default_locales()?;
        for locale in &self.locales {
            let locale = MonthLocale::new(locale.name.clone(), &locale.months)
                .map_err(|e| Error::Config(e.to_string()))?;
            loader = loader.with_locale(locale);
        }
        Ok(loader)
    }

    pub fn combiner(&self) -> Result<SeriesCombiner> {
        Ok(SeriesCombiner::new(self.loader()?, self.registry()?))
    }

    pub fn trainer(&self) -> Result<Trainer> {
        Trainer::new(self.training.clone(), self.arima.clone())
    }

    pub fn recorder(&self) -> FileRecorder {
        FileRecorder::new(&self.tracking.root, self.tracking.experiment_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ModelSelectionCriterion;

    const MINIMAL: &str = "
training:
  target: Inflation
  test_size: 0.2
  seasonal: false
  m: 12
";

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = PipelineConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.training.target, "Inflation");
        assert_eq!(config.training.random_state, None);
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.arima, ArimaSearch::default());
        assert_eq!(config.registry().unwrap().len(), 9);
    }

    #[test]
    fn test_missing_training_section() {
        let err = PipelineConfig::from_yaml_str("data:\n  raw_dir: raw\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_required_key() {
        let err = PipelineConfig::from_yaml_str(
            "training:\n  target: Inflation\n  seasonal: false\n  m: 12\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("test_size"));
    }

    #[test]
    fn test_out_of_range_values() {
        let bad = MINIMAL.replace("0.2", "1.5");
        assert!(matches!(PipelineConfig::from_yaml_str(&bad), Err(Error::Config(_))));

        let bad = MINIMAL.replace("seasonal: false", "seasonal: true").replace("m: 12", "m: 1");
        assert!(matches!(PipelineConfig::from_yaml_str(&bad), Err(Error::Config(_))));
    }

    #[test]
    fn test_full_config() {
        let text = format!(
            "{}{}",
            MINIMAL,
            "
arima:
  max_p: 2
  max_q: 2
  criterion: aic
tracking:
  root: runs
  experiment_name: test
locales:
  - name: pt
    months: {fev: Feb, abr: Apr}
datasets:
  - label: Inflation
    path: inflation.csv
    date_column: Fecha
    value_column: Valor
"
        );
        let config = PipelineConfig::from_yaml_str(&text).unwrap();
        assert_eq!(config.arima.criterion, ModelSelectionCriterion::Aic);
        assert_eq!(config.arima.max_d, 2);
        assert_eq!(config.recorder().experiment_dir(), Path::new("runs/test"));
        assert_eq!(config.loader().unwrap().locales().len(), 2);

        let registry = config.registry().unwrap();
        assert_eq!(registry.labels(), vec!["Inflation".to_string()]);
        assert_eq!(registry.entries()[0].descriptor.path, Path::new("data/raw/inflation.csv"));
        assert_eq!(registry.entries()[0].descriptor.separator, ';');
    }

    #[test]
    fn test_bad_locale_is_config_error() {
        let text = format!("{}locales:\n  - name: xx\n    months: {{foo: Nope}}\n", MINIMAL);
        let config = PipelineConfig::from_yaml_str(&text).unwrap();
        assert!(matches!(config.loader(), Err(Error::Config(_))));
    }
}
