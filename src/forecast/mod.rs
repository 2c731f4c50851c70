//! Forecasting Module
//!
//! Classical univariate forecasters:
//! - SARIMA (Seasonal ARIMA)
//! - Auto ARIMA for automatic order selection

pub mod auto_arima;
pub mod sarima;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

pub use auto_arima::{ArimaSearch, AutoArima, ModelSelectionCriterion, ModelSelectionResult};
pub use sarima::SarimaForecaster;

/// Common interface of univariate forecasters
pub trait Forecaster {
    /// Fit the model to an ordered slice of observations
    fn fit(&mut self, values: &[f64]) -> Result<()>;

    /// Forecast `periods` steps past the end of the fitted data
    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ForecastResult>;

    /// Model name
    fn name(&self) -> &str;

    /// Model parameters (orders and the like)
    fn parameters(&self) -> BTreeMap<String, f64>;
}

/// Point forecasts with prediction intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast: Vec<f64>,
    pub lower_ci: Vec<f64>,
    pub upper_ci: Vec<f64>,
    pub method: String,
    pub parameters: BTreeMap<String, f64>,
    pub confidence_level: f64,
    pub aic: Option<f64>,
    pub bic: Option<f64>,
}

/// Helper function to get z-score for confidence level
pub(crate) fn z_score(confidence_level: f64) -> f64 {
    match (confidence_level * 100.0).round() as i32 {
        80 => 1.282,
        90 => 1.645,
        95 => 1.96,
        99 => 2.576,
        _ => 1.96,
    }
}

/// Population variance
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
