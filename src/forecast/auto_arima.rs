//! Automatic order selection over a SARIMA grid

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::forecast::{variance, ForecastResult, Forecaster, SarimaForecaster};

/// Criterion for model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSelectionCriterion {
    /// Akaike Information Criterion
    Aic,
    /// Corrected AIC (for small samples)
    #[default]
    Aicc,
    /// Bayesian Information Criterion
    Bic,
}

/// Bounds of the order search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaSearch {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_d: usize,
    pub max_seasonal_q: usize,
    pub criterion: ModelSelectionCriterion,
}

impl Default for ArimaSearch {
    fn default() -> Self {
        ArimaSearch {
            max_p: 5,
            max_d: 2,
            max_q: 5,
            max_seasonal_p: 2,
            max_seasonal_d: 1,
            max_seasonal_q: 2,
            criterion: ModelSelectionCriterion::Aicc,
        }
    }
}

/// Result of model selection for a single model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSelectionResult {
    /// Model order (p, d, q)
    pub order: (usize, usize, usize),
    /// Seasonal order (P, D, Q, m)
    pub seasonal_order: (usize, usize, usize, usize),
    pub aic: Option<f64>,
    pub aicc: Option<f64>,
    pub bic: Option<f64>,
    /// Whether the model was successfully fitted
    pub success: bool,
}

/// Auto ARIMA for automatic model selection
#[derive(Debug, Clone)]
pub struct AutoArima {
    search: ArimaSearch,
    /// Seasonal period (0 or 1 for non-seasonal)
    seasonal_period: usize,
    /// Best model found
    best_model: Option<SarimaForecaster>,
    selection_results: Vec<ModelSelectionResult>,
}

impl AutoArima {
    pub fn with_search(search: ArimaSearch) -> Self {
        AutoArima {
            search,
            seasonal_period: 0,
            best_model: None,
            selection_results: Vec::new(),
        }
    }

    /// Set seasonal period
    pub fn seasonal(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    fn is_seasonal(&self) -> bool {
        self.seasonal_period > 1
    }

    /// Fit every candidate order and keep the best by the configured criterion
    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        let n_obs = values.len();
        self.selection_results.clear();
        self.best_model = None;

        let d = self.estimate_differencing_order(values);
        let seasonal_d = if self.is_seasonal() {
            self.estimate_seasonal_differencing_order(values)
        } else {
            0
        };
        log::debug!(
            "auto arima: d={}, D={}, m={}, {} observations",
            d,
            seasonal_d,
            self.seasonal_period,
            n_obs
        );

        let seasonal_grid: Vec<(usize, usize)> = if self.is_seasonal() {
            (0..=self.search.max_seasonal_p)
                .flat_map(|sp| (0..=self.search.max_seasonal_q).map(move |sq| (sp, sq)))
                .collect()
        } else {
            vec![(0, 0)]
        };
        let period = if self.is_seasonal() { self.seasonal_period } else { 1 };
        let seasonal_d = if self.is_seasonal() { seasonal_d } else { 0 };

        let mut best: Option<(f64, SarimaForecaster)> = None;

        for p in 0..=self.search.max_p {
            for q in 0..=self.search.max_q {
                for &(seasonal_p, seasonal_q) in &seasonal_grid {
                    let mut model =
                        SarimaForecaster::new(p, d, q, seasonal_p, seasonal_d, seasonal_q, period);
                    let outcome = model.fit(values);

                    let result = ModelSelectionResult {
                        order: (p, d, q),
                        seasonal_order: (seasonal_p, seasonal_d, seasonal_q, period),
                        aic: model.aic(),
                        aicc: model.aicc(n_obs),
                        bic: model.bic(n_obs),
                        success: outcome.is_ok(),
                    };

                    match outcome {
                        Ok(()) => {
                            let value = self.criterion_value(&result);
                            log::debug!(
                                "auto arima: ({},{},{})({},{},{}){} -> {:.4}",
                                p,
                                d,
                                q,
                                seasonal_p,
                                seasonal_d,
                                seasonal_q,
                                period,
                                value
                            );
                            if best.as_ref().map_or(true, |(v, _)| value < *v) {
                                best = Some((value, model));
                            }
                        }
                        Err(e) => log::debug!(
                            "auto arima: ({},{},{})({},{},{}){} failed: {}",
                            p,
                            d,
                            q,
                            seasonal_p,
                            seasonal_d,
                            seasonal_q,
                            period,
                            e
                        ),
                    }
                    self.selection_results.push(result);
                }
            }
        }

        match best {
            Some((_, model)) => {
                self.best_model = Some(model);
                Ok(())
            }
            None => Err(Error::InvalidOperation(format!(
                "No suitable model found among {} candidate orders",
                self.selection_results.len()
            ))),
        }
    }

    /// Get the criterion value based on selected criterion
    fn criterion_value(&self, result: &ModelSelectionResult) -> f64 {
        match self.search.criterion {
            ModelSelectionCriterion::Aic => result.aic,
            ModelSelectionCriterion::Aicc => result.aicc,
            ModelSelectionCriterion::Bic => result.bic,
        }
        .unwrap_or(f64::INFINITY)
    }

    /// Estimate the differencing order from variance ratios
    fn estimate_differencing_order(&self, values: &[f64]) -> usize {
        let var0 = variance(values);
        if var0 < 1e-10 || values.len() < 3 {
            return 0;
        }

        let diff1: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        let var1 = variance(&diff1);

        // If differencing reduces variance significantly, use d=1
        if var1 < var0 * 0.9 {
            let diff2: Vec<f64> = diff1.windows(2).map(|w| w[1] - w[0]).collect();
            let var2 = variance(&diff2);

            if var2 < var1 * 0.9 {
                2.min(self.search.max_d)
            } else {
                1.min(self.search.max_d)
            }
        } else {
            0
        }
    }

    /// Estimate seasonal differencing order
    fn estimate_seasonal_differencing_order(&self, values: &[f64]) -> usize {
        if values.len() <= self.seasonal_period * 2 {
            return 0;
        }

        let var0 = variance(values);
        let seasonal_diff: Vec<f64> = values
            .iter()
            .skip(self.seasonal_period)
            .zip(values.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();

        if variance(&seasonal_diff) < var0 * 0.8 {
            1.min(self.search.max_seasonal_d)
        } else {
            0
        }
    }

    /// Get the best model
    pub fn best_model(&self) -> Option<&SarimaForecaster> {
        self.best_model.as_ref()
    }

    /// Consume the selector, keeping the best model
    pub fn into_best_model(self) -> Option<SarimaForecaster> {
        self.best_model
    }

    /// Get all model selection results
    pub fn selection_results(&self) -> &[ModelSelectionResult] {
        &self.selection_results
    }

    /// Get summary of model selection
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Auto ARIMA Model Selection Summary\n");
        summary.push_str("==================================\n\n");

        if let Some(model) = &self.best_model {
            let (p, d, q) = model.order();
            summary.push_str(&format!("Best Model: ARIMA({},{},{})", p, d, q));
            let (sp, sd, sq, m) = model.seasonal_order();
            if m > 1 {
                summary.push_str(&format!("({},{},{}){}", sp, sd, sq, m));
            }
            summary.push_str("\n\n");

            if let Some(aic) = model.aic() {
                summary.push_str(&format!("AIC: {:.4}\n", aic));
            }
        } else {
            summary.push_str("No model selected.\n");
        }

        summary.push_str(&format!(
            "\nModels evaluated: {}\n",
            self.selection_results.len()
        ));

        summary
    }
}

impl Forecaster for AutoArima {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        AutoArima::fit(self, values)
    }

    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ForecastResult> {
        let model = self
            .best_model
            .as_ref()
            .ok_or_else(|| Error::InvalidOperation("No model fitted".to_string()))?;
        model.forecast(periods, confidence_level)
    }

    fn name(&self) -> &str {
        "Auto ARIMA"
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        self.best_model
            .as_ref()
            .map(|m| m.parameters())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(max_p: usize, max_d: usize, max_q: usize) -> ArimaSearch {
        ArimaSearch {
            max_p,
            max_d,
            max_q,
            ..ArimaSearch::default()
        }
    }

    fn trend_series() -> Vec<f64> {
        (0..100)
            .map(|i| 10.0 + i as f64 * 0.5 + (i as f64 * 0.1).sin())
            .collect()
    }

    #[test]
    fn test_auto_arima() {
        let values = trend_series();
        let mut auto = AutoArima::with_search(bounded(2, 2, 2));

        auto.fit(&values).unwrap();
        assert!(auto.best_model().is_some());
        assert_eq!(auto.selection_results().len(), 9);

        let result = auto.forecast(5, 0.95).unwrap();
        assert_eq!(result.forecast.len(), 5);
    }

    #[test]
    fn test_auto_arima_summary() {
        let mut auto = AutoArima::with_search(bounded(2, 1, 2));
        auto.fit(&trend_series()).unwrap();

        let summary = auto.summary();
        assert!(summary.contains("Best Model"));
        assert!(summary.contains("Models evaluated: 9"));
    }

    #[test]
    fn test_model_selection_criterion() {
        let values = trend_series();

        let mut auto_aic = AutoArima::with_search(ArimaSearch {
            criterion: ModelSelectionCriterion::Aic,
            ..bounded(1, 2, 1)
        });
        let mut auto_bic = AutoArima::with_search(ArimaSearch {
            criterion: ModelSelectionCriterion::Bic,
            ..bounded(1, 2, 1)
        });

        auto_aic.fit(&values).unwrap();
        auto_bic.fit(&values).unwrap();

        assert!(auto_aic.best_model().is_some());
        assert!(auto_bic.best_model().is_some());
    }

    #[test]
    fn test_seasonal_grid() {
        let values: Vec<f64> = (0..60)
            .map(|i| 5.0 * (i as f64 * 2.0 * std::f64::consts::PI / 12.0).sin() + i as f64 * 0.05)
            .collect();
        let mut auto = AutoArima::with_search(ArimaSearch {
            max_seasonal_p: 1,
            max_seasonal_q: 1,
            ..bounded(1, 2, 1)
        })
        .seasonal(12);

        auto.fit(&values).unwrap();
        assert_eq!(auto.selection_results().len(), 16);
        assert!(auto.selection_results().iter().all(|r| r.seasonal_order.3 == 12));
    }

    #[test]
    fn test_constant_series_forecasts_zero_mean() {
        let mut auto = AutoArima::with_search(bounded(1, 2, 1));
        auto.fit(&[2.0, 2.0]).unwrap();

        let result = auto.forecast(1, 0.95).unwrap();
        assert_eq!(result.forecast, vec![0.0]);
    }

    #[test]
    fn test_no_model_for_empty_series() {
        let mut auto = AutoArima::with_search(bounded(1, 2, 1));
        assert!(auto.fit(&[]).is_err());
        assert!(auto.forecast(1, 0.95).is_err());
    }

    #[test]
    fn test_criterion_deserializes_lowercase() {
        let search: ArimaSearch = serde_yaml::from_str("max_p: 2\ncriterion: bic\n").unwrap();
        assert_eq!(search.max_p, 2);
        assert_eq!(search.max_q, 5);
        assert_eq!(search.criterion, ModelSelectionCriterion::Bic);
    }
}
