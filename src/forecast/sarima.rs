//! SARIMA(p,d,q)(P,D,Q)\[m\] forecaster

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::forecast::{z_score, ForecastResult, Forecaster};

/// SARIMA (Seasonal ARIMA) model
/// ARIMA(p,d,q)(P,D,Q)\[m\]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaForecaster {
    /// Non-seasonal AR order
    p: usize,
    /// Non-seasonal differencing order
    d: usize,
    /// Non-seasonal MA order
    q: usize,
    /// Seasonal AR order
    seasonal_p: usize,
    /// Seasonal differencing order
    seasonal_d: usize,
    /// Seasonal MA order
    seasonal_q: usize,
    /// Seasonal period (e.g., 12 for monthly data with yearly seasonality)
    seasonal_period: usize,
    /// AR parameters
    ar_params: Option<Vec<f64>>,
    /// MA parameters
    ma_params: Option<Vec<f64>>,
    /// Seasonal AR parameters
    seasonal_ar_params: Option<Vec<f64>>,
    /// Seasonal MA parameters
    seasonal_ma_params: Option<Vec<f64>>,
    /// Fitted values (differenced scale)
    fitted_values: Option<Vec<f64>>,
    /// Residuals
    residuals: Option<Vec<f64>>,
    /// Series before each differencing step, with the lag used
    stages: Vec<(Vec<f64>, usize)>,
    /// Differenced series
    differenced_series: Option<Vec<f64>>,
    /// Residual standard deviation
    residual_std: Option<f64>,
    /// Log likelihood
    log_likelihood: Option<f64>,
    /// Number of parameters (for AIC/BIC calculation)
    n_params: usize,
}

impl SarimaForecaster {
    /// Create a new SARIMA model
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        seasonal_p: usize,
        seasonal_d: usize,
        seasonal_q: usize,
        seasonal_period: usize,
    ) -> Self {
        let n_params = p + q + seasonal_p + seasonal_q + 1; // +1 for variance
        SarimaForecaster {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            seasonal_period,
            ar_params: None,
            ma_params: None,
            seasonal_ar_params: None,
            seasonal_ma_params: None,
            fitted_values: None,
            residuals: None,
            stages: Vec::new(),
            differenced_series: None,
            residual_std: None,
            log_likelihood: None,
            n_params,
        }
    }

    /// Create a non-seasonal ARIMA model
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(p, d, q, 0, 0, 0, 1)
    }

    /// Non-seasonal order (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Seasonal order (P, D, Q, m)
    pub fn seasonal_order(&self) -> (usize, usize, usize, usize) {
        (
            self.seasonal_p,
            self.seasonal_d,
            self.seasonal_q,
            self.seasonal_period,
        )
    }

    pub fn is_seasonal(&self) -> bool {
        self.seasonal_period > 1
            && (self.seasonal_p > 0 || self.seasonal_d > 0 || self.seasonal_q > 0)
    }

    pub fn log_likelihood(&self) -> Option<f64> {
        self.log_likelihood
    }

    /// Minimum number of observations the model can be fitted on
    pub fn min_observations(&self) -> usize {
        self.p
            + self.d
            + self.q
            + self.seasonal_period * (self.seasonal_p + self.seasonal_d + self.seasonal_q)
            + 1
    }

    fn information_criterion(&self, penalty_per_param: f64) -> Option<f64> {
        self.log_likelihood
            .map(|ll| self.n_params as f64 * penalty_per_param - 2.0 * ll)
    }

    pub fn aic(&self) -> Option<f64> {
        self.information_criterion(2.0)
    }

    pub fn bic(&self, n_obs: usize) -> Option<f64> {
        self.information_criterion((n_obs as f64).ln())
    }

    /// AIC with the small-sample correction; plain AIC when `n_obs` is too small for it
    pub fn aicc(&self, n_obs: usize) -> Option<f64> {
        let k = self.n_params as f64;
        let slack = n_obs as f64 - k - 1.0;
        let correction = if slack > 0.0 {
            2.0 * k * (k + 1.0) / slack
        } else {
            0.0
        };
        self.aic().map(|aic| aic + correction)
    }

    /// One-step prediction on the differenced scale
    fn predict_step(
        &self,
        series: &[f64],
        residuals: &[f64],
        ar: &[f64],
        ma: &[f64],
        seasonal_ar: &[f64],
        seasonal_ma: &[f64],
    ) -> f64 {
        let n = series.len();
        let mut prediction = 0.0;

        for (j, &param) in ar.iter().enumerate() {
            if n > j {
                prediction += param * series[n - j - 1];
            }
        }
        for (j, &param) in ma.iter().enumerate() {
            if j < residuals.len() {
                prediction += param * residuals[residuals.len() - j - 1];
            }
        }
        for (j, &param) in seasonal_ar.iter().enumerate() {
            let lag = (j + 1) * self.seasonal_period;
            if n >= lag {
                prediction += param * series[n - lag];
            }
        }
        for (j, &param) in seasonal_ma.iter().enumerate() {
            let lag = (j + 1) * self.seasonal_period;
            if lag <= residuals.len() {
                prediction += param * residuals[residuals.len() - lag];
            }
        }
        prediction
    }
}

/// Difference `values` at `lag`
fn difference(values: &[f64], lag: usize) -> Vec<f64> {
    values
        .iter()
        .skip(lag)
        .zip(values.iter())
        .map(|(curr, prev)| curr - prev)
        .collect()
}

/// Undo one differencing step for values forecast past the end of `history`
fn undifference(forecasts: &[f64], history: &[f64], lag: usize) -> Vec<f64> {
    let mut extended = history.to_vec();
    for &f in forecasts {
        let base = extended[extended.len() - lag];
        extended.push(f + base);
    }
    extended.split_off(history.len())
}

/// Sample autocorrelations at lags `0..=max_lag`, `None` for a flat series
fn autocorrelations(values: &[f64], max_lag: usize) -> Option<Vec<f64>> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let deviations: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let autocovariance = |lag: usize| {
        deviations[lag..]
            .iter()
            .zip(&deviations)
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n
    };

    let variance = autocovariance(0);
    if variance < 1e-10 {
        return None;
    }
    Some((0..=max_lag).map(|lag| autocovariance(lag) / variance).collect())
}

/// AR coefficients solving the Yule-Walker equations by Levinson-Durbin
fn yule_walker(values: &[f64], order: usize) -> Vec<f64> {
    if order == 0 || values.len() <= order {
        return Vec::new();
    }
    let rho = match autocorrelations(values, order) {
        Some(rho) => rho,
        None => return vec![0.0; order],
    };

    let mut phi: Vec<f64> = Vec::with_capacity(order);
    for k in 0..order {
        let numerator = rho[k + 1] - (0..k).map(|j| phi[j] * rho[k - j]).sum::<f64>();
        let denominator = 1.0 - (0..k).map(|j| phi[j] * rho[j + 1]).sum::<f64>();
        let reflection = if denominator.abs() < 1e-10 {
            0.0
        } else {
            numerator / denominator
        };

        let previous = phi.clone();
        for j in 0..k {
            phi[j] = previous[j] - reflection * previous[k - 1 - j];
        }
        phi.push(reflection);
    }
    phi
}

/// MA coefficients approximated by the residual autocorrelations, kept invertible
fn residual_ma(residuals: &[f64], order: usize) -> Vec<f64> {
    if order == 0 || residuals.len() <= order {
        return Vec::new();
    }
    match autocorrelations(residuals, order) {
        Some(rho) => rho[1..].iter().map(|r| r.clamp(-0.99, 0.99)).collect(),
        None => vec![0.0; order],
    }
}

/// One-step errors of a pure AR filter over `series`
fn ar_residuals(series: &[f64], phi: &[f64]) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            let prediction: f64 = phi
                .iter()
                .take(i)
                .enumerate()
                .map(|(j, c)| c * series[i - j - 1])
                .sum();
            series[i] - prediction
        })
        .collect()
}

/// Zero-mean Gaussian log-likelihood; negative infinity for a degenerate variance
fn gaussian_log_likelihood(residuals: &[f64], variance: f64) -> f64 {
    if variance <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let n = residuals.len() as f64;
    let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
    -0.5 * (n * (2.0 * std::f64::consts::PI * variance).ln() + sum_sq / variance)
}

impl Forecaster for SarimaForecaster {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        let min_len = self.min_observations();
        if values.len() < min_len {
            return Err(Error::InsufficientData(format!(
                "series too short for SARIMA model: need at least {} observations, got {}",
                min_len,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(
                "missing or infinite values not supported in SARIMA".to_string(),
            ));
        }

        // Non-seasonal differencing, then seasonal differencing
        let mut stages = Vec::with_capacity(self.d + self.seasonal_d);
        let mut working_series = values.to_vec();
        for _ in 0..self.d {
            let next = difference(&working_series, 1);
            stages.push((std::mem::replace(&mut working_series, next), 1));
        }
        if self.seasonal_period > 1 {
            for _ in 0..self.seasonal_d {
                if working_series.len() <= self.seasonal_period {
                    return Err(Error::InsufficientData(format!(
                        "{} observations left after differencing, seasonal period is {}",
                        working_series.len(),
                        self.seasonal_period
                    )));
                }
                let next = difference(&working_series, self.seasonal_period);
                stages.push((std::mem::replace(&mut working_series, next), self.seasonal_period));
            }
        }

        let ar_params = yule_walker(&working_series, self.p);
        let innovations = ar_residuals(&working_series, &ar_params);
        let ma_params = residual_ma(&innovations, self.q);
        let seasonal_ar_params = yule_walker(&working_series, self.seasonal_p);
        let seasonal_ma_params = residual_ma(&innovations, self.seasonal_q);

        let mut fitted = Vec::with_capacity(working_series.len());
        let mut residuals: Vec<f64> = Vec::with_capacity(working_series.len());

        for i in 0..working_series.len() {
            let prediction = self.predict_step(
                &working_series[..i],
                &residuals,
                &ar_params,
                &ma_params,
                &seasonal_ar_params,
                &seasonal_ma_params,
            );
            fitted.push(prediction);
            residuals.push(working_series[i] - prediction);
        }

        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
        let log_likelihood = gaussian_log_likelihood(&residuals, variance);
        if !log_likelihood.is_finite() {
            return Err(Error::ComputationError(
                "degenerate fit: residual variance is zero or not finite".to_string(),
            ));
        }

        self.ar_params = Some(ar_params);
        self.ma_params = Some(ma_params);
        self.seasonal_ar_params = Some(seasonal_ar_params);
        self.seasonal_ma_params = Some(seasonal_ma_params);
        self.fitted_values = Some(fitted);
        self.residuals = Some(residuals);
        self.stages = stages;
        self.differenced_series = Some(working_series);
        self.residual_std = Some(variance.sqrt());
        self.log_likelihood = Some(log_likelihood);

        Ok(())
    }

    fn forecast(&self, periods: usize, confidence_level: f64) -> Result<ForecastResult> {
        let not_fitted = || Error::InvalidOperation("Model not fitted".to_string());
        let ar_params = self.ar_params.as_ref().ok_or_else(not_fitted)?;
        let ma_params = self.ma_params.as_ref().ok_or_else(not_fitted)?;
        let differenced = self.differenced_series.as_ref().ok_or_else(not_fitted)?;
        let residuals = self.residuals.as_ref().ok_or_else(not_fitted)?;
        let seasonal_ar = self.seasonal_ar_params.as_deref().unwrap_or(&[]);
        let seasonal_ma = self.seasonal_ma_params.as_deref().unwrap_or(&[]);

        let mut forecasts = Vec::with_capacity(periods);
        let mut extended_series = differenced.clone();
        let mut extended_residuals = residuals.clone();

        for _ in 0..periods {
            let forecast = self.predict_step(
                &extended_series,
                &extended_residuals,
                ar_params,
                ma_params,
                seasonal_ar,
                seasonal_ma,
            );
            forecasts.push(forecast);
            extended_series.push(forecast);
            extended_residuals.push(0.0); // Expected residual for future
        }

        // Back to the original scale
        for (history, lag) in self.stages.iter().rev() {
            forecasts = undifference(&forecasts, history, *lag);
        }

        // Prediction interval widens with horizon
        let residual_std = self.residual_std.unwrap_or(1.0);
        let z = z_score(confidence_level);
        let margins: Vec<f64> = (0..periods)
            .map(|h| z * residual_std * ((h + 1) as f64).sqrt())
            .collect();
        let lower_ci = forecasts.iter().zip(&margins).map(|(f, m)| f - m).collect();
        let upper_ci = forecasts.iter().zip(&margins).map(|(f, m)| f + m).collect();

        Ok(ForecastResult {
            forecast: forecasts,
            lower_ci,
            upper_ci,
            method: self.name().to_string(),
            parameters: self.parameters(),
            confidence_level,
            aic: self.aic(),
            bic: self.bic(differenced.len()),
        })
    }

    fn name(&self) -> &str {
        "SARIMA"
    }

    fn parameters(&self) -> BTreeMap<String, f64> {
        let mut params = BTreeMap::new();
        params.insert("p".to_string(), self.p as f64);
        params.insert("d".to_string(), self.d as f64);
        params.insert("q".to_string(), self.q as f64);
        params.insert("P".to_string(), self.seasonal_p as f64);
        params.insert("D".to_string(), self.seasonal_d as f64);
        params.insert("Q".to_string(), self.seasonal_q as f64);
        params.insert("m".to_string(), self.seasonal_period as f64);
        params
    }
}
