use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::forecast::SarimaForecaster;
use crate::ml::LinearRegression;

/// Name under which the classical forecaster is reported
pub const ARIMA: &str = "ARIMA";
/// Name under which the regression model is reported
pub const LINEAR_REGRESSION: &str = "Linear Regression";

/// A trained candidate, serialized as the run's model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum FittedModel {
    Arima(SarimaForecaster),
    Linear(LinearRegression),
}

impl FittedModel {
    pub fn name(&self) -> &'static str {
        match self {
            FittedModel::Arima(_) => ARIMA,
            FittedModel::Linear(_) => LINEAR_REGRESSION,
        }
    }
}

/// Result of fitting and scoring one candidate
#[derive(Debug)]
pub enum CandidateOutcome {
    Fitted { model: FittedModel, rmse: f64 },
    Failed { error: Error },
}

impl CandidateOutcome {
    /// Wrap a fit attempt; failures and non-finite errors become `Failed`
    pub fn from_attempt(name: &str, attempt: Result<(FittedModel, f64)>) -> Self {
        match attempt {
            Ok((model, rmse)) if rmse.is_finite() => CandidateOutcome::Fitted { model, rmse },
            Ok((_, rmse)) => {
                let error = Error::ModelFit {
                    model: name.to_string(),
                    reason: format!("RMSE is not finite ({})", rmse),
                };
                log::warn!("{}", error);
                CandidateOutcome::Failed { error }
            }
            Err(cause) => {
                let error = match cause {
                    Error::ModelFit { .. } => cause,
                    other => Error::model_fit(name, &other),
                };
                log::warn!("{}", error);
                CandidateOutcome::Failed { error }
            }
        }
    }

    /// Selection metric; a failed candidate scores positive infinity
    pub fn rmse(&self) -> f64 {
        match self {
            CandidateOutcome::Fitted { rmse, .. } => *rmse,
            CandidateOutcome::Failed { .. } => f64::INFINITY,
        }
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, CandidateOutcome::Fitted { .. })
    }
}

/// Winner of the comparison and both scores
#[derive(Debug)]
pub struct Selection {
    pub model: FittedModel,
    pub rmse_arima: f64,
    pub rmse_linear: f64,
}

impl Selection {
    pub fn selected_name(&self) -> &'static str {
        self.model.name()
    }
}

/// Choose between the classical and the linear candidate
///
/// The linear model wins only with a strictly lower RMSE, so ties go to the
/// classical model. Two failed candidates are a run-level failure.
pub fn select(classical: CandidateOutcome, linear: CandidateOutcome) -> Result<Selection> {
    let rmse_arima = classical.rmse();
    let rmse_linear = linear.rmse();

    let model = match (classical, linear) {
        (
            CandidateOutcome::Fitted { model: c, rmse: rc },
            CandidateOutcome::Fitted { model: l, rmse: rl },
        ) => {
            if rl < rc {
                l
            } else {
                c
            }
        }
        (CandidateOutcome::Fitted { model, .. }, CandidateOutcome::Failed { .. }) => model,
        (CandidateOutcome::Failed { .. }, CandidateOutcome::Fitted { model, .. }) => model,
        (CandidateOutcome::Failed { error: c }, CandidateOutcome::Failed { error: l }) => {
            return Err(Error::NoViableModel {
                classical: c.to_string(),
                linear: l.to_string(),
            });
        }
    };

    Ok(Selection {
        model,
        rmse_arima,
        rmse_linear,
    })
}
