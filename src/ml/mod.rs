//! Regression models and evaluation metrics
//!
//! Models are fitted on [`Panel`](crate::panel::Panel) columns selected by
//! name, mirroring how the trainer splits a panel into target and features.

pub mod linear;
pub mod metrics;

pub use linear::{LinearRegression, SupervisedModel};
pub use metrics::{mean_absolute_error, mean_squared_error, r2_score, root_mean_squared_error};
