//! Linear regression model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::panel::Panel;

/// Trait shared by supervised models
pub trait SupervisedModel {
    /// Fit the model on `target` explained by `features`
    fn fit(&mut self, df: &Panel, target: &str, features: &[&str]) -> Result<()>;

    /// Predict one value per row of `df`
    fn predict(&self, df: &Panel) -> Result<Vec<f64>>;
}

/// Ordinary least squares with intercept
///
/// Columns that are constant or linearly dependent on earlier columns over
/// the training rows get a zero coefficient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Regression coefficients, one per feature
    coefficients: Vec<f64>,
    intercept: f64,
    feature_names: Vec<String>,
    fitted: bool,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficients keyed by feature name
    pub fn coefficients(&self) -> BTreeMap<String, f64> {
        self.feature_names
            .iter()
            .zip(self.coefficients.iter())
            .map(|(name, coef)| (name.clone(), *coef))
            .collect()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }
}

impl SupervisedModel for LinearRegression {
    fn fit(&mut self, df: &Panel, target: &str, features: &[&str]) -> Result<()> {
        let y = df
            .column(target)
            .ok_or_else(|| Error::InvalidInput(format!("Target column '{}' not found", target)))?;
        if features.is_empty() {
            return Err(Error::InvalidInput("no feature columns to regress on".to_string()));
        }
        if y.is_empty() {
            return Err(Error::InsufficientData("no training rows".to_string()));
        }

        let xs = features
            .iter()
            .map(|name| {
                df.column(name).ok_or_else(|| {
                    Error::InvalidInput(format!("Feature column '{}' not found", name))
                })
            })
            .collect::<Result<Vec<&[f64]>>>()?;

        let n = y.len() as f64;
        let y_mean = y.iter().sum::<f64>() / n;
        let x_means: Vec<f64> = xs.iter().map(|x| x.iter().sum::<f64>() / n).collect();

        // Normal equations on centered data: (Xc'Xc) b = Xc'yc
        let k = xs.len();
        let mut xtx = vec![vec![0.0; k]; k];
        let mut xty = vec![0.0; k];
        for i in 0..k {
            for j in i..k {
                let s: f64 = xs[i]
                    .iter()
                    .zip(xs[j].iter())
                    .map(|(a, b)| (a - x_means[i]) * (b - x_means[j]))
                    .sum();
                xtx[i][j] = s;
                xtx[j][i] = s;
            }
            xty[i] = xs[i]
                .iter()
                .zip(y.iter())
                .map(|(a, b)| (a - x_means[i]) * (b - y_mean))
                .sum();
        }

        let coefficients = solve_least_squares(xtx, xty);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(x_means.iter())
                .map(|(b, m)| b * m)
                .sum::<f64>();

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::ComputationError(
                "least squares solution is not finite".to_string(),
            ));
        }

        self.coefficients = coefficients;
        self.intercept = intercept;
        self.feature_names = features.iter().map(|s| s.to_string()).collect();
        self.fitted = true;

        Ok(())
    }

    fn predict(&self, df: &Panel) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(Error::InvalidOperation(
                "Model has not been fitted yet".to_string(),
            ));
        }

        let mut predictions = vec![self.intercept; df.nrows()];
        for (name, coef) in self.feature_names.iter().zip(self.coefficients.iter()) {
            let column = df.column(name).ok_or_else(|| {
                Error::InvalidInput(format!("Feature column '{}' not found", name))
            })?;
            for (p, x) in predictions.iter_mut().zip(column.iter()) {
                *p += coef * x;
            }
        }

        Ok(predictions)
    }
}

/// Gauss-Jordan elimination with partial pivoting
///
/// Columns whose best pivot is negligible are left free and solved as zero,
/// which yields a minimum-support solution for singular systems.
fn solve_least_squares(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    let scale = a
        .iter()
        .enumerate()
        .map(|(i, row)| row[i].abs())
        .fold(1.0, f64::max);
    let tolerance = 1e-10 * scale;

    let mut pivots: Vec<(usize, usize)> = Vec::with_capacity(n); // (column, row)
    let mut row = 0;

    for col in 0..n {
        if row == n {
            break;
        }

        let mut max_row = row;
        let mut max_val = a[row][col].abs();
        for r in row + 1..n {
            if a[r][col].abs() > max_val {
                max_row = r;
                max_val = a[r][col].abs();
            }
        }
        if max_val < tolerance {
            continue;
        }

        a.swap(row, max_row);
        b.swap(row, max_row);

        let pivot = a[row][col];
        for j in 0..n {
            a[row][j] /= pivot;
        }
        b[row] /= pivot;

        for r in 0..n {
            if r != row {
                let factor = a[r][col];
                if factor != 0.0 {
                    for j in 0..n {
                        a[r][j] -= factor * a[row][j];
                    }
                    b[r] -= factor * b[row];
                }
            }
        }

        pivots.push((col, row));
        row += 1;
    }

    let mut solution = vec![0.0; n];
    for (col, r) in pivots {
        solution[col] = b[r];
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::MonthPeriod;
    use crate::ml::r2_score;

    fn panel(columns: Vec<(&str, Vec<f64>)>) -> Panel {
        let rows = columns[0].1.len();
        let start = MonthPeriod::new(2020, 1).unwrap();
        let mut index = vec![start];
        for _ in 1..rows {
            let next = index[index.len() - 1].succ();
            index.push(next);
        }
        Panel::new(
            index,
            columns
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_simple_regression() {
        let df = panel(vec![
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![3.0, 5.0, 7.0, 9.0, 11.0]),
        ]);
        let mut model = LinearRegression::new();
        model.fit(&df, "y", &["x"]).unwrap();

        assert!((model.intercept() - 1.0).abs() < 1e-9);
        assert!((model.coefficients()["x"] - 2.0).abs() < 1e-9);
        let predictions = model.predict(&df).unwrap();
        assert!(r2_score(df.column("y").unwrap(), &predictions).unwrap() > 1.0 - 1e-9);
    }

    #[test]
    fn test_multiple_regression() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x2 = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 0.5 + 1.5 * a - 2.0 * b)
            .collect();
        let df = panel(vec![("x1", x1), ("x2", x2), ("y", y.clone())]);

        let mut model = LinearRegression::new();
        model.fit(&df, "y", &["x1", "x2"]).unwrap();
        let predictions = model.predict(&df).unwrap();

        for (p, t) in predictions.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8);
        }
    }

    #[test]
    fn test_constant_feature_gets_zero_coefficient() {
        let df = panel(vec![("x", vec![2.0, 2.0]), ("y", vec![2.0, 2.0])]);
        let mut model = LinearRegression::new();
        model.fit(&df, "y", &["x"]).unwrap();

        assert_eq!(model.coefficients()["x"], 0.0);
        assert_eq!(model.intercept(), 2.0);
        assert_eq!(model.predict(&df).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_collinear_features() {
        let df = panel(vec![
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![2.0, 4.0, 6.0, 8.0]),
            ("y", vec![1.0, 2.0, 3.0, 4.0]),
        ]);
        let mut model = LinearRegression::new();
        model.fit(&df, "y", &["a", "b"]).unwrap();

        let predictions = model.predict(&df).unwrap();
        for (p, t) in predictions.iter().zip([1.0, 2.0, 3.0, 4.0]) {
            assert!((p - t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_errors() {
        let df = panel(vec![("x", vec![1.0, 2.0]), ("y", vec![1.0, 2.0])]);
        let mut model = LinearRegression::new();

        assert!(model.predict(&df).is_err());
        assert!(model.fit(&df, "missing", &["x"]).is_err());
        assert!(model.fit(&df, "y", &[]).is_err());
        assert!(model.fit(&df, "y", &["nope"]).is_err());
    }
}
