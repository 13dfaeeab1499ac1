//! Ordinary least squares on a dummy-coded design
//!
//! Coefficients solve the normal equations `XᵗX β = Xᵗy` through a Cholesky
//! factorisation of the Gram matrix, whose inverse also supplies the
//! coefficient covariance `σ²(XᵗX)⁻¹`. Full column rank is checked first
//! with an SVD so that a singular design is reported rather than solved.

use crate::design::{DesignMatrix, Predictor};
use disparity_confidence::{f_upper_p_value, t_critical, t_two_sided_p_value, ConfidenceLevel};
use disparity_core::{CleanedRecord, Error, NumericField, Result};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, instrument};

/// One estimated coefficient with its inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// A fitted linear model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionModel {
    /// Coefficients in design-column order, intercept first
    pub coefficients: Vec<Coefficient>,
    pub confidence_level: ConfidenceLevel,
    /// `√(SSR / (n - p))`
    pub residual_std_error: f64,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    /// Overall F statistic on `(p - 1, n - p)` degrees of freedom
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub df_model: usize,
    pub df_residual: usize,
    pub n: usize,
    /// Gaussian log-likelihood at the MLE of σ²
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub fitted_values: Vec<f64>,
    pub residuals: Vec<f64>,
    #[serde(skip)]
    gram_inverse: DMatrix<f64>,
}

impl RegressionModel {
    /// Look up a coefficient by design-column name
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    pub fn estimates(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }

    /// Number of estimated coefficients, intercept included
    pub fn n_parameters(&self) -> usize {
        self.coefficients.len()
    }

    /// Sum of squared residuals
    pub fn ssr(&self) -> f64 {
        self.residuals.iter().map(|e| e * e).sum()
    }

    /// `(XᵗX)⁻¹` of the fitted design
    pub fn gram_inverse(&self) -> &DMatrix<f64> {
        &self.gram_inverse
    }

    /// Prediction for one design row, intercept column included
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(Error::size_mismatch(
                self.coefficients.len(),
                row.len(),
                "prediction row",
            ));
        }
        Ok(row
            .iter()
            .zip(&self.coefficients)
            .map(|(x, c)| x * c.estimate)
            .sum())
    }

    /// Predictions for every row of a design with the same columns
    pub fn predict_design(&self, design: &DesignMatrix) -> Result<Vec<f64>> {
        if design.ncols() != self.coefficients.len() {
            return Err(Error::size_mismatch(
                self.coefficients.len(),
                design.ncols(),
                "prediction design columns",
            ));
        }
        let beta = DVector::from_vec(self.estimates());
        Ok((design.matrix() * beta).iter().copied().collect())
    }
}

/// OLS estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct OlsRegression {
    level: ConfidenceLevel,
}

impl OlsRegression {
    /// Coefficient intervals are reported at `level`
    pub fn new(level: ConfidenceLevel) -> Self {
        Self { level }
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.level
    }

    /// Fit `response` on the design
    #[instrument(skip(self, design, response), fields(n = design.nrows(), p = design.ncols()))]
    pub fn fit(&self, design: &DesignMatrix, response: &[f64]) -> Result<RegressionModel> {
        let x = design.matrix();
        let (n, p) = x.shape();

        if response.len() != n {
            return Err(Error::size_mismatch(n, response.len(), "response"));
        }
        if response.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput("Response contains non-finite values".to_string()));
        }
        if n <= p {
            return Err(Error::insufficient(p + 1, n));
        }

        let (rank, tolerance) = rank_with_tolerance(x);
        if rank < p {
            return Err(singular_design(design, rank, tolerance));
        }

        let y = DVector::from_column_slice(response);
        let gram = x.tr_mul(x);
        let xty = x.tr_mul(&y);
        let chol = gram
            .cholesky()
            .ok_or_else(|| singular_design(design, rank, tolerance))?;
        let beta = chol.solve(&xty);
        let gram_inverse = chol.inverse();

        let fitted = x * &beta;
        let residuals = &y - &fitted;

        let nf = n as f64;
        let df_model = p - 1;
        let df_residual = n - p;
        let df_resid = df_residual as f64;

        let ssr = residuals.norm_squared();
        let mean_y = y.mean();
        let sst: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
        let sigma2 = ssr / df_resid;
        let residual_std_error = sigma2.sqrt();

        let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { f64::NAN };
        let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / df_resid;

        let (f_statistic, f_p_value) = if df_model == 0 {
            (f64::NAN, f64::NAN)
        } else {
            let f = ((sst - ssr) / df_model as f64) / sigma2;
            (f, f_upper_p_value(f, df_model as f64, df_resid)?)
        };

        let critical = t_critical(self.level, df_resid)?;
        let coefficients = design
            .column_names()
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let estimate = beta[j];
                let std_error = (sigma2 * gram_inverse[(j, j)]).max(0.0).sqrt();
                let t_statistic = estimate / std_error;
                Ok(Coefficient {
                    name: name.clone(),
                    estimate,
                    std_error,
                    t_statistic,
                    p_value: t_two_sided_p_value(t_statistic, df_resid)?,
                    ci_lower: estimate - critical * std_error,
                    ci_upper: estimate + critical * std_error,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let log_likelihood = -0.5 * nf * ((2.0 * PI).ln() + (ssr / nf).ln() + 1.0);
        let k = p as f64;
        let aic = 2.0 * k - 2.0 * log_likelihood;
        let bic = nf.ln() * k - 2.0 * log_likelihood;

        debug!(r_squared, residual_std_error, f_statistic, "fitted OLS model");

        Ok(RegressionModel {
            coefficients,
            confidence_level: self.level,
            residual_std_error,
            r_squared,
            adjusted_r_squared,
            f_statistic,
            f_p_value,
            df_model,
            df_residual,
            n,
            log_likelihood,
            aic,
            bic,
            fitted_values: fitted.iter().copied().collect(),
            residuals: residuals.iter().copied().collect(),
            gram_inverse,
        })
    }

    /// Build the design from records and fit `response` on it
    pub fn fit_records(
        &self,
        records: &[CleanedRecord],
        response: NumericField,
        predictors: &[Predictor],
    ) -> Result<(DesignMatrix, RegressionModel)> {
        let design = DesignMatrix::from_records(records, predictors)?;
        let y: Vec<f64> = records.iter().map(|r| response.value(r)).collect();
        let model = self.fit(&design, &y)?;
        Ok((design, model))
    }
}

/// Singular values below this fraction of the largest count as zero
const RELATIVE_RANK_TOLERANCE: f64 = 1e-9;

/// Numerical rank of `x` and the absolute tolerance it was judged against
fn rank_with_tolerance(x: &DMatrix<f64>) -> (usize, f64) {
    if x.ncols() == 0 {
        return (0, 0.0);
    }
    let svd = x.clone().svd(false, false);
    let largest = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let tolerance = largest * RELATIVE_RANK_TOLERANCE;
    (svd.rank(tolerance), tolerance)
}

fn matrix_rank(x: DMatrix<f64>, tolerance: f64) -> usize {
    if x.ncols() == 0 {
        return 0;
    }
    x.svd(false, false).rank(tolerance)
}

/// Walk the terms in order and name those that add less rank than columns
fn singular_design(design: &DesignMatrix, rank: usize, tolerance: f64) -> Error {
    let x = design.matrix();
    let mut degenerate = Vec::new();
    let mut previous_rank = 0;

    for term in design.terms() {
        if term.columns.is_empty() {
            continue;
        }
        let prefix = x.columns(0, term.columns.end).clone_owned();
        let prefix_rank = matrix_rank(prefix, tolerance);
        if prefix_rank.saturating_sub(previous_rank) < term.width() {
            degenerate.push(term.name.clone());
        }
        previous_rank = prefix_rank;
    }

    Error::SingularDesign {
        terms: degenerate,
        rank,
        columns: design.ncols(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::PredictorColumn;
    use approx::assert_relative_eq;

    fn numeric(name: &str, values: &[f64]) -> PredictorColumn {
        PredictorColumn::Numeric {
            name: name.to_string(),
            values: values.to_vec(),
        }
    }

    fn categorical(name: &str, levels: &[&str], codes: &[usize]) -> PredictorColumn {
        PredictorColumn::Categorical {
            name: name.to_string(),
            levels: levels.iter().map(|l| l.to_string()).collect(),
            codes: codes.to_vec(),
        }
    }

    #[test]
    fn test_simple_regression() {
        // y = 1 + 2x + e
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.1, 4.9, 7.2, 8.8, 11.0];
        let design = DesignMatrix::build(5, &[numeric("x", &x)]).unwrap();
        let model = OlsRegression::default().fit(&design, &y).unwrap();

        // Closed form: slope = Sxy / Sxx = 19.7 / 10, intercept = 7 - 1.97 * 3
        assert_relative_eq!(model.coefficient("x").unwrap().estimate, 1.97, epsilon = 1e-10);
        assert_relative_eq!(
            model.coefficient("(Intercept)").unwrap().estimate,
            7.0 - 1.97 * 3.0,
            epsilon = 1e-10
        );
        assert_eq!(model.df_model, 1);
        assert_eq!(model.df_residual, 3);
        assert!(model.r_squared > 0.99);
        assert!(model.adjusted_r_squared < model.r_squared);

        // With one slope the F statistic is the square of its t statistic
        let t = model.coefficient("x").unwrap().t_statistic;
        assert_relative_eq!(model.f_statistic, t * t, max_relative = 1e-9);
        assert_relative_eq!(model.f_p_value, model.coefficient("x").unwrap().p_value, epsilon = 1e-9);
    }

    #[test]
    fn test_standard_errors_match_closed_form() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 4.5, 5.5, 8.5, 9.0, 12.5];
        let design = DesignMatrix::build(6, &[numeric("x", &x)]).unwrap();
        let model = OlsRegression::default().fit(&design, &y).unwrap();

        let sxx: f64 = 17.5;
        let sigma = model.residual_std_error;
        let slope = model.coefficient("x").unwrap();
        assert_relative_eq!(slope.std_error, sigma / sxx.sqrt(), max_relative = 1e-9);
        assert_relative_eq!(
            model.residual_std_error,
            (model.ssr() / 4.0).sqrt(),
            max_relative = 1e-12
        );
        assert!(slope.ci_lower < slope.estimate && slope.estimate < slope.ci_upper);
    }

    #[test]
    fn test_group_means_from_dummies() {
        // With only a categorical predictor the fit reproduces group means
        let y = [10.0, 12.0, 20.0, 22.0, 30.0, 34.0];
        let design = DesignMatrix::build(
            6,
            &[categorical("grp", &["a", "b", "c"], &[0, 0, 1, 1, 2, 2])],
        )
        .unwrap();
        let model = OlsRegression::default().fit(&design, &y).unwrap();

        assert_relative_eq!(model.estimates()[0], 11.0, epsilon = 1e-10);
        assert_relative_eq!(model.coefficient("grpb").unwrap().estimate, 10.0, epsilon = 1e-10);
        assert_relative_eq!(model.coefficient("grpc").unwrap().estimate, 21.0, epsilon = 1e-10);
    }

    #[test]
    fn test_intercept_only_model() {
        let y = [1.0, 2.0, 3.0, 6.0];
        let design = DesignMatrix::build(4, &[]).unwrap();
        let model = OlsRegression::default().fit(&design, &y).unwrap();
        assert_relative_eq!(model.estimates()[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(model.r_squared, 0.0, epsilon = 1e-12);
        assert!(model.f_statistic.is_nan());
        assert!(model.f_p_value.is_nan());
    }

    #[test]
    fn test_rank_with_tolerance() {
        let full = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 5.0]);
        let (rank, tolerance) = rank_with_tolerance(&full);
        assert_eq!(rank, 2);
        assert!(tolerance > 0.0 && tolerance < 1e-6);

        let aliased = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        assert_eq!(rank_with_tolerance(&aliased).0, 1);
        assert_eq!(rank_with_tolerance(&DMatrix::zeros(3, 0)), (0, 0.0));
    }

    #[test]
    fn test_collinear_predictor_is_named() {
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let x2: Vec<f64> = x1.iter().map(|v| 2.0 * v + 1.0).collect();
        let design =
            DesignMatrix::build(5, &[numeric("x1", &x1), numeric("x2", &x2)]).unwrap();
        let err = OlsRegression::default()
            .fit(&design, &[1.0, 2.0, 2.5, 4.0, 5.5])
            .unwrap_err();

        match err {
            Error::SingularDesign { terms, rank, columns } => {
                assert_eq!(terms, vec!["x2".to_string()]);
                assert_eq!(rank, 2);
                assert_eq!(columns, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_aliased_categories_are_named() {
        // `b` and `q` pick out exactly the same rows
        let design = DesignMatrix::build(
            6,
            &[
                categorical("first", &["a", "b"], &[0, 0, 0, 1, 1, 1]),
                categorical("second", &["p", "q"], &[0, 0, 0, 1, 1, 1]),
            ],
        )
        .unwrap();
        let err = OlsRegression::default()
            .fit(&design, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap_err();
        assert!(
            matches!(err, Error::SingularDesign { ref terms, .. } if terms == &["second".to_string()])
        );
    }

    #[test]
    fn test_too_few_observations() {
        let design = DesignMatrix::build(2, &[numeric("x", &[1.0, 2.0])]).unwrap();
        let err = OlsRegression::default().fit(&design, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::InsufficientSample { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_response_validation() {
        let design = DesignMatrix::build(3, &[]).unwrap();
        assert!(OlsRegression::default().fit(&design, &[1.0, 2.0]).is_err());
        assert!(OlsRegression::default().fit(&design, &[1.0, f64::NAN, 2.0]).is_err());
    }

    #[test]
    fn test_information_criteria() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 4.5, 5.5, 8.5, 9.0, 12.5];
        let design = DesignMatrix::build(6, &[numeric("x", &x)]).unwrap();
        let model = OlsRegression::default().fit(&design, &y).unwrap();

        let n = 6.0_f64;
        let ll = -0.5 * n * ((2.0 * PI).ln() + (model.ssr() / n).ln() + 1.0);
        assert_relative_eq!(model.log_likelihood, ll, max_relative = 1e-12);
        assert_relative_eq!(model.aic, 4.0 - 2.0 * ll, max_relative = 1e-12);
        assert_relative_eq!(model.bic, n.ln() * 2.0 - 2.0 * ll, max_relative = 1e-12);
    }

    #[test]
    fn test_predict() {
        let design = DesignMatrix::build(4, &[numeric("x", &[0.0, 1.0, 2.0, 3.0])]).unwrap();
        let model = OlsRegression::default()
            .fit(&design, &[1.0, 3.0, 5.0, 7.0])
            .unwrap();
        assert_relative_eq!(model.predict(&[1.0, 10.0]).unwrap(), 21.0, epsilon = 1e-9);
        assert!(model.predict(&[1.0]).is_err());

        let fitted = model.predict_design(&design).unwrap();
        for (a, b) in fitted.iter().zip(&model.fitted_values) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }
}
