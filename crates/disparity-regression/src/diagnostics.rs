//! Residual diagnostics for a fitted model
//!
//! Leverage is the diagonal of the hat matrix `H = X(XᵗX)⁻¹Xᵗ`, computed
//! row by row as `h_i = x_iᵗ (XᵗX)⁻¹ x_i` without forming `H`.

use crate::design::DesignMatrix;
use crate::ols::RegressionModel;
use disparity_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

/// Leverage at or above `1 - LEVERAGE_EPSILON` leaves no residual variance
const LEVERAGE_EPSILON: f64 = 1e-10;

/// Per-observation diagnostics, indexed like the fitted records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub fitted_values: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Hat values `h_i`
    pub leverage: Vec<f64>,
    /// `e_i / (σ̂ √(1 - h_i))`, NaN where `h_i = 1`
    pub standardized_residuals: Vec<f64>,
    pub cooks_distance: Vec<f64>,
    /// Cutoff used for `high_leverage`, `2p / n`
    pub leverage_threshold: f64,
    /// Indices whose leverage exceeds the cutoff
    pub high_leverage: Vec<usize>,
}

impl Diagnostics {
    /// Diagnostics for `model` fitted on `design`
    pub fn compute(model: &RegressionModel, design: &DesignMatrix) -> Result<Self> {
        let x = design.matrix();
        let p = model.n_parameters();
        if x.ncols() != p {
            return Err(Error::size_mismatch(p, x.ncols(), "design columns"));
        }
        if x.nrows() != model.n {
            return Err(Error::size_mismatch(model.n, x.nrows(), "design rows"));
        }

        let projected = x * model.gram_inverse();
        let leverage: Vec<f64> = (0..x.nrows())
            .map(|i| projected.row(i).dot(&x.row(i)))
            .collect();

        let sigma = model.residual_std_error;
        let standardized_residuals: Vec<f64> = model
            .residuals
            .iter()
            .zip(&leverage)
            .map(|(&e, &h)| {
                let room = 1.0 - h;
                if room <= LEVERAGE_EPSILON {
                    f64::NAN
                } else {
                    e / (sigma * room.sqrt())
                }
            })
            .collect();

        let pf = p as f64;
        let cooks_distance = standardized_residuals
            .iter()
            .zip(&leverage)
            .map(|(&r, &h)| r * r * h / (pf * (1.0 - h)))
            .collect();

        let leverage_threshold = 2.0 * pf / model.n as f64;
        let high_leverage: Vec<usize> = leverage
            .iter()
            .enumerate()
            .filter(|&(_, &h)| h > leverage_threshold)
            .map(|(i, _)| i)
            .collect();

        debug!(high_leverage = high_leverage.len(), "computed regression diagnostics");

        Ok(Self {
            fitted_values: model.fitted_values.clone(),
            residuals: model.residuals.clone(),
            leverage,
            standardized_residuals,
            cooks_distance,
            leverage_threshold,
            high_leverage,
        })
    }

    pub fn len(&self) -> usize {
        self.residuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }

    /// Indices whose standardized residual magnitude exceeds `cutoff`
    pub fn outliers(&self, cutoff: f64) -> Vec<usize> {
        self.standardized_residuals
            .iter()
            .enumerate()
            .filter(|(_, r)| r.abs() > cutoff)
            .map(|(i, _)| i)
            .collect()
    }
}
