//! Linear regression for survey income models
//!
//! This crate provides:
//!
//! - **Design matrices**: intercept plus numeric and dummy-coded categorical
//!   predictors, with the first observed level of each category as reference
//! - **OLS fitting**: coefficients, standard errors, t and F inference, R²,
//!   information criteria, and named diagnosis of singular designs
//! - **Diagnostics**: leverage, standardized residuals and Cook's distance
//!
//! # Example
//!
//! ```rust
//! use disparity_regression::{Diagnostics, DesignMatrix, OlsRegression, PredictorColumn};
//!
//! let years = vec![1.0, 3.0, 4.0, 6.0, 8.0, 9.0];
//! let sector = PredictorColumn::Categorical {
//!     name: "sector".to_string(),
//!     levels: vec!["private".to_string(), "public".to_string()],
//!     codes: vec![0, 1, 0, 1, 0, 1],
//! };
//! let income = vec![31.0, 38.5, 40.0, 47.0, 52.5, 57.0];
//!
//! let design = DesignMatrix::build(
//!     6,
//!     &[PredictorColumn::Numeric { name: "years".to_string(), values: years }, sector],
//! )
//! .unwrap();
//! let model = OlsRegression::default().fit(&design, &income).unwrap();
//! assert!(model.coefficient("sectorpublic").is_some());
//!
//! let diagnostics = Diagnostics::compute(&model, &design).unwrap();
//! assert_eq!(diagnostics.leverage.len(), 6);
//! ```

mod design;
mod diagnostics;
mod ols;

pub use design::{DesignMatrix, Predictor, PredictorColumn, Term, INTERCEPT};
pub use diagnostics::Diagnostics;
pub use ols::{Coefficient, OlsRegression, RegressionModel};
