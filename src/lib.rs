//! Income disparity analysis for survey data
//!
//! This crate re-exports the component crates and adds the end-to-end
//! [`SurveyAnalysis`] pipeline:
//!
//! - [`disparity_core`]: records, recoding, cleaning, configuration, errors
//! - [`disparity_aggregate`]: grouped count / mean / median / standard deviation
//! - [`disparity_confidence`]: t-based confidence intervals for group means
//! - [`disparity_hypothesis`]: pooled and Welch two-sample t-tests
//! - [`disparity_regression`]: dummy-coded OLS and residual diagnostics
//!
//! # Example
//!
//! ```rust
//! use income_disparity::{AnalysisConfig, RawRecord, SectionOutcome, SurveyAnalysis};
//!
//! let raw: Vec<RawRecord> = [
//!     (52_000.0, 1, 4, 1),
//!     (61_000.0, 1, 5, 1),
//!     (47_500.0, 1, 2, 0),
//!     (44_000.0, 2, 4, 1),
//!     (39_000.0, 2, 2, 0),
//!     (50_500.0, 2, 6, 3),
//! ]
//! .into_iter()
//! .map(|(income, gender, education, marital): (f64, i64, i64, i64)| {
//!     RawRecord::new()
//!         .with("total_income", income)
//!         .with("gender", gender)
//!         .with("education", education)
//!         .with("marital_status", marital)
//! })
//! .collect();
//!
//! let report = SurveyAnalysis::run(&raw, &AnalysisConfig::default()).unwrap();
//! assert_eq!(report.cleaning.kept, 6);
//! assert!(matches!(report.hypothesis_test, SectionOutcome::Completed(_)));
//! println!("{}", report.to_json().unwrap());
//! ```

mod analysis;

pub use analysis::{
    AnalysisReport, CleaningSummary, HypothesisSection, RegressionSection, SectionError,
    SectionOutcome, SurveyAnalysis,
};

pub use disparity_aggregate::{AggregateResult, Aggregator, GroupKey};
pub use disparity_confidence::{
    ConfidenceInterval, ConfidenceLevel, GroupInterval, IntervalEstimator, IntervalOutcome,
    MeanInterval,
};
pub use disparity_core::{
    AnalysisConfig, CategoricalField, CleanedRecord, CleaningReport, Education, Error, Field,
    FieldNames, Gender, MaritalStatus, NumericField, RawRecord, RawValue, RecordCleaner, Result,
    Topcode, TopcodePolicy,
};
pub use disparity_hypothesis::{HypothesisTestResult, TwoSampleTTest};
pub use disparity_regression::{
    Coefficient, DesignMatrix, Diagnostics, OlsRegression, Predictor, RegressionModel,
};

// Component crates, for everything not re-exported above
pub use disparity_aggregate;
pub use disparity_confidence;
pub use disparity_core;
pub use disparity_hypothesis;
pub use disparity_regression;
