//! Two-sample hypothesis tests for survey group comparisons
//!
//! The pooled-variance t-test compares the mean of a numeric variable
//! between two groups, reporting the statistic, its degrees of freedom,
//! a two-sided p-value and a confidence interval for the difference.
//! Welch's unequal-variance variant is available as an option.
//!
//! # Example
//!
//! ```rust
//! use disparity_confidence::ConfidenceLevel;
//! use disparity_hypothesis::TwoSampleTTest;
//!
//! let men = [52_000.0, 61_500.0, 48_200.0, 57_000.0];
//! let women = [44_000.0, 46_300.0, 39_800.0, 50_100.0];
//! let result = TwoSampleTTest::new(ConfidenceLevel::NINETY_FIVE)
//!     .test(&men, &women)
//!     .unwrap();
//! assert!(result.mean_difference > 0.0);
//! assert!(result.confidence_interval.contains(result.mean_difference));
//! println!("{result}");
//! ```

mod ttest;
mod types;

pub use ttest::TwoSampleTTest;
pub use types::{DifferenceInterval, HypothesisTestResult, SampleSummary, TTestKind};

/// Pooled t-test at the given confidence level
pub fn pooled_t_test(
    group1: &[f64],
    group2: &[f64],
    confidence_level: f64,
) -> disparity_core::Result<HypothesisTestResult> {
    let level = disparity_confidence::ConfidenceLevel::new(confidence_level)?;
    TwoSampleTTest::new(level).test(group1, group2)
}
