//! Types for two-sample test results

use disparity_confidence::ConfidenceLevel;
use serde::Serialize;
use std::fmt;

/// Variance assumption of a two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TTestKind {
    /// Equal population variances, pooled estimate, `n1 + n2 - 2` df
    Pooled,
    /// Unequal variances, Welch-Satterthwaite df
    Welch,
}

impl TTestKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pooled => "Pooled two-sample t-test",
            Self::Welch => "Welch two-sample t-test",
        }
    }
}

/// Descriptive summary of one compared sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub label: String,
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// Confidence interval for the difference of means
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifferenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: ConfidenceLevel,
}

impl DifferenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Outcome of a two-sample t-test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisTestResult {
    pub kind: TTestKind,
    /// `(mean1 - mean2) / SE`
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    /// `mean1 - mean2`
    pub mean_difference: f64,
    pub standard_error: f64,
    pub confidence_interval: DifferenceInterval,
    /// Two-sided p-value
    pub p_value: f64,
    /// Standardized mean difference using the pooled standard deviation
    pub cohens_d: f64,
    pub group1: SampleSummary,
    pub group2: SampleSummary,
}

impl HypothesisTestResult {
    /// Whether the null of equal means is rejected at `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for HypothesisTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} vs {}): t = {:.4}, df = {:.2}, p = {:.4}, diff = {:.2} [{:.2}, {:.2}]",
            self.kind.name(),
            self.group1.label,
            self.group2.label,
            self.statistic,
            self.degrees_of_freedom,
            self.p_value,
            self.mean_difference,
            self.confidence_interval.lower,
            self.confidence_interval.upper
        )
    }
}
