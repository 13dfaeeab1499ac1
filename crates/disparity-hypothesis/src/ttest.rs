//! Two-sample t-tests
//!
//! The pooled test assumes equal population variances:
//!
//! ```text
//! s_p² = ((n1 - 1)s1² + (n2 - 1)s2²) / (n1 + n2 - 2)
//! SE   = √(s_p² (1/n1 + 1/n2))
//! t    = (mean1 - mean2) / SE,  df = n1 + n2 - 2
//! ```
//!
//! The Welch variant uses `SE = √(s1²/n1 + s2²/n2)` with Welch-Satterthwaite
//! degrees of freedom.

use crate::types::{DifferenceInterval, HypothesisTestResult, SampleSummary, TTestKind};
use disparity_aggregate::grouped_values;
use disparity_confidence::{t_critical, t_two_sided_p_value, ConfidenceLevel};
use disparity_core::{CategoricalField, CleanedRecord, Error, Moments, NumericField, Result};
use tracing::{debug, instrument};

/// Two-sample t-test for a difference in means
#[derive(Debug, Clone, Copy)]
pub struct TwoSampleTTest {
    level: ConfidenceLevel,
    kind: TTestKind,
}

impl TwoSampleTTest {
    /// Pooled-variance test
    pub fn new(level: ConfidenceLevel) -> Self {
        Self {
            level,
            kind: TTestKind::Pooled,
        }
    }

    /// Switch to Welch's unequal-variance test
    pub fn with_welch_correction(mut self) -> Self {
        self.kind = TTestKind::Welch;
        self
    }

    pub fn kind(&self) -> TTestKind {
        self.kind
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.level
    }

    /// Compare two unlabeled samples
    pub fn test(&self, group1: &[f64], group2: &[f64]) -> Result<HypothesisTestResult> {
        self.test_labeled(("group1", group1), ("group2", group2))
    }

    /// Compare two labeled samples; the difference is `group1 - group2`
    pub fn test_labeled(
        &self,
        (label1, group1): (&str, &[f64]),
        (label2, group2): (&str, &[f64]),
    ) -> Result<HypothesisTestResult> {
        let m1 = Moments::from_sample(group1)?;
        let m2 = Moments::from_sample(group2)?;

        let n1 = m1.n as f64;
        let n2 = m2.n as f64;
        let df_pooled = n1 + n2 - 2.0;
        let pooled_variance = ((n1 - 1.0) * m1.variance + (n2 - 1.0) * m2.variance) / df_pooled;

        let (standard_error, df) = match self.kind {
            TTestKind::Pooled => (
                (pooled_variance * (1.0 / n1 + 1.0 / n2)).sqrt(),
                df_pooled,
            ),
            TTestKind::Welch => {
                let a = m1.variance / n1;
                let b = m2.variance / n2;
                let df = (a + b).powi(2) / (a * a / (n1 - 1.0) + b * b / (n2 - 1.0));
                ((a + b).sqrt(), df)
            }
        };

        if !(standard_error > 0.0) {
            return Err(Error::Computation(
                "Standard error of the mean difference is zero: both samples are constant"
                    .to_string(),
            ));
        }

        let mean_difference = m1.mean - m2.mean;
        let statistic = mean_difference / standard_error;
        let p_value = t_two_sided_p_value(statistic, df)?;
        let margin = t_critical(self.level, df)? * standard_error;

        debug!(
            kind = ?self.kind,
            statistic,
            df,
            p_value,
            "two-sample t-test"
        );

        Ok(HypothesisTestResult {
            kind: self.kind,
            statistic,
            degrees_of_freedom: df,
            mean_difference,
            standard_error,
            confidence_interval: DifferenceInterval {
                lower: mean_difference - margin,
                upper: mean_difference + margin,
                confidence_level: self.level,
            },
            p_value,
            cohens_d: mean_difference / pooled_variance.sqrt(),
            group1: summary(label1, &m1),
            group2: summary(label2, &m2),
        })
    }

    /// Compare `value` across the two observed levels of `field`
    ///
    /// Group 1 is the level that comes first in canonical order.
    #[instrument(skip(self, records), fields(n = records.len()))]
    pub fn test_by_field(
        &self,
        records: &[CleanedRecord],
        field: CategoricalField,
        value: NumericField,
    ) -> Result<HypothesisTestResult> {
        let groups = grouped_values(records, &[field], value);
        if groups.len() != 2 {
            return Err(Error::InputCardinality {
                field: field.name().to_string(),
                levels: groups.keys().map(|key| key.to_string()).collect(),
            });
        }

        let mut iter = groups.iter();
        let (Some((key1, values1)), Some((key2, values2))) = (iter.next(), iter.next()) else {
            return Err(Error::Computation("grouping lost a level".to_string()));
        };
        self.test_labeled(
            (key1.to_string().as_str(), values1.as_slice()),
            (key2.to_string().as_str(), values2.as_slice()),
        )
    }
}

impl Default for TwoSampleTTest {
    fn default() -> Self {
        Self::new(ConfidenceLevel::default())
    }
}

fn summary(label: &str, moments: &Moments) -> SampleSummary {
    SampleSummary {
        label: label.to_string(),
        n: moments.n,
        mean: moments.mean,
        std_dev: moments.std_dev(),
    }
}
