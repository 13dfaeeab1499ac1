//! Confidence intervals for group means
//!
//! The interval is `mean ± c · s/√n` where `c` is the two-sided critical value
//! of Student's t with `n - 1` degrees of freedom (or of the standard normal
//! for the large-sample variant).

use crate::distribution::{t_critical, z_critical};
use crate::types::{ConfidenceInterval, ConfidenceLevel};
use disparity_aggregate::{grouped_values, GroupKey};
use disparity_core::{CategoricalField, CleanedRecord, Error, Moments, NumericField, Result};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Anything that turns a sample into a mean confidence interval
pub trait IntervalEstimator {
    /// Interval for the mean of `sample`
    fn confidence_interval(&self, sample: &[f64]) -> Result<ConfidenceInterval>;

    /// Confidence level used by this estimator
    fn confidence_level(&self) -> ConfidenceLevel;
}

/// Which reference distribution supplies the critical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalDistribution {
    StudentsT,
    Normal,
}

/// Mean interval estimator
#[derive(Debug, Clone, Copy)]
pub struct MeanInterval {
    level: ConfidenceLevel,
    distribution: CriticalDistribution,
}

impl MeanInterval {
    /// Interval from Student's t with `n - 1` degrees of freedom
    pub fn students_t(level: ConfidenceLevel) -> Self {
        Self {
            level,
            distribution: CriticalDistribution::StudentsT,
        }
    }

    /// Large-sample interval from the standard normal
    pub fn normal(level: ConfidenceLevel) -> Self {
        Self {
            level,
            distribution: CriticalDistribution::Normal,
        }
    }

    pub fn distribution(&self) -> CriticalDistribution {
        self.distribution
    }

    /// One interval per observed group of `grouping`
    ///
    /// Groups too small for an interval are reported, not dropped.
    #[instrument(skip(self, records), fields(n = records.len()))]
    pub fn group_intervals(
        &self,
        records: &[CleanedRecord],
        grouping: &[CategoricalField],
        value: NumericField,
    ) -> Vec<GroupInterval> {
        let groups = grouped_values(records, grouping, value);
        debug!(groups = groups.len(), "estimating group intervals");

        groups
            .into_iter()
            .map(|(key, values)| {
                let outcome = match self.confidence_interval(&values) {
                    Ok(interval) => IntervalOutcome::Estimated(interval),
                    Err(err) => {
                        warn!(group = %key, %err, "no interval for group");
                        IntervalOutcome::from_error(err, values.len())
                    }
                };
                GroupInterval { key, outcome }
            })
            .collect()
    }
}

impl Default for MeanInterval {
    fn default() -> Self {
        Self::students_t(ConfidenceLevel::default())
    }
}

impl IntervalEstimator for MeanInterval {
    fn confidence_interval(&self, sample: &[f64]) -> Result<ConfidenceInterval> {
        let moments = Moments::from_sample(sample)?;
        let standard_error = moments.standard_error();
        if moments.variance == 0.0 {
            warn!(
                n = moments.n,
                mean = moments.mean,
                "zero-variance sample gives a degenerate interval"
            );
        }

        let critical_value = match self.distribution {
            CriticalDistribution::StudentsT => t_critical(self.level, (moments.n - 1) as f64)?,
            CriticalDistribution::Normal => z_critical(self.level)?,
        };

        let margin = critical_value * standard_error;
        Ok(ConfidenceInterval {
            mean: moments.mean,
            std_dev: moments.std_dev(),
            n: moments.n,
            standard_error,
            lower: moments.mean - margin,
            upper: moments.mean + margin,
            confidence_level: self.level,
        })
    }

    fn confidence_level(&self) -> ConfidenceLevel {
        self.level
    }
}

/// Interval result for a single group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupInterval {
    pub key: GroupKey,
    pub outcome: IntervalOutcome,
}

impl GroupInterval {
    pub fn interval(&self) -> Option<&ConfidenceInterval> {
        match &self.outcome {
            IntervalOutcome::Estimated(ci) => Some(ci),
            _ => None,
        }
    }
}

/// Estimated interval, or the reason there is none
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntervalOutcome {
    Estimated(ConfidenceInterval),
    InsufficientSample { n: usize },
    Failed { message: String },
}

impl IntervalOutcome {
    fn from_error(err: Error, n: usize) -> Self {
        match err {
            Error::InsufficientSample { .. } => Self::InsufficientSample { n },
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use disparity_core::{Education, Gender, MaritalStatus};

    #[test]
    fn test_students_t_interval() {
        let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ci = MeanInterval::default().confidence_interval(&sample).unwrap();

        assert_eq!(ci.n, 5);
        assert_relative_eq!(ci.mean, 3.0);
        assert_relative_eq!(ci.std_dev, 2.5_f64.sqrt());
        assert_relative_eq!(ci.standard_error, (2.5_f64 / 5.0).sqrt());
        // t(0.975, 4) = 2.776445
        let margin = 2.776445 * (0.5_f64).sqrt();
        assert_relative_eq!(ci.lower, 3.0 - margin, epsilon = 1e-4);
        assert_relative_eq!(ci.upper, 3.0 + margin, epsilon = 1e-4);
        assert_eq!(ci.confidence_level, ConfidenceLevel::NINETY_FIVE);
    }

    #[test]
    fn test_t_wider_than_normal_for_small_samples() {
        let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
        let t = MeanInterval::students_t(ConfidenceLevel::NINETY_FIVE)
            .confidence_interval(&sample)
            .unwrap();
        let z = MeanInterval::normal(ConfidenceLevel::NINETY_FIVE)
            .confidence_interval(&sample)
            .unwrap();
        assert!(t.width() > z.width());
        assert!(t.contains(3.0) && z.contains(3.0));
    }

    #[test]
    fn test_higher_level_is_wider() {
        let sample: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let ci_90 = MeanInterval::students_t(ConfidenceLevel::NINETY)
            .confidence_interval(&sample)
            .unwrap();
        let ci_95 = MeanInterval::students_t(ConfidenceLevel::NINETY_FIVE)
            .confidence_interval(&sample)
            .unwrap();
        let ci_99 = MeanInterval::students_t(ConfidenceLevel::NINETY_NINE)
            .confidence_interval(&sample)
            .unwrap();
        assert!(ci_90.width() < ci_95.width());
        assert!(ci_95.width() < ci_99.width());
    }

    #[test]
    fn test_insufficient_sample() {
        let err = MeanInterval::default().confidence_interval(&[42.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientSample {
                expected: 2,
                actual: 1
            }
        ));
        assert!(MeanInterval::default().confidence_interval(&[]).is_err());
    }

    #[test]
    fn test_constant_sample_gives_degenerate_interval() {
        let ci = MeanInterval::default()
            .confidence_interval(&[7.0, 7.0, 7.0])
            .unwrap();
        assert_eq!(ci.lower, 7.0);
        assert_eq!(ci.upper, 7.0);
        assert!(ci.contains(ci.mean));
    }

    #[test]
    fn test_group_intervals_report_small_groups() {
        let records: Vec<CleanedRecord> = [
            (10.0, Gender::Male),
            (12.0, Gender::Male),
            (14.0, Gender::Male),
            (9.0, Gender::Female),
        ]
        .into_iter()
        .filter_map(|(income, gender)| {
            CleanedRecord::new(income, gender, Education::HighSchool, MaritalStatus::Widowed)
        })
        .collect();

        let intervals = MeanInterval::default().group_intervals(
            &records,
            &[CategoricalField::Gender],
            NumericField::Income,
        );
        assert_eq!(intervals.len(), 2);
        let male = intervals[0].interval().unwrap();
        assert_relative_eq!(male.mean, 12.0);
        assert!(male.lower <= male.mean && male.mean <= male.upper);
        assert_eq!(
            intervals[1].outcome,
            IntervalOutcome::InsufficientSample { n: 1 }
        );
    }
}
