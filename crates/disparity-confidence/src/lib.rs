//! Confidence interval estimation for group means
//!
//! This crate provides:
//!
//! - **Student's t intervals**: `mean ± t(1 - α/2, n - 1) · s/√n`
//! - **Large-sample normal intervals**: the same with a normal critical value
//! - **Per-group intervals**: one interval per observed category combination
//! - **Reference distributions**: critical values and p-values shared with the
//!   hypothesis-test and regression crates
//!
//! # Example
//!
//! ```rust
//! use disparity_confidence::{ConfidenceLevel, IntervalEstimator, MeanInterval};
//!
//! let sample = vec![41_000.0, 38_500.0, 52_000.0, 47_250.0, 39_900.0];
//! let level = ConfidenceLevel::new(0.95).unwrap();
//! let ci = MeanInterval::students_t(level).confidence_interval(&sample).unwrap();
//! assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
//! println!("{ci}");
//! ```

pub mod distribution;
mod interval;
mod types;

// Re-exports
pub use distribution::{f_upper_p_value, t_critical, t_two_sided_p_value, z_critical};
pub use interval::{
    CriticalDistribution, GroupInterval, IntervalEstimator, IntervalOutcome, MeanInterval,
};
pub use types::{ConfidenceInterval, ConfidenceLevel};

// Convenience constructor
pub fn students_t_interval(confidence_level: f64) -> disparity_core::Result<MeanInterval> {
    Ok(MeanInterval::students_t(ConfidenceLevel::new(confidence_level)?))
}
