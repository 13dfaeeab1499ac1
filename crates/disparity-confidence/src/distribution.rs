//! Reference distributions shared by interval, test and regression code

use crate::types::ConfidenceLevel;
use disparity_core::{Error, Result};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

/// Standard Student's t distribution with `df` degrees of freedom
pub fn students_t(df: f64) -> Result<StudentsT> {
    if !(df > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Not enough data for t-distribution: {df} degrees of freedom"
        )));
    }
    StudentsT::new(0.0, 1.0, df).map_err(|e| Error::distribution("Student's t", e))
}

/// Two-sided critical value `t(1 - alpha/2, df)`
pub fn t_critical(level: ConfidenceLevel, df: f64) -> Result<f64> {
    Ok(students_t(df)?.inverse_cdf(1.0 - level.tail_probability()))
}

/// Two-sided critical value from the standard normal
pub fn z_critical(level: ConfidenceLevel) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::distribution("normal", e))?;
    Ok(normal.inverse_cdf(1.0 - level.tail_probability()))
}

/// Two-sided p-value of a t statistic
///
/// Infinite statistics give 0 and NaN propagates.
pub fn t_two_sided_p_value(statistic: f64, df: f64) -> Result<f64> {
    if statistic.is_nan() {
        return Ok(f64::NAN);
    }
    if statistic.is_infinite() {
        return Ok(0.0);
    }
    let dist = students_t(df)?;
    // Lower tail keeps precision far out where `1 - cdf` rounds to zero
    let p = 2.0 * dist.cdf(-statistic.abs());
    Ok(p.clamp(0.0, 1.0))
}

/// Upper-tail p-value of an F statistic with `(df1, df2)` degrees of freedom
pub fn f_upper_p_value(statistic: f64, df1: f64, df2: f64) -> Result<f64> {
    if statistic.is_nan() || !(df1 > 0.0) {
        return Ok(f64::NAN);
    }
    if statistic.is_infinite() {
        return Ok(0.0);
    }
    let dist = FisherSnedecor::new(df1, df2).map_err(|e| Error::distribution("F", e))?;
    Ok(dist.sf(statistic.max(0.0)).clamp(0.0, 1.0))
}
