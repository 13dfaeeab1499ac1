//! Descriptive moments over plain `f64` samples
//!
//! Variances use the unbiased (n - 1) denominator and a corrected two-pass
//! sum so large incomes do not lose precision.

use crate::error::{Error, Result};

/// Arithmetic mean
pub fn mean(sample: &[f64]) -> Result<f64> {
    if sample.is_empty() {
        return Err(Error::insufficient(1, 0));
    }
    Ok(sample.iter().sum::<f64>() / sample.len() as f64)
}

/// Unbiased sample variance
pub fn variance(sample: &[f64]) -> Result<f64> {
    let m = mean(sample)?;
    variance_about(sample, m)
}

/// Unbiased sample variance given a precomputed mean
pub fn variance_about(sample: &[f64], mean: f64) -> Result<f64> {
    let n = sample.len();
    if n < 2 {
        return Err(Error::insufficient(2, n));
    }
    // Corrected two-pass algorithm: the second term cancels rounding in `mean`.
    let (sum_sq, sum) = sample.iter().fold((0.0, 0.0), |(sq, s), &x| {
        let d = x - mean;
        (sq + d * d, s + d)
    });
    let var = (sum_sq - sum * sum / n as f64) / (n - 1) as f64;
    Ok(var.max(0.0))
}

/// Unbiased sample standard deviation
pub fn std_dev(sample: &[f64]) -> Result<f64> {
    variance(sample).map(f64::sqrt)
}

/// Median of an unsorted sample
pub fn median(sample: &[f64]) -> Result<f64> {
    if sample.is_empty() {
        return Err(Error::insufficient(1, 0));
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_sorted(&sorted)
}

/// Median of an already sorted sample
pub fn median_sorted(sorted: &[f64]) -> Result<f64> {
    let n = sorted.len();
    if n == 0 {
        return Err(Error::insufficient(1, 0));
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Mean, unbiased variance and size of one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub n: usize,
    pub mean: f64,
    pub variance: f64,
}

impl Moments {
    /// Requires at least two observations
    pub fn from_sample(sample: &[f64]) -> Result<Self> {
        if sample.len() < 2 {
            return Err(Error::insufficient(2, sample.len()));
        }
        let mean = mean(sample)?;
        let variance = variance_about(sample, mean)?;
        Ok(Self {
            n: sample.len(),
            mean,
            variance,
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn standard_error(&self) -> f64 {
        (self.variance / self.n as f64).sqrt()
    }
}
