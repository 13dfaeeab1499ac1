//! Grouped aggregation
//!
//! A single pass buckets the numeric field by [`GroupKey`]; each bucket is then
//! summarised independently, in parallel when the `parallel` feature is on.
//! Only combinations present in the data produce a result.

use crate::types::{AggregateResult, GroupKey};
use disparity_core::descriptive::{median_sorted, variance_about};
use disparity_core::{CategoricalField, CleanedRecord, Error, NumericField, Result};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bucket `value` by the given grouping fields
///
/// The map iterates in key order, so consumers see groups in canonical
/// level order regardless of record order.
pub fn grouped_values(
    records: &[CleanedRecord],
    grouping: &[CategoricalField],
    value: NumericField,
) -> BTreeMap<GroupKey, Vec<f64>> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for record in records {
        let key = GroupKey::new(grouping.iter().map(|field| field.value(record)).collect());
        groups.entry(key).or_default().push(value.value(record));
    }
    groups
}

/// Summarise one group's values; `values` is non-empty for every bucket
pub(crate) fn summarize(key: GroupKey, mut values: Vec<f64>) -> AggregateResult {
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std_dev = variance_about(&values, mean)
        .map(f64::sqrt)
        .unwrap_or(f64::NAN);
    values.sort_by(f64::total_cmp);
    let median = median_sorted(&values).unwrap_or(f64::NAN);

    AggregateResult {
        key,
        count,
        mean,
        median,
        std_dev,
    }
}

/// Computes count / mean / median / standard deviation per group
#[derive(Debug, Clone)]
pub struct Aggregator {
    grouping: Vec<CategoricalField>,
    value: NumericField,
}

impl Aggregator {
    /// Group by one or two distinct categorical fields
    pub fn new(grouping: Vec<CategoricalField>, value: NumericField) -> Result<Self> {
        match grouping.as_slice() {
            [_] => {}
            [a, b] if a != b => {}
            [a, _] => {
                return Err(Error::InvalidParameter(format!(
                    "grouping field `{a}` listed twice"
                )))
            }
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "aggregation needs 1 or 2 grouping fields, got {}",
                    grouping.len()
                )))
            }
        }
        Ok(Self { grouping, value })
    }

    /// Group by a single field
    pub fn by(field: CategoricalField, value: NumericField) -> Self {
        Self {
            grouping: vec![field],
            value,
        }
    }

    pub fn grouping(&self) -> &[CategoricalField] {
        &self.grouping
    }

    pub fn value(&self) -> NumericField {
        self.value
    }

    /// One result per observed combination, sorted by key
    #[instrument(skip(self, records), fields(n = records.len(), grouping = ?self.grouping))]
    pub fn aggregate(&self, records: &[CleanedRecord]) -> Vec<AggregateResult> {
        let groups = grouped_values(records, &self.grouping, self.value);
        debug!(groups = groups.len(), "bucketed records");

        #[cfg(feature = "parallel")]
        let results: Vec<AggregateResult> = groups
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(key, values)| summarize(key, values))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<AggregateResult> = groups
            .into_iter()
            .map(|(key, values)| summarize(key, values))
            .collect();

        results
    }
}
