//! Types for grouped summaries

use disparity_core::{CategoricalField, Category};
use serde::Serialize;
use std::fmt;

/// Ordered tuple of one or two categorical values identifying a group
///
/// Keys sort by field and then canonical level order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<Category>);

impl GroupKey {
    pub fn new(values: Vec<Category>) -> Self {
        Self(values)
    }

    /// Single-field key
    pub fn single(value: Category) -> Self {
        Self(vec![value])
    }

    pub fn values(&self) -> &[Category] {
        &self.0
    }

    /// Fields making up the key, in order
    pub fn fields(&self) -> Vec<CategoricalField> {
        self.0.iter().map(Category::field).collect()
    }

    /// Value of `field` within this key, if present
    pub fn get(&self, field: CategoricalField) -> Option<Category> {
        self.0.iter().copied().find(|c| c.field() == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl From<Category> for GroupKey {
    fn from(value: Category) -> Self {
        Self::single(value)
    }
}

/// Summary of one group's numeric values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub key: GroupKey,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Unbiased standard deviation; NaN when `count == 1`
    pub std_dev: f64,
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: n={}, mean={:.2}, median={:.2}, sd={:.2}",
            self.key, self.count, self.mean, self.median, self.std_dev
        )
    }
}
