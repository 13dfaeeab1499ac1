//! Grouped descriptive summaries
//!
//! Buckets cleaned survey records by one or two categorical fields and
//! reports count, mean, median and unbiased standard deviation for each
//! observed combination.
//!
//! # Example
//!
//! ```rust
//! use disparity_aggregate::Aggregator;
//! use disparity_core::{
//!     CategoricalField, CleanedRecord, Education, Gender, MaritalStatus, NumericField,
//! };
//!
//! let records: Vec<CleanedRecord> = [(40.0, Gender::Male), (30.0, Gender::Female), (50.0, Gender::Male)]
//!     .into_iter()
//!     .filter_map(|(income, gender)| {
//!         CleanedRecord::new(income, gender, Education::Bachelors, MaritalStatus::Married)
//!     })
//!     .collect();
//!
//! let results = Aggregator::by(CategoricalField::Gender, NumericField::Income).aggregate(&records);
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].count, 2);
//! assert_eq!(results[0].mean, 45.0);
//! ```

mod aggregator;
mod types;

pub use aggregator::{grouped_values, Aggregator};
pub use types::{AggregateResult, GroupKey};
