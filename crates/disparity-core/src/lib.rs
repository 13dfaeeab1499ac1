//! Core types for survey income disparity analysis
//!
//! This crate holds everything the analysis stages share:
//!
//! - **Records**: loosely typed [`RawRecord`]s and validated [`CleanedRecord`]s
//! - **Recoding**: explicit code tables for gender, education and marital status
//! - **Cleaning**: [`RecordCleaner`] with rejection accounting and topcoding
//! - **Moments**: unbiased mean / variance / median helpers
//! - **Configuration**: [`AnalysisConfig`] loaded from JSON
//!
//! # Example
//!
//! ```rust
//! use disparity_core::{RawRecord, RecordCleaner, Gender};
//!
//! let rows = vec![
//!     RawRecord::new()
//!         .with("total_income", 48000.0)
//!         .with("gender", 2_i64)
//!         .with("education", 4_i64)
//!         .with("marital_status", 1_i64),
//!     RawRecord::new()
//!         .with("total_income", -1.0)
//!         .with("gender", 1_i64)
//!         .with("education", 4_i64)
//!         .with("marital_status", 1_i64),
//! ];
//!
//! let report = RecordCleaner::new().clean(&rows);
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.rejected, 1);
//! assert_eq!(report.records[0].gender(), Gender::Female);
//! ```

pub mod cleaner;
pub mod config;
pub mod descriptive;
pub mod error;
pub mod records;

// Re-export core types
pub use error::{Error, Result};

pub use cleaner::{
    CleaningReport, RecordCleaner, RecordError, RejectionReason, Topcode, TopcodePolicy,
};
pub use config::AnalysisConfig;
pub use descriptive::Moments;
pub use records::{
    Categorical, CategoricalField, Category, CleanedRecord, Education, Field, FieldKind, FieldNames, Gender,
    MaritalStatus, NumericField, RawRecord, RawValue,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
