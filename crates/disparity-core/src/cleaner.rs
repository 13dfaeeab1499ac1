//! Record cleaning and recoding
//!
//! Turns raw survey rows into [`CleanedRecord`]s. Rules run per record in a
//! fixed order (gender, education, marital status, income, topcode) and the
//! first failing rule decides the rejection reason. Rejected rows are counted,
//! never imputed.

use crate::error::{Error, Result};
use crate::records::{
    Categorical, CleanedRecord, Education, FieldNames, Gender, MaritalStatus, RawRecord, RawValue,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, instrument};

/// What to do with incomes above a topcode threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopcodePolicy {
    /// Drop the record
    Exclude,
    /// Keep the record with income set to the threshold
    Clip,
}

/// Explicit topcoding rule; there is no default policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topcode {
    pub threshold: f64,
    pub policy: TopcodePolicy,
}

impl Topcode {
    pub fn new(threshold: f64, policy: TopcodePolicy) -> Result<Self> {
        let topcode = Self { threshold, policy };
        topcode.validate()?;
        Ok(topcode)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "Topcode threshold {} must be positive and finite",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Why a raw record was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("unrecognised gender code {0:?}")]
    InvalidGender(RawValue),

    #[error("unrecognised education code {0:?}")]
    InvalidEducation(RawValue),

    #[error("unrecognised marital status code {0:?}")]
    InvalidMaritalStatus(RawValue),

    #[error("income {0:?} is not a positive finite number")]
    InvalidIncome(RawValue),

    #[error("income {income} exceeds topcode threshold {threshold}")]
    AboveTopcode { income: f64, threshold: f64 },
}

impl RecordError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            Self::MissingField(_) => RejectionReason::MissingField,
            Self::InvalidGender(_) => RejectionReason::InvalidGender,
            Self::InvalidEducation(_) => RejectionReason::InvalidEducation,
            Self::InvalidMaritalStatus(_) => RejectionReason::InvalidMaritalStatus,
            Self::InvalidIncome(_) => RejectionReason::InvalidIncome,
            Self::AboveTopcode { .. } => RejectionReason::AboveTopcode,
        }
    }
}

/// Rejection tally key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MissingField,
    InvalidGender,
    InvalidEducation,
    InvalidMaritalStatus,
    InvalidIncome,
    AboveTopcode,
}

/// Output of a cleaning pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    /// Kept records, in their original relative order
    pub records: Vec<CleanedRecord>,
    /// Total number of rejected records
    pub rejected: usize,
    /// Rejections broken down by reason
    pub rejections: BTreeMap<RejectionReason, usize>,
    /// Kept records whose income was clipped to the topcode threshold
    pub clipped: usize,
}

impl CleaningReport {
    /// Number of raw records seen
    pub fn total(&self) -> usize {
        self.records.len() + self.rejected
    }

    /// Rejections for one reason
    pub fn rejected_for(&self, reason: RejectionReason) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }
}

/// Validates and recodes raw records
#[derive(Debug, Clone, Default)]
pub struct RecordCleaner {
    field_names: FieldNames,
    topcode: Option<Topcode>,
}

impl RecordCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_names(mut self, field_names: FieldNames) -> Self {
        self.field_names = field_names;
        self
    }

    pub fn with_topcode(mut self, topcode: Topcode) -> Result<Self> {
        topcode.validate()?;
        self.topcode = Some(topcode);
        Ok(self)
    }

    pub fn field_names(&self) -> &FieldNames {
        &self.field_names
    }

    /// Clean one record, reporting why it was rejected
    pub fn clean_record(&self, raw: &RawRecord) -> std::result::Result<CleanedRecord, RecordError> {
        self.clean_one(raw).map(|(record, _)| record)
    }

    /// Clean a sequence of records
    ///
    /// Deterministic: the same input always yields the same kept records in
    /// the same relative order.
    #[instrument(skip(self, raw), fields(n = raw.len()))]
    pub fn clean(&self, raw: &[RawRecord]) -> CleaningReport {
        let mut records = Vec::with_capacity(raw.len());
        let mut rejections = BTreeMap::new();
        let mut clipped = 0;

        for row in raw {
            match self.clean_one(row) {
                Ok((record, was_clipped)) => {
                    clipped += usize::from(was_clipped);
                    records.push(record);
                }
                Err(err) => {
                    *rejections.entry(err.reason()).or_insert(0) += 1;
                }
            }
        }

        let rejected = raw.len() - records.len();
        debug!(
            kept = records.len(),
            rejected,
            clipped,
            "cleaning pass finished"
        );

        CleaningReport {
            records,
            rejected,
            rejections,
            clipped,
        }
    }

    fn clean_one(&self, raw: &RawRecord) -> std::result::Result<(CleanedRecord, bool), RecordError> {
        let names = &self.field_names;

        let gender: Gender = recode(raw, &names.gender, RecordError::InvalidGender)?;
        let education: Education = recode(raw, &names.education, RecordError::InvalidEducation)?;
        let marital_status: MaritalStatus =
            recode(raw, &names.marital_status, RecordError::InvalidMaritalStatus)?;

        let income_value = raw.get(&names.income);
        if income_value.is_missing() {
            return Err(RecordError::MissingField(names.income.clone()));
        }
        let income = income_value
            .as_number()
            .ok_or_else(|| RecordError::InvalidIncome(income_value.clone()))?;
        let record = CleanedRecord::new(income, gender, education, marital_status)
            .ok_or_else(|| RecordError::InvalidIncome(income_value.clone()))?;

        match self.topcode {
            Some(Topcode { threshold, policy }) if income > threshold => match policy {
                TopcodePolicy::Exclude => Err(RecordError::AboveTopcode { income, threshold }),
                TopcodePolicy::Clip => Ok((record.with_income(threshold), true)),
            },
            _ => Ok((record, false)),
        }
    }
}

fn recode<C: Categorical>(
    raw: &RawRecord,
    name: &str,
    invalid: fn(RawValue) -> RecordError,
) -> std::result::Result<C, RecordError> {
    let value = raw.get(name);
    if value.is_missing() {
        return Err(RecordError::MissingField(name.to_string()));
    }
    value
        .as_code()
        .and_then(C::from_code)
        .ok_or_else(|| invalid(value.clone()))
}
