//! Analysis configuration
//!
//! Deserialized from JSON; every option has a default except the topcode
//! policy, which must be spelled out whenever topcoding is requested.

use crate::cleaner::Topcode;
use crate::error::{Error, Result};
use crate::records::{CategoricalField, Field, FieldNames, NumericField};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognised analysis options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Confidence level for intervals, in (0, 1)
    pub confidence_level: f64,
    /// Alpha used for significance verdicts
    pub significance_level: f64,
    /// One or two categorical fields to group by
    pub grouping_fields: Vec<Field>,
    /// Numeric response for aggregation, intervals, tests and regression
    pub response: Field,
    /// Ordered regression predictors
    pub regression_predictors: Vec<Field>,
    /// Optional income topcoding rule
    pub topcode: Option<Topcode>,
    /// Raw field names the cleaner reads
    pub field_names: FieldNames,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            significance_level: 0.05,
            grouping_fields: vec![Field::Gender],
            response: Field::Income,
            regression_predictors: vec![Field::Gender, Field::Education, Field::MaritalStatus],
            topcode: None,
            field_names: FieldNames::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        validate_probability("confidence_level", self.confidence_level)?;
        validate_probability("significance_level", self.significance_level)?;

        if self.grouping_fields.is_empty() || self.grouping_fields.len() > 2 {
            return Err(Error::InvalidParameter(format!(
                "grouping_fields must name 1 or 2 fields, got {}",
                self.grouping_fields.len()
            )));
        }
        for field in &self.grouping_fields {
            if !field.is_categorical() {
                return Err(Error::InvalidParameter(format!(
                    "grouping field `{field}` is not categorical"
                )));
            }
        }
        if self.grouping_fields.len() == 2 && self.grouping_fields[0] == self.grouping_fields[1] {
            return Err(Error::InvalidParameter(format!(
                "grouping field `{}` listed twice",
                self.grouping_fields[0]
            )));
        }

        if self.response.as_numeric().is_none() {
            return Err(Error::InvalidParameter(format!(
                "response `{}` is not numeric",
                self.response
            )));
        }

        for (i, field) in self.regression_predictors.iter().enumerate() {
            if self.regression_predictors[..i].contains(field) {
                return Err(Error::InvalidParameter(format!(
                    "regression predictor `{field}` listed twice"
                )));
            }
            if field.as_numeric().is_some() {
                return Err(Error::InvalidParameter(format!(
                    "regression predictor `{field}` is derived from the income response"
                )));
            }
        }

        if let Some(topcode) = &self.topcode {
            topcode.validate()?;
        }
        Ok(())
    }

    /// Grouping fields as categorical selectors
    pub fn grouping(&self) -> Vec<CategoricalField> {
        self.grouping_fields
            .iter()
            .filter_map(Field::as_categorical)
            .collect()
    }

    /// Response as a numeric selector
    pub fn response_field(&self) -> NumericField {
        self.response.as_numeric().unwrap_or(NumericField::Income)
    }
}

fn validate_probability(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "{name} {value} must be in (0, 1)"
        )));
    }
    Ok(())
}
