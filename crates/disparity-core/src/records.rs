//! Raw and cleaned survey records
//!
//! Raw records are loosely typed field maps handed over by whatever parsed the
//! source table. Cleaned records are the typed form every analysis stage
//! consumes. Category codes are recoded through explicit tables so that each
//! code is validated rather than relabelled by position.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A categorical level set with a fixed canonical ordering
pub trait Categorical: Copy + Ord + fmt::Debug + 'static {
    /// All levels in canonical order
    fn levels() -> &'static [Self];

    /// Human readable level label
    fn label(&self) -> &'static str;

    /// Recode a raw survey code, `None` if the code is not recognised
    fn from_code(code: i64) -> Option<Self>;

    /// Canonical survey code for this level
    fn code(&self) -> i64;

    /// Position of this level in canonical order
    fn level_index(&self) -> usize {
        Self::levels()
            .iter()
            .position(|level| level == self)
            .unwrap_or(0)
    }
}

/// Respondent gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Categorical for Gender {
    fn levels() -> &'static [Self] {
        &[Self::Male, Self::Female]
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    fn code(&self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 2,
        }
    }
}

/// Highest completed education, collapsed from the eight survey codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Education {
    NoDegree,
    HighSchool,
    Associates,
    Bachelors,
    Graduate,
}

impl Categorical for Education {
    fn levels() -> &'static [Self] {
        &[
            Self::NoDegree,
            Self::HighSchool,
            Self::Associates,
            Self::Bachelors,
            Self::Graduate,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NoDegree => "NoDegree",
            Self::HighSchool => "HighSchool",
            Self::Associates => "Associates",
            Self::Bachelors => "Bachelors",
            Self::Graduate => "Graduate",
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 | 1 => Some(Self::NoDegree),
            2 => Some(Self::HighSchool),
            3 => Some(Self::Associates),
            4 => Some(Self::Bachelors),
            5..=7 => Some(Self::Graduate),
            _ => None,
        }
    }

    // Collapsed levels re-encode to the lowest code of their range.
    fn code(&self) -> i64 {
        match self {
            Self::NoDegree => 0,
            Self::HighSchool => 2,
            Self::Associates => 3,
            Self::Bachelors => 4,
            Self::Graduate => 5,
        }
    }
}

/// Marital status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    NeverMarried,
    Married,
    Separated,
    Divorced,
    Widowed,
}

impl Categorical for MaritalStatus {
    fn levels() -> &'static [Self] {
        &[
            Self::NeverMarried,
            Self::Married,
            Self::Separated,
            Self::Divorced,
            Self::Widowed,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NeverMarried => "NeverMarried",
            Self::Married => "Married",
            Self::Separated => "Separated",
            Self::Divorced => "Divorced",
            Self::Widowed => "Widowed",
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NeverMarried),
            1 => Some(Self::Married),
            2 => Some(Self::Separated),
            3 => Some(Self::Divorced),
            4 => Some(Self::Widowed),
            _ => None,
        }
    }

    fn code(&self) -> i64 {
        match self {
            Self::NeverMarried => 0,
            Self::Married => 1,
            Self::Separated => 2,
            Self::Divorced => 3,
            Self::Widowed => 4,
        }
    }
}

/// A single categorical value of any field
///
/// Ordering is by field, then by canonical level order, which gives group
/// keys a deterministic sort independent of data order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Gender(Gender),
    Education(Education),
    MaritalStatus(MaritalStatus),
}

impl Category {
    /// Field the value belongs to
    pub fn field(&self) -> CategoricalField {
        match self {
            Self::Gender(_) => CategoricalField::Gender,
            Self::Education(_) => CategoricalField::Education,
            Self::MaritalStatus(_) => CategoricalField::MaritalStatus,
        }
    }

    /// Level label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gender(v) => v.label(),
            Self::Education(v) => v.label(),
            Self::MaritalStatus(v) => v.label(),
        }
    }

    /// Position of the level in its field's canonical order
    pub fn level_index(&self) -> usize {
        match self {
            Self::Gender(v) => v.level_index(),
            Self::Education(v) => v.level_index(),
            Self::MaritalStatus(v) => v.level_index(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Categorical field selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Gender,
    Education,
    MaritalStatus,
}

impl CategoricalField {
    /// Field name as used in configuration and coefficient names
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Education => "education",
            Self::MaritalStatus => "marital_status",
        }
    }

    /// All levels of the field in canonical order
    pub fn levels(&self) -> Vec<Category> {
        match self {
            Self::Gender => Gender::levels().iter().map(|&g| Category::Gender(g)).collect(),
            Self::Education => Education::levels()
                .iter()
                .map(|&e| Category::Education(e))
                .collect(),
            Self::MaritalStatus => MaritalStatus::levels()
                .iter()
                .map(|&m| Category::MaritalStatus(m))
                .collect(),
        }
    }

    /// Extract this field from a record
    pub fn value(&self, record: &CleanedRecord) -> Category {
        match self {
            Self::Gender => Category::Gender(record.gender()),
            Self::Education => Category::Education(record.education()),
            Self::MaritalStatus => Category::MaritalStatus(record.marital_status()),
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric field selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Income,
    LogIncome,
}

impl NumericField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::LogIncome => "log_income",
        }
    }

    /// Extract this field from a record
    pub fn value(&self, record: &CleanedRecord) -> f64 {
        match self {
            Self::Income => record.income(),
            // income > 0 is a record invariant
            Self::LogIncome => record.income().ln(),
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any analysable field, as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Income,
    LogIncome,
    Gender,
    Education,
    MaritalStatus,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::LogIncome => "log_income",
            Self::Gender => "gender",
            Self::Education => "education",
            Self::MaritalStatus => "marital_status",
        }
    }

    /// The categorical selector, if this field is categorical
    pub fn as_categorical(&self) -> Option<CategoricalField> {
        match self {
            Self::Gender => Some(CategoricalField::Gender),
            Self::Education => Some(CategoricalField::Education),
            Self::MaritalStatus => Some(CategoricalField::MaritalStatus),
            Self::Income | Self::LogIncome => None,
        }
    }

    /// The numeric selector, if this field is numeric
    pub fn as_numeric(&self) -> Option<NumericField> {
        match self {
            Self::Income => Some(NumericField::Income),
            Self::LogIncome => Some(NumericField::LogIncome),
            _ => None,
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.as_categorical().is_some()
    }

    pub fn kind(&self) -> FieldKind {
        if self.is_categorical() {
            FieldKind::Categorical
        } else {
            FieldKind::Numeric
        }
    }
}

/// Whether a field is dummy-coded or used as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Categorical,
    Numeric,
}

impl From<CategoricalField> for Field {
    fn from(field: CategoricalField) -> Self {
        match field {
            CategoricalField::Gender => Self::Gender,
            CategoricalField::Education => Self::Education,
            CategoricalField::MaritalStatus => Self::MaritalStatus,
        }
    }
}

impl From<NumericField> for Field {
    fn from(field: NumericField) -> Self {
        match field {
            NumericField::Income => Self::Income,
            NumericField::LogIncome => Self::LogIncome,
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "income" => Ok(Self::Income),
            "log_income" => Ok(Self::LogIncome),
            "gender" => Ok(Self::Gender),
            "education" => Ok(Self::Education),
            "marital_status" => Ok(Self::MaritalStatus),
            other => Err(Error::InvalidParameter(format!("Unknown field `{other}`"))),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw field value as produced by the table parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Missing,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Interpret the value as an integral category code
    pub fn as_code(&self) -> Option<i64> {
        let number = match self {
            Self::Missing => return None,
            Self::Number(x) => *x,
            Self::Text(s) => {
                let s = s.trim();
                if let Ok(code) = s.parse::<i64>() {
                    return Some(code);
                }
                s.parse::<f64>().ok()?
            }
        };
        if number.is_finite() && number.fract() == 0.0 {
            Some(number as i64)
        } else {
            None
        }
    }

    /// Interpret the value as a floating point number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Missing => None,
            Self::Number(x) => Some(*x),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One observed individual, as an immutable map from field name to raw value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field; absent fields read as [`RawValue::Missing`]
    pub fn get(&self, name: &str) -> &RawValue {
        static MISSING: RawValue = RawValue::Missing;
        self.fields.get(name).unwrap_or(&MISSING)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Names of the raw fields the cleaner reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub income: String,
    pub gender: String,
    pub education: String,
    pub marital_status: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            income: "total_income".to_string(),
            gender: "gender".to_string(),
            education: "education".to_string(),
            marital_status: "marital_status".to_string(),
        }
    }
}

/// A validated, typed survey record
///
/// Construction enforces `income > 0` and finite; records that fail never
/// exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CleanedRecord {
    income: f64,
    gender: Gender,
    education: Education,
    marital_status: MaritalStatus,
}

impl CleanedRecord {
    /// Create a record, `None` if the income is not a positive finite number
    pub fn new(
        income: f64,
        gender: Gender,
        education: Education,
        marital_status: MaritalStatus,
    ) -> Option<Self> {
        if !(income.is_finite() && income > 0.0) {
            return None;
        }
        Some(Self {
            income,
            gender,
            education,
            marital_status,
        })
    }

    pub fn income(&self) -> f64 {
        self.income
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn education(&self) -> Education {
        self.education
    }

    pub fn marital_status(&self) -> MaritalStatus {
        self.marital_status
    }

    /// Re-express the record with canonical raw codes
    pub fn to_raw(&self, names: &FieldNames) -> RawRecord {
        RawRecord::new()
            .with(names.income.as_str(), self.income)
            .with(names.gender.as_str(), self.gender.code())
            .with(names.education.as_str(), self.education.code())
            .with(names.marital_status.as_str(), self.marital_status.code())
    }

    pub(crate) fn with_income(mut self, income: f64) -> Self {
        self.income = income;
        self
    }
}
