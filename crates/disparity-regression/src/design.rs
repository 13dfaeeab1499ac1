//! Design matrix construction with dummy coding
//!
//! Column 0 is the intercept. Numeric predictors contribute one column each.
//! A categorical predictor with `k` observed levels contributes `k - 1`
//! indicator columns; the first observed level in canonical order is the
//! reference and is encoded as all zeros. Levels never observed get no column,
//! so an empty category cannot make the matrix rank deficient on its own.

use disparity_core::{
    CategoricalField, CleanedRecord, Error, Field, FieldKind, NumericField, Result,
};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::{debug, warn};

/// Name of the intercept column and term
pub const INTERCEPT: &str = "(Intercept)";

/// A predictor selected from cleaned records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predictor {
    Categorical(CategoricalField),
    Numeric(NumericField),
}

impl Predictor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Categorical(field) => field.name(),
            Self::Numeric(field) => field.name(),
        }
    }

    /// Extract the predictor's raw column from `records`
    pub fn column(&self, records: &[CleanedRecord]) -> PredictorColumn {
        match self {
            Self::Numeric(field) => PredictorColumn::Numeric {
                name: field.name().to_string(),
                values: records.iter().map(|r| field.value(r)).collect(),
            },
            Self::Categorical(field) => PredictorColumn::Categorical {
                name: field.name().to_string(),
                levels: field
                    .levels()
                    .iter()
                    .map(|level| level.label().to_string())
                    .collect(),
                codes: records.iter().map(|r| field.value(r).level_index()).collect(),
            },
        }
    }
}

impl From<Field> for Predictor {
    fn from(field: Field) -> Self {
        match field {
            Field::Income => Self::Numeric(NumericField::Income),
            Field::LogIncome => Self::Numeric(NumericField::LogIncome),
            Field::Gender => Self::Categorical(CategoricalField::Gender),
            Field::Education => Self::Categorical(CategoricalField::Education),
            Field::MaritalStatus => Self::Categorical(CategoricalField::MaritalStatus),
        }
    }
}

impl From<CategoricalField> for Predictor {
    fn from(field: CategoricalField) -> Self {
        Self::Categorical(field)
    }
}

impl From<NumericField> for Predictor {
    fn from(field: NumericField) -> Self {
        Self::Numeric(field)
    }
}

/// A predictor's values before coding
#[derive(Debug, Clone, PartialEq)]
pub enum PredictorColumn {
    Numeric {
        name: String,
        values: Vec<f64>,
    },
    /// `codes[i]` indexes into `levels`, which is in canonical order
    Categorical {
        name: String,
        levels: Vec<String>,
        codes: Vec<usize>,
    },
}

impl PredictorColumn {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } | Self::Categorical { name, .. } => name,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric { values, .. } => values.len(),
            Self::Categorical { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The design-matrix columns owned by one predictor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub name: String,
    pub kind: FieldKind,
    pub columns: Range<usize>,
    /// Reference level of a categorical term
    pub reference: Option<String>,
}

impl Term {
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// Dummy-coded model matrix with column bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    matrix: DMatrix<f64>,
    column_names: Vec<String>,
    terms: Vec<Term>,
}

impl DesignMatrix {
    /// Build the design for `n_rows` observations
    pub fn build(n_rows: usize, predictors: &[PredictorColumn]) -> Result<Self> {
        if n_rows == 0 {
            return Err(Error::InvalidInput("Design matrix needs at least one row".to_string()));
        }

        let mut column_names = vec![INTERCEPT.to_string()];
        let mut columns: Vec<Vec<f64>> = vec![vec![1.0; n_rows]];
        let mut terms = vec![Term {
            name: INTERCEPT.to_string(),
            kind: FieldKind::Numeric,
            columns: 0..1,
            reference: None,
        }];

        for predictor in predictors {
            if predictor.len() != n_rows {
                return Err(Error::size_mismatch(
                    n_rows,
                    predictor.len(),
                    &format!("predictor `{}`", predictor.name()),
                ));
            }

            let start = columns.len();
            match predictor {
                PredictorColumn::Numeric { name, values } => {
                    if values.iter().any(|v| !v.is_finite()) {
                        return Err(Error::InvalidInput(format!(
                            "Predictor `{name}` contains non-finite values"
                        )));
                    }
                    column_names.push(name.clone());
                    columns.push(values.clone());
                    terms.push(Term {
                        name: name.clone(),
                        kind: FieldKind::Numeric,
                        columns: start..start + 1,
                        reference: None,
                    });
                }
                PredictorColumn::Categorical { name, levels, codes } => {
                    if let Some(&bad) = codes.iter().find(|&&code| code >= levels.len()) {
                        return Err(Error::InvalidInput(format!(
                            "Predictor `{name}` has level index {bad} but only {} levels",
                            levels.len()
                        )));
                    }

                    let observed: BTreeSet<usize> = codes.iter().copied().collect();
                    let mut observed = observed.into_iter();
                    let reference = observed.next();

                    for level in observed {
                        column_names.push(format!("{name}{}", levels[level]));
                        columns.push(
                            codes
                                .iter()
                                .map(|&code| if code == level { 1.0 } else { 0.0 })
                                .collect(),
                        );
                    }

                    if columns.len() == start {
                        warn!(
                            predictor = %name,
                            "categorical predictor has a single observed level and contributes no columns"
                        );
                    }

                    terms.push(Term {
                        name: name.clone(),
                        kind: FieldKind::Categorical,
                        columns: start..columns.len(),
                        reference: reference.map(|level| levels[level].clone()),
                    });
                }
            }
        }

        let n_cols = columns.len();
        let matrix = DMatrix::from_fn(n_rows, n_cols, |i, j| columns[j][i]);
        debug!(rows = n_rows, columns = n_cols, terms = terms.len(), "built design matrix");

        Ok(Self {
            matrix,
            column_names,
            terms,
        })
    }

    /// Build the design for `predictors` over cleaned records
    pub fn from_records(records: &[CleanedRecord], predictors: &[Predictor]) -> Result<Self> {
        let columns: Vec<PredictorColumn> =
            predictors.iter().map(|p| p.column(records)).collect();
        Self::build(records.len(), &columns)
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.iter().find(|term| term.name == name)
    }

    /// Values of row `i`
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.matrix.row(i).iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disparity_core::{Education, Gender, MaritalStatus};

    fn letters(codes: &[usize]) -> PredictorColumn {
        PredictorColumn::Categorical {
            name: "cat".to_string(),
            levels: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            codes: codes.to_vec(),
        }
    }

    #[test]
    fn test_dummy_coding_omits_reference() {
        let design = DesignMatrix::build(
            4,
            &[
                PredictorColumn::Numeric {
                    name: "x1".to_string(),
                    values: vec![0.5, 1.5, 2.5, 3.5],
                },
                letters(&[0, 1, 2, 1]),
            ],
        )
        .unwrap();

        assert_eq!(design.column_names(), ["(Intercept)", "x1", "catB", "catC"]);
        assert_eq!(design.row(0), vec![1.0, 0.5, 0.0, 0.0]);
        assert_eq!(design.row(1), vec![1.0, 1.5, 1.0, 0.0]);
        assert_eq!(design.row(2), vec![1.0, 2.5, 0.0, 1.0]);

        let cat = design.term("cat").unwrap();
        assert_eq!(cat.columns, 2..4);
        assert_eq!(cat.reference.as_deref(), Some("A"));
    }

    #[test]
    fn test_reference_is_first_observed_level() {
        // Level A never appears: B becomes the reference and A gets no column
        let design = DesignMatrix::build(3, &[letters(&[2, 1, 2])]).unwrap();
        assert_eq!(design.column_names(), ["(Intercept)", "catC"]);
        assert_eq!(design.term("cat").unwrap().reference.as_deref(), Some("B"));
    }

    #[test]
    fn test_single_level_contributes_nothing() {
        let design = DesignMatrix::build(3, &[letters(&[1, 1, 1])]).unwrap();
        assert_eq!(design.ncols(), 1);
        assert_eq!(design.term("cat").unwrap().width(), 0);
    }

    #[test]
    fn test_invalid_columns() {
        assert!(DesignMatrix::build(0, &[]).is_err());
        assert!(DesignMatrix::build(3, &[letters(&[0, 1])]).is_err());
        assert!(DesignMatrix::build(2, &[letters(&[0, 3])]).is_err());
        let nan = PredictorColumn::Numeric {
            name: "x".to_string(),
            values: vec![1.0, f64::NAN],
        };
        assert!(DesignMatrix::build(2, &[nan]).is_err());
    }

    #[test]
    fn test_from_records_names_levels() {
        let records: Vec<CleanedRecord> = [
            (Gender::Female, Education::Bachelors),
            (Gender::Male, Education::Graduate),
            (Gender::Female, Education::HighSchool),
        ]
        .into_iter()
        .filter_map(|(g, e)| CleanedRecord::new(40_000.0, g, e, MaritalStatus::Married))
        .collect();

        let design = DesignMatrix::from_records(
            &records,
            &[
                Predictor::from(Field::Gender),
                Predictor::from(Field::Education),
                Predictor::from(Field::MaritalStatus),
            ],
        )
        .unwrap();

        assert_eq!(
            design.column_names(),
            ["(Intercept)", "genderFemale", "educationBachelors", "educationGraduate"]
        );
        assert_eq!(design.term("gender").unwrap().reference.as_deref(), Some("Male"));
        assert_eq!(design.term("education").unwrap().reference.as_deref(), Some("HighSchool"));
        assert_eq!(design.term("marital_status").unwrap().width(), 0);
        assert_eq!(design.row(0), vec![1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_predictor_from_field() {
        assert_eq!(Predictor::from(Field::LogIncome), Predictor::Numeric(NumericField::LogIncome));
        assert_eq!(
            Predictor::from(Field::Education),
            Predictor::Categorical(CategoricalField::Education)
        );
        assert_eq!(Predictor::from(Field::Gender).name(), "gender");
    }
}
