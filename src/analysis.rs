//! End-to-end survey analysis
//!
//! Cleaning runs first; the four consumers of the cleaned records then run
//! independently. A failing section is recorded in the report next to the
//! sections that succeeded.

use disparity_aggregate::{AggregateResult, Aggregator};
use disparity_confidence::{ConfidenceLevel, GroupInterval, MeanInterval};
use disparity_core::{
    AnalysisConfig, CategoricalField, CleanedRecord, CleaningReport, Error, RawRecord,
    RecordCleaner, RejectionReason, Result,
};
use disparity_hypothesis::{HypothesisTestResult, TwoSampleTTest};
use disparity_regression::{Diagnostics, OlsRegression, Predictor, RegressionModel, Term};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Result of one report section, or the error that aborted it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum SectionOutcome<T> {
    Completed(T),
    Failed(SectionError),
}

impl<T> SectionOutcome<T> {
    fn from_result(section: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => {
                warn!(section, %err, "analysis section failed");
                Self::Failed(SectionError::from(&err))
            }
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SectionError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(err) => Some(err),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Serializable form of an [`Error`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionError {
    /// Snake-case error variant, e.g. `insufficient_sample`
    pub kind: String,
    pub message: String,
}

impl From<&Error> for SectionError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Counts from the cleaning pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningSummary {
    pub total: usize,
    pub kept: usize,
    pub rejected: usize,
    pub rejections: BTreeMap<RejectionReason, usize>,
    pub clipped: usize,
}

impl From<&CleaningReport> for CleaningSummary {
    fn from(report: &CleaningReport) -> Self {
        Self {
            total: report.total(),
            kept: report.records.len(),
            rejected: report.rejected,
            rejections: report.rejections.clone(),
            clipped: report.clipped,
        }
    }
}

/// Two-group comparison on the first grouping field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisSection {
    pub field: CategoricalField,
    pub significance_level: f64,
    pub significant: bool,
    pub result: HypothesisTestResult,
}

/// Fitted model with its design terms and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionSection {
    pub terms: Vec<Term>,
    pub model: RegressionModel,
    pub diagnostics: Diagnostics,
}

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub cleaning: CleaningSummary,
    pub aggregates: SectionOutcome<Vec<AggregateResult>>,
    pub intervals: SectionOutcome<Vec<GroupInterval>>,
    pub hypothesis_test: SectionOutcome<HypothesisSection>,
    pub regression: SectionOutcome<RegressionSection>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Configured analysis pipeline
#[derive(Debug, Clone)]
pub struct SurveyAnalysis {
    config: AnalysisConfig,
    level: ConfidenceLevel,
    cleaner: RecordCleaner,
}

impl SurveyAnalysis {
    /// Validate `config` and prepare the pipeline
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let level = ConfidenceLevel::new(config.confidence_level)?;
        let mut cleaner = RecordCleaner::new().with_field_names(config.field_names.clone());
        if let Some(topcode) = config.topcode {
            cleaner = cleaner.with_topcode(topcode)?;
        }
        Ok(Self {
            config,
            level,
            cleaner,
        })
    }

    /// Clean `raw` and run every section
    pub fn run(raw: &[RawRecord], config: &AnalysisConfig) -> Result<AnalysisReport> {
        Ok(Self::new(config.clone())?.analyze(raw))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn clean(&self, raw: &[RawRecord]) -> CleaningReport {
        self.cleaner.clean(raw)
    }

    pub fn aggregate(&self, records: &[CleanedRecord]) -> Result<Vec<AggregateResult>> {
        let aggregator = Aggregator::new(self.config.grouping(), self.config.response_field())?;
        Ok(aggregator.aggregate(records))
    }

    pub fn intervals(&self, records: &[CleanedRecord]) -> Result<Vec<GroupInterval>> {
        if records.is_empty() {
            return Err(Error::insufficient(2, 0));
        }
        Ok(MeanInterval::students_t(self.level).group_intervals(
            records,
            &self.config.grouping(),
            self.config.response_field(),
        ))
    }

    /// Pooled t-test across the levels of the first grouping field
    pub fn hypothesis_test(&self, records: &[CleanedRecord]) -> Result<HypothesisSection> {
        let field = self
            .config
            .grouping()
            .first()
            .copied()
            .ok_or_else(|| Error::InvalidParameter("no grouping field to test".to_string()))?;
        let result = TwoSampleTTest::new(self.level).test_by_field(
            records,
            field,
            self.config.response_field(),
        )?;
        Ok(HypothesisSection {
            field,
            significance_level: self.config.significance_level,
            significant: result.is_significant(self.config.significance_level),
            result,
        })
    }

    pub fn regression(&self, records: &[CleanedRecord]) -> Result<RegressionSection> {
        let predictors: Vec<Predictor> = self
            .config
            .regression_predictors
            .iter()
            .map(|&field| Predictor::from(field))
            .collect();
        let (design, model) = OlsRegression::new(self.level).fit_records(
            records,
            self.config.response_field(),
            &predictors,
        )?;
        let diagnostics = Diagnostics::compute(&model, &design)?;
        Ok(RegressionSection {
            terms: design.terms().to_vec(),
            model,
            diagnostics,
        })
    }

    /// Clean `raw` and run every section over the kept records
    #[instrument(skip(self, raw), fields(n = raw.len()))]
    pub fn analyze(&self, raw: &[RawRecord]) -> AnalysisReport {
        let cleaning = self.clean(raw);
        debug!(
            kept = cleaning.records.len(),
            rejected = cleaning.rejected,
            "cleaned survey records"
        );
        let records = &cleaning.records;

        #[cfg(feature = "parallel")]
        let ((aggregates, intervals), (hypothesis_test, regression)) = rayon::join(
            || (self.aggregate(records), self.intervals(records)),
            || (self.hypothesis_test(records), self.regression(records)),
        );

        #[cfg(not(feature = "parallel"))]
        let ((aggregates, intervals), (hypothesis_test, regression)) = (
            (self.aggregate(records), self.intervals(records)),
            (self.hypothesis_test(records), self.regression(records)),
        );

        AnalysisReport {
            config: self.config.clone(),
            cleaning: CleaningSummary::from(&cleaning),
            aggregates: SectionOutcome::from_result("aggregates", aggregates),
            intervals: SectionOutcome::from_result("intervals", intervals),
            hypothesis_test: SectionOutcome::from_result("hypothesis_test", hypothesis_test),
            regression: SectionOutcome::from_result("regression", regression),
        }
    }
}
