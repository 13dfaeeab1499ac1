//! Runs the full analysis over a synthetic survey and prints the report
//!
//! Usage: `cargo run --example survey_report [config.json]`
//! Set `RUST_LOG=debug` to see per-stage logging.

use anyhow::Result;
use income_disparity::{AnalysisConfig, RawRecord, SectionOutcome, SurveyAnalysis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::LogNormal;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Survey rows with an education gradient and a gender gap
fn generate_survey(n: usize, seed: u64) -> Result<Vec<RawRecord>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spread = LogNormal::new(0.0, 0.45)?;

    let rows = (0..n)
        .map(|i| {
            let gender: i64 = rng.gen_range(1..=2);
            let education: i64 = rng.gen_range(0..=7);
            let marital: i64 = rng.gen_range(0..=4);
            let married_premium = if marital == 1 { 2_000.0 } else { 0.0 };
            let base = 28_000.0 + 5_500.0 * education as f64 + married_premium;
            let gap = if gender == 2 { 0.82 } else { 1.0 };
            let income = base * gap * spread.sample(&mut rng);

            let record = RawRecord::new()
                .with("gender", gender)
                .with("education", education)
                .with("marital_status", marital);
            // Roughly one row in forty has no usable income
            if i % 40 == 7 {
                record.with("total_income", "refused")
            } else {
                record.with("total_income", income.round())
            }
        })
        .collect();
    Ok(rows)
}

fn print_section<T>(name: &str, outcome: &SectionOutcome<T>, render: impl Fn(&T)) {
    println!("\n== {name} ==");
    match outcome {
        SectionOutcome::Completed(value) => render(value),
        SectionOutcome::Failed(err) => println!("  failed ({}): {}", err.kind, err.message),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    let survey = generate_survey(2_000, 42)?;
    let report = SurveyAnalysis::run(&survey, &config)?;

    println!(
        "Cleaned {} of {} records ({} rejected, {} clipped)",
        report.cleaning.kept, report.cleaning.total, report.cleaning.rejected, report.cleaning.clipped
    );
    for (reason, count) in &report.cleaning.rejections {
        println!("  {reason:?}: {count}");
    }

    print_section("Group summaries", &report.aggregates, |groups| {
        for group in groups {
            println!("  {group}");
        }
    });

    print_section("Confidence intervals", &report.intervals, |intervals| {
        for group in intervals {
            match group.interval() {
                Some(ci) => println!("  {}: {ci}", group.key),
                None => println!("  {}: {:?}", group.key, group.outcome),
            }
        }
    });

    print_section("Two-sample t-test", &report.hypothesis_test, |section| {
        println!("  {}", section.result);
        println!(
            "  significant at alpha = {}: {}",
            section.significance_level, section.significant
        );
    });

    print_section("Regression", &report.regression, |section| {
        let model = &section.model;
        for c in &model.coefficients {
            println!(
                "  {:<28} {:>12.2} (se {:>10.2}, t {:>7.2}, p {:.4})",
                c.name, c.estimate, c.std_error, c.t_statistic, c.p_value
            );
        }
        println!(
            "  R² = {:.4}, adj. R² = {:.4}, F = {:.2} (p = {:.4}), σ = {:.2}",
            model.r_squared,
            model.adjusted_r_squared,
            model.f_statistic,
            model.f_p_value,
            model.residual_std_error
        );
        println!(
            "  {} high-leverage observations (h > {:.4}), {} with |standardized residual| > 3",
            section.diagnostics.high_leverage.len(),
            section.diagnostics.leverage_threshold,
            section.diagnostics.outliers(3.0).len()
        );
    });

    if std::env::var("SURVEY_REPORT_JSON").is_ok() {
        println!("{}", report.to_json()?);
    }
    Ok(())
}
