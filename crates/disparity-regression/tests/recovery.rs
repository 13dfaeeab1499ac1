//! Noise-free data is reproduced exactly and OLS geometry holds on noisy data

use approx::{assert_abs_diff_eq, assert_relative_eq};
use disparity_core::{
    CategoricalField, CleanedRecord, Education, Error, Gender, MaritalStatus, NumericField,
};
use disparity_regression::{
    Diagnostics, DesignMatrix, OlsRegression, Predictor, PredictorColumn,
};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

fn x1_cat_design(x1: &[f64], cat: &[usize]) -> DesignMatrix {
    DesignMatrix::build(
        x1.len(),
        &[
            PredictorColumn::Numeric {
                name: "x1".to_string(),
                values: x1.to_vec(),
            },
            PredictorColumn::Categorical {
                name: "cat".to_string(),
                levels: vec!["A".to_string(), "B".to_string()],
                codes: cat.to_vec(),
            },
        ],
    )
    .unwrap()
}

#[test]
fn recovers_noise_free_coefficients() {
    let x1 = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    let cat = [0, 1, 0, 1, 1, 0, 0, 1];
    let y: Vec<f64> = x1
        .iter()
        .zip(&cat)
        .map(|(x, &c)| 3.0 + 2.0 * x - 5.0 * c as f64)
        .collect();

    let design = x1_cat_design(&x1, &cat);
    let model = OlsRegression::default().fit(&design, &y).unwrap();

    assert_abs_diff_eq!(model.coefficient("(Intercept)").unwrap().estimate, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.coefficient("x1").unwrap().estimate, 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.coefficient("catB").unwrap().estimate, -5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.r_squared, 1.0, epsilon = 1e-9);
    for e in &model.residuals {
        assert_abs_diff_eq!(*e, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn noisy_fit_is_close_and_consistent() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.5).unwrap();
    let n = 200;
    let x1: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..10.0)).collect();
    let cat: Vec<usize> = (0..n).map(|_| rng.gen_range(0..2)).collect();
    let y: Vec<f64> = x1
        .iter()
        .zip(&cat)
        .map(|(x, &c)| 3.0 + 2.0 * x - 5.0 * c as f64 + noise.sample(&mut rng))
        .collect();

    let design = x1_cat_design(&x1, &cat);
    let model = OlsRegression::default().fit(&design, &y).unwrap();

    for (name, truth) in [("(Intercept)", 3.0), ("x1", 2.0), ("catB", -5.0)] {
        let c = model.coefficient(name).unwrap();
        assert!(
            (c.estimate - truth).abs() < 5.0 * c.std_error,
            "{name}: {} far from {truth}",
            c.estimate
        );
        assert!(c.p_value < 1e-6);
    }
    assert_relative_eq!(model.residual_std_error, 0.5, max_relative = 0.2);
    assert!(model.f_p_value < 1e-10);
}

#[test]
fn fit_from_records_uses_record_fields() {
    let rows = [
        (30_000.0, Gender::Female, Education::HighSchool),
        (34_000.0, Gender::Female, Education::Bachelors),
        (52_000.0, Gender::Male, Education::Bachelors),
        (41_000.0, Gender::Male, Education::HighSchool),
        (36_500.0, Gender::Female, Education::Graduate),
        (61_000.0, Gender::Male, Education::Graduate),
        (29_000.0, Gender::Female, Education::HighSchool),
    ];
    let records: Vec<CleanedRecord> = rows
        .iter()
        .filter_map(|&(income, g, e)| CleanedRecord::new(income, g, e, MaritalStatus::Married))
        .collect();

    let predictors = [
        Predictor::Categorical(CategoricalField::Gender),
        Predictor::Categorical(CategoricalField::Education),
        Predictor::Categorical(CategoricalField::MaritalStatus),
    ];
    let (design, model) = OlsRegression::default()
        .fit_records(&records, NumericField::Income, &predictors)
        .unwrap();

    assert_eq!(
        design.column_names(),
        ["(Intercept)", "genderFemale", "educationBachelors", "educationGraduate"]
    );
    assert_eq!(model.n, 7);
    assert_eq!(model.df_residual, 3);
    assert!(model.coefficient("genderFemale").unwrap().estimate < 0.0);
}

#[test]
fn empty_category_cell_is_reported() {
    // Every Female respondent is a graduate, so the two indicators coincide
    let rows = [
        (30_000.0, Gender::Female, Education::Graduate),
        (34_000.0, Gender::Female, Education::Graduate),
        (52_000.0, Gender::Male, Education::Bachelors),
        (41_000.0, Gender::Male, Education::Bachelors),
        (45_000.0, Gender::Male, Education::Bachelors),
    ];
    let records: Vec<CleanedRecord> = rows
        .iter()
        .filter_map(|&(income, g, e)| CleanedRecord::new(income, g, e, MaritalStatus::Married))
        .collect();

    let err = OlsRegression::default()
        .fit_records(
            &records,
            NumericField::Income,
            &[
                Predictor::Categorical(CategoricalField::Gender),
                Predictor::Categorical(CategoricalField::Education),
            ],
        )
        .unwrap_err();
    match err {
        Error::SingularDesign { terms, rank, columns } => {
            assert_eq!(terms, vec!["education".to_string()]);
            assert_eq!((rank, columns), (2, 3));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

fn noisy_design() -> impl Strategy<Value = (Vec<f64>, Vec<usize>, Vec<f64>)> {
    (8usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(-50.0f64..50.0, n),
            prop::collection::vec(0usize..3, n),
            prop::collection::vec(-100.0f64..100.0, n),
        )
    })
}

proptest! {
    #[test]
    fn prop_hat_trace_and_residual_orthogonality((x1, cat, y) in noisy_design()) {
        let design = DesignMatrix::build(
            x1.len(),
            &[
                PredictorColumn::Numeric { name: "x1".to_string(), values: x1.clone() },
                PredictorColumn::Categorical {
                    name: "cat".to_string(),
                    levels: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                    codes: cat.clone(),
                },
            ],
        )
        .unwrap();

        let model = match OlsRegression::default().fit(&design, &y) {
            Ok(model) => model,
            // Degenerate draws, e.g. a constant x1
            Err(Error::SingularDesign { .. }) | Err(Error::InsufficientSample { .. }) => {
                return Ok(());
            }
            Err(other) => panic!("unexpected error {other:?}"),
        };
        let diagnostics = Diagnostics::compute(&model, &design).unwrap();

        let trace: f64 = diagnostics.leverage.iter().sum();
        prop_assert!((trace - design.ncols() as f64).abs() < 1e-6);
        prop_assert!(diagnostics.leverage.iter().all(|&h| h > -1e-9 && h < 1.0 + 1e-9));

        let scale = y.iter().map(|v| v.abs()).fold(1.0, f64::max);
        for j in 0..design.ncols() {
            let column = design.matrix().column(j);
            let weighted: f64 = column.iter().zip(&model.residuals).map(|(x, e)| x * e).sum();
            prop_assert!(weighted.abs() < 1e-7 * scale * 50.0 * x1.len() as f64);
        }
    }
}
