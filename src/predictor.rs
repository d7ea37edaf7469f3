// 🔮 Attrition predictor (demo)
// Imputation + scaling/one-hot encoding feeding an L2 logistic regression

use crate::dataset::{columns, Dataset};
use crate::stats;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Candidate features, used when present in the table
pub const CANDIDATE_FEATURES: [&str; 6] = [
    columns::AGE,
    columns::MONTHLY_INCOME,
    columns::YEARS_AT_COMPANY,
    columns::DISTANCE_FROM_HOME,
    columns::JOB_SATISFACTION,
    columns::OVERTIME,
];

const SPLIT_SEED: u64 = 42;
const TEST_FRACTION: f64 = 0.2;
const MIN_ROWS_FOR_SPLIT: usize = 10;
/// Inverse regularization strength
const C: f64 = 1.0;
const MAX_ITER: usize = 500;
const TOLERANCE: f64 = 1e-8;

// ============================================================================
// INPUT VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Numbers when the text parses as one, text otherwise
    pub fn parse(text: &str) -> FeatureValue {
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(n) => FeatureValue::Number(n),
            Err(_) => FeatureValue::Text(text.to_string()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(t) => t.trim().parse().ok(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            FeatureValue::Number(n) => n.to_string(),
            FeatureValue::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Feature name -> value; absent features are imputed
pub type ModelInput = BTreeMap<String, FeatureValue>;

/// Parse `Feature=value` into an input entry
pub fn parse_assignment(text: &str) -> Result<(String, FeatureValue)> {
    let (name, value) = text
        .split_once('=')
        .with_context(|| format!("Expected Feature=value, got {:?}", text))?;
    Ok((name.trim().to_string(), FeatureValue::parse(value)))
}

// ============================================================================
// PREPROCESSING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum FeatureEncoder {
    /// Median imputation, then standardization
    Numeric {
        name: String,
        median: f64,
        mean: f64,
        scale: f64,
    },
    /// Most-frequent imputation, then one-hot over the training categories
    Categorical {
        name: String,
        categories: Vec<String>,
        most_frequent: String,
    },
}

impl FeatureEncoder {
    fn fit(ds: &Dataset, name: &str, rows: &[usize]) -> Option<FeatureEncoder> {
        let column = ds.column(name)?;

        if let Some(values) = &column.numeric {
            let train: Vec<Option<f64>> = rows.iter().map(|&r| values[r]).collect();
            let median = stats::median(&train)?;
            let imputed: Vec<f64> = train.iter().map(|v| v.unwrap_or(median)).collect();
            let mean = imputed.iter().sum::<f64>() / imputed.len() as f64;
            let var = imputed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / imputed.len() as f64;
            let scale = if var > 0.0 { var.sqrt() } else { 1.0 };
            return Some(FeatureEncoder::Numeric {
                name: name.to_string(),
                median,
                mean,
                scale,
            });
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &r in rows {
            if let Some(v) = &column.raw[r] {
                *counts.entry(v.as_str()).or_insert(0) += 1;
            }
        }
        // Ties resolve to the smallest value
        let most_frequent = counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (&k, &n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((k, n)),
            })?
            .0
            .to_string();

        Some(FeatureEncoder::Categorical {
            name: name.to_string(),
            categories: counts.keys().map(|k| k.to_string()).collect(),
            most_frequent,
        })
    }

    fn name(&self) -> &str {
        match self {
            FeatureEncoder::Numeric { name, .. } | FeatureEncoder::Categorical { name, .. } => name,
        }
    }

    fn width(&self) -> usize {
        match self {
            FeatureEncoder::Numeric { .. } => 1,
            FeatureEncoder::Categorical { categories, .. } => categories.len(),
        }
    }

    fn encode(&self, value: Option<&FeatureValue>, out: &mut Vec<f64>) {
        match self {
            FeatureEncoder::Numeric { median, mean, scale, .. } => {
                let x = value.and_then(FeatureValue::as_number).unwrap_or(*median);
                out.push((x - mean) / scale);
            }
            FeatureEncoder::Categorical { categories, most_frequent, .. } => {
                let text = value.map(FeatureValue::as_text).unwrap_or_else(|| most_frequent.clone());
                // Unknown categories encode as all zeros
                out.extend(categories.iter().map(|c| if *c == text { 1.0 } else { 0.0 }));
            }
        }
    }

    fn default_value(&self) -> FeatureValue {
        match self {
            FeatureEncoder::Numeric { median, .. } => FeatureValue::Number(*median),
            FeatureEncoder::Categorical { categories, most_frequent, .. } => FeatureValue::Text(
                categories.first().cloned().unwrap_or_else(|| most_frequent.clone()),
            ),
        }
    }
}

fn row_input(ds: &Dataset, features: &[&str], row: usize) -> ModelInput {
    let mut input = ModelInput::new();
    for &name in features {
        let Some(column) = ds.column(name) else { continue };
        let value = match &column.numeric {
            Some(values) => values[row].map(FeatureValue::Number),
            None => column.raw[row].clone().map(FeatureValue::Text),
        };
        if let Some(value) = value {
            input.insert(name.to_string(), value);
        }
    }
    input
}

// ============================================================================
// SPLIT
// ============================================================================

/// Stratified train/test split; returns (train, test, stratified)
fn split_rows(labels: &[bool]) -> (Vec<usize>, Vec<usize>, bool) {
    let all: Vec<usize> = (0..labels.len()).collect();
    let positives = labels.iter().filter(|&&y| y).count();
    let both_classes = positives > 0 && positives < labels.len();

    if !both_classes || labels.len() < MIN_ROWS_FOR_SPLIT {
        return (all.clone(), all, false);
    }

    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [false, true] {
        let mut idx: Vec<usize> = all.iter().copied().filter(|&i| labels[i] == class).collect();
        idx.shuffle(&mut rng);
        let n_test = ((idx.len() as f64 * TEST_FRACTION).round() as usize)
            .max(1)
            .min(idx.len() - 1);
        test.extend_from_slice(&idx[..n_test]);
        train.extend_from_slice(&idx[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test, true)
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// Newton iterations on 0.5*|w|^2 + C * sum(logloss); intercept is the last
/// column of `x` (always 1) and is penalised like the other weights
fn fit_logistic(x: &[Vec<f64>], y: &[f64]) -> Result<(Vec<f64>, usize)> {
    let d = x.first().map(|row| row.len()).unwrap_or(0);
    let mut w = vec![0.0; d];

    for iteration in 1..=MAX_ITER {
        let mut grad = w.clone();
        let mut hess: Vec<Vec<f64>> = (0..d)
            .map(|i| (0..d).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();

        for (row, &label) in x.iter().zip(y) {
            let p = sigmoid(dot(row, &w));
            let weight = C * p * (1.0 - p);
            for i in 0..d {
                grad[i] += C * (p - label) * row[i];
                for j in 0..d {
                    hess[i][j] += weight * row[i] * row[j];
                }
            }
        }

        let step = solve(hess, grad).context("Model training failed: singular Hessian")?;
        for (wi, si) in w.iter_mut().zip(&step) {
            *wi -= si;
        }

        if step.iter().map(|s| s * s).sum::<f64>().sqrt() < TOLERANCE {
            return Ok((w, iteration));
        }
    }

    Ok((w, MAX_ITER))
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub train_rows: usize,
    pub test_rows: usize,
    pub stratified: bool,
    pub accuracy: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone)]
pub struct AttritionModel {
    encoders: Vec<FeatureEncoder>,
    weights: Vec<f64>,
    pub evaluation: Evaluation,
}

impl AttritionModel {
    pub fn train(ds: &Dataset) -> Result<AttritionModel> {
        let features: Vec<&str> = CANDIDATE_FEATURES
            .iter()
            .copied()
            .filter(|f| ds.has_column(f))
            .collect();
        if features.is_empty() {
            bail!("Not enough features for predictor demo");
        }

        let labels = ds.attrition_flags();
        let positives = ds.attrition_count();
        if positives == 0 || positives == labels.len() {
            bail!("Model training failed: attrition labels contain a single class");
        }

        let (train, test, stratified) = split_rows(labels);

        let encoders: Vec<FeatureEncoder> = features
            .iter()
            .filter_map(|f| FeatureEncoder::fit(ds, f, &train))
            .collect();
        if encoders.is_empty() {
            bail!("Not enough features for predictor demo");
        }

        let mut model = AttritionModel {
            encoders,
            weights: Vec::new(),
            evaluation: Evaluation {
                train_rows: train.len(),
                test_rows: test.len(),
                stratified,
                accuracy: 0.0,
                iterations: 0,
            },
        };

        let encode_rows = |rows: &[usize]| -> Vec<Vec<f64>> {
            rows.iter()
                .map(|&r| model.design_row(&row_input(ds, &features, r)))
                .collect()
        };
        let x_train = encode_rows(&train);
        let x_test = encode_rows(&test);
        let y_train: Vec<f64> = train.iter().map(|&r| if labels[r] { 1.0 } else { 0.0 }).collect();

        let (weights, iterations) = fit_logistic(&x_train, &y_train)?;

        let correct = x_test
            .iter()
            .zip(&test)
            .filter(|(row, &r)| (sigmoid(dot(row, &weights)) >= 0.5) == labels[r])
            .count();

        model.weights = weights;
        model.evaluation.iterations = iterations;
        model.evaluation.accuracy = correct as f64 / test.len().max(1) as f64;

        tracing::info!(
            features = ?model.features(),
            train_rows = model.evaluation.train_rows,
            test_rows = model.evaluation.test_rows,
            accuracy = model.evaluation.accuracy,
            iterations,
            "attrition model trained"
        );

        Ok(model)
    }

    pub fn features(&self) -> Vec<&str> {
        self.encoders.iter().map(|e| e.name()).collect()
    }

    /// Encoded features followed by the constant intercept term
    fn design_row(&self, input: &ModelInput) -> Vec<f64> {
        let width: usize = self.encoders.iter().map(|e| e.width()).sum();
        let mut row = Vec::with_capacity(width + 1);
        for encoder in &self.encoders {
            encoder.encode(input.get(encoder.name()), &mut row);
        }
        row.push(1.0);
        row
    }

    /// Medians for numeric features, first category for categorical ones
    pub fn default_input(&self) -> ModelInput {
        self.encoders
            .iter()
            .map(|e| (e.name().to_string(), e.default_value()))
            .collect()
    }

    /// Probability of attrition for one employee profile
    pub fn predict_proba(&self, input: &ModelInput) -> f64 {
        sigmoid(dot(&self.design_row(input), &self.weights))
    }

    /// Distinct values seen for a categorical feature
    pub fn categories(&self, feature: &str) -> Option<BTreeSet<&str>> {
        self.encoders.iter().find_map(|e| match e {
            FeatureEncoder::Categorical { name, categories, .. } if name == feature => {
                Some(categories.iter().map(|c| c.as_str()).collect())
            }
            _ => None,
        })
    }
}
