use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicantRecord, ColumnKind, ColumnValue};
use super::{
    sigmoid, AdditiveContributions, Classifier, InferenceError, PipelineStages, Preprocessor,
    ScoringModel,
};

/// Artifact layout version this build can read.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Serialized form of a trained preprocessing + logistic regression pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub name: String,
    pub steps: PipelineSteps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSteps {
    pub preprocessor: PreprocessorArtifact,
    pub classifier: ClassifierArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorArtifact {
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    pub handle_unknown: UnknownCategoryPolicy,
}

/// Standardised numeric input: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

/// One-hot encoded input, one output feature per category in listed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    /// Negative label first, positive label second.
    pub classes: [i64; 2],
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Attribution background in transformed feature space.
    #[serde(default)]
    pub feature_means: Option<Vec<f64>>,
}

/// Structural problems found while assembling a pipeline from an artifact.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArtifactError {
    #[error("unsupported artifact format version {found} (expected {expected})")]
    FormatVersion { found: u32, expected: u32 },
    #[error("preprocessor references unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{column}' is {actual} but the preprocessor treats it as {declared}")]
    ColumnKind {
        column: String,
        declared: &'static str,
        actual: &'static str,
    },
    #[error("column '{0}' is encoded more than once")]
    DuplicateColumn(String),
    #[error("numeric column '{0}' has an invalid mean or scale")]
    InvalidScaling(String),
    #[error("categorical column '{0}' lists no categories or repeats one")]
    InvalidCategories(String),
    #[error("classifier expects {coefficients} features but the preprocessor produces {features}")]
    CoefficientCount { coefficients: usize, features: usize },
    #[error("feature_means has {found} entries, expected {expected}")]
    FeatureMeansCount { found: usize, expected: usize },
    #[error("classifier parameters must be finite")]
    NonFiniteParameters,
}

/// Column-wise scaler and one-hot encoder over the applicant row.
#[derive(Debug, Clone)]
pub struct TabularPreprocessor {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
    handle_unknown: UnknownCategoryPolicy,
}

impl TabularPreprocessor {
    pub fn from_artifact(artifact: PreprocessorArtifact) -> Result<Self, ArtifactError> {
        let mut seen = HashSet::new();

        for column in &artifact.numeric {
            check_column(&column.column, ColumnKind::Numeric, &mut seen)?;
            let valid = column.mean.is_finite() && column.scale.is_finite() && column.scale != 0.0;
            if !valid {
                return Err(ArtifactError::InvalidScaling(column.column.clone()));
            }
        }

        for column in &artifact.categorical {
            check_column(&column.column, ColumnKind::Categorical, &mut seen)?;
            let distinct: HashSet<&str> = column.categories.iter().map(String::as_str).collect();
            if column.categories.is_empty() || distinct.len() != column.categories.len() {
                return Err(ArtifactError::InvalidCategories(column.column.clone()));
            }
        }

        Ok(Self {
            numeric: artifact.numeric,
            categorical: artifact.categorical,
            handle_unknown: artifact.handle_unknown,
        })
    }

    pub fn n_features_out(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|column| column.categories.len())
                .sum::<usize>()
    }

    /// Neutral attribution background: scaled mean for numerics, uniform share per category.
    fn default_background(&self) -> Vec<f64> {
        let mut background = vec![0.0; self.numeric.len()];
        for column in &self.categorical {
            let share = 1.0 / column.categories.len() as f64;
            background.extend(std::iter::repeat(share).take(column.categories.len()));
        }
        background
    }

    fn numeric_value(&self, record: &ApplicantRecord, column: &str) -> Result<f64, InferenceError> {
        match record.column(column) {
            Some(ColumnValue::Numeric(value)) => Ok(value),
            Some(other) => Err(InferenceError::ColumnKind {
                column: column.to_string(),
                expected: ColumnKind::Numeric.label(),
                found: other.kind().label(),
            }),
            None => Err(InferenceError::MissingColumn(column.to_string())),
        }
    }

    fn categorical_value(
        &self,
        record: &ApplicantRecord,
        column: &str,
    ) -> Result<&'static str, InferenceError> {
        match record.column(column) {
            Some(ColumnValue::Categorical(value)) => Ok(value),
            Some(other) => Err(InferenceError::ColumnKind {
                column: column.to_string(),
                expected: ColumnKind::Categorical.label(),
                found: other.kind().label(),
            }),
            None => Err(InferenceError::MissingColumn(column.to_string())),
        }
    }
}

fn check_column(
    column: &str,
    declared: ColumnKind,
    seen: &mut HashSet<String>,
) -> Result<(), ArtifactError> {
    let actual =
        ColumnKind::of_column(column).ok_or_else(|| ArtifactError::UnknownColumn(column.to_string()))?;
    if actual != declared {
        return Err(ArtifactError::ColumnKind {
            column: column.to_string(),
            declared: declared.label(),
            actual: actual.label(),
        });
    }
    if !seen.insert(column.to_string()) {
        return Err(ArtifactError::DuplicateColumn(column.to_string()));
    }
    Ok(())
}

impl Preprocessor for TabularPreprocessor {
    fn transform(&self, record: &ApplicantRecord) -> Result<Vec<f64>, InferenceError> {
        let mut row = Vec::with_capacity(self.n_features_out());

        for column in &self.numeric {
            let raw = self.numeric_value(record, &column.column)?;
            let scaled = (raw - column.mean) / column.scale;
            if !scaled.is_finite() {
                return Err(InferenceError::NonFinite {
                    feature: format!("num__{}", column.column),
                });
            }
            row.push(scaled);
        }

        for column in &self.categorical {
            let value = self.categorical_value(record, &column.column)?;
            let position = column
                .categories
                .iter()
                .position(|category| category == value);

            if position.is_none() && self.handle_unknown == UnknownCategoryPolicy::Error {
                return Err(InferenceError::UnknownCategory {
                    column: column.column.clone(),
                    value: value.to_string(),
                });
            }

            row.extend(
                (0..column.categories.len()).map(|index| {
                    if position == Some(index) {
                        1.0
                    } else {
                        0.0
                    }
                }),
            );
        }

        Ok(row)
    }

    fn feature_names_out(&self) -> Vec<String> {
        let numeric = self
            .numeric
            .iter()
            .map(|column| format!("num__{}", column.column));
        let categorical = self.categorical.iter().flat_map(|column| {
            column
                .categories
                .iter()
                .map(move |category| format!("cat__{}_{}", column.column, category))
        });
        numeric.chain(categorical).collect()
    }
}

/// Binary logistic regression over the transformed feature row.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    classes: [i64; 2],
    coefficients: Vec<f64>,
    intercept: f64,
    feature_means: Vec<f64>,
}

impl LogisticClassifier {
    pub fn classes(&self) -> [i64; 2] {
        self.classes
    }

    pub fn label_for(&self, margin: f64) -> i64 {
        if margin > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }

    fn check_shape(&self, features: &[f64]) -> Result<(), InferenceError> {
        if features.len() != self.coefficients.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }
        Ok(())
    }
}

impl Classifier for LogisticClassifier {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn decision_function(&self, features: &[f64]) -> Result<f64, InferenceError> {
        self.check_shape(features)?;
        let margin = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (coef, value)| acc + coef * value);

        if !margin.is_finite() {
            return Err(InferenceError::NonFinite {
                feature: "decision_function".to_string(),
            });
        }
        Ok(margin)
    }

    fn local_contributions(&self, features: &[f64]) -> Result<AdditiveContributions, InferenceError> {
        self.check_shape(features)?;

        let base_value = self
            .coefficients
            .iter()
            .zip(&self.feature_means)
            .fold(self.intercept, |acc, (coef, mean)| acc + coef * mean);
        let values = self
            .coefficients
            .iter()
            .zip(features.iter().zip(&self.feature_means))
            .map(|(coef, (value, mean))| coef * (value - mean))
            .collect();

        Ok(AdditiveContributions { base_value, values })
    }
}

/// Preprocessor and logistic classifier loaded from a [`PipelineArtifact`].
#[derive(Debug, Clone)]
pub struct LogisticPipeline {
    name: String,
    preprocessor: TabularPreprocessor,
    classifier: LogisticClassifier,
}

impl LogisticPipeline {
    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, ArtifactError> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ArtifactError::FormatVersion {
                found: artifact.format_version,
                expected: SUPPORTED_FORMAT_VERSION,
            });
        }

        let PipelineSteps {
            preprocessor,
            classifier,
        } = artifact.steps;
        let preprocessor = TabularPreprocessor::from_artifact(preprocessor)?;

        let features = preprocessor.n_features_out();
        if classifier.coefficients.len() != features {
            return Err(ArtifactError::CoefficientCount {
                coefficients: classifier.coefficients.len(),
                features,
            });
        }

        let feature_means = match classifier.feature_means {
            Some(means) if means.len() != features => {
                return Err(ArtifactError::FeatureMeansCount {
                    found: means.len(),
                    expected: features,
                });
            }
            Some(means) => means,
            None => preprocessor.default_background(),
        };

        let finite = classifier.intercept.is_finite()
            && classifier.coefficients.iter().all(|value| value.is_finite())
            && feature_means.iter().all(|value| value.is_finite());
        if !finite {
            return Err(ArtifactError::NonFiniteParameters);
        }

        Ok(Self {
            name: artifact.name,
            preprocessor,
            classifier: LogisticClassifier {
                classes: classifier.classes,
                coefficients: classifier.coefficients,
                intercept: classifier.intercept,
                feature_means,
            },
        })
    }

    pub fn preprocessor(&self) -> &TabularPreprocessor {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &LogisticClassifier {
        &self.classifier
    }

    fn margin(&self, record: &ApplicantRecord) -> Result<f64, InferenceError> {
        let features = self.preprocessor.transform(record)?;
        self.classifier.decision_function(&features)
    }
}

impl ScoringModel for LogisticPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, record: &ApplicantRecord) -> Result<i64, InferenceError> {
        let margin = self.margin(record)?;
        Ok(self.classifier.label_for(margin))
    }

    fn predict_probability(&self, record: &ApplicantRecord) -> Result<f64, InferenceError> {
        let margin = self.margin(record)?;
        Ok(sigmoid(margin))
    }

    fn stages(&self) -> Option<PipelineStages<'_>> {
        Some(PipelineStages {
            preprocessor: &self.preprocessor,
            classifier: &self.classifier,
        })
    }
}
