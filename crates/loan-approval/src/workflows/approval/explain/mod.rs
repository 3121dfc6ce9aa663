//! Local feature attribution for a single prediction.
//!
//! The record is pushed through the model's preprocessing stage, the classification stage
//! supplies additive contributions for that one row, and the result is condensed into a
//! waterfall running from the base value to the model output.

mod chart;

pub use chart::{render_svg, render_text};

use serde::{Deserialize, Serialize};

use super::domain::ApplicantRecord;
use super::failure::FailureKind;
use super::model::{InferenceError, ScoringModel};

/// Number of rows shown on the waterfall, including the collapsed remainder row.
pub const MAX_DISPLAY: usize = 10;

/// Reasons attribution could not be produced. Never blocks the decision itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributionError {
    #[error("model does not expose 'preprocessor' and 'classifier' stages")]
    MissingStages,
    #[error("preprocessing failed: {0}")]
    Preprocessing(InferenceError),
    #[error("classifier attribution failed: {0}")]
    Classifier(InferenceError),
    #[error("{names} feature names do not match {values} attribution values")]
    FeatureNames { names: usize, values: usize },
}

impl AttributionError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::AttributionFailure
    }
}

/// Contribution of one transformed feature to the model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
    pub contribution: f64,
}

/// Additive explanation for one record, contributions sorted by magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub base_value: f64,
    pub output_value: f64,
    pub contributions: Vec<FeatureContribution>,
}

impl Explanation {
    pub fn waterfall(&self, max_display: usize) -> Waterfall {
        let max_display = max_display.max(1);
        let (shown, rest) = if self.contributions.len() > max_display {
            self.contributions.split_at(max_display - 1)
        } else {
            (self.contributions.as_slice(), &[][..])
        };

        let mut rows: Vec<(String, Option<f64>, f64)> = shown
            .iter()
            .map(|item| (item.feature.clone(), Some(item.value), item.contribution))
            .collect();
        if !rest.is_empty() {
            let remainder = rest.iter().map(|item| item.contribution).sum();
            rows.push((format!("{} other features", rest.len()), None, remainder));
        }

        // Bars stack upward from the base value, smallest row first.
        let mut cursor = self.base_value;
        let mut steps: Vec<WaterfallStep> = rows
            .into_iter()
            .rev()
            .map(|(label, value, contribution)| {
                let start = cursor;
                cursor += contribution;
                WaterfallStep {
                    label,
                    value,
                    contribution,
                    start,
                    end: cursor,
                }
            })
            .collect();
        steps.reverse();

        Waterfall {
            base_value: self.base_value,
            output_value: self.output_value,
            steps,
        }
    }
}

/// Display-ready waterfall, largest step first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waterfall {
    pub base_value: f64,
    pub output_value: f64,
    pub steps: Vec<WaterfallStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub contribution: f64,
    pub start: f64,
    pub end: f64,
}

/// Computes the local attribution of `model` for `record`.
pub fn explain(
    model: &dyn ScoringModel,
    record: &ApplicantRecord,
) -> Result<Explanation, AttributionError> {
    let stages = model.stages().ok_or(AttributionError::MissingStages)?;

    let features = stages
        .preprocessor
        .transform(record)
        .map_err(AttributionError::Preprocessing)?;
    let names = stages.preprocessor.feature_names_out();
    let additive = stages
        .classifier
        .local_contributions(&features)
        .map_err(AttributionError::Classifier)?;

    if names.len() != additive.values.len() || features.len() != additive.values.len() {
        return Err(AttributionError::FeatureNames {
            names: names.len(),
            values: additive.values.len(),
        });
    }

    let output_value = additive.base_value + additive.values.iter().sum::<f64>();
    let mut contributions: Vec<FeatureContribution> = names
        .into_iter()
        .zip(features)
        .zip(additive.values)
        .map(|((feature, value), contribution)| FeatureContribution {
            feature,
            value,
            contribution,
        })
        .collect();
    contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

    Ok(Explanation {
        base_value: additive.base_value,
        output_value,
        contributions,
    })
}
