use serde::{Deserialize, Serialize};

/// User-facing classification of every recoverable scoring failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ArtifactMissing,
    ArtifactIncompatible,
    InferenceFailure,
    AttributionFailure,
}

impl FailureKind {
    pub const fn label(self) -> &'static str {
        match self {
            FailureKind::ArtifactMissing => "artifact_missing",
            FailureKind::ArtifactIncompatible => "artifact_incompatible",
            FailureKind::InferenceFailure => "inference_failure",
            FailureKind::AttributionFailure => "attribution_failure",
        }
    }
}
