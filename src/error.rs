use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RegionId;

#[derive(Debug, Error)]
pub enum SvcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Graph integrity error: {0}")]
    Integrity(String),

    #[error("Labeling size mismatch: segmentation has {segm} points, ground truth has {truth}")]
    PopulationMismatch { segm: usize, truth: usize },
}

impl SvcError {
    pub fn config(message: impl Into<String>) -> Self {
        SvcError::Config(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        SvcError::State(message.into())
    }

    pub fn dangling_region(id: RegionId) -> Self {
        SvcError::Integrity(format!("region {id} is not part of the graph"))
    }

    pub fn missing_edge(a: RegionId, b: RegionId) -> Self {
        SvcError::Integrity(format!("no edge between regions {a} and {b}"))
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            SvcError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            SvcError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Check the scene/labeling JSON against the documented schema.",
            ),
            SvcError::ConfigParse(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Fix the TOML syntax or field names in the config file.",
            ),
            SvcError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("lambda") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Lambda must lie in [0, 1] and is only accepted with --criterion manual-lambda.",
                    )
                } else if lower.contains("bins") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "The bin count must be positive and is only accepted with --criterion equalization.",
                    )
                } else if lower.contains("threshold") || lower.contains("step") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Thresholds and steps must lie in [0, 1]; the sweep step must be positive.",
                    )
                } else if lower.contains("empty") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Provide a labeling with at least one point.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags and config values (e.g., --criterion, --lambda, --bins-num).",
                    )
                }
            }
            SvcError::State(msg) => ErrorPayload::new(
                ErrorCategory::State,
                msg.to_string(),
                "Set an initial state (regions and adjacency) before clustering or evaluating.",
            ),
            SvcError::Integrity(msg) => ErrorPayload::new(
                ErrorCategory::Integrity,
                msg.to_string(),
                "The adjacency references unknown regions; rebuild the scene and retry.",
            ),
            SvcError::PopulationMismatch { .. } => ErrorPayload::new(
                ErrorCategory::Input,
                self.to_string(),
                "Both labelings must cover the same point population in the same order.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, SvcError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    State,
    Integrity,
    Io,
    Input,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_payload_mentions_manual_criterion() {
        let err = SvcError::config("lambda 1.5 outside range [0, 1]");
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Config);
        let remediation = payload.remediation.unwrap_or_default();
        assert!(
            remediation.contains("manual-lambda"),
            "expected remediation to mention manual-lambda, got: {remediation}"
        );
    }

    #[test]
    fn bins_payload_mentions_equalization() {
        let err = SvcError::config("bins_num must be greater than 0");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("equalization"),
            "expected equalization remediation, got: {remediation}"
        );
    }

    #[test]
    fn generic_config_payload_uses_default_remediation() {
        let err = SvcError::config("Some other config issue");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("Check flags"),
            "expected default remediation for generic config errors"
        );
    }

    #[test]
    fn state_payload_points_at_initial_state() {
        let err = SvcError::state("cluster called before set_initial_state");
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::State);
        assert!(payload
            .remediation
            .unwrap_or_default()
            .contains("initial state"));
    }

    #[test]
    fn integrity_helpers_name_the_ids() {
        let err = SvcError::dangling_region(42);
        assert_eq!(
            err.to_string(),
            "Graph integrity error: region 42 is not part of the graph"
        );
        let err = SvcError::missing_edge(3, 7);
        assert_eq!(err.to_payload().category, ErrorCategory::Integrity);
        assert!(err.to_string().contains("3 and 7"));
    }

    #[test]
    fn mismatch_payload_is_input_category() {
        let err = SvcError::PopulationMismatch { segm: 10, truth: 12 };
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Input);
        assert!(payload.message.contains("10"));
        assert!(payload.message.contains("12"));
    }
}
