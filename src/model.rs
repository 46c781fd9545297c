use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, ValidationError};

/// An HTTP trigger declared in the deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredEndpoint {
    pub function_name: String,
    pub http_method: String,
    pub http_path: String,
}

impl DeclaredEndpoint {
    pub fn new(function_name: &str, http_method: &str, http_path: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
            http_method: http_method.to_string(),
            http_path: http_path.to_string(),
        }
    }
}

/// A (path, method) pair extracted from the description document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentedEndpoint {
    pub path: String,
    pub method: String,
}

/// Outcome of a validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid,
    Invalid {
        kind: FailureKind,
        /// Undocumented function names for coverage failures, otherwise a
        /// single error message.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

impl From<ValidationError> for ValidationResult {
    fn from(err: ValidationError) -> Self {
        let kind = err.kind();
        let reasons = match err {
            ValidationError::Coverage { functions } => functions,
            other => vec![other.to_string()],
        };
        ValidationResult::Invalid { kind, reasons }
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => ValidationResult::Valid,
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_reasons_are_function_names() {
        let result: ValidationResult = ValidationError::Coverage {
            functions: vec!["create".into()],
        }
        .into();
        assert_eq!(
            result,
            ValidationResult::Invalid {
                kind: FailureKind::Coverage,
                reasons: vec!["create".into()],
            }
        );
    }

    #[test]
    fn other_failures_carry_one_message() {
        let result: ValidationResult =
            Err(ValidationError::Annotation("line 1: expected API name".into())).into();
        assert_eq!(
            result,
            ValidationResult::Invalid {
                kind: FailureKind::Annotation,
                reasons: vec!["line 1: expected API name".into()],
            }
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let valid = serde_json::to_value(ValidationResult::Valid).unwrap();
        assert_eq!(valid, serde_json::json!({"status": "valid"}));

        let invalid = serde_json::to_value(ValidationResult::Invalid {
            kind: FailureKind::Coverage,
            reasons: vec!["create".into()],
        })
        .unwrap();
        assert_eq!(
            invalid,
            serde_json::json!({"status": "invalid", "kind": "coverage", "reasons": ["create"]})
        );
    }
}
