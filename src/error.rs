//! Error types for a validation run.

use std::path::PathBuf;

use thiserror::Error;

/// The one failure a validation run reports.
///
/// Every variant is terminal: the run stops at the first one raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The configured blueprint file could not be read.
    #[error("API Blueprint file was not found at {}.", path.display())]
    DocumentNotFound { path: PathBuf },

    /// The parser rejected the document. Carries its message unmodified.
    #[error("{0}")]
    Parse(String),

    /// The parser accepted the document but attached an annotation to it.
    #[error("{0}")]
    Annotation(String),

    /// Declared functions without a documented endpoint, in declaration order.
    #[error(
        "API Blueprint does not contain documentation for the following functions:\n\n\t{}",
        functions.join(", ")
    )]
    Coverage { functions: Vec<String> },
}

impl ValidationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ValidationError::DocumentNotFound { .. } => FailureKind::DocumentNotFound,
            ValidationError::Parse(_) => FailureKind::Parse,
            ValidationError::Annotation(_) => FailureKind::Annotation,
            ValidationError::Coverage { .. } => FailureKind::Coverage,
        }
    }
}

/// Which failure shape produced an invalid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DocumentNotFound,
    Parse,
    Annotation,
    Coverage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::DocumentNotFound => "document_not_found",
            FailureKind::Parse => "parse",
            FailureKind::Annotation => "annotation",
            FailureKind::Coverage => "coverage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_path() {
        let err = ValidationError::DocumentNotFound {
            path: PathBuf::from("./apiary.apib"),
        };
        assert_eq!(
            err.to_string(),
            "API Blueprint file was not found at ./apiary.apib."
        );
    }

    #[test]
    fn coverage_message_lists_functions_in_order() {
        let err = ValidationError::Coverage {
            functions: vec!["create".into(), "delete".into()],
        };
        assert_eq!(
            err.to_string(),
            "API Blueprint does not contain documentation for the following functions:\n\n\tcreate, delete"
        );
    }

    #[test]
    fn parse_message_is_verbatim() {
        let err = ValidationError::Parse("line 3: unexpected token".into());
        assert_eq!(err.to_string(), "line 3: unexpected token");
        assert_eq!(err.kind(), FailureKind::Parse);
    }
}
