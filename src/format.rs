//! Markdown output formatters for CLI commands

use clap::ValueEnum;

use crate::model::{DeclaredEndpoint, DocumentedEndpoint, ValidationResult};

/// Output format of the CLI and the console sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    #[value(alias = "md")]
    Markdown,
}

/// Format a ValidationResult as markdown
pub fn validation(result: &ValidationResult) -> String {
    match result {
        ValidationResult::Valid => "API Blueprint documents every HTTP function.\n".to_string(),
        ValidationResult::Invalid { kind, reasons } => match kind {
            crate::error::FailureKind::Coverage => {
                let mut md = String::from(
                    "API Blueprint does not contain documentation for the following functions:\n\n",
                );
                for name in reasons {
                    md.push_str(&format!("- `{name}`\n"));
                }
                md
            }
            _ => format!(
                "API Blueprint check failed ({}): {}\n",
                kind.as_str(),
                reasons.join("; ")
            ),
        },
    }
}

/// Format the outcome of a document-only check as markdown
pub fn lint(result: &ValidationResult) -> String {
    match result {
        ValidationResult::Valid => "API Blueprint is valid.\n".to_string(),
        invalid => validation(invalid),
    }
}

/// Format documented endpoints as a markdown table
pub fn endpoints(endpoints: &[DocumentedEndpoint]) -> String {
    if endpoints.is_empty() {
        return "No documented endpoints.\n".to_string();
    }

    let mut md = String::from("| Method | Path |\n|--------|------|\n");
    for endpoint in endpoints {
        md.push_str(&format!("| {} | `{}` |\n", endpoint.method, endpoint.path));
    }
    md
}

/// Format declared endpoints as a markdown table
pub fn functions(endpoints: &[DeclaredEndpoint]) -> String {
    if endpoints.is_empty() {
        return "No HTTP functions declared.\n".to_string();
    }

    let mut md = String::from("| Function | Method | Path |\n|----------|--------|------|\n");
    for endpoint in endpoints {
        md.push_str(&format!(
            "| {} | {} | `{}` |\n",
            endpoint.function_name, endpoint.http_method, endpoint.http_path
        ));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn format_values() {
        assert_eq!(OutputFormat::from_str("json", false), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("Markdown", true), Ok(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_str("md", false), Ok(OutputFormat::Markdown));
        assert!(OutputFormat::from_str("yaml", false).is_err());
    }

    #[test]
    fn valid_run() {
        assert_eq!(
            validation(&ValidationResult::Valid),
            "API Blueprint documents every HTTP function.\n"
        );
        assert_eq!(lint(&ValidationResult::Valid), "API Blueprint is valid.\n");
    }

    #[test]
    fn coverage_lists_functions() {
        let md = validation(&ValidationResult::Invalid {
            kind: FailureKind::Coverage,
            reasons: vec!["create".into(), "remove".into()],
        });
        assert!(md.starts_with("API Blueprint does not contain documentation"));
        assert!(md.contains("- `create`\n- `remove`\n"));
    }

    #[test]
    fn other_failures_show_kind_and_message() {
        let md = lint(&ValidationResult::Invalid {
            kind: FailureKind::Annotation,
            reasons: vec!["line 3: the resource '/users' is already defined".into()],
        });
        assert_eq!(
            md,
            "API Blueprint check failed (annotation): line 3: the resource '/users' is already defined\n"
        );
    }

    #[test]
    fn endpoint_tables() {
        let md = endpoints(&[DocumentedEndpoint {
            path: "/users{?page}".into(),
            method: "GET".into(),
        }]);
        assert!(md.contains("| GET | `/users{?page}` |"));
        assert_eq!(endpoints(&[]), "No documented endpoints.\n");

        let md = functions(&[DeclaredEndpoint::new("list", "get", "users")]);
        assert!(md.contains("| list | get | `users` |"));
        assert_eq!(functions(&[]), "No HTTP functions declared.\n");
    }
}
