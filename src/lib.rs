//! apib-coverage: check that every HTTP function is documented
//!
//! Reads the HTTP triggers declared in a `serverless.yml`, parses an API
//! Blueprint description document and reports the functions whose
//! (path, method) pair the document does not describe.

pub mod config;
pub mod coverage;
pub mod error;
pub mod format;
pub mod model;
pub mod parse;
pub mod sink;
pub mod source;
pub mod tree;

use std::path::Path;

use config::ConfigProvider;
use error::ValidationError;
use model::{DocumentedEndpoint, ValidationResult};
use parse::DocumentParser;
use sink::ResultSink;
use source::DocumentSource;
use tree::ContentNode;

/// Parser handle accepted by the library entry points
pub type Parser<'a> = &'a (dyn DocumentParser + Send + Sync);

/// Validate that the description document covers every declared endpoint
///
/// With no declared endpoints the run is valid and the document is not read.
/// Otherwise the document is read, parsed, checked for annotations and then
/// matched against the declarations; the first failure ends the run.
pub async fn validate(
    config: &dyn ConfigProvider,
    source: &dyn DocumentSource,
    parser: Parser<'_>,
) -> Result<(), ValidationError> {
    let declared = match config.declared_endpoints() {
        Some(declared) if !declared.is_empty() => declared,
        _ => return Ok(()),
    };

    let tree = check_document(config.document_path(), source, parser).await?;
    coverage::check_coverage(&tree, declared, config.base_path())
}

/// Read and parse a description document, rejecting annotated documents
pub async fn check_document(
    path: &Path,
    source: &dyn DocumentSource,
    parser: Parser<'_>,
) -> Result<ContentNode, ValidationError> {
    let text = source.read_document(path)?;
    parse::parse_document(parser, &text).await
}

/// List the (path, method) pairs a description document describes
///
/// Annotations do not stop the listing; parse failures do.
pub async fn list_documented(
    path: &Path,
    source: &dyn DocumentSource,
    parser: Parser<'_>,
) -> Result<Vec<DocumentedEndpoint>, ValidationError> {
    let text = source.read_document(path)?;
    let tree = parser.parse(&text).await?;
    Ok(coverage::documented_endpoints(&tree))
}

/// Run a validation and hand its result to `sink`
pub async fn run(
    config: &dyn ConfigProvider,
    source: &dyn DocumentSource,
    parser: Parser<'_>,
    sink: &mut dyn ResultSink,
) -> std::io::Result<ValidationResult> {
    let result = ValidationResult::from(validate(config, source, parser).await);
    sink.receive(&result)?;
    Ok(result)
}
