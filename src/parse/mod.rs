pub mod blueprint;
pub mod drafter;
pub mod refract;

use crate::error::ValidationError;
use crate::tree::{find_all, find_first, ContentNode, ElementKind};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which parser turns the description document into a content tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Built-in API Blueprint reader
    #[default]
    Native,
    /// The document is already an API Elements JSON parse result
    Refract,
    /// The external `drafter` binary
    Drafter,
}

/// Trait for description document parsers
#[async_trait]
pub trait DocumentParser {
    /// Short name for this parser: "native", "refract", "drafter"
    fn name(&self) -> &str;

    /// Parse the raw document text into a content tree
    async fn parse(&self, source: &str) -> Result<ContentNode, ValidationError>;
}

/// The built-in API Blueprint reader
pub struct NativeParser;

#[async_trait]
impl DocumentParser for NativeParser {
    fn name(&self) -> &str {
        "native"
    }

    async fn parse(&self, source: &str) -> Result<ContentNode, ValidationError> {
        blueprint::parse_blueprint(source)
    }
}

/// Reads a pre-rendered API Elements JSON parse result
///
/// Error-class annotations fail here as [`ValidationError::Parse`] and never
/// reach [`check_annotations`].
pub struct RefractParser;

#[async_trait]
impl DocumentParser for RefractParser {
    fn name(&self) -> &str {
        "refract"
    }

    async fn parse(&self, source: &str) -> Result<ContentNode, ValidationError> {
        let tree = refract::parse_refract(source)?;
        reject_error_annotations(tree)
    }
}

/// Build the parser for a configured kind
pub fn parser_for(kind: ParserKind, drafter_program: &str) -> Box<dyn DocumentParser + Send + Sync> {
    match kind {
        ParserKind::Native => Box::new(NativeParser),
        ParserKind::Refract => Box::new(RefractParser),
        ParserKind::Drafter => Box::new(drafter::DrafterParser::new(drafter_program)),
    }
}

/// Turn an error-class annotation into a parse failure.
///
/// API Elements parsers report hard errors in-band as annotations with the
/// `error` class; those mean the parse failed.
pub fn reject_error_annotations(tree: ContentNode) -> Result<ContentNode, ValidationError> {
    let error = find_all(&tree, |node| {
        node.kind == ElementKind::Annotation && node.has_class("error")
    })
    .into_iter()
    .next()
    .map(|found| annotation_message(found.node));

    match error {
        Some(message) => Err(ValidationError::Parse(message)),
        None => Ok(tree),
    }
}

/// Fail on the first annotation of any severity, in document order.
pub fn check_annotations(tree: &ContentNode) -> Result<(), ValidationError> {
    match find_first(tree, &ElementKind::Annotation) {
        Some(annotation) => Err(ValidationError::Annotation(annotation_message(annotation))),
        None => Ok(()),
    }
}

fn annotation_message(annotation: &ContentNode) -> String {
    annotation
        .text
        .clone()
        .unwrap_or_else(|| "unspecified annotation".to_string())
}

/// Parse a document and reject it if the parser annotated it
pub async fn parse_document(
    parser: &(dyn DocumentParser + Send + Sync),
    source: &str,
) -> Result<ContentNode, ValidationError> {
    let tree = parser.parse(source).await?;
    check_annotations(&tree)?;
    Ok(tree)
}
