//! Coverage of declared endpoints by a parsed description document.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::model::{DeclaredEndpoint, DocumentedEndpoint};
use crate::tree::{find_kind, ContentNode, ElementKind};

/// Optional-parameter placeholders such as `{?page,limit}`.
fn optional_params_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\?[^=]+?\}").unwrap())
}

/// Canonical comparable form of a path template.
///
/// Removes optional-parameter placeholders, then trailing slashes. Path
/// placeholders like `{id}` are kept and must match literally.
///
/// Removing a placeholder can join a `{` and a following `?...}` into a
/// new one, so removal repeats until nothing matches.
pub fn clean_path(path: &str) -> String {
    let mut stripped = path.to_string();
    loop {
        let next = optional_params_re().replace_all(&stripped, "").into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }
    stripped.trim_end_matches('/').to_string()
}

/// Every (path, method) pair documented in the tree, in document order.
///
/// Resources whose `href` is not a literal string are skipped. A
/// transition's own `href` overrides the resource path.
pub fn documented_endpoints(tree: &ContentNode) -> Vec<DocumentedEndpoint> {
    let mut documented = Vec::new();

    for resource in find_kind(tree, &ElementKind::Resource) {
        let Some(resource_path) = resource.node.attr_text("href") else {
            continue;
        };

        for transition in find_kind(resource.node, &ElementKind::Transition) {
            let path = transition
                .node
                .attr_text("href")
                .unwrap_or(resource_path);

            let mut seen: HashSet<Vec<usize>> = HashSet::new();
            for request in find_kind(transition.node, &ElementKind::HttpRequest) {
                if !seen.insert(request.position) {
                    continue;
                }
                if let Some(method) = request.node.attr_text("method") {
                    documented.push(DocumentedEndpoint {
                        path: path.to_string(),
                        method: method.to_string(),
                    });
                }
            }
        }
    }

    documented
}

/// Whether `endpoint`, prefixed with `base_path`, is among `documented`.
pub fn is_documented(
    endpoint: &DeclaredEndpoint,
    documented: &[DocumentedEndpoint],
    base_path: &str,
) -> bool {
    let match_path = clean_path(&format!("{base_path}{}", endpoint.http_path));
    let match_method = endpoint.http_method.to_lowercase();

    documented
        .iter()
        .any(|doc| clean_path(&doc.path) == match_path && doc.method.to_lowercase() == match_method)
}

/// Names of declared endpoints with no documented counterpart.
///
/// Follows the declaration order; a function owning several undocumented
/// triggers is listed once per trigger.
pub fn undocumented_functions(
    declared: &[DeclaredEndpoint],
    documented: &[DocumentedEndpoint],
    base_path: &str,
) -> Vec<String> {
    declared
        .iter()
        .filter(|endpoint| !is_documented(endpoint, documented, base_path))
        .map(|endpoint| endpoint.function_name.clone())
        .collect()
}

/// Check that the tree documents every declared endpoint.
pub fn check_coverage(
    tree: &ContentNode,
    declared: &[DeclaredEndpoint],
    base_path: &str,
) -> Result<(), ValidationError> {
    let documented = documented_endpoints(tree);
    let functions = undocumented_functions(declared, &documented, base_path);
    if functions.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Coverage { functions })
    }
}
