//! Built-in API Blueprint reader.
//!
//! Understands the section structure that matters for coverage: groups,
//! resources, actions and their request/response items. Message bodies,
//! parameters and data structures are skipped. Problems that the reference
//! parser reports as warnings become `annotation` nodes.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::tree::{AttrValue, ContentNode, ElementKind};

const METHODS: &str = "GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS|TRACE|CONNECT|LINK|UNLINK";

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})[ ]+(.*?)[ ]*#*[ ]*$").unwrap())
}

fn group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Group\s+(.+)$").unwrap())
}

fn endpoint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^({METHODS})\s+(/\S*)$")).unwrap())
}

fn action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?:({METHODS})|(?:(.+?)\s*)?\[({METHODS})(?:\s+(\S+))?\])$"
        ))
        .unwrap()
    })
}

fn resource_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:(/\S*)|(?:(.+?)\s*)?\[(/\S*)\])$").unwrap())
}

fn request_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}[+*-][ ]+Request\b").unwrap())
}

fn response_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}[+*-][ ]+Response[ ]+(\d{3})\b").unwrap())
}

/// A classified section header.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Group(String),
    Resource {
        title: Option<String>,
        uri: String,
    },
    Endpoint {
        method: String,
        uri: String,
    },
    Action {
        title: Option<String>,
        method: String,
        uri: Option<String>,
    },
    Other(String),
}

fn classify_header(text: &str) -> Section {
    if let Some(caps) = group_re().captures(text) {
        return Section::Group(caps[1].trim().to_string());
    }
    if let Some(caps) = endpoint_re().captures(text) {
        return Section::Endpoint {
            method: caps[1].to_string(),
            uri: caps[2].to_string(),
        };
    }
    if let Some(caps) = action_re().captures(text) {
        let method = caps
            .get(1)
            .or_else(|| caps.get(3))
            .map_or(String::new(), |m| m.as_str().to_string());
        return Section::Action {
            title: caps.get(2).map(|m| m.as_str().to_string()),
            method,
            uri: caps.get(4).map(|m| m.as_str().to_string()),
        };
    }
    if let Some(caps) = resource_re().captures(text) {
        let uri = caps
            .get(1)
            .or_else(|| caps.get(3))
            .map_or(String::new(), |m| m.as_str().to_string());
        return Section::Resource {
            title: caps.get(2).map(|m| m.as_str().to_string()),
            uri,
        };
    }
    Section::Other(text.to_string())
}

/// Whether every `{` in a URI template is closed, without nesting.
fn braces_balanced(uri: &str) -> bool {
    let mut open = false;
    for c in uri.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}

#[derive(Debug, Default)]
struct Transaction {
    implicit: bool,
    responses: Vec<String>,
}

#[derive(Debug)]
struct OpenAction {
    title: Option<String>,
    method: String,
    uri: Option<String>,
    transactions: Vec<Transaction>,
}

impl OpenAction {
    fn new(title: Option<String>, method: String, uri: Option<String>) -> Self {
        Self {
            title,
            method,
            uri,
            transactions: Vec::new(),
        }
    }

    fn add_request(&mut self) {
        self.transactions.push(Transaction::default());
    }

    fn add_response(&mut self, status: &str) {
        let start_new = match self.transactions.last() {
            None => true,
            Some(last) => last.implicit && !last.responses.is_empty(),
        };
        if start_new {
            self.transactions.push(Transaction {
                implicit: true,
                responses: Vec::new(),
            });
        }
        if let Some(last) = self.transactions.last_mut() {
            last.responses.push(status.to_string());
        }
    }

    fn into_transition(mut self) -> ContentNode {
        if self.transactions.is_empty() {
            self.transactions.push(Transaction {
                implicit: true,
                responses: Vec::new(),
            });
        }

        let transactions = self
            .transactions
            .iter()
            .map(|t| {
                let mut children = vec![
                    ContentNode::new(ElementKind::HttpRequest).with_attr("method", &self.method)
                ];
                children.extend(t.responses.iter().map(|status| {
                    ContentNode::new(ElementKind::HttpResponse).with_attr("statusCode", status)
                }));
                ContentNode::new(ElementKind::HttpTransaction).with_children(children)
            })
            .collect();

        let mut transition = ContentNode::new(ElementKind::Transition).with_children(transactions);
        if let Some(title) = self.title {
            transition = transition.with_attr("title", title);
        }
        if let Some(uri) = self.uri {
            transition = transition.with_attr("href", uri);
        }
        transition
    }
}

#[derive(Debug)]
struct OpenResource {
    level: usize,
    title: Option<String>,
    uri: String,
    methods: HashSet<String>,
    transitions: Vec<ContentNode>,
}

impl OpenResource {
    fn into_node(self) -> ContentNode {
        let mut node = ContentNode::new(ElementKind::Resource)
            .with_attr("href", self.uri)
            .with_children(self.transitions);
        if let Some(title) = self.title {
            node = node.with_attr("title", title);
        }
        node
    }
}

#[derive(Debug)]
struct OpenGroup {
    level: usize,
    node: ContentNode,
}

/// Incremental tree builder driven line by line.
struct Builder {
    api: ContentNode,
    group: Option<OpenGroup>,
    resource: Option<OpenResource>,
    action: Option<OpenAction>,
    annotations: Vec<ContentNode>,
    resource_uris: HashSet<String>,
    seen_header: bool,
}

impl Builder {
    fn new() -> Self {
        Self {
            api: ContentNode::new(ElementKind::Category).with_class("api"),
            group: None,
            resource: None,
            action: None,
            annotations: Vec::new(),
            resource_uris: HashSet::new(),
            seen_header: false,
        }
    }

    fn warn(&mut self, line: usize, message: impl AsRef<str>) {
        self.annotations.push(
            ContentNode::new(ElementKind::Annotation)
                .with_class("warning")
                .with_attr("line", line.to_string())
                .with_text(format!("line {line}: {}", message.as_ref())),
        );
    }

    fn close_action(&mut self) {
        if let Some(action) = self.action.take() {
            if let Some(resource) = self.resource.as_mut() {
                resource.transitions.push(action.into_transition());
            }
        }
    }

    fn close_resource(&mut self) {
        self.close_action();
        if let Some(resource) = self.resource.take() {
            let node = resource.into_node();
            match self.group.as_mut() {
                Some(group) => group.node.children.push(node),
                None => self.api.children.push(node),
            }
        }
    }

    fn close_group(&mut self) {
        self.close_resource();
        if let Some(group) = self.group.take() {
            self.api.children.push(group.node);
        }
    }

    fn open_resource(&mut self, line: usize, level: usize, title: Option<String>, uri: String) {
        self.close_resource();
        if !braces_balanced(&uri) {
            self.warn(line, format!("URI template '{uri}' has unbalanced braces"));
        }
        if !self.resource_uris.insert(uri.clone()) {
            self.warn(line, format!("the resource '{uri}' is already defined"));
        }
        self.resource = Some(OpenResource {
            level,
            title,
            uri,
            methods: HashSet::new(),
            transitions: Vec::new(),
        });
    }

    fn open_action(
        &mut self,
        line: usize,
        title: Option<String>,
        method: String,
        uri: Option<String>,
    ) {
        self.close_action();
        let Some(resource) = self.resource.as_mut() else {
            let label = title.as_deref().unwrap_or(&method).to_string();
            self.warn(
                line,
                format!("action '{label}' is not nested under a resource section"),
            );
            return;
        };

        let duplicate = uri.is_none() && !resource.methods.insert(method.clone());
        let resource_uri = resource.uri.clone();
        if duplicate {
            self.warn(
                line,
                format!("action with method '{method}' already defined for resource '{resource_uri}'"),
            );
        }
        if let Some(uri) = &uri {
            if !braces_balanced(uri) {
                self.warn(line, format!("URI template '{uri}' has unbalanced braces"));
            }
        }
        self.action = Some(OpenAction::new(title, method, uri));
    }

    fn header(&mut self, line: usize, level: usize, text: &str) {
        let section = classify_header(text);
        let first = !self.seen_header;
        self.seen_header = true;

        match section {
            Section::Other(name) if first => {
                self.api
                    .attributes
                    .insert("title".to_string(), AttrValue::Text(name));
            }
            _ if first => {
                self.warn(line, "expected API name, e.g. '# <API Name>'");
                self.section(line, level, section);
            }
            _ => self.section(line, level, section),
        }
    }

    fn section(&mut self, line: usize, level: usize, section: Section) {
        match section {
            Section::Group(name) => {
                self.close_group();
                self.group = Some(OpenGroup {
                    level,
                    node: ContentNode::new(ElementKind::Category)
                        .with_class("resourceGroup")
                        .with_attr("title", name),
                });
            }
            Section::Resource { title, uri } => self.open_resource(line, level, title, uri),
            Section::Endpoint { method, uri } => {
                self.open_resource(line, level, None, uri);
                self.open_action(line, None, method, None);
            }
            Section::Action { title, method, uri } => self.open_action(line, title, method, uri),
            Section::Other(_) => {
                if self.resource.as_ref().is_some_and(|r| level <= r.level) {
                    self.close_resource();
                }
                if self.group.as_ref().is_some_and(|g| level <= g.level) {
                    self.close_group();
                }
            }
        }
    }

    fn list_item(&mut self, line_text: &str) {
        let Some(action) = self.action.as_mut() else {
            return;
        };
        if let Some(caps) = response_re().captures(line_text) {
            action.add_response(&caps[1]);
        } else if request_re().is_match(line_text) {
            action.add_request();
        }
    }

    fn finish(mut self) -> ContentNode {
        self.close_group();
        if !self.seen_header {
            self.warn(1, "expected API name, e.g. '# <API Name>'");
        }
        let mut children = vec![self.api];
        children.extend(self.annotations);
        ContentNode::new(ElementKind::ParseResult).with_children(children)
    }
}

/// Parse API Blueprint text into a content tree.
///
/// Fails only when the source contains tab characters; every other problem
/// is recorded as an annotation in the returned tree.
pub fn parse_blueprint(source: &str) -> Result<ContentNode, ValidationError> {
    if source.contains('\t') {
        return Err(ValidationError::Parse(
            "the use of tab(s) '\\t' in source data isn't currently supported, please contact makers"
                .to_string(),
        ));
    }

    let mut builder = Builder::new();
    let mut in_fence = false;

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;

        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(caps) = header_re().captures(line) {
            let level = caps[1].len();
            builder.header(line_number, level, &caps[2]);
        } else {
            builder.list_item(line);
        }
    }

    Ok(builder.finish())
}
