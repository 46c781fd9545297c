//! Conversion of API Elements (refract) JSON into a content tree.
//!
//! Accepts both the API Elements 1.0 serialization, where attribute values
//! and meta classes are themselves elements, and the older refract form
//! that uses bare JSON strings and arrays.

use serde_json::Value;

use crate::error::ValidationError;
use crate::tree::{AttrValue, ContentNode, ElementKind};

/// Parse a refract JSON document into a content tree.
pub fn parse_refract(json: &str) -> Result<ContentNode, ValidationError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ValidationError::Parse(format!("invalid API Elements JSON: {e}")))?;
    from_value(&value).ok_or_else(|| {
        ValidationError::Parse("invalid API Elements JSON: top level is not an element".to_string())
    })
}

/// Convert a JSON value to a node; `None` if it is not an element object.
pub fn from_value(value: &Value) -> Option<ContentNode> {
    let object = value.as_object()?;
    let element = object.get("element")?.as_str()?;

    let mut node = ContentNode::new(ElementKind::from(element));

    if let Some(classes) = object.get("meta").and_then(|meta| meta.get("classes")) {
        node.classes = string_list(classes);
    }

    if let Some(attributes) = object.get("attributes").and_then(Value::as_object) {
        for (name, value) in attributes {
            node.attributes.insert(name.clone(), attr_value(value));
        }
    }

    match object.get("content") {
        Some(Value::String(text)) => node.text = Some(text.clone()),
        Some(Value::Array(items)) => {
            node.children = items.iter().filter_map(from_value).collect();
        }
        Some(inner @ Value::Object(map)) if map.contains_key("element") => {
            node.children = from_value(inner).into_iter().collect();
        }
        Some(Value::Object(member)) => {
            // member element content: {"key": ..., "value": ...}
            node.children = ["key", "value"]
                .iter()
                .filter_map(|k| member.get(*k).and_then(from_value))
                .collect();
        }
        Some(Value::Number(n)) => node.text = Some(n.to_string()),
        Some(Value::Bool(b)) => node.text = Some(b.to_string()),
        Some(Value::Null) | None => {}
    }

    Some(node)
}

/// Literal strings (bare or wrapped in a `string` element) become text;
/// everything else stays an element.
fn attr_value(value: &Value) -> AttrValue {
    match value {
        Value::String(text) => AttrValue::Text(text.clone()),
        Value::Object(object)
            if object.get("element").and_then(Value::as_str) == Some("string") =>
        {
            match object.get("content") {
                Some(Value::String(text)) => AttrValue::Text(text.clone()),
                _ => AttrValue::Element(from_value(value).unwrap_or_else(string_element)),
            }
        }
        other => match from_value(other) {
            Some(node) => AttrValue::Element(node),
            None => AttrValue::Element(
                ContentNode::new(ElementKind::Other("json".to_string()))
                    .with_text(other.to_string()),
            ),
        },
    }
}

fn string_element() -> ContentNode {
    ContentNode::new(ElementKind::Other("string".to_string()))
}

/// Class names from either `["a", "b"]` or an `array` element of strings.
fn string_list(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(object) => match object.get("content") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("content").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{find_first, find_kind};
    use pretty_assertions::assert_eq;

    const PARSE_RESULT: &str = r#"{
      "element": "parseResult",
      "content": [
        {
          "element": "category",
          "meta": {
            "classes": {"element": "array", "content": [{"element": "string", "content": "api"}]},
            "title": {"element": "string", "content": "Users API"}
          },
          "content": [
            {
              "element": "resource",
              "attributes": {
                "href": {"element": "string", "content": "/users{?page}"}
              },
              "content": [
                {
                  "element": "transition",
                  "content": [
                    {
                      "element": "httpTransaction",
                      "content": [
                        {
                          "element": "httpRequest",
                          "attributes": {"method": {"element": "string", "content": "GET"}}
                        },
                        {
                          "element": "httpResponse",
                          "attributes": {"statusCode": {"element": "string", "content": "200"}}
                        }
                      ]
                    }
                  ]
                }
              ]
            }
          ]
        },
        {
          "element": "annotation",
          "meta": {"classes": {"element": "array", "content": [{"element": "string", "content": "warning"}]}},
          "attributes": {"code": {"element": "number", "content": 6}},
          "content": "action is missing a response"
        }
      ]
    }"#;

    #[test]
    fn converts_api_elements() {
        let tree = parse_refract(PARSE_RESULT).unwrap();
        assert_eq!(tree.kind, ElementKind::ParseResult);

        let api = find_first(&tree, &ElementKind::Category).unwrap();
        assert_eq!(api.classes, vec!["api"]);

        let resource = find_first(&tree, &ElementKind::Resource).unwrap();
        assert_eq!(resource.attr_text("href"), Some("/users{?page}"));

        let request = find_first(&tree, &ElementKind::HttpRequest).unwrap();
        assert_eq!(request.attr_text("method"), Some("GET"));
    }

    #[test]
    fn keeps_annotation_text_and_classes() {
        let tree = parse_refract(PARSE_RESULT).unwrap();
        let annotations = find_kind(&tree, &ElementKind::Annotation);
        assert_eq!(annotations.len(), 1);
        let annotation = annotations[0].node;
        assert!(annotation.has_class("warning"));
        assert_eq!(annotation.text.as_deref(), Some("action is missing a response"));
        assert!(matches!(
            annotation.attributes.get("code"),
            Some(AttrValue::Element(code)) if code.text.as_deref() == Some("6")
        ));
    }

    #[test]
    fn accepts_legacy_bare_strings() {
        let json = r#"{
          "element": "resource",
          "meta": {"classes": ["legacy"]},
          "attributes": {"href": "/legacy"},
          "content": [{"element": "transition", "content": [
            {"element": "httpTransaction", "content": [
              {"element": "httpRequest", "attributes": {"method": "POST"}}
            ]}
          ]}]
        }"#;
        let tree = parse_refract(json).unwrap();
        assert_eq!(tree.classes, vec!["legacy"]);
        assert_eq!(tree.attr_text("href"), Some("/legacy"));
        let request = find_first(&tree, &ElementKind::HttpRequest).unwrap();
        assert_eq!(request.attr_text("method"), Some("POST"));
    }

    #[test]
    fn templated_href_is_not_literal() {
        let json = r#"{
          "element": "resource",
          "attributes": {"href": {"element": "ref", "content": "UserHref"}}
        }"#;
        let tree = parse_refract(json).unwrap();
        assert_eq!(tree.attr_text("href"), None);
        assert!(matches!(tree.attributes.get("href"), Some(AttrValue::Element(_))));
    }

    #[test]
    fn member_content_becomes_children() {
        let json = r#"{
          "element": "member",
          "content": {
            "key": {"element": "string", "content": "id"},
            "value": {"element": "number", "content": 1}
          }
        }"#;
        let tree = parse_refract(json).unwrap();
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].text.as_deref(), Some("id"));
        assert_eq!(tree.children[1].text.as_deref(), Some("1"));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_refract("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::Parse(msg) if msg.starts_with("invalid API Elements JSON")));
    }

    #[test]
    fn rejects_non_element_root() {
        assert!(parse_refract("[1, 2, 3]").is_err());
        assert!(parse_refract(r#"{"content": []}"#).is_err());
    }
}
