//! `serverless.yml` as a [`ConfigProvider`].

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use super::{ConfigError, ConfigProvider, OptionOverrides, ValidatorOptions};
use crate::model::DeclaredEndpoint;

#[derive(Debug, Deserialize)]
struct FunctionDef {
    #[serde(default)]
    events: Vec<EventDef>,
}

/// Only `http` events matter; other event sources are ignored.
#[derive(Debug, Deserialize)]
struct EventDef {
    #[serde(default)]
    http: Option<HttpEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HttpEvent {
    /// `http: GET users/{id}`
    Shorthand(String),
    Detailed { method: String, path: String },
}

/// Deployment configuration read from a `serverless.yml` file
#[derive(Debug, Clone)]
pub struct ServerlessConfig {
    options: ValidatorOptions,
    endpoints: Option<Vec<DeclaredEndpoint>>,
}

impl ServerlessConfig {
    /// Read and interpret the file at `path`.
    ///
    /// A relative `blueprintFile` coming from the file (or the default) is
    /// resolved against the file's directory; an explicit override is kept
    /// as given.
    pub fn load(path: &Path, overrides: &OptionOverrides) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "reading deployment configuration");
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_value(&root, overrides)?;
        if overrides.blueprint_file.is_none() && config.options.blueprint_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.options.blueprint_file = dir.join(&config.options.blueprint_file);
            }
        }
        Ok(config)
    }

    /// Interpret an already parsed configuration document.
    pub fn from_value(root: &Value, overrides: &OptionOverrides) -> Result<Self, ConfigError> {
        let custom = root
            .get("custom")
            .and_then(|custom| custom.get("apibValidator"))
            .filter(|section| section.is_mapping());
        let options = ValidatorOptions::load(custom, overrides)?;

        let endpoints = match root.get("functions") {
            Some(Value::Mapping(functions)) => Some(declared_endpoints(functions)?),
            _ => None,
        };
        if let Some(endpoints) = &endpoints {
            tracing::debug!(count = endpoints.len(), "declared http endpoints");
        }

        Ok(Self { options, endpoints })
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }
}

impl ConfigProvider for ServerlessConfig {
    fn declared_endpoints(&self) -> Option<&[DeclaredEndpoint]> {
        self.endpoints.as_deref()
    }

    fn document_path(&self) -> &Path {
        &self.options.blueprint_file
    }

    fn base_path(&self) -> &str {
        &self.options.base_path
    }
}

/// Flatten the `functions` mapping into HTTP triggers, keeping the order
/// in which functions and their events are listed.
fn declared_endpoints(functions: &serde_yaml::Mapping) -> Result<Vec<DeclaredEndpoint>, ConfigError> {
    let mut endpoints = Vec::new();

    for (name, definition) in functions {
        let name = match name {
            Value::String(name) => name.clone(),
            other => serde_yaml::to_string(other)
                .unwrap_or_default()
                .trim()
                .to_string(),
        };
        if definition.is_null() {
            continue;
        }

        let function: FunctionDef =
            serde_yaml::from_value(definition.clone()).map_err(|e| ConfigError::InvalidEvent {
                function: name.clone(),
                reason: e.to_string(),
            })?;

        for http in function.events.into_iter().filter_map(|event| event.http) {
            let (method, path) = match http {
                HttpEvent::Detailed { method, path } => (method, path),
                HttpEvent::Shorthand(text) => parse_shorthand(&text).ok_or_else(|| {
                    ConfigError::InvalidEvent {
                        function: name.clone(),
                        reason: format!("expected '<METHOD> <path>', got '{text}'"),
                    }
                })?,
            };
            endpoints.push(DeclaredEndpoint {
                function_name: name.clone(),
                http_method: method,
                http_path: path,
            });
        }
    }

    Ok(endpoints)
}

fn parse_shorthand(text: &str) -> Option<(String, String)> {
    let mut parts = text.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((method.to_string(), path.to_string()))
}
