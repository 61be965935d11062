//! API description loading and the in-memory document model.
//!
//! This module loads Swagger 2.0 and OpenAPI 3.x descriptions (JSON or YAML,
//! from a file or an `http(s)://` URL) and reduces them to a [`SchemaDocument`]:
//! paths, operations, parameters, responses and the model dictionary. The
//! document is read-only once built; derived data produced during generation
//! lives in side-tables such as [`crate::translate::PathAnnotations`].
//!
//! # Examples
//!
//! ```no_run
//! use konggen_core::schema::SchemaDocument;
//! use konggen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let doc = SchemaDocument::from_file_or_url("petstore.json").await?;
//! for (path, item) in &doc.paths {
//!     for method in item.operations.keys() {
//!         println!("{} {}", method, path);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod property;

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::Error;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::fs;

pub use property::PropertyNode;

/// HTTP methods an operation can be declared under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Upper-case method name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    /// Returns an iterator over all methods in declaration order
    pub fn all() -> impl Iterator<Item = Self> {
        use HttpMethod::*;
        [Get, Put, Post, Delete, Options, Head, Patch, Trace]
            .iter()
            .copied()
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown HTTP method: {}", s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried in the request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    FormData,
    Body,
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            "formData" => Ok(Self::FormData),
            "body" => Ok(Self::Body),
            other => Err(format!("Unknown parameter location: {}", other)),
        }
    }
}

/// The full API description
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    /// `info.title`
    pub title: Option<String>,
    /// `info.version`
    pub version: Option<String>,
    /// `info.description`
    pub description: Option<String>,
    /// Path items keyed by their raw path string
    pub paths: BTreeMap<String, PathItem>,
    /// Model definitions (`definitions` or `components.schemas`)
    pub models: BTreeMap<String, ModelDefinition>,
}

/// The operations declared under one path
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    /// Raw path, e.g. `/users/{id}/orders/{orderId}`
    pub path: String,
    pub operations: BTreeMap<HttpMethod, OperationSpec>,
}

/// One HTTP operation
#[derive(Debug, Clone, Default)]
pub struct OperationSpec {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    /// Path-level parameters merged with the operation's own
    pub parameters: Vec<ParameterSpec>,
    /// Responses keyed by status code (or `default`)
    pub responses: BTreeMap<String, ResponseSpec>,
    /// Vendor extensions (keys starting with `x-`)
    pub vendor_extensions: BTreeMap<String, JsonValue>,
}

/// One operation parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    pub node: PropertyNode,
}

/// One declared response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseSpec {
    pub description: Option<String>,
    pub node: Option<PropertyNode>,
}

/// A named model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelDefinition {
    pub name: String,
    pub description: Option<String>,
}

impl SchemaDocument {
    /// Load from a file path or an `http(s)://` URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();
        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }
        Self::from_file(location).await
    }

    /// Load from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let json = parse_content(&content).map_err(|e| {
            Error::schema(format!("Failed to parse API description at {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded API description from {}", path.display());
        Self::from_json(&json)
    }

    /// Load from a URL (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            Error::schema(format!("Failed to fetch API description from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::schema(format!(
                "Failed to fetch API description from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::schema(format!("Failed to read response from {}: {}", url, e))
        })?;
        let json = parse_content(&content).map_err(|e| {
            Error::schema(format!("Failed to parse API description from {}: {}", url, e))
        })?;
        log::debug!("Loaded API description from {}", url);
        Self::from_json(&json)
    }

    /// Build the document model from an already parsed description
    pub fn from_json(root: &JsonValue) -> crate::Result<Self> {
        let info = root.get("info");
        let text = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(JsonValue::as_str)
                .map(String::from)
        };

        let paths_json = root
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::schema("Missing 'paths' object"))?;

        let mut paths = BTreeMap::new();
        for (path, item) in paths_json {
            if path.is_empty() {
                return Err(Error::schema("Empty path key in 'paths'"));
            }
            paths.insert(path.clone(), parse_path_item(root, path, item)?);
        }

        Ok(Self {
            title: text("title"),
            version: text("version"),
            description: text("description"),
            paths,
            models: parse_models(root),
        })
    }

    /// Number of operations across all paths
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|p| p.operations.len()).sum()
    }
}

/// Parse content as either JSON or YAML
fn parse_content(content: &str) -> Result<JsonValue, String> {
    if let Ok(json) = serde_json::from_str(content) {
        return Ok(json);
    }
    if let Ok(json) = serde_yaml::from_str(content) {
        return Ok(json);
    }
    Err("content is neither valid JSON nor YAML".to_string())
}

fn parse_models(root: &JsonValue) -> BTreeMap<String, ModelDefinition> {
    let schemas = root
        .get("definitions")
        .or_else(|| root.get("components").and_then(|c| c.get("schemas")))
        .and_then(JsonValue::as_object);

    schemas
        .map(|defs| {
            defs.iter()
                .map(|(name, def)| {
                    let model = ModelDefinition {
                        name: name.clone(),
                        description: def
                            .get("description")
                            .and_then(JsonValue::as_str)
                            .map(String::from),
                    };
                    (name.clone(), model)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_path_item(root: &JsonValue, path: &str, item: &JsonValue) -> crate::Result<PathItem> {
    let shared = item
        .get("parameters")
        .map(|params| parse_parameters(root, params, &format!("paths.{}", path)))
        .transpose()?
        .unwrap_or_default();

    let mut operations = BTreeMap::new();
    if let Some(obj) = item.as_object() {
        for (key, value) in obj {
            let Ok(method) = key.parse::<HttpMethod>() else {
                continue;
            };
            let Some(op) = value.as_object() else {
                continue;
            };
            let location = format!("paths.{}.{}", path, key);
            operations.insert(method, parse_operation(root, op, &shared, &location)?);
        }
    }

    Ok(PathItem {
        path: path.to_string(),
        operations,
    })
}

fn parse_operation(
    root: &JsonValue,
    op: &JsonMap<String, JsonValue>,
    shared: &[ParameterSpec],
    location: &str,
) -> crate::Result<OperationSpec> {
    let str_field = |key: &str| op.get(key).and_then(JsonValue::as_str).map(String::from);

    let own = op
        .get("parameters")
        .map(|params| parse_parameters(root, params, location))
        .transpose()?
        .unwrap_or_default();

    // Operation-level parameters override path-level ones with the same name and location
    let mut parameters: Vec<ParameterSpec> = shared
        .iter()
        .filter(|s| {
            !own.iter()
                .any(|o| o.name == s.name && o.location == s.location)
        })
        .cloned()
        .collect();
    parameters.extend(own);

    if let Some(body) = op.get("requestBody") {
        if let Some(param) = parse_request_body(root, body, location)? {
            parameters.push(param);
        }
    }

    let mut responses = BTreeMap::new();
    if let Some(map) = op.get("responses").and_then(JsonValue::as_object) {
        for (code, response) in map {
            let response = resolve_ref(root, response);
            let node = response_schema(response)
                .map(|schema| {
                    PropertyNode::from_schema(schema, &format!("{}.responses.{}", location, code))
                })
                .transpose()?;
            responses.insert(
                code.clone(),
                ResponseSpec {
                    description: response
                        .get("description")
                        .and_then(JsonValue::as_str)
                        .map(String::from),
                    node,
                },
            );
        }
    }

    Ok(OperationSpec {
        operation_id: str_field("operationId"),
        summary: str_field("summary"),
        description: str_field("description"),
        tags: op
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        deprecated: op
            .get("deprecated")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        parameters,
        responses,
        vendor_extensions: op
            .iter()
            .filter(|(k, _)| k.starts_with("x-"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}

fn parse_parameters(
    root: &JsonValue,
    params: &JsonValue,
    location: &str,
) -> crate::Result<Vec<ParameterSpec>> {
    let Some(arr) = params.as_array() else {
        return Err(Error::schema(format!("'parameters' at {} is not a list", location)));
    };

    let mut result = Vec::with_capacity(arr.len());
    for param in arr {
        let param = resolve_ref(root, param);
        let name = param
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::schema(format!("parameter without a name at {}", location)))?;
        let param_location = format!("{}.parameters[{}]", location, name);
        let kind: ParameterLocation = param
            .get("in")
            .and_then(JsonValue::as_str)
            .unwrap_or("query")
            .parse()
            .map_err(|e| Error::schema(format!("{} at {}", e, param_location)))?;

        // Swagger 2.0 non-body parameters carry their type inline
        let node = match param.get("schema").or_else(|| {
            param
                .get("content")
                .and_then(JsonValue::as_object)
                .and_then(|c| c.values().next())
                .and_then(|media| media.get("schema"))
        }) {
            Some(schema) => PropertyNode::from_schema(schema, &param_location)?,
            None if param.get("type").is_some() => {
                PropertyNode::from_schema(param, &param_location)?
            }
            None => PropertyNode::primitive("string"),
        };

        result.push(ParameterSpec {
            name: name.to_string(),
            location: kind,
            required: kind == ParameterLocation::Path
                || param
                    .get("required")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(false),
            description: param
                .get("description")
                .and_then(JsonValue::as_str)
                .map(String::from),
            node,
        });
    }
    Ok(result)
}

/// OpenAPI 3 request bodies become a `body` parameter
fn parse_request_body(
    root: &JsonValue,
    body: &JsonValue,
    location: &str,
) -> crate::Result<Option<ParameterSpec>> {
    let body = resolve_ref(root, body);
    let Some(schema) = media_schema(body) else {
        return Ok(None);
    };
    let node = PropertyNode::from_schema(schema, &format!("{}.requestBody", location))?;
    Ok(Some(ParameterSpec {
        name: "body".to_string(),
        location: ParameterLocation::Body,
        required: body
            .get("required")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        description: body
            .get("description")
            .and_then(JsonValue::as_str)
            .map(String::from),
        node,
    }))
}

/// Swagger 2.0 puts the schema on the response, OpenAPI 3 under `content`
fn response_schema(response: &JsonValue) -> Option<&JsonValue> {
    response.get("schema").or_else(|| media_schema(response))
}

/// Schema of the JSON media type, or of the first media type declared
fn media_schema(holder: &JsonValue) -> Option<&JsonValue> {
    let content = holder.get("content").and_then(JsonValue::as_object)?;
    content
        .get("application/json")
        .or_else(|| content.values().next())
        .and_then(|media| media.get("schema"))
}

/// Follow a local `$ref` (`#/parameters/x`, `#/components/responses/y`, ...)
fn resolve_ref<'a>(root: &'a JsonValue, value: &'a JsonValue) -> &'a JsonValue {
    match value.get("$ref").and_then(JsonValue::as_str) {
        Some(reference) if reference.starts_with("#/") => {
            root.pointer(&reference[1..]).unwrap_or(value)
        }
        _ => value,
    }
}
