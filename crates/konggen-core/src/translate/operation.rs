//! Per-operation translation into route descriptors.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::escape::{escape_text, IdentifierEscaper};
use super::path::{check_shell_safe, dollar_escape, PathTemplate};
use super::types::{TypeNaming, TypeResolver};
use crate::schema::{HttpMethod, OperationSpec, ParameterLocation, ResponseSpec, SchemaDocument};
use crate::utils::{camelize, collapse_whitespace, lower_camelize};
use crate::Error;

/// Vendor extension under which the dollar-escaped path is exposed to templates
pub const X_PATH: &str = "x-path";

/// Dollar-escaped paths for every (path, method) of a document.
///
/// Built once by [`PathAnnotations::collect`] before any translation and only
/// read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAnnotations {
    entries: HashMap<(String, HttpMethod), String>,
}

impl PathAnnotations {
    /// Visit every path and operation of `doc` and record its `${`-escaped path
    pub fn collect(doc: &SchemaDocument) -> Self {
        let mut entries = HashMap::new();
        for (path, item) in &doc.paths {
            let escaped = dollar_escape(path);
            for method in item.operations.keys() {
                entries.insert((path.clone(), *method), escaped.clone());
            }
        }
        log::debug!("Annotated {} operations with dollar paths", entries.len());
        Self { entries }
    }

    pub fn get(&self, path: &str, method: HttpMethod) -> Option<&str> {
        self.entries
            .get(&(path.to_string(), method))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Template-ready view of one operation parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    /// Name as declared in the API description
    pub base_name: String,
    /// Escaped variable name
    pub param_name: String,
    pub location: ParameterLocation,
    pub data_type: String,
    pub required: bool,
    pub description: Option<String>,
}

/// Template-ready view of one (path, method) operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDescriptor {
    pub operation_id: String,
    pub method: HttpMethod,
    /// Path as declared, e.g. `/pet/{petId}`
    pub raw_path: String,
    /// Path with `uri_captures` references, e.g. `/pet/$(uri_captures.{petId})`
    pub path: String,
    /// Like `path`, but naming the capture groups of `route_pattern`
    pub replace_uri: String,
    /// Kong route path (prefix or `~` regex)
    pub route_pattern: String,
    /// Path with `${` placeholders, from the preprocessing pass
    pub dollar_path: String,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<String>,
    pub vendor_extensions: BTreeMap<String, JsonValue>,
}

impl RouteDescriptor {
    /// Parameters carried in the path, in declaration order
    pub fn path_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
    }
}

/// Turns operations into [`RouteDescriptor`]s
pub struct OperationTranslator<'a, N: TypeNaming> {
    escaper: &'a IdentifierEscaper,
    types: TypeResolver<'a, N>,
}

impl<'a, N: TypeNaming> OperationTranslator<'a, N> {
    pub fn new(escaper: &'a IdentifierEscaper, types: TypeResolver<'a, N>) -> Self {
        Self { escaper, types }
    }

    /// Translate one operation. Failures are tagged with the method and path.
    pub fn translate(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &OperationSpec,
        annotations: &PathAnnotations,
    ) -> crate::Result<RouteDescriptor> {
        self.translate_inner(path, method, operation, annotations)
            .map_err(|e| e.in_operation(method.as_str(), path))
    }

    fn translate_inner(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &OperationSpec,
        annotations: &PathAnnotations,
    ) -> crate::Result<RouteDescriptor> {
        // Capture rewriting comes before anything else looks at the path.
        // `rewrite` goes through the same tokenizer.
        check_shell_safe(path)?;
        let template = PathTemplate::parse(path)?;
        let captured = template.capture_path();

        let dollar_path = annotations
            .get(path, method)
            .ok_or_else(|| Error::MissingAnnotation {
                method: method.to_string(),
                path: path.to_string(),
            })?
            .to_string();

        let declared: Vec<&str> = template.parameter_names();
        for name in &declared {
            let documented = operation
                .parameters
                .iter()
                .any(|p| p.location == ParameterLocation::Path && p.name == *name);
            if !documented {
                log::warn!(
                    "{} {}: placeholder '{{{}}}' has no path parameter definition",
                    method,
                    path,
                    name
                );
            }
        }

        let mut parameters = Vec::with_capacity(operation.parameters.len());
        for param in &operation.parameters {
            let data_type = self
                .types
                .resolve(&param.node)
                .map_err(|e| e.referenced_by(format!("parameter '{}'", param.name)))?;
            parameters.push(ParameterDescriptor {
                base_name: param.name.clone(),
                param_name: self.escaper.to_param_name(&param.name),
                location: param.location,
                data_type,
                required: param.required,
                description: param.description.as_deref().map(clean_text),
            });
        }

        let return_type = success_response(&operation.responses)
            .and_then(|(_, r)| r.node.as_ref())
            .map(|node| self.types.resolve(node))
            .transpose()
            .map_err(|e| e.referenced_by("response"))?;

        let operation_id = match &operation.operation_id {
            Some(id) if !id.trim().is_empty() => self.escaper.to_operation_id(id),
            _ => self
                .escaper
                .to_operation_id(&fallback_operation_id(path, method)),
        };

        let mut vendor_extensions = operation.vendor_extensions.clone();
        vendor_extensions.insert(X_PATH.to_string(), JsonValue::String(dollar_path.clone()));

        Ok(RouteDescriptor {
            operation_id,
            method,
            raw_path: path.to_string(),
            path: captured,
            replace_uri: template.replace_uri(),
            route_pattern: template.route_pattern(),
            dollar_path,
            summary: operation.summary.as_deref().map(clean_text),
            notes: operation.description.as_deref().map(clean_text),
            tags: operation.tags.iter().map(|t| escape_text(t)).collect(),
            deprecated: operation.deprecated,
            parameters,
            return_type,
            vendor_extensions,
        })
    }
}

/// Single-line, quote-free, comment-safe text
fn clean_text(text: &str) -> String {
    escape_text(&collapse_whitespace(text))
}

/// Lowest 2xx response with a schema, falling back to `default`
fn success_response(
    responses: &BTreeMap<String, ResponseSpec>,
) -> Option<(&String, &ResponseSpec)> {
    // status codes are three digits, so key order is numeric order
    responses
        .iter()
        .find(|(code, r)| code.starts_with('2') && r.node.is_some())
        .or_else(|| responses.get_key_value("default"))
}

/// Operation id for operations that do not declare one (`/pet/{petId}` GET -> `petPetIdGet`)
pub fn fallback_operation_id(path: &str, method: HttpMethod) -> String {
    let joined = path.replace(['{', '}'], "").replace('/', "_");
    let base = lower_camelize(&joined);
    let suffix = camelize(&method.as_str().to_lowercase());
    if base.is_empty() {
        format!("root{}", suffix)
    } else {
        format!("{}{}", base, suffix)
    }
}
