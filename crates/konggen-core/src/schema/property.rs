//! Schema type nodes.
//!
//! Every schema that describes a parameter, a response body or a model property
//! is reduced to a [`PropertyNode`]. Primitive nodes keep the swagger type
//! vocabulary (`long`, `DateTime`, `UUID`, ...) so the type naming convention
//! can map them without looking at formats again.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::Error;

/// A schema type node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyNode {
    /// A scalar or free-form type, named by its swagger type
    Primitive(String),
    /// An array with the given element type
    Array(Box<PropertyNode>),
    /// A string-keyed map with the given value type
    Map(Box<PropertyNode>),
    /// A reference to a model in the document's model dictionary
    NamedModel(String),
}

impl PropertyNode {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    pub fn array(element: PropertyNode) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn map(value: PropertyNode) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn model(name: impl Into<String>) -> Self {
        Self::NamedModel(name.into())
    }

    /// Parse a JSON schema object.
    ///
    /// `location` is only used in error messages (e.g. `paths./pets.get.parameters[limit]`).
    pub fn from_schema(schema: &JsonValue, location: &str) -> crate::Result<Self> {
        let obj = schema
            .as_object()
            .ok_or_else(|| Error::schema(format!("schema at {} is not an object", location)))?;

        if let Some(reference) = obj.get("$ref").and_then(JsonValue::as_str) {
            return Ok(Self::model(ref_name(reference)));
        }

        let format = obj.get("format").and_then(JsonValue::as_str);
        match schema_type(obj) {
            Some("array") => {
                let items = obj.get("items").ok_or_else(|| {
                    Error::schema(format!("array schema at {} has no 'items'", location))
                })?;
                let element = Self::from_schema(items, &format!("{}.items", location))?;
                Ok(Self::array(element))
            }
            Some("object") | None => Self::from_object(obj, location),
            Some(other) => primitive_name(other, format)
                .map(Self::primitive)
                .ok_or_else(|| {
                    Error::schema(format!(
                        "unresolved schema type '{}' at {}",
                        other, location
                    ))
                }),
        }
    }

    /// Untyped schemas and `type: object` schemas: maps when they only carry
    /// `additionalProperties`, otherwise an opaque object.
    fn from_object(obj: &JsonMap<String, JsonValue>, location: &str) -> crate::Result<Self> {
        if obj.contains_key("properties") {
            return Ok(Self::primitive("object"));
        }
        match obj.get("additionalProperties") {
            Some(value @ JsonValue::Object(_)) => {
                let inner =
                    Self::from_schema(value, &format!("{}.additionalProperties", location))?;
                Ok(Self::map(inner))
            }
            Some(JsonValue::Bool(true)) => Ok(Self::map(Self::primitive("object"))),
            _ if obj.contains_key("items") && schema_type(obj).is_none() => {
                let items = &obj["items"];
                let element = Self::from_schema(items, &format!("{}.items", location))?;
                Ok(Self::array(element))
            }
            _ => Ok(Self::primitive("object")),
        }
    }
}

/// The declared `type`, taking the first non-null entry of an OpenAPI 3.1 type list
fn schema_type(obj: &JsonMap<String, JsonValue>) -> Option<&str> {
    match obj.get("type")? {
        JsonValue::String(s) => Some(s.as_str()),
        JsonValue::Array(types) => types
            .iter()
            .filter_map(JsonValue::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn primitive_name(kind: &str, format: Option<&str>) -> Option<&'static str> {
    let name = match (kind, format) {
        ("string", Some("date")) => "date",
        ("string", Some("date-time")) => "DateTime",
        ("string", Some("uuid")) => "UUID",
        ("string", Some("byte")) => "ByteArray",
        ("string", Some("binary")) => "binary",
        ("string", _) => "string",
        ("integer", Some("int64")) => "long",
        ("integer", _) => "integer",
        ("number", Some("float")) => "float",
        ("number", Some("double")) => "double",
        ("number", _) => "number",
        ("boolean", _) => "boolean",
        ("file", _) => "file",
        _ => return None,
    };
    Some(name)
}

/// Model name of a `$ref` (`#/definitions/Pet` -> `Pet`)
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
