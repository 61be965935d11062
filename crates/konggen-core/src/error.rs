//! Error handling for the konggen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Translation failures carry the
//! offending path, method or schema node so callers can report them or skip
//! the entry.
//!
//! # Examples
//!
//! ```
//! use konggen_core::error::{Error, Result};
//!
//! fn might_fail(path: &str) -> Result<()> {
//!     if path.is_empty() {
//!         return Err(Error::schema("empty path"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(might_fail("/pets").is_ok());
//! ```

use thiserror::Error;

/// Result type for konggen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for konggen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML manifest parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The API description could not be loaded or is structurally invalid
    #[error("Schema error: {0}")]
    Schema(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A path template with unbalanced or empty `{...}` placeholders
    #[error("Malformed path '{path}' at byte {offset}: {reason}")]
    MalformedPath {
        path: String,
        offset: usize,
        reason: &'static str,
    },

    /// A schema node that names a model the document does not define
    #[error("Unresolved type '{name}'{}", referenced_in(.referenced_by))]
    UnresolvedType {
        name: String,
        /// The parameter or response that used the type, when known
        referenced_by: Option<String>,
    },

    /// Translation ran without the preprocessing side-table entry for an operation
    #[error("No path annotation for {method} {path}; preprocessing must run before translation")]
    MissingAnnotation { method: String, path: String },

    /// Failure while translating one operation
    #[error("{method} {path}: {source}")]
    Operation {
        method: String,
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Record where an unresolved type was used. Other errors pass through.
    pub fn referenced_by(self, field: impl Into<String>) -> Self {
        match self {
            Self::UnresolvedType {
                name,
                referenced_by: None,
            } => Self::UnresolvedType {
                name,
                referenced_by: Some(field.into()),
            },
            other => other,
        }
    }

    /// Attach the operation a failure belongs to.
    pub fn in_operation(self, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Operation {
            method: method.into(),
            path: path.into(),
            source: Box::new(self),
        }
    }
}

fn referenced_in(field: &Option<String>) -> String {
    field
        .as_deref()
        .map(|f| format!(" in {}", f))
        .unwrap_or_default()
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
