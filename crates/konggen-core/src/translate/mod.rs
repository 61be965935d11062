//! Translation of API description elements into gateway script terms.
//!
//! - [`escape`]: free-text and reserved-word escaping
//! - [`types`]: textual type declarations for schema nodes
//! - [`path`]: `{param}` placeholders to Kong `uri_captures` references
//! - [`operation`]: per-operation route descriptors built from the above

pub mod escape;
pub mod operation;
pub mod path;
pub mod types;

pub use escape::{escape_comment_delimiters, escape_quote, escape_text, IdentifierEscaper};
pub use operation::{
    OperationTranslator, ParameterDescriptor, PathAnnotations, RouteDescriptor, X_PATH,
};
pub use path::{
    capture_name, capture_reference, check_shell_safe, dollar_escape, rewrite, PathSegment,
    PathTemplate,
};
pub use types::{KongTypeNaming, TypeNaming, TypeResolver};
