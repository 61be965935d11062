//! konggen Core Library
//!
//! This library turns Swagger 2.0 / OpenAPI 3.x descriptions into bash scripts
//! that register one Kong gateway route per API operation.
//!
//! The translation engine lives in [`translate`]; [`generate()`] drives a full
//! run from a [`Config`].

pub mod builders;
pub mod config;
pub mod error;
pub mod gateway;
pub mod generate;
pub mod layout;
pub mod manifest;
pub mod schema;
pub mod templates;
pub mod translate;
pub mod utils;

pub use crate::{
    config::Config,
    error::{Error, Result},
    gateway::{GatewayConfig, GatewayOverrides},
    generate::{generate, GenerationReport},
    layout::OutputLayout,
    schema::SchemaDocument,
    templates::{TemplateDir, TemplateKind, TemplateManager},
    translate::{OperationTranslator, PathAnnotations, RouteDescriptor},
};
