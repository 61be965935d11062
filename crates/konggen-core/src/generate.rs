//! Code generation functionality for konggen
//!
//! One run loads the API description, records the dollar-escaped path of every
//! operation, translates each operation into a route descriptor, groups the
//! routes into API files and renders them through the selected templates.

// Internal imports (std, crate)
use std::path::PathBuf;
use std::str::FromStr;

use crate::{
    builders::RouteContext,
    config::Config,
    error::{Error, Result},
    gateway::GENERATOR_NAME,
    schema::{HttpMethod, SchemaDocument},
    templates::{TemplateKind, TemplateManager},
    translate::{escape_text, KongTypeNaming, OperationTranslator, PathAnnotations, RouteDescriptor, TypeResolver},
    utils::collapse_whitespace,
};

// External imports (alphabetized)
use serde_json::{Map, Value as JsonValue};

/// Version string published to templates as `api_version`
pub const API_VERSION: &str = "1.0.0";

/// An operation left out because it failed to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOperation {
    pub method: HttpMethod,
    pub path: String,
    pub reason: String,
}

/// Routes produced from a document
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub routes: Vec<RouteDescriptor>,
    pub skipped: Vec<SkippedOperation>,
    /// Operations dropped by the include/exclude filters
    pub filtered: usize,
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Written files, in write order
    pub files: Vec<PathBuf>,
    pub routes: usize,
    pub skipped: Vec<SkippedOperation>,
    pub filtered: usize,
}

/// Main entry point for code generation
pub async fn generate(config: &Config) -> Result<GenerationReport> {
    // 1. Load the API description
    let document = SchemaDocument::from_file_or_url(&config.schema_path).await?;

    // 2. Initialize template manager with template_dir from config if available
    let template_kind = TemplateKind::from_str(&config.template_kind).map_err(Error::config)?;
    let template_dir = config.template_dir.as_ref().map(PathBuf::from);
    let template_manager = TemplateManager::new(template_kind, template_dir).await?;

    // 3. Translate, render and write
    generate_with(&document, config, &template_manager).await
}

/// Generate from an already loaded document and template manager
pub async fn generate_with(
    document: &SchemaDocument,
    config: &Config,
    template_manager: &TemplateManager,
) -> Result<GenerationReport> {
    let translation = translate_document(document, config)?;
    let routes = translation.routes.len();
    log::info!(
        "Translated {} of {} operations ({} skipped, {} filtered)",
        routes,
        document.operation_count(),
        translation.skipped.len(),
        translation.filtered
    );

    let groups = RouteContext::group_by_api(translation.routes);
    let layout = config.layout();
    let context = base_context(document, config);

    let files = template_manager.generate(&context, &groups, &layout).await?;
    template_manager
        .execute_post_generation_hooks(layout.output_dir())
        .await?;

    Ok(GenerationReport {
        files,
        routes,
        skipped: translation.skipped,
        filtered: translation.filtered,
    })
}

/// Translate every operation of `document`.
///
/// The dollar-path side-table is built over the whole document before the
/// first operation is translated. A failing operation aborts the run unless
/// `config.skip_invalid` is set, in which case it is logged and left out.
pub fn translate_document(document: &SchemaDocument, config: &Config) -> Result<Translation> {
    let escaper = config.escaper()?;
    let annotations = PathAnnotations::collect(document);
    let translator = OperationTranslator::new(
        &escaper,
        TypeResolver::new(KongTypeNaming, &document.models),
    );

    let mut translation = Translation::default();
    for (path, item) in &document.paths {
        for (method, operation) in &item.operations {
            match translator.translate(path, *method, operation, &annotations) {
                Ok(route) if config.includes_operation(&route.operation_id) => {
                    translation.routes.push(route);
                }
                Ok(route) => {
                    log::debug!("Filtered out operation {}", route.operation_id);
                    translation.filtered += 1;
                }
                Err(e) if config.skip_invalid => {
                    log::warn!("Skipping operation: {}", e);
                    translation.skipped.push(SkippedOperation {
                        method: *method,
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(translation)
}

/// Values every template sees
pub fn base_context(document: &SchemaDocument, config: &Config) -> Map<String, JsonValue> {
    let gateway = config.gateway_config();
    let mut context = Map::new();

    context.insert(
        "app_name".to_string(),
        JsonValue::from(
            document
                .title
                .as_deref()
                .map(|t| escape_text(&collapse_whitespace(t)))
                .unwrap_or_else(|| gateway.target_service_name.clone()),
        ),
    );
    context.insert(
        "app_version".to_string(),
        JsonValue::from(document.version.clone().unwrap_or_else(|| API_VERSION.to_string())),
    );
    context.insert(
        "app_description".to_string(),
        JsonValue::from(
            document
                .description
                .as_deref()
                .map(|d| escape_text(&collapse_whitespace(d)))
                .unwrap_or_default(),
        ),
    );
    context.insert("api_version".to_string(), JsonValue::from(API_VERSION));
    context.insert("generator_name".to_string(), JsonValue::from(GENERATOR_NAME));
    gateway.publish(&mut context);

    for (key, value) in &config.additional_properties {
        context
            .entry(key.clone())
            .or_insert_with(|| JsonValue::from(value.clone()));
    }
    context
}
