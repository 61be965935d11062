//! Template loading, rendering and output writing

// Internal imports (std, crate)
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    builders::{ApiGroup, RouteContext},
    error::{Error, Result},
    layout::OutputLayout,
    manifest::{ForEach, TemplateFile, TemplateManifest},
};

use super::{embedded_template, TemplateDir, TemplateKind};

// External imports (alphabetized)
use serde_json::{Map, Value as JsonValue};
use tera::{Context, Tera};

/// Where the templates of a manager were loaded from
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Directory(TemplateDir),
    Embedded(TemplateKind),
}

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    source: TemplateSource,
    /// The template manifest
    manifest: TemplateManifest,
}

impl TemplateManager {
    /// Create a new TemplateManager for the given template kind.
    ///
    /// With an explicit `template_dir` the templates are read from there.
    /// Otherwise the standard locations are searched, and kinds with a
    /// built-in copy fall back to it.
    pub async fn new(template_kind: TemplateKind, template_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = template_dir {
            let dir = TemplateDir::discover(template_kind, Some(dir.as_path()))?;
            return Self::from_dir(dir).await;
        }

        match TemplateDir::discover(template_kind, None) {
            Ok(dir) => Self::from_dir(dir).await,
            Err(e) if template_kind.is_embedded() => {
                log::debug!("{}; using built-in '{}' template", e, template_kind);
                Self::embedded(template_kind)
            }
            Err(e) => Err(Error::template(format!(
                "{} (pass --template-dir for '{}' templates)",
                e, template_kind
            ))),
        }
    }

    /// Load every `*.tera` file and the manifest of a template directory
    pub async fn from_dir(template_dir: TemplateDir) -> Result<Self> {
        let template_path = template_dir.template_path();
        let template_dir_str = template_path.to_str().ok_or_else(|| {
            Error::template(format!(
                "Template path contains invalid UTF-8: {}",
                template_path.display()
            ))
        })?;

        let manifest = TemplateManifest::load_from_dir(template_path).await?;

        let tera = Tera::new(&format!("{}/**/*.tera", template_dir_str)).map_err(|e| {
            Error::template(format!("Failed to parse templates: {}", error_chain(&e)))
        })?;
        log::debug!(
            "Loaded {} templates from {}",
            tera.get_template_names().count(),
            template_dir.display()
        );

        Ok(Self {
            tera: Arc::new(tera),
            source: TemplateSource::Directory(template_dir),
            manifest,
        })
    }

    /// Use the copy of a template compiled into the binary
    pub fn embedded(template_kind: TemplateKind) -> Result<Self> {
        let template = embedded_template(template_kind).ok_or_else(|| {
            Error::template(format!("No built-in '{}' template", template_kind))
        })?;

        let mut tera = Tera::default();
        tera.add_raw_templates(template.sources.iter().copied())
            .map_err(|e| {
                Error::template(format!("Failed to parse templates: {}", error_chain(&e)))
            })?;

        Ok(Self {
            tera: Arc::new(tera),
            source: TemplateSource::Embedded(template_kind),
            manifest: TemplateManifest::from_yaml_str(template.manifest)?,
        })
    }

    /// Get the template kind this template manager is configured for
    pub fn template_kind(&self) -> TemplateKind {
        match &self.source {
            TemplateSource::Directory(dir) => dir.kind(),
            TemplateSource::Embedded(kind) => *kind,
        }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Get the template directory, if templates were read from disk
    pub fn template_dir(&self) -> Option<&TemplateDir> {
        match &self.source {
            TemplateSource::Directory(dir) => Some(dir),
            TemplateSource::Embedded(_) => None,
        }
    }

    /// Get a reference to the template manifest
    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// List all manifest entries whose source template is loaded
    pub fn list_templates(&self) -> Vec<(String, String)> {
        self.manifest
            .files
            .iter()
            .filter(|f| self.has_template(&f.source))
            .map(|f| (f.source.clone(), f.destination.clone()))
            .collect()
    }

    /// Render one template with a JSON object context
    pub fn render(&self, template_name: &str, context: &JsonValue) -> Result<String> {
        if !context.is_object() {
            return Err(Error::template("Context must be a JSON object"));
        }
        let tera_context = Context::from_value(context.clone())?;

        self.tera.render(template_name, &tera_context).map_err(|e| {
            log::error!("Template rendering failed for '{}': {}", template_name, e);
            Error::template(format!(
                "Failed to render template '{}': {}",
                template_name,
                error_chain(&e)
            ))
        })
    }

    /// Render every manifest entry and write the results.
    ///
    /// `for_each: api` entries are rendered once per group and
    /// `for_each: operation` entries once per route; both land in the API
    /// folder of `layout`. Other entries are rendered once into the output
    /// root. Returns the written paths in order.
    pub async fn generate(
        &self,
        base_context: &Map<String, JsonValue>,
        groups: &[ApiGroup],
        layout: &OutputLayout,
    ) -> Result<Vec<PathBuf>> {
        let output_dir = layout.output_dir();
        tokio::fs::create_dir_all(output_dir).await?;
        let api_folder = layout.api_file_folder();
        let kind = self.template_kind();

        let mut written = Vec::new();
        for file in &self.manifest.files {
            log::debug!("Processing file: {} -> {}", file.source, file.destination);
            match file.for_each {
                Some(ForEach::Api) => {
                    for group in groups {
                        let mut context = self.create_file_context(base_context, file);
                        merge_object(&mut context, RouteContext::api_context(kind, group)?);

                        let destination = file.destination_for(Some(&group.api_name), None);
                        let path = api_folder.join(destination);
                        self.write_file(&file.source, &context, &path).await?;
                        written.push(path);
                    }
                }
                Some(ForEach::Operation) => {
                    let builder = RouteContext::get_builder(kind);
                    for group in groups {
                        for route in &group.routes {
                            let mut context = self.create_file_context(base_context, file);
                            context.insert("api_name".to_string(), group.api_name.clone().into());
                            context.insert("api_tag".to_string(), group.tag.clone().into());
                            let route_context = builder.build(route)?;
                            context.insert("operation".to_string(), route_context.clone());
                            merge_object(&mut context, route_context);

                            let destination = file.destination_for(
                                Some(&group.api_name),
                                Some(&route.operation_id),
                            );
                            let path = api_folder.join(destination);
                            self.write_file(&file.source, &context, &path).await?;
                            written.push(path);
                        }
                    }
                }
                None => {
                    let mut context = self.create_file_context(base_context, file);
                    let apis = groups
                        .iter()
                        .map(|g| RouteContext::api_context(kind, g))
                        .collect::<Result<Vec<_>>>()?;
                    context.insert("apis".to_string(), JsonValue::Array(apis));

                    let path = output_dir.join(file.destination_for(None, None));
                    self.write_file(&file.source, &context, &path).await?;
                    written.push(path);
                }
            }
        }

        Ok(written)
    }

    async fn write_file(
        &self,
        template_name: &str,
        context: &Map<String, JsonValue>,
        output_path: &Path,
    ) -> Result<()> {
        let content = self.render(template_name, &JsonValue::Object(context.clone()))?;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, &content).await?;
        log::debug!(
            "Wrote {} ({} bytes) from {}",
            output_path.display(),
            content.len(),
            template_name
        );
        Ok(())
    }

    /// Merge base context with file context, giving precedence to file context keys
    pub fn create_file_context(
        &self,
        base_context: &Map<String, JsonValue>,
        file: &TemplateFile,
    ) -> Map<String, JsonValue> {
        let mut context = match &file.context {
            JsonValue::Object(file_ctx) => file_ctx.clone(),
            _ => Map::new(),
        };
        for (k, v) in base_context {
            if !context.contains_key(k) {
                context.insert(k.clone(), v.clone());
            }
        }
        context
    }

    /// Execute post-generation hooks from the manifest
    pub async fn execute_post_generation_hooks(&self, output_path: &Path) -> Result<()> {
        use tokio::process::Command as AsyncCommand;

        for command in &self.manifest.hooks.post_generate {
            log::info!("Running post-generation hook: {}", command);
            let output = AsyncCommand::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(output_path)
                .output()
                .await
                .map_err(|e| {
                    Error::template(format!(
                        "Failed to execute post-generation hook '{}': {}",
                        command, e
                    ))
                })?;

            if !output.status.success() {
                return Err(Error::template(format!(
                    "Post-generation hook '{}' failed with status {}\n{}{}",
                    command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr),
                    String::from_utf8_lossy(&output.stdout)
                )));
            }
        }
        Ok(())
    }
}

fn merge_object(target: &mut Map<String, JsonValue>, value: JsonValue) {
    if let JsonValue::Object(map) = value {
        target.extend(map);
    }
}

/// Tera keeps the useful part of a failure in the source chain
fn error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
