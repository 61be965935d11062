//! Manifest file format for konggen templates.
//!
//! A template directory describes its output in `manifest.yaml` (or
//! `manifest.toml`): which `.tera` sources to render, where the results go,
//! whether a source is rendered once per API group or once per operation, and
//! shell hooks to run afterwards.

// Internal imports (std, crate)
use std::path::Path;

use crate::Error;

// External imports (alphabetized)
use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;

/// The root manifest structure for a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// The name of the template
    pub name: String,

    /// A short description of what the template generates
    #[serde(default)]
    pub description: String,

    /// The version of the template (should follow semantic versioning)
    #[serde(default = "default_version")]
    pub version: String,

    /// List of files to generate
    #[serde(default)]
    pub files: Vec<TemplateFile>,

    /// Optional hooks that run after generation
    #[serde(default)]
    pub hooks: TemplateHooks,
}

/// Repetition mode for a template file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForEach {
    /// Once per API group (operations sharing a first tag)
    Api,
    /// Once per operation
    Operation,
}

/// Describes a single file to be generated from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Path to the template file, relative to the template directory
    pub source: String,

    /// Destination path, relative to the output directory (or API folder for
    /// `for_each` files). May contain `{api}` and `{operation_id}`.
    pub destination: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each: Option<ForEach>,

    /// Additional context to pass to the template
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,
}

/// Hooks that run at specific points during code generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateHooks {
    /// Commands to run after code generation
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub post_generate: Vec<String>,
}

impl Default for TemplateManifest {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            description: String::from("Default template"),
            version: default_version(),
            files: Vec::new(),
            hooks: TemplateHooks::default(),
        }
    }
}

impl TemplateFile {
    /// Destination with `{api}` / `{operation_id}` filled in
    pub fn destination_for(&self, api: Option<&str>, operation_id: Option<&str>) -> String {
        let mut destination = self.destination.clone();
        if let Some(api) = api {
            destination = destination.replace("{api}", api);
        }
        if let Some(operation_id) = operation_id {
            destination = destination.replace("{operation_id}", operation_id);
        }
        destination
    }
}

impl TemplateManifest {
    /// Load the manifest of a template directory.
    ///
    /// `manifest.yaml` is preferred over `manifest.toml`; a directory with
    /// neither gets [`TemplateManifest::default`].
    pub async fn load_from_dir(template_dir: &Path) -> crate::Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        if yaml_path.exists() {
            let content = read_manifest(&yaml_path).await?;
            Self::from_yaml_str(&content).map_err(|e| {
                Error::template(format!(
                    "Invalid YAML in template manifest at {}: {}",
                    yaml_path.display(),
                    e
                ))
            })
        } else if toml_path.exists() {
            let content = read_manifest(&toml_path).await?;
            Self::from_toml_str(&content).map_err(|e| {
                Error::template(format!(
                    "Invalid TOML in template manifest at {}: {}",
                    toml_path.display(),
                    e
                ))
            })
        } else {
            log::debug!("No manifest in {}, using default", template_dir.display());
            Ok(Self::default())
        }
    }

    pub fn from_yaml_str(content: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

async fn read_manifest(path: &Path) -> crate::Result<String> {
    log::debug!("Reading template manifest from {}", path.display());
    fs::read_to_string(path).await.map_err(|e| {
        Error::template(format!(
            "Failed to read template manifest at {}: {}",
            path.display(),
            e
        ))
    })
}

fn default_version() -> String {
    String::from("0.1.0")
}

/// Helper function to deserialize either a single command or a list of commands
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => {
            let mut result = Vec::new();
            for item in seq {
                if let SerdeValue::String(s) = item {
                    result.push(s);
                } else {
                    return Err(serde::de::Error::custom(
                        "Expected string or array of strings",
                    ));
                }
            }
            Ok(result)
        }
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}
