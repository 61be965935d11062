//! Configuration management for konggen code generation.
//!
//! This module defines the `Config` struct holding every generation setting.
//! A configuration can be loaded from a YAML file, created programmatically,
//! or assembled from command-line arguments; the CLI layers its flags over a
//! loaded file.
//!
//! # Examples
//!
//! ```no_run
//! use konggen_core::config::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> konggen_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("petstore.json", "generated-code/kongCodegen");
//! config.gateway.host = Some("kong.internal".to_string());
//! config.skip_invalid = true;
//!
//! // Or load from a config file
//! let config = Config::from_file("konggen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::Path;

use crate::gateway::{GatewayConfig, GatewayOverrides};
use crate::layout::{OutputLayout, DEFAULT_OUTPUT_DIR};
use crate::translate::IdentifierEscaper;
use crate::Error;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for Kong script generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path or URL of the API description
    pub schema_path: String,

    /// Output directory for generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Template to use for generation
    #[serde(default = "default_template")]
    pub template_kind: String,

    /// Optional path to template directory
    #[serde(default)]
    pub template_dir: Option<String>,

    /// Folder under the output directory that holds packages
    #[serde(default)]
    pub source_folder: String,

    /// Dotted package for API scripts
    #[serde(default)]
    pub api_package: String,

    /// Dotted package for model files
    #[serde(default)]
    pub model_package: String,

    /// Gateway settings; unset fields fall back to additional properties, then defaults
    #[serde(default)]
    pub gateway: GatewayOverrides,

    /// Replacements for reserved words (`sample1: exampleOne`)
    #[serde(default)]
    pub reserved_words_mappings: BTreeMap<String, String>,

    /// Free-form values exposed to templates
    #[serde(default)]
    pub additional_properties: BTreeMap<String, String>,

    /// Operation ids to generate; empty means all
    #[serde(default)]
    pub include_operations: Vec<String>,

    /// Operation ids to leave out
    #[serde(default)]
    pub exclude_operations: Vec<String>,

    /// Log and skip operations that fail to translate instead of aborting
    #[serde(default)]
    pub skip_invalid: bool,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(schema_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            schema_path: schema_path.into(),
            output_dir: output_dir.into(),
            template_kind: default_template(),
            template_dir: None,
            source_folder: String::new(),
            api_package: String::new(),
            model_package: String::new(),
            gateway: GatewayOverrides::default(),
            reserved_words_mappings: BTreeMap::new(),
            additional_properties: BTreeMap::new(),
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
            skip_invalid: false,
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Output layout described by this config
    pub fn layout(&self) -> OutputLayout {
        OutputLayout {
            output_dir: self.output_dir.clone().into(),
            source_folder: self.source_folder.clone(),
            api_package: self.api_package.clone(),
            model_package: self.model_package.clone(),
        }
    }

    /// Gateway settings: explicit values, then additional properties, then defaults
    pub fn gateway_config(&self) -> GatewayConfig {
        let overrides = self
            .gateway
            .clone()
            .merge(GatewayOverrides::from_properties(&self.additional_properties));
        GatewayConfig::resolve(GatewayConfig::default(), overrides)
    }

    /// Identifier escaper honouring the reserved word mappings
    pub fn escaper(&self) -> crate::Result<IdentifierEscaper> {
        IdentifierEscaper::with_mappings(self.reserved_words_mappings.clone())
    }

    /// Whether an operation passes the include/exclude filters
    pub fn includes_operation(&self, operation_id: &str) -> bool {
        let included = self.include_operations.is_empty()
            || self.include_operations.iter().any(|id| id == operation_id);
        included && !self.exclude_operations.iter().any(|id| id == operation_id)
    }
}

/// Parse `key=value,key2=value2` into a map. Blank entries are ignored.
pub fn parse_key_value_list(input: &str) -> crate::Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| Error::config(format!("expected key=value, got '{}'", entry)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::config(format!("empty key in '{}'", entry)));
        }
        map.insert(key.to_string(), value.trim().to_string());
    }
    Ok(map)
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_template() -> String {
    crate::templates::TemplateKind::default().as_str().to_string()
}
