//! Kong gateway settings for generated scripts.
//!
//! The three settings are the admin API host, its port and the name of the
//! upstream service the routes are attached to. They are resolved once per run
//! by layering optional overrides over [`GatewayConfig::default`], and never
//! change afterwards. Values are passed through as given; the generated script
//! is the first place a bad host or port would show up.
//!
//! # Examples
//!
//! ```
//! use konggen_core::gateway::{GatewayConfig, GatewayOverrides};
//!
//! let overrides = GatewayOverrides {
//!     port: Some("8444".to_string()),
//!     ..Default::default()
//! };
//! let config = GatewayConfig::resolve(GatewayConfig::default(), overrides);
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, "8444");
//! assert_eq!(config.target_service_name, "myApi");
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Name under which this generator is registered
pub const GENERATOR_NAME: &str = "kong";

/// Generator category
pub const GENERATOR_KIND: &str = "documentation";

/// One-line description shown by `config-help`
pub const GENERATOR_HELP: &str = "Generates a bash-script to create routes to a kong gateway.";

/// Additional-property key for the admin host
pub const KONG_HOST: &str = "kongHost";
/// Additional-property key for the admin port
pub const KONG_PORT: &str = "kongPort";
/// Additional-property key for the upstream service name
pub const TARGET_API_NAME: &str = "targetApiName";

/// A user-facing generator option with its default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOption {
    pub name: &'static str,
    pub description: &'static str,
    pub default: &'static str,
}

/// Options accepted by the Kong generator, in display order
pub const GATEWAY_OPTIONS: &[GeneratorOption] = &[
    GeneratorOption {
        name: KONG_HOST,
        description: "Hostname of the kong admin API",
        default: "localhost",
    },
    GeneratorOption {
        name: KONG_PORT,
        description: "Port of the kong admin API",
        default: "8001",
    },
    GeneratorOption {
        name: TARGET_API_NAME,
        description: "Name of the kong service the routes belong to",
        default: "myApi",
    },
];

/// Resolved gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    /// Kept as text; it is only ever spliced into URLs
    pub port: String,
    pub target_service_name: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: GATEWAY_OPTIONS[0].default.to_string(),
            port: GATEWAY_OPTIONS[1].default.to_string(),
            target_service_name: GATEWAY_OPTIONS[2].default.to_string(),
        }
    }
}

/// Optional replacements for any [`GatewayConfig`] field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_service_name: Option<String>,
}

impl GatewayOverrides {
    /// Read overrides from a generator additional-properties map
    pub fn from_properties(properties: &BTreeMap<String, String>) -> Self {
        Self {
            host: properties.get(KONG_HOST).cloned(),
            port: properties.get(KONG_PORT).cloned(),
            target_service_name: properties.get(TARGET_API_NAME).cloned(),
        }
    }

    /// Layer `self` over `fallback`; fields set on `self` win
    pub fn merge(self, fallback: GatewayOverrides) -> Self {
        Self {
            host: self.host.or(fallback.host),
            port: self.port.or(fallback.port),
            target_service_name: self.target_service_name.or(fallback.target_service_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none() && self.target_service_name.is_none()
    }
}

impl GatewayConfig {
    /// Apply every present override to `defaults`
    pub fn resolve(defaults: GatewayConfig, overrides: GatewayOverrides) -> Self {
        Self {
            host: overrides.host.unwrap_or(defaults.host),
            port: overrides.port.unwrap_or(defaults.port),
            target_service_name: overrides
                .target_service_name
                .unwrap_or(defaults.target_service_name),
        }
    }

    /// Admin API base URL, e.g. `http://localhost:8001`
    pub fn admin_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Expose the settings to templates, under both the snake_case keys and
    /// the option names. Resolved values replace whatever was there.
    pub fn publish(&self, context: &mut JsonMap<String, JsonValue>) {
        context.insert(KONG_HOST.to_string(), JsonValue::from(self.host.clone()));
        context.insert(KONG_PORT.to_string(), JsonValue::from(self.port.clone()));
        context.insert(
            TARGET_API_NAME.to_string(),
            JsonValue::from(self.target_service_name.clone()),
        );
        context.insert("kong_host".to_string(), JsonValue::from(self.host.clone()));
        context.insert("kong_port".to_string(), JsonValue::from(self.port.clone()));
        context.insert(
            "target_api_name".to_string(),
            JsonValue::from(self.target_service_name.clone()),
        );
        context.insert("kong_admin_url".to_string(), JsonValue::from(self.admin_url()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::resolve(GatewayConfig::default(), GatewayOverrides::default());
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, "8001");
        assert_eq!(config.target_service_name, "myApi");
        assert_eq!(config.admin_url(), "http://localhost:8001");
    }

    #[test]
    fn test_overrides_are_not_validated() {
        let overrides = GatewayOverrides {
            host: Some("".to_string()),
            port: Some("not-a-port".to_string()),
            target_service_name: Some("pets".to_string()),
        };
        let config = GatewayConfig::resolve(GatewayConfig::default(), overrides);
        assert_eq!(config.host, "");
        assert_eq!(config.port, "not-a-port");
        assert_eq!(config.target_service_name, "pets");
    }

    #[test]
    fn test_explicit_settings_win_over_properties() {
        let mut properties = BTreeMap::new();
        properties.insert(KONG_HOST.to_string(), "kong.internal".to_string());
        properties.insert(KONG_PORT.to_string(), "9001".to_string());
        properties.insert("unrelated".to_string(), "x".to_string());

        let explicit = GatewayOverrides {
            port: Some("8444".to_string()),
            ..Default::default()
        };
        let merged = explicit.merge(GatewayOverrides::from_properties(&properties));
        let config = GatewayConfig::resolve(GatewayConfig::default(), merged);
        assert_eq!(config.host, "kong.internal");
        assert_eq!(config.port, "8444");
        assert_eq!(config.target_service_name, "myApi");
    }

    #[test]
    fn test_publish() {
        let mut context = JsonMap::new();
        GatewayConfig::default().publish(&mut context);
        assert_eq!(context["kong_host"], "localhost");
        assert_eq!(context["kong_port"], "8001");
        assert_eq!(context["target_api_name"], "myApi");
        assert_eq!(context[KONG_HOST], "localhost");
        assert_eq!(context[KONG_PORT], "8001");
        assert_eq!(context[TARGET_API_NAME], "myApi");
    }

    #[test]
    fn test_option_registry() {
        let names: Vec<_> = GATEWAY_OPTIONS.iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["kongHost", "kongPort", "targetApiName"]);
        assert!(GatewayOverrides::default().is_empty());
    }
}
