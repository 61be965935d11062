//! Context builders turning translated routes into template contexts.
pub mod kong;

use std::collections::BTreeMap;

use crate::templates::TemplateKind;
use crate::translate::RouteDescriptor;
use crate::utils::camelize;
use serde_json::{json, Value as JsonValue};

/// Tag used for operations that declare none
pub const DEFAULT_TAG: &str = "default";

/// Trait for converting a RouteDescriptor into a template-specific context.
pub trait RouteContextBuilder {
    fn build(&self, route: &RouteDescriptor) -> crate::Result<JsonValue>;
}

/// Routes that end up in the same generated API file
#[derive(Debug, Clone, PartialEq)]
pub struct ApiGroup {
    /// File-level name, e.g. `PetApi`
    pub api_name: String,
    /// Tag the group was formed from
    pub tag: String,
    pub routes: Vec<RouteDescriptor>,
}

/// Group name for a tag (`pet` -> `PetApi`)
pub fn api_name_for_tag(tag: &str) -> String {
    let base = camelize(tag);
    if base.is_empty() {
        format!("{}Api", camelize(DEFAULT_TAG))
    } else {
        format!("{}Api", base)
    }
}

pub struct RouteContext;

impl RouteContext {
    /// Group routes by their first tag. Groups are ordered by name and keep
    /// the incoming route order.
    pub fn group_by_api(routes: Vec<RouteDescriptor>) -> Vec<ApiGroup> {
        let mut groups: BTreeMap<String, ApiGroup> = BTreeMap::new();
        for route in routes {
            let tag = route
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_TAG.to_string());
            let api_name = api_name_for_tag(&tag);
            groups
                .entry(api_name.clone())
                .or_insert_with(|| ApiGroup {
                    api_name,
                    tag,
                    routes: Vec::new(),
                })
                .routes
                .push(route);
        }
        groups.into_values().collect()
    }

    /// Template contexts for every route of a group
    pub fn transform_routes(
        template: TemplateKind,
        routes: &[RouteDescriptor],
    ) -> crate::Result<Vec<JsonValue>> {
        let builder = Self::get_builder(template);
        routes.iter().map(|route| builder.build(route)).collect()
    }

    /// Per-file context for one API group
    pub fn api_context(template: TemplateKind, group: &ApiGroup) -> crate::Result<JsonValue> {
        let operations = Self::transform_routes(template, &group.routes)?;
        Ok(json!({
            "api_name": group.api_name,
            "api_tag": group.tag,
            "operations": operations,
        }))
    }

    pub fn get_builder(template: TemplateKind) -> Box<dyn RouteContextBuilder> {
        match template {
            // custom templates receive the same route contexts as the built-in one
            TemplateKind::Kong | TemplateKind::Custom => Box::new(kong::KongRouteContextBuilder),
        }
    }
}
