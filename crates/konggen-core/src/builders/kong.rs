//! Route context builder for the Kong bash script templates.

use super::RouteContextBuilder;
use crate::translate::{capture_name, capture_reference, PathTemplate, RouteDescriptor};
use crate::utils::{is_shell_identifier, sanitize_name};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A path placeholder as the script templates see it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathParamContext {
    /// Placeholder name, e.g. `petId`
    pub name: String,
    /// Regex group name in the route pattern
    pub group: String,
    /// Reference to the group, e.g. `$(uri_captures.{petId})`
    pub capture: String,
}

#[derive(Debug, Clone, Serialize)]
struct KongRouteContext<'a> {
    #[serde(flatten)]
    route: &'a RouteDescriptor,
    /// Kong route name, unique per operation
    route_name: String,
    path_params: Vec<PathParamContext>,
    has_path_params: bool,
    /// Every placeholder is a valid bash variable, so `dollar_path` expands cleanly
    shell_callable: bool,
}

#[derive(Debug, Clone)]
pub struct KongRouteContextBuilder;

impl RouteContextBuilder for KongRouteContextBuilder {
    fn build(&self, route: &RouteDescriptor) -> crate::Result<JsonValue> {
        let template = PathTemplate::parse(&route.raw_path)?;
        let path_params: Vec<PathParamContext> = template
            .parameter_names()
            .into_iter()
            .map(|name| {
                let group = capture_name(name);
                PathParamContext {
                    name: name.to_string(),
                    capture: capture_reference(&format!("{{{}}}", group)),
                    group,
                }
            })
            .collect();

        let context = KongRouteContext {
            route,
            route_name: sanitize_name(&route.operation_id),
            has_path_params: !path_params.is_empty(),
            shell_callable: path_params.iter().all(|p| is_shell_identifier(&p.name)),
            path_params,
        };
        Ok(serde_json::to_value(context)?)
    }
}
