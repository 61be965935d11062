//! Type declarations for schema nodes.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use crate::schema::{ModelDefinition, PropertyNode};
use crate::utils::camelize;
use crate::Error;

/// Canonical naming of swagger types and models for one output flavour.
pub trait TypeNaming {
    /// Name for a swagger type keyword (`array`, `map`, `string`, `long`, ...)
    fn base_type_name(&self, kind: &str) -> String;
    /// Name for a model from the document's model dictionary
    fn model_name(&self, name: &str) -> String;
}

static KONG_TYPE_MAPPING: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("array", "List"),
        ("map", "Map"),
        ("string", "String"),
        ("char", "String"),
        ("int", "Integer"),
        ("integer", "Integer"),
        ("long", "Long"),
        ("short", "Short"),
        ("float", "Float"),
        ("double", "Double"),
        ("number", "BigDecimal"),
        ("BigDecimal", "BigDecimal"),
        ("boolean", "Boolean"),
        ("date", "Date"),
        ("DateTime", "Date"),
        ("UUID", "UUID"),
        ("ByteArray", "ByteArray"),
        ("binary", "File"),
        ("file", "File"),
        ("object", "Object"),
    ])
});

/// Naming used by the Kong script templates
#[derive(Debug, Clone, Copy, Default)]
pub struct KongTypeNaming;

impl TypeNaming for KongTypeNaming {
    fn base_type_name(&self, kind: &str) -> String {
        match KONG_TYPE_MAPPING.get(kind) {
            Some(mapped) => self.model_name(mapped),
            None => self.model_name(kind),
        }
    }

    fn model_name(&self, name: &str) -> String {
        camelize(name)
    }
}

/// Resolves [`PropertyNode`]s to textual type declarations such as
/// `List[Map[String, Pet]]`.
pub struct TypeResolver<'a, N: TypeNaming> {
    naming: N,
    models: &'a BTreeMap<String, ModelDefinition>,
}

impl<'a, N: TypeNaming> TypeResolver<'a, N> {
    pub fn new(naming: N, models: &'a BTreeMap<String, ModelDefinition>) -> Self {
        Self { naming, models }
    }

    /// Resolve a node, recursing through array and map element types.
    ///
    /// Named models resolve to their name and are never expanded, so
    /// self-referencing models terminate. A model missing from the dictionary
    /// is an [`Error::UnresolvedType`].
    pub fn resolve(&self, node: &PropertyNode) -> crate::Result<String> {
        match node {
            PropertyNode::Primitive(kind) => Ok(self.naming.base_type_name(kind)),
            PropertyNode::NamedModel(name) => {
                if self.models.contains_key(name) {
                    Ok(self.naming.model_name(name))
                } else {
                    Err(Error::UnresolvedType {
                        name: name.clone(),
                        referenced_by: None,
                    })
                }
            }
            PropertyNode::Array(element) => Ok(format!(
                "{}[{}]",
                self.naming.base_type_name("array"),
                self.resolve(element)?
            )),
            // Map keys are always strings in the supported schema formats
            PropertyNode::Map(value) => Ok(format!(
                "{}[String, {}]",
                self.naming.base_type_name("map"),
                self.resolve(value)?
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> BTreeMap<String, ModelDefinition> {
        names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    ModelDefinition {
                        name: n.to_string(),
                        description: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_primitives() -> crate::Result<()> {
        let models = models(&[]);
        let resolver = TypeResolver::new(KongTypeNaming, &models);
        assert_eq!(resolver.resolve(&PropertyNode::primitive("string"))?, "String");
        assert_eq!(resolver.resolve(&PropertyNode::primitive("long"))?, "Long");
        assert_eq!(resolver.resolve(&PropertyNode::primitive("DateTime"))?, "Date");
        assert_eq!(resolver.resolve(&PropertyNode::primitive("object"))?, "Object");
        Ok(())
    }

    #[test]
    fn test_array_of_map_nesting() -> crate::Result<()> {
        let models = models(&[]);
        let resolver = TypeResolver::new(KongTypeNaming, &models);
        let node = PropertyNode::array(PropertyNode::map(PropertyNode::primitive("string")));
        assert_eq!(resolver.resolve(&node)?, "List[Map[String, String]]");
        Ok(())
    }

    #[test]
    fn test_deep_composition_with_models() -> crate::Result<()> {
        let models = models(&["pet_tag"]);
        let resolver = TypeResolver::new(KongTypeNaming, &models);
        let node = PropertyNode::map(PropertyNode::array(PropertyNode::map(
            PropertyNode::array(PropertyNode::model("pet_tag")),
        )));
        assert_eq!(
            resolver.resolve(&node)?,
            "Map[String, List[Map[String, List[PetTag]]]]"
        );
        Ok(())
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let models = models(&["Pet"]);
        let resolver = TypeResolver::new(KongTypeNaming, &models);
        let err = resolver
            .resolve(&PropertyNode::array(PropertyNode::model("Ghost")))
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref name, .. } if name == "Ghost"));
    }

    struct Lowercase;

    impl TypeNaming for Lowercase {
        fn base_type_name(&self, kind: &str) -> String {
            kind.to_lowercase()
        }

        fn model_name(&self, name: &str) -> String {
            name.to_lowercase()
        }
    }

    #[test]
    fn test_custom_naming() -> crate::Result<()> {
        let models = models(&["Pet"]);
        let resolver = TypeResolver::new(Lowercase, &models);
        let node = PropertyNode::map(PropertyNode::model("Pet"));
        assert_eq!(resolver.resolve(&node)?, "map[String, pet]");
        Ok(())
    }
}
