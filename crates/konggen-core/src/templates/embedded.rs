//! Templates compiled into the binary.

use super::TemplateKind;

/// A template directory carried as static strings
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedTemplate {
    /// `manifest.yaml` content
    pub manifest: &'static str,
    /// `(name, source)` of every `.tera` file
    pub sources: &'static [(&'static str, &'static str)],
}

const KONG: EmbeddedTemplate = EmbeddedTemplate {
    manifest: include_str!("../../../../templates/kong/manifest.yaml"),
    sources: &[(
        "kong-bash-script.sh.tera",
        include_str!("../../../../templates/kong/kong-bash-script.sh.tera"),
    )],
};

/// The built-in copy of a template, if the kind has one
pub fn embedded_template(kind: TemplateKind) -> Option<EmbeddedTemplate> {
    match kind {
        TemplateKind::Kong => Some(KONG),
        TemplateKind::Custom => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::TemplateManifest;

    #[test]
    fn test_embedded_kong_manifest_names_its_sources() -> crate::Result<()> {
        let template = embedded_template(TemplateKind::Kong).unwrap();
        let manifest = TemplateManifest::from_yaml_str(template.manifest)?;
        assert_eq!(manifest.name, "kong");
        for file in &manifest.files {
            assert!(template.sources.iter().any(|(name, _)| *name == file.source));
        }
        assert!(embedded_template(TemplateKind::Custom).is_none());
        Ok(())
    }
}
