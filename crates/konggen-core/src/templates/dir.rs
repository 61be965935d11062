//! Unified handling of template directory resolution

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// Environment variable naming a templates base directory
pub const TEMPLATE_DIR_ENV: &str = "KONGGEN_TEMPLATE_DIR";

/// Represents a template directory with resolved paths and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDir {
    /// Base directory holding one sub-directory per template kind
    root_dir: PathBuf,
    /// Path to the specific template directory
    template_path: PathBuf,
    kind: TemplateKind,
}

impl TemplateDir {
    /// Create a new TemplateDir with explicit paths
    pub fn new(root_dir: PathBuf, template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            root_dir,
            template_path,
            kind,
        }
    }

    /// Returns a displayable version of the template path
    pub fn display(&self) -> std::path::Display<'_> {
        self.template_path.display()
    }

    /// Resolve the directory of a template.
    ///
    /// An explicit `custom_dir` may point either at a base directory holding
    /// `<kind>/` or straight at a template directory. Without one, the
    /// standard locations are searched for `<kind>/`.
    pub fn discover(kind: TemplateKind, custom_dir: Option<&Path>) -> io::Result<Self> {
        if let Some(dir) = custom_dir {
            if !dir.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Template directory not found: {}", dir.display()),
                ));
            }
            let nested = dir.join(kind.as_str());
            if nested.is_dir() {
                return Ok(Self::new(dir.to_path_buf(), nested, kind));
            }
            let root = dir.parent().unwrap_or(dir).to_path_buf();
            return Ok(Self::new(root, dir.to_path_buf(), kind));
        }

        let root_dir = Self::find_template_base_dir(kind).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "Could not find a '{}' template directory in any standard location",
                    kind
                ),
            )
        })?;
        let template_path = root_dir.join(kind.as_str());
        Ok(Self::new(root_dir, template_path, kind))
    }

    /// Candidate base directories, most specific first
    fn candidate_base_dirs() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Environment variable
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            candidates.push(PathBuf::from(dir));
        }

        // 2. `templates/` in the current directory or any ancestor
        if let Ok(cwd) = std::env::current_dir() {
            candidates.extend(cwd.ancestors().map(|dir| dir.join("templates")));
        }

        // 3. The workspace root (for development)
        if let Some(workspace_root) = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2) {
            candidates.push(workspace_root.join("templates"));
        }

        // 4. The user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            candidates.push(home_dir.join(".konggen").join("templates"));
        }

        candidates
    }

    fn find_template_base_dir(kind: TemplateKind) -> Option<PathBuf> {
        Self::candidate_base_dirs()
            .into_iter()
            .find(|dir| dir.join(kind.as_str()).is_dir())
    }

    /// Get the root directory containing the templates
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the template kind
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the path to the specific template directory
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Check if the template directory exists
    pub fn exists(&self) -> bool {
        self.template_path.exists()
    }
}
