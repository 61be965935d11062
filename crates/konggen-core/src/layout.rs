//! Where generated files land.
//!
//! API scripts are written to `<output>/<source folder>/<api package>` and
//! model files to `<output>/<source folder>/<model package>`, with each `.` in
//! a package name turned into a directory level.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Default output root for the Kong generator
pub const DEFAULT_OUTPUT_DIR: &str = "generated-code/kongCodegen";

/// Output directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub source_folder: String,
    #[serde(default)]
    pub api_package: String,
    #[serde(default)]
    pub model_package: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            source_folder: String::new(),
            api_package: String::new(),
            model_package: String::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Folder for per-API files
    pub fn api_file_folder(&self) -> PathBuf {
        self.package_folder(&self.api_package)
    }

    /// Folder for per-model files
    pub fn model_file_folder(&self) -> PathBuf {
        self.package_folder(&self.model_package)
    }

    fn package_folder(&self, package: &str) -> PathBuf {
        let mut folder = self.output_dir.clone();
        for part in self.source_folder.split(['/', '\\']).filter(|p| !p.is_empty()) {
            folder.push(part);
        }
        for part in package.split('.').filter(|p| !p.is_empty()) {
            folder.push(part);
        }
        folder
    }
}
