//! Project configuration (flint.toml format).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration driving rule generation.
///
/// All fields are optional in the file; an absent file means all defaults,
/// which describe a flat project rooted in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directories scanned (non-recursively) for sources.
    pub source_dirs: Vec<PathBuf>,

    /// Extra include directories beyond the source dirs.
    pub include_dirs: Vec<PathBuf>,

    /// Libraries passed to the link step.
    pub libraries: Vec<String>,

    /// Preprocessor definitions (without the `-D`).
    pub defines: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec![PathBuf::from(".")],
            include_dirs: Vec::new(),
            libraries: Vec::new(),
            defines: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ProjectConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `flint.toml` from `dir`, falling back to defaults when absent.
    pub fn load_or_default(dir: &Path) -> crate::Result<Self> {
        let path = dir.join("flint.toml");
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// `-I` flags for every source and include directory, space-joined.
    pub fn include_flags(&self) -> String {
        self.source_dirs
            .iter()
            .chain(self.include_dirs.iter())
            .map(|dir| format!("-I{}", dir.display()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `-D` flags for every define, space-joined.
    pub fn define_flags(&self) -> String {
        self.defines
            .iter()
            .map(|def| format!("-D{def}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Link libraries, space-joined.
    pub fn library_flags(&self) -> String {
        self.libraries.join(" ")
    }
}
