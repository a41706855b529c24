use std::fs;
use std::path::Path;

use crate::document::{Info, License};
use crate::error::ProjectError;

/// Default project descriptor looked up in the working directory.
pub const PROJECT_FILE_NAME: &str = "Cargo.toml";

/// Package metadata used to seed the document's `info` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub description: Option<String>,
}

impl ProjectInfo {
    /// Parse the `[package]` table of a Cargo manifest.
    ///
    /// Fields that are not plain strings, such as `version.workspace = true`,
    /// are left empty.
    pub fn from_manifest(content: &str) -> Result<Self, ProjectError> {
        let manifest: toml::Table = content.parse()?;
        let package = manifest.get("package");
        let field = |key: &str| {
            package
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        Ok(Self {
            name: field("name"),
            version: field("version"),
            license: field("license"),
            description: field("description"),
        })
    }

    /// Build the `info` block. The description always starts with a link to
    /// the raw spec endpoint.
    pub fn to_info(&self, spec_endpoint: &str) -> Info {
        let mut description = format!("[Specification JSON]({spec_endpoint})");
        if let Some(ref extra) = self.description {
            description.push_str("\n\n");
            description.push_str(extra);
        }
        Info {
            title: self.name.clone(),
            version: self.version.clone(),
            description: Some(description),
            license: self.license.clone().map(|name| License { name }),
        }
    }
}

/// Load project metadata. Returns `None` if the file doesn't exist.
pub fn load_project_info(path: &Path) -> Result<Option<ProjectInfo>, ProjectError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    ProjectInfo::from_manifest(&content).map(Some)
}

/// Like [`load_project_info`], but an unreadable manifest is logged and
/// treated as absent.
pub fn project_info_or_default(path: &Path) -> ProjectInfo {
    match load_project_info(path) {
        Ok(Some(info)) => info,
        Ok(None) => {
            log::debug!("no project file at {}", path.display());
            ProjectInfo::default()
        }
        Err(e) => {
            log::warn!("ignoring project file {}: {}", path.display(), e);
            ProjectInfo::default()
        }
    }
}
