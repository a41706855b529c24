use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::merge::PredefinedSpec;
use crate::project::PROJECT_FILE_NAME;

/// Default location of the raw spec endpoint.
pub const DEFAULT_SPEC_ENDPOINT: &str = "/api/spec";

/// Default location of the documentation page.
pub const DEFAULT_DOCS_ENDPOINT: &str = "/api/docs";

/// Bodies declaring a larger `Content-Length` are not captured.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Observer configuration, usually loaded from `.autospec.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutospecConfig {
    /// Write the document after every request. Requires `path`.
    pub save: bool,
    /// Target file for persistence.
    pub path: Option<PathBuf>,
    pub spec_endpoint: String,
    pub docs_endpoint: String,
    pub max_body_bytes: usize,
    /// JSON or YAML fragment merged over the synthesized document.
    pub predefined: Option<PathBuf>,
    /// Cargo manifest used to seed `info`.
    pub project_file: PathBuf,
}

impl Default for AutospecConfig {
    fn default() -> Self {
        Self {
            save: false,
            path: None,
            spec_endpoint: DEFAULT_SPEC_ENDPOINT.to_string(),
            docs_endpoint: DEFAULT_DOCS_ENDPOINT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            predefined: None,
            project_file: PathBuf::from(PROJECT_FILE_NAME),
        }
    }
}

impl AutospecConfig {
    /// Persistence target, only when both `save` and a non-empty `path` are set.
    pub fn persist_path(&self) -> Option<&Path> {
        if !self.save {
            return None;
        }
        self.path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Load the predefined fragment named by `predefined`, if any.
    pub fn load_predefined(&self) -> Result<PredefinedSpec, ConfigError> {
        match self.predefined {
            Some(ref path) => load_predefined(path),
            None => Ok(PredefinedSpec::default()),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".autospec.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<AutospecConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = read(path)?;
    let config: AutospecConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Load a predefined fragment. `.json` files are parsed as JSON, anything
/// else as YAML. The top level must be an object.
pub fn load_predefined(path: &Path) -> Result<PredefinedSpec, ConfigError> {
    let content = read(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let value: serde_json::Value = if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    };

    if !value.is_object() {
        return Err(ConfigError::NotAnObject(path.to_path_buf()));
    }
    Ok(PredefinedSpec::fragment(value))
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# autospec configuration
save: false                  # write the spec to `path` after every request
# path: openapi.json

spec_endpoint: /api/spec     # raw JSON document
docs_endpoint: /api/docs     # Swagger UI page
max_body_bytes: 1048576      # larger bodies are not captured

# predefined: base-spec.yaml # merged over the synthesized spec on every read
project_file: Cargo.toml     # seeds info.title / version / license / description
"#
}
