use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::{Operation, PathItem};

/// Swagger version the synthesized document declares.
pub const SWAGGER_VERSION: &str = "2.0";

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// License information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
}

/// Security scheme registered from observed `Authorization` headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl SecurityScheme {
    pub fn basic() -> Self {
        Self {
            scheme_type: "basic".to_string(),
            name: None,
            location: None,
        }
    }

    pub fn api_key_header(header: &str) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            name: Some(header.to_string()),
            location: Some("header".to_string()),
        }
    }
}

/// The synthesized specification document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
    pub swagger: String,

    pub info: Info,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(
        rename = "securityDefinitions",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_definitions: IndexMap<String, SecurityScheme>,
}

impl SpecDocument {
    pub fn new(info: Info) -> Self {
        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info,
            schemes: Vec::new(),
            host: None,
            paths: IndexMap::new(),
            security_definitions: IndexMap::new(),
        }
    }

    /// Register a bare operation for every method of a route. Operations that
    /// already exist are left as recorded.
    pub fn seed_route<'a>(
        &mut self,
        template: &str,
        path_params: &[String],
        methods: impl IntoIterator<Item = &'a str>,
    ) {
        let item = self.paths.entry(template.to_string()).or_default();
        for method in methods {
            item.entry(method.to_lowercase())
                .or_insert_with(|| Operation::seeded(template, path_params));
        }
    }

    pub fn operation(&self, template: &str, method: &str) -> Option<&Operation> {
        self.paths.get(template)?.get(method)
    }

    pub fn operation_mut(&mut self, template: &str, method: &str) -> Option<&mut Operation> {
        self.paths.get_mut(template)?.get_mut(method)
    }

    pub fn record_scheme(&mut self, scheme: &str) {
        if !self.schemes.iter().any(|s| s == scheme) {
            self.schemes.push(scheme.to_string());
        }
    }

    /// First observed host wins.
    pub fn record_host(&mut self, host: &str) {
        if self.host.is_none() {
            self.host = Some(host.to_string());
        }
    }

    pub fn register_security(&mut self, name: &str, scheme: SecurityScheme) {
        self.security_definitions
            .entry(name.to_string())
            .or_insert(scheme);
    }
}
