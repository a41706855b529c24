use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parameter::{Parameter, ParameterLocation};
use super::schema::{Schema, SchemaType};

/// Media type every operation declares in `consumes`.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Security requirement: scheme name to scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Operations of a single path template keyed by lowercase HTTP method.
pub type PathItem = IndexMap<String, Operation>;

/// An observed API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default)]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl Operation {
    /// Bare entry for a freshly enumerated route.
    pub fn seeded(template: &str, path_params: &[String]) -> Self {
        Self {
            summary: Some(template.to_string()),
            consumes: vec![JSON_MEDIA_TYPE.to_string()],
            produces: Vec::new(),
            parameters: path_params.iter().map(Parameter::path).collect(),
            responses: IndexMap::new(),
            security: Vec::new(),
        }
    }

    pub fn parameter(&self, location: ParameterLocation, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.location == location && p.name == name)
    }

    /// Insert a parameter, or fold it into the existing one with the same
    /// name and location. New parameters are appended so path parameters keep
    /// their template order at the front.
    pub fn upsert_parameter(&mut self, observed: Parameter) {
        match self.parameters.iter_mut().find(|p| p.is_same(&observed)) {
            Some(existing) => existing.absorb(observed),
            None => self.parameters.push(observed),
        }
    }

    pub fn add_produces(&mut self, media_type: &str) {
        if !self.produces.iter().any(|m| m == media_type) {
            self.produces.push(media_type.to_string());
        }
    }

    pub fn add_security(&mut self, scheme: &str) {
        let present = self.security.iter().any(|req| req.contains_key(scheme));
        if !present {
            let mut requirement = SecurityRequirement::new();
            requirement.insert(scheme.to_string(), Vec::new());
            self.security.push(requirement);
        }
    }

    /// Fetch or create the response entry for a status code.
    pub fn response_mut(&mut self, status: u16, description: &str) -> &mut Response {
        self.responses
            .entry(status.to_string())
            .or_insert_with(|| Response {
                description: description.to_string(),
                schema: None,
                headers: IndexMap::new(),
            })
    }
}

/// A documented response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Header>,
}

impl Response {
    pub fn absorb_schema(&mut self, observed: Schema) {
        match self.schema.as_mut() {
            Some(existing) => existing.absorb(observed),
            None => self.schema = Some(observed),
        }
    }

    pub fn record_header(&mut self, name: &str, header_type: SchemaType, example: serde_json::Value) {
        let entry = self
            .headers
            .entry(name.to_string())
            .or_insert_with(|| Header {
                header_type,
                example: None,
            });
        entry.header_type = entry.header_type.widen(header_type);
        entry.example = Some(example);
    }
}

/// A response header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "type")]
    pub header_type: SchemaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}
