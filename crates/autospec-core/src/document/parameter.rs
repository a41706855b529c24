use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaType};

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

/// An operation parameter.
///
/// Simple parameters (path, query, header) carry `type` and `example`
/// directly; the body parameter carries a `schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default)]
    pub required: bool,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// A path parameter as seeded from a route template, before any traffic.
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            required: true,
            param_type: None,
            example: None,
            schema: None,
        }
    }

    pub fn simple(
        name: impl Into<String>,
        location: ParameterLocation,
        param_type: SchemaType,
        example: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParameterLocation::Path,
            param_type: Some(param_type),
            example: Some(example),
            schema: None,
        }
    }

    pub fn body(schema: Schema) -> Self {
        Self {
            name: "body".to_string(),
            location: ParameterLocation::Body,
            required: true,
            param_type: None,
            example: None,
            schema: Some(schema),
        }
    }

    pub fn is_same(&self, other: &Parameter) -> bool {
        self.location == other.location && self.name == other.name
    }

    /// Fold a fresh observation of the same parameter into this one.
    pub fn absorb(&mut self, observed: Parameter) {
        self.param_type = match (self.param_type, observed.param_type) {
            (Some(current), Some(next)) => Some(current.widen(next)),
            (current, None) => current,
            (None, next) => next,
        };
        if observed.example.is_some() {
            self.example = observed.example;
        }
        match (self.schema.as_mut(), observed.schema) {
            (Some(existing), Some(next)) => existing.absorb(next),
            (None, Some(next)) => self.schema = Some(next),
            _ => {}
        }
    }
}
