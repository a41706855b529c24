use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type tag attached to inferred schemas and simple parameters.
///
/// `float` is not a JSON Schema keyword value, but it is what the docs page
/// shows for observed decimal values, so integers and floats stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
    Null,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Boolean => "boolean",
            SchemaType::Integer => "integer",
            SchemaType::Float => "float",
            SchemaType::String => "string",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }

    /// Combine a previously recorded type with a newly observed one.
    ///
    /// The newer observation wins, except that an integer never narrows an
    /// established float: `9.5` followed by `10` is still a float field.
    pub fn widen(self, observed: SchemaType) -> SchemaType {
        match (self, observed) {
            (SchemaType::Float, SchemaType::Integer) => SchemaType::Float,
            (_, observed) => observed,
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inferred schema fragment mirroring the shape of an observed JSON value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl Schema {
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Fold a fresh observation into this schema.
    ///
    /// Properties are unioned recursively, the latest example replaces the
    /// stored one, and the type follows [`SchemaType::widen`].
    pub fn absorb(&mut self, observed: Schema) {
        self.schema_type = match (self.schema_type, observed.schema_type) {
            (Some(current), Some(next)) => Some(current.widen(next)),
            (current, None) => current,
            (None, next) => next,
        };

        if self.schema_type != Some(SchemaType::Object) {
            self.properties.clear();
        }
        for (name, property) in observed.properties {
            match self.properties.get_mut(&name) {
                Some(existing) => existing.absorb(property),
                None => {
                    self.properties.insert(name, property);
                }
            }
        }

        match (self.items.as_mut(), observed.items) {
            (Some(existing), Some(next)) => existing.absorb(*next),
            (None, Some(next)) => self.items = Some(next),
            _ => {}
        }
        if self.schema_type != Some(SchemaType::Array) {
            self.items = None;
        }

        if observed.example.is_some() {
            self.example = observed.example;
        }
    }
}
