//! Schema inference from observed JSON values.

use serde_json::{Map, Value};

use crate::document::{Schema, SchemaType};

/// Nesting depth kept in examples; deeper containers become [`TRUNCATED`].
pub const EXAMPLE_MAX_DEPTH: usize = 2;

/// Placeholder for containers cut off by [`truncate`].
pub const TRUNCATED: &str = "[Truncated]";

/// Example recorded for any field named `password`.
pub const REDACTED: &str = "******";

const REDACTED_FIELD: &str = "password";

/// Classify a single value.
///
/// Booleans and the strings `"true"`/`"false"` are `boolean`. Anything that
/// is not numeric takes the name of its JSON kind. Numbers, and strings that
/// read as a finite number, are `float` when their text contains a `.` and
/// `integer` otherwise.
pub fn infer_type(value: &Value) -> SchemaType {
    match value {
        Value::Bool(_) => SchemaType::Boolean,
        Value::String(s) if s == "true" || s == "false" => SchemaType::Boolean,
        Value::Number(n) => numeric_type(&n.to_string()),
        Value::String(s) if is_numeric(s) => numeric_type(s),
        Value::String(_) => SchemaType::String,
        Value::Array(_) => SchemaType::Array,
        Value::Object(_) => SchemaType::Object,
        Value::Null => SchemaType::Null,
    }
}

/// Classify a raw string such as a path segment or query value.
pub fn infer_text_type(text: &str) -> SchemaType {
    infer_type(&Value::String(text.to_string()))
}

/// Turn a raw string into the example value matching its inferred type, so
/// `"true"` is recorded as `true` and `"42"` as `42`.
pub fn typed_example(text: &str) -> Value {
    match infer_text_type(text) {
        SchemaType::Boolean => Value::Bool(text == "true"),
        SchemaType::Integer => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        SchemaType::Float => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

fn numeric_type(text: &str) -> SchemaType {
    if text.contains('.') {
        SchemaType::Float
    } else {
        SchemaType::Integer
    }
}

/// Copy `value`, replacing containers nested deeper than `max_depth` with
/// [`TRUNCATED`]. Scalars are kept at every level that survives.
pub fn truncate(value: &Value, max_depth: usize) -> Value {
    truncate_at(value, max_depth, 0)
}

fn truncate_at(value: &Value, max_depth: usize, depth: usize) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) if depth >= max_depth => {
            Value::String(TRUNCATED.to_string())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), truncate_at(v, max_depth, depth + 1)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| truncate_at(v, max_depth, depth + 1))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Infer a schema fragment for an observed payload.
///
/// The shape comes from the full value; examples come from its truncated
/// copy, so fields below the truncation depth keep their type but carry no
/// example. Fields named `password` are always redacted.
pub fn infer_schema(value: &Value) -> Schema {
    let examples = truncate(value, EXAMPLE_MAX_DEPTH);
    match value {
        Value::Object(map) => object_schema(map, Some(&examples)),
        other => {
            let mut schema = shape_of(other);
            schema.example = Some(examples);
            schema
        }
    }
}

fn object_schema(map: &Map<String, Value>, examples: Option<&Value>) -> Schema {
    let mut schema = Schema::of_type(SchemaType::Object);
    for (name, field) in map {
        let example = examples.and_then(|e| e.get(name));
        let property = match field {
            Value::Object(nested) => object_schema(nested, example),
            other => {
                let mut leaf = shape_of(other);
                leaf.example = if name == REDACTED_FIELD {
                    Some(Value::String(REDACTED.to_string()))
                } else {
                    example.cloned()
                };
                leaf
            }
        };
        schema.properties.insert(name.clone(), property);
    }
    schema
}

/// Type and structure of a value, without examples at this level.
fn shape_of(value: &Value) -> Schema {
    match value {
        Value::Object(map) => object_schema(map, None),
        Value::Array(items) => {
            let mut schema = Schema::of_type(SchemaType::Array);
            let mut element: Option<Schema> = None;
            for item in items {
                let observed = shape_of(item);
                match element.as_mut() {
                    Some(existing) => existing.absorb(observed),
                    None => element = Some(observed),
                }
            }
            schema.items = element.map(Box::new);
            schema
        }
        scalar => Schema::of_type(infer_type(scalar)),
    }
}
