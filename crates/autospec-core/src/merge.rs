//! Combining the synthesized document with the user's predefined spec.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// A document transform supplied by the user.
pub type TransformFn = dyn Fn(Value) -> Value + Send + Sync;

/// User-supplied base specification, applied with final precedence on every
/// read of the document.
#[derive(Clone)]
pub enum PredefinedSpec {
    /// Deep-merged over the synthesized document, then key-sorted.
    Fragment(Value),
    /// Receives the synthesized document and returns the published one as-is.
    Transform(Arc<TransformFn>),
}

impl PredefinedSpec {
    pub fn fragment(value: Value) -> Self {
        PredefinedSpec::Fragment(value)
    }

    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        PredefinedSpec::Transform(Arc::new(f))
    }

    /// Produce the published document from a synthesized one.
    pub fn apply(&self, synthesized: Value) -> Value {
        match self {
            PredefinedSpec::Fragment(fragment) => {
                let mut merged = synthesized;
                deep_merge(&mut merged, fragment);
                sort_keys(merged)
            }
            PredefinedSpec::Transform(f) => f(synthesized),
        }
    }
}

impl Default for PredefinedSpec {
    fn default() -> Self {
        PredefinedSpec::Fragment(Value::Object(Map::new()))
    }
}

impl fmt::Debug for PredefinedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredefinedSpec::Fragment(value) => f.debug_tuple("Fragment").field(value).finish(),
            PredefinedSpec::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Merge `overlay` into `base`. Objects merge key by key; any other overlay
/// value (arrays included) replaces the base value outright.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Recursively order object keys lexicographically. Array order is kept.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
