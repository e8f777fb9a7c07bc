//! Value Serializer
//!
//! Recursively converts a [`ManagementValue`] into JSON. Two policies apply
//! at every level:
//!
//! - containers whose children all disappear disappear themselves, so the
//!   output never holds an empty list or object;
//! - in values-only mode, text, boolean and object-name scalars disappear,
//!   leaving only numeric leaves.
//!
//! "Disappear" is `Ok(None)`. The functions here are pure.

use super::collector::AttributeResult;
use super::value::{CompositeData, ManagementValue, Scalar};
use crate::error::CyclicValueError;
use serde_json::{Map, Number, Value};

/// Default bound on value nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Serialization mode, passed explicitly to every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Keep only numeric scalars
    pub values_only: bool,
    /// Nesting beyond this depth is treated as a cycle
    pub max_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            values_only: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializeOptions {
    pub fn values_only() -> Self {
        Self {
            values_only: true,
            ..Self::default()
        }
    }
}

/// Serialize one value, `Ok(None)` when it is filtered or empty
pub fn serialize(
    value: &ManagementValue,
    options: &SerializeOptions,
) -> Result<Option<Value>, CyclicValueError> {
    serialize_at(value, options, 0)
}

/// Serialize all attributes of one resource into a JSON object
///
/// Attributes that serialize to nothing are dropped; `Ok(None)` when none remain.
pub fn serialize_attributes(
    attributes: &AttributeResult,
    options: &SerializeOptions,
) -> Result<Option<Value>, CyclicValueError> {
    let mut object = Map::new();
    for (name, value) in attributes.values() {
        if let Some(node) = serialize(value, options)? {
            object.insert(name.to_string(), node);
        }
    }
    Ok(non_empty_object(object))
}

fn serialize_at(
    value: &ManagementValue,
    options: &SerializeOptions,
    depth: usize,
) -> Result<Option<Value>, CyclicValueError> {
    if depth > options.max_depth {
        return Err(CyclicValueError {
            limit: options.max_depth,
        });
    }

    match value {
        ManagementValue::Null => Ok(Some(Value::Null)),
        ManagementValue::Scalar(scalar) => {
            if options.values_only && !scalar.is_numeric() {
                return Ok(None);
            }
            Ok(Some(scalar_to_json(scalar)))
        }
        ManagementValue::Sequence(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                if let Some(node) = serialize_at(item, options, depth + 1)? {
                    list.push(node);
                }
            }
            if list.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Value::Array(list)))
            }
        }
        ManagementValue::Keyed(entries) => {
            let mut object = Map::new();
            for (key, entry) in entries {
                let key_node = serialize_at(key, options, depth + 1)?;
                let Some(node) = serialize_at(entry, options, depth + 1)? else {
                    continue;
                };
                let key = match key_node {
                    Some(key_node) => json_key(&key_node),
                    None => fallback_key(key, options, depth)?,
                };
                object.insert(key, node);
            }
            Ok(non_empty_object(object))
        }
        ManagementValue::Record(data) => serialize_record(data, options, depth),
        ManagementValue::Opaque(opaque) => {
            tracing::trace!(
                "Rendering {} as text",
                opaque.type_name.as_deref().unwrap_or("untyped value")
            );
            Ok(Some(Value::String(opaque.to_string())))
        }
    }
}

fn serialize_record(
    data: &CompositeData,
    options: &SerializeOptions,
    depth: usize,
) -> Result<Option<Value>, CyclicValueError> {
    if data.is_empty() {
        return Ok(None);
    }
    let mut object = Map::with_capacity(data.len());
    for name in data.field_names() {
        let Some(field) = data.get(name) else {
            continue;
        };
        if let Some(node) = serialize_at(field, options, depth + 1)? {
            object.insert(name.to_string(), node);
        }
    }
    if object.is_empty() {
        tracing::trace!("All fields of {} collapsed", data.type_name());
    }
    Ok(non_empty_object(object))
}

fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Integer(n) => Value::Number(Number::from(*n)),
        // NaN and infinities have no JSON number form
        Scalar::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Text(s) | Scalar::ObjectName(s) => Value::String(s.clone()),
    }
}

/// Object key for a serialized map key
fn json_key(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Key filtered away by values-only mode: label the entry with its plain rendering
fn fallback_key(
    key: &ManagementValue,
    options: &SerializeOptions,
    depth: usize,
) -> Result<String, CyclicValueError> {
    let plain = SerializeOptions {
        values_only: false,
        ..*options
    };
    Ok(serialize_at(key, &plain, depth + 1)?
        .map(|node| json_key(&node))
        .unwrap_or_else(|| "null".to_string()))
}

fn non_empty_object(object: Map<String, Value>) -> Option<Value> {
    if object.is_empty() {
        None
    } else {
        Some(Value::Object(object))
    }
}
