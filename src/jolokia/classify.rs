//! Classification of agent replies
//!
//! The agent flattens every Java value into JSON. The declared attribute
//! type from the MBean metadata is used as a hint to recover the shape:
//! composite records, object names, arrays, and values the agent could
//! only render with `toString`.

use crate::mbean::value::{CompositeData, ManagementValue, Opaque, Scalar};
use serde_json::Value;

const OBJECT_NAME_TYPE: &str = "javax.management.ObjectName";
const OBJECT_NAME_KEY: &str = "objectName";

/// Declared types whose string replies are plain text, same as untyped strings
const TEXT_TYPES: &[&str] = &[
    "java.lang.String",
    "String",
    "java.lang.CharSequence",
    "java.lang.Object",
    "java.io.Serializable",
];

const BOOLEAN_TYPES: &[&str] = &["boolean", "java.lang.Boolean"];

const INTEGER_TYPES: &[&str] = &[
    "byte",
    "short",
    "int",
    "long",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.math.BigInteger",
    "java.util.concurrent.atomic.AtomicInteger",
    "java.util.concurrent.atomic.AtomicLong",
];

const FLOAT_TYPES: &[&str] = &[
    "float",
    "double",
    "java.lang.Float",
    "java.lang.Double",
    "java.math.BigDecimal",
    "java.lang.Number",
];

/// Classify a reply value, using the declared type when known
pub fn classify(value: Value, type_hint: Option<&str>) -> ManagementValue {
    let hint = type_hint.map(str::trim).filter(|h| !h.is_empty());

    match value {
        Value::Null => ManagementValue::Null,
        Value::Bool(b) => ManagementValue::boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ManagementValue::integer(i),
            None => ManagementValue::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => classify_string(s, hint),
        Value::Array(items) => {
            let element_hint = hint.and_then(array_component_type);
            ManagementValue::Sequence(
                items
                    .into_iter()
                    .map(|item| classify(item, element_hint.as_deref()))
                    .collect(),
            )
        }
        Value::Object(map) => {
            if let Some(name) = lone_object_name(&map) {
                return ManagementValue::object_name(&name);
            }
            match hint {
                Some(h) if is_composite_type(h) => {
                    let fields = map
                        .into_iter()
                        .map(|(key, field)| (key, classify(field, None)))
                        .collect();
                    CompositeData::new(h, fields).into()
                }
                _ => ManagementValue::Keyed(
                    map.into_iter()
                        .map(|(key, entry)| (ManagementValue::text(&key), classify(entry, None)))
                        .collect(),
                ),
            }
        }
    }
}

fn classify_string(s: String, hint: Option<&str>) -> ManagementValue {
    let Some(hint) = hint else {
        return ManagementValue::Scalar(Scalar::Text(s));
    };

    if hint == OBJECT_NAME_TYPE {
        return ManagementValue::Scalar(Scalar::ObjectName(s));
    }
    if TEXT_TYPES.contains(&hint) {
        return ManagementValue::Scalar(Scalar::Text(s));
    }
    // Agents configured to serialize longs as strings
    if INTEGER_TYPES.contains(&hint) {
        if let Ok(i) = s.trim().parse::<i64>() {
            return ManagementValue::integer(i);
        }
        return ManagementValue::Scalar(Scalar::Text(s));
    }
    if FLOAT_TYPES.contains(&hint) {
        if let Ok(f) = s.trim().parse::<f64>() {
            return ManagementValue::float(f);
        }
        return ManagementValue::Scalar(Scalar::Text(s));
    }
    if BOOLEAN_TYPES.contains(&hint) {
        return match s.trim() {
            "true" => ManagementValue::boolean(true),
            "false" => ManagementValue::boolean(false),
            _ => ManagementValue::Scalar(Scalar::Text(s)),
        };
    }

    ManagementValue::Opaque(Opaque::new(Some(hint), &s))
}

/// `{"objectName": "..."}` is how the agent renders an ObjectName
fn lone_object_name(map: &serde_json::Map<String, Value>) -> Option<String> {
    if map.len() != 1 {
        return None;
    }
    map.get(OBJECT_NAME_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn is_composite_type(hint: &str) -> bool {
    hint.starts_with("javax.management.openmbean.CompositeData")
        || hint.starts_with("java.lang.management.")
        || hint.starts_with("com.sun.management.GcInfo")
}

/// Element type of a JVM array descriptor (`[Ljava.lang.String;`, `[J`)
fn array_component_type(hint: &str) -> Option<String> {
    let component = hint.strip_prefix('[')?;
    let resolved = match component {
        "Z" => "boolean",
        "B" => "byte",
        "C" => "char",
        "S" => "short",
        "I" => "int",
        "J" => "long",
        "F" => "float",
        "D" => "double",
        nested if nested.starts_with('[') => nested,
        object => object.strip_prefix('L')?.strip_suffix(';')?,
    };
    Some(resolved.to_string())
}
