//! Attribute value model
//!
//! Every value fetched from an endpoint is classified once, when it crosses
//! the connection boundary, into a [`ManagementValue`]. Everything
//! downstream matches on this closed set.

use std::fmt;

/// A readable attribute as reported by introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    /// Declared type (e.g. `javax.management.openmbean.CompositeData`)
    pub type_name: Option<String>,
}

impl AttributeInfo {
    pub fn new(name: &str, type_name: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.map(str::to_string),
        }
    }

    /// Attribute with no type information
    pub fn untyped(name: &str) -> Self {
        Self::new(name, None)
    }
}

/// Terminal values
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    /// A reference to another resource
    ObjectName(String),
}

impl Scalar {
    /// Numeric scalars are the only ones kept in values-only mode
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Integer(_) | Scalar::Float(_))
    }
}

/// Structured value with a fixed set of named fields
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeData {
    type_name: String,
    fields: Vec<(String, ManagementValue)>,
}

impl CompositeData {
    pub fn new(type_name: &str, fields: Vec<(String, ManagementValue)>) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Field names in descriptor order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ManagementValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Anything that is not one of the recognized shapes
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    pub type_name: Option<String>,
    pub text: String,
}

impl Opaque {
    pub fn new(type_name: Option<&str>, text: &str) -> Self {
        Self {
            type_name: type_name.map(str::to_string),
            text: text.to_string(),
        }
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// An attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum ManagementValue {
    Null,
    Scalar(Scalar),
    /// Arrays and collections
    Sequence(Vec<ManagementValue>),
    /// Map entries in source iteration order
    Keyed(Vec<(ManagementValue, ManagementValue)>),
    Record(CompositeData),
    Opaque(Opaque),
}

impl ManagementValue {
    pub fn integer(value: i64) -> Self {
        ManagementValue::Scalar(Scalar::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        ManagementValue::Scalar(Scalar::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        ManagementValue::Scalar(Scalar::Boolean(value))
    }

    pub fn text(value: &str) -> Self {
        ManagementValue::Scalar(Scalar::Text(value.to_string()))
    }

    pub fn object_name(value: &str) -> Self {
        ManagementValue::Scalar(Scalar::ObjectName(value.to_string()))
    }
}

impl From<Scalar> for ManagementValue {
    fn from(scalar: Scalar) -> Self {
        ManagementValue::Scalar(scalar)
    }
}

impl From<CompositeData> for ManagementValue {
    fn from(data: CompositeData) -> Self {
        ManagementValue::Record(data)
    }
}
