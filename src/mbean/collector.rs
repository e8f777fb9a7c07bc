//! Attribute Collector
//!
//! Fetches every readable attribute of one resource: one batched read
//! first, and when that fails as a whole, one read per attribute so a
//! single broken attribute cannot hide the others.

use super::endpoint::Connection;
use super::value::{AttributeInfo, ManagementValue};
use crate::error::{FetchError, ResourceError};

/// Values fetched for one resource
#[derive(Debug, Clone, Default)]
pub struct AttributeResult {
    values: Vec<(String, ManagementValue)>,
    failures: Vec<(String, FetchError)>,
}

impl AttributeResult {
    /// Bind a value, replacing an earlier binding of the same name
    pub fn insert(&mut self, name: &str, value: ManagementValue) {
        if let Some(slot) = self.values.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.values.push((name.to_string(), value));
        }
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &ManagementValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&ManagementValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attributes whose individual read failed
    pub fn failures(&self) -> &[(String, FetchError)] {
        &self.failures
    }

    /// Consume the failures as per-resource errors
    pub fn into_errors(self, resource: &str) -> Vec<ResourceError> {
        self.failures
            .into_iter()
            .map(|(attribute, source)| ResourceError::AttributeUnreadable {
                resource: resource.to_string(),
                attribute,
                source,
            })
            .collect()
    }
}

/// Fetch all `attributes` of `resource`
pub async fn collect_attributes<C: Connection + ?Sized>(
    connection: &C,
    resource: &str,
    attributes: &[AttributeInfo],
) -> AttributeResult {
    let mut result = AttributeResult::default();
    if attributes.is_empty() {
        return result;
    }

    match connection.fetch_batch(resource, attributes).await {
        Ok(pairs) => {
            for (name, value) in pairs {
                if let Some(value) = value {
                    result.insert(&name, value);
                }
            }
            tracing::debug!(
                "batch read of {}: {}/{} attributes",
                resource,
                result.len(),
                attributes.len()
            );
        }
        Err(e) => {
            tracing::debug!("batch read of {} failed ({}), reading one by one", resource, e);
            for attribute in attributes {
                match connection.fetch_one(resource, attribute).await {
                    Ok(value) => result.insert(&attribute.name, value),
                    Err(e) => {
                        tracing::debug!("read of {}.{} failed: {}", resource, attribute.name, e);
                        result.failures.push((attribute.name.clone(), e));
                    }
                }
            }
        }
    }

    result
}
