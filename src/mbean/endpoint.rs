//! Endpoint traits
//!
//! The narrow interfaces the dump consumes. [`crate::jolokia::JolokiaClient`]
//! implements all three remote traits; tests use in-memory fakes.

use super::value::{AttributeInfo, ManagementValue};
use crate::error::FetchError;
use async_trait::async_trait;

/// Lists resources of a domain
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    /// Resource names in `domain`, or in every domain when `None`
    async fn list_resources(&self, domain: Option<&str>) -> Result<Vec<String>, FetchError>;
}

/// Describes a resource's attributes
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Readable attributes of `resource`, in metadata order
    async fn readable_attributes(&self, resource: &str) -> Result<Vec<AttributeInfo>, FetchError>;
}

/// Reads attribute values
#[async_trait]
pub trait Connection: Send + Sync {
    /// Read several attributes in one request
    ///
    /// Fails as a whole when the request fails. An attribute missing from
    /// the reply, or paired with `None`, had no value.
    async fn fetch_batch(
        &self,
        resource: &str,
        attributes: &[AttributeInfo],
    ) -> Result<Vec<(String, Option<ManagementValue>)>, FetchError>;

    /// Read a single attribute
    async fn fetch_one(
        &self,
        resource: &str,
        attribute: &AttributeInfo,
    ) -> Result<ManagementValue, FetchError>;
}

/// Everything a dump needs from the remote side
pub trait ManagementEndpoint: ResourceDirectory + Introspector + Connection {}

impl<T: ResourceDirectory + Introspector + Connection> ManagementEndpoint for T {}
