//! Dump Orchestrator
//!
//! Lists the resources of a domain, collects and serializes each one, and
//! writes the resulting `{resource: {attribute: value}}` document as one
//! line of JSON.

use super::collector::collect_attributes;
use super::endpoint::ManagementEndpoint;
use super::serializer::{serialize_attributes, SerializeOptions};
use super::sink::OutputSink;
use crate::error::{DumpError, FetchError, ResourceError};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Map, Value};

/// Options for one dump
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Domain given on the command line
    pub domain: Option<String>,
    /// Session default domain, used when no domain is given
    pub default_domain: Option<String>,
    pub serialize: SerializeOptions,
    /// Resources in flight at once
    pub concurrency: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            domain: None,
            default_domain: None,
            serialize: SerializeOptions::default(),
            concurrency: 1,
        }
    }
}

/// Resource name to serialized attributes, in listing order
pub type DumpResult = Map<String, Value>;

/// Counters logged after a dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub listed: usize,
    pub dumped: usize,
    pub skipped: usize,
    pub unreadable_attributes: usize,
}

/// Explicit domain, else the session default, else every domain (`None`)
pub fn resolve_scope<'a>(explicit: Option<&'a str>, session_default: Option<&'a str>) -> Option<&'a str> {
    explicit
        .or(session_default)
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != "*")
}

/// Outcome of one resource
struct ResourceDump {
    name: String,
    node: Option<Value>,
    unreadable: usize,
}

/// Runs dumps against an endpoint
pub struct Dumper<'a, E: ManagementEndpoint + ?Sized> {
    endpoint: &'a E,
    options: DumpOptions,
}

impl<'a, E: ManagementEndpoint + ?Sized> Dumper<'a, E> {
    pub fn new(endpoint: &'a E, options: DumpOptions) -> Self {
        Self { endpoint, options }
    }

    /// Build the dump document
    pub async fn dump(&self) -> Result<(DumpResult, DumpSummary), DumpError> {
        let scope = resolve_scope(
            self.options.domain.as_deref(),
            self.options.default_domain.as_deref(),
        );
        tracing::info!("Dumping domain: {}", scope.unwrap_or("<all>"));

        let names = self
            .endpoint
            .list_resources(scope)
            .await
            .map_err(DumpError::from_directory)?;

        let mut summary = DumpSummary {
            listed: names.len(),
            ..DumpSummary::default()
        };
        let mut result = DumpResult::new();

        let outcomes: Vec<ResourceDump> = stream::iter(names)
            .map(|name| self.dump_resource(name))
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        for outcome in outcomes {
            summary.unreadable_attributes += outcome.unreadable;
            match outcome.node {
                Some(node) => {
                    summary.dumped += 1;
                    result.insert(outcome.name, node);
                }
                None => summary.skipped += 1,
            }
        }

        tracing::info!(
            "Dump complete: {} listed, {} dumped, {} skipped, {} unreadable attributes",
            summary.listed,
            summary.dumped,
            summary.skipped,
            summary.unreadable_attributes
        );

        Ok((result, summary))
    }

    /// Build the dump and write it to `sink` as one line of JSON
    pub async fn run(&self, sink: &mut dyn OutputSink) -> Result<DumpSummary, DumpError> {
        let (result, summary) = self.dump().await?;
        let text = Value::Object(result).to_string();
        sink.write(&text);
        Ok(summary)
    }

    /// A transport failure during introspection means the agent is gone
    async fn dump_resource(&self, name: String) -> Result<ResourceDump, DumpError> {
        let attributes = match self.endpoint.readable_attributes(&name).await {
            Ok(attributes) => attributes,
            Err(source @ FetchError::Transport(_)) => {
                return Err(DumpError::ConnectionLost(source));
            }
            Err(source) => {
                let error = ResourceError::Unreachable {
                    resource: name.clone(),
                    source,
                };
                tracing::warn!("Skipping resource: {}", error);
                return Ok(ResourceDump {
                    name,
                    node: None,
                    unreadable: 0,
                });
            }
        };

        let collected = collect_attributes(self.endpoint, &name, &attributes).await;

        let node = match serialize_attributes(&collected, &self.options.serialize) {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!("Skipping resource {}: {}", name, e);
                None
            }
        };

        let errors = collected.into_errors(&name);
        for error in &errors {
            tracing::debug!("Omitted: {}", error);
        }

        Ok(ResourceDump {
            name,
            node,
            unreadable: errors.len(),
        })
    }
}
