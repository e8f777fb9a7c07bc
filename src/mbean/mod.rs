//! MBean dump core
//!
//! This module turns the attributes of remote management resources into a
//! compact JSON document. It knows nothing about the wire protocol; the
//! remote side is reached through the traits in [`endpoint`].
//!
//! # Architecture
//!
//! - [`value`] - The closed value model every fetched attribute is classified into
//! - [`collector`] - Batch-first attribute retrieval with per-attribute fallback
//! - [`serializer`] - Recursive conversion to JSON with empty and values-only filtering
//! - [`dump`] - Scope resolution, per-resource orchestration, output
//! - [`sink`] - Output destinations
//!
//! # Example
//!
//! ```ignore
//! use jmxdump::jolokia::JolokiaClient;
//! use jmxdump::mbean::{DumpOptions, Dumper, WriterSink};
//!
//! async fn dump_java_lang(client: &JolokiaClient) -> anyhow::Result<()> {
//!     let options = DumpOptions {
//!         domain: Some("java.lang".to_string()),
//!         ..DumpOptions::default()
//!     };
//!     Dumper::new(client, options).run(&mut WriterSink::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod dump;
pub mod endpoint;
pub mod serializer;
pub mod sink;
pub mod value;

pub use collector::{collect_attributes, AttributeResult};
pub use dump::{resolve_scope, DumpOptions, DumpResult, DumpSummary, Dumper};
pub use endpoint::{Connection, Introspector, ManagementEndpoint, ResourceDirectory};
pub use serializer::{serialize, serialize_attributes, SerializeOptions, DEFAULT_MAX_DEPTH};
pub use sink::{OutputSink, WriterSink};
pub use value::{AttributeInfo, CompositeData, ManagementValue, Opaque, Scalar};
