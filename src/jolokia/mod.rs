//! Jolokia agent access
//!
//! This module provides the remote side of a dump: a client for a Jolokia
//! agent, which exposes JMX over HTTP with JSON request and reply bodies.
//!
//! # Module Structure
//!
//! - [`client`] - Agent client implementing the dump's endpoint traits
//! - [`classify`] - Recovers value shapes from JSON replies using declared types
//! - [`http`] - HTTP utilities for agent calls
//!
//! # Example
//!
//! ```ignore
//! use jmxdump::jolokia::{JolokiaClient, JolokiaSettings};
//! use jmxdump::mbean::ResourceDirectory;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = JolokiaClient::new(&JolokiaSettings::new("http://localhost:8778/jolokia/"))?;
//!     let beans = client.list_resources(Some("java.lang")).await?;
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod client;
pub mod http;

pub use client::{JolokiaClient, JolokiaSettings};
pub use http::{format_jolokia_error, Credentials};
