//! jmxdump - dump MBean attributes as JSON
//!
//! - [`mbean`] - Value model, collection, serialization and the dump itself
//! - [`jolokia`] - Jolokia agent client, the remote side of a dump
//! - [`config`] - Persistent configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod jolokia;
pub mod mbean;

/// Version injected at compile time via JMXDUMP_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("JMXDUMP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
