//! Database connectors
//!
//! # Features
//!
//! - `cassandra` (default) - Cassandra/ScyllaDB support via the `scylla` driver
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::cassandra::{self, CassandraConfig};
//!
//! let config = CassandraConfig::from_env()?;
//! let session = cassandra::connect_from_config_with_retry(&config, None).await?;
//! ```

pub mod common;

#[cfg(feature = "cassandra")]
pub mod cassandra;

pub use common::RetryConfig;
