//! Cassandra/ScyllaDB connector and utilities
//!
//! Uses the `scylla` driver, which speaks the native protocol to both Apache
//! Cassandra and ScyllaDB.
//!
//! # Example
//!
//! ```ignore
//! use database::cassandra::{CassandraConfig, connect_from_config, check_health};
//!
//! let config = CassandraConfig::new(vec!["127.0.0.1:9042"])
//!     .with_datacenter("dc1")
//!     .with_credentials("user", "password");
//! let session = connect_from_config(&config).await?;
//! check_health(&session).await?;
//! ```

mod config;
mod connector;
mod health;

pub use config::CassandraConfig;
pub use connector::{
    CassandraError, CassandraSession, connect_from_config, connect_from_config_with_retry,
};
pub use health::{ClusterInfo, check_health, get_cluster_info};

// Re-export scylla types for convenience
pub use scylla::client::session::Session;
