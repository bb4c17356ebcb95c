//! data-controller: CloudEvents receiver that stores and serves embeddings
//! records in Cassandra.

pub mod config;
pub mod server;

pub use config::Config;
pub use server::{build_router, run};
