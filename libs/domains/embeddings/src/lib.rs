//! Embeddings Domain
//!
//! Receives `insert` and `get` CloudEvents, stores or reads an opaque
//! embeddings payload keyed by id, and replies with a CloudEvent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← CloudEvents HTTP binding
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Dispatcher  │  ← operation routing, reply building, error classes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Mapper    │  ← decode/validate requests, encode replies
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ RecordStore │  ← Cassandra or in-memory
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_embeddings::{Dispatcher, InMemoryRecordStore, handlers};
//!
//! let dispatcher = Dispatcher::new(InMemoryRecordStore::provisioned());
//! let router = handlers::router(dispatcher);
//! ```

pub mod cassandra;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handlers;
pub mod mapper;
pub mod models;
pub mod repository;

pub use cassandra::CassandraRecordStore;
pub use config::StoreConfig;
pub use dispatcher::{Dispatcher, Rejection, StatusClass};
pub use error::{EmbeddingError, EmbeddingResult};
pub use events::{CloudEvent, EnvelopeError, Operation, ReplyType};
pub use models::{GetRequest, InsertRequest, Record, ReplicationStrategy, ReplyBody, SchemaHandle};
pub use repository::{InMemoryRecordStore, RecordStore};
