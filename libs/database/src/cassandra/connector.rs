use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::errors::{ExecutionError, NewSessionError};
use scylla::policies::load_balancing::DefaultPolicy;
use std::sync::Arc;
use tracing::info;

use super::CassandraConfig;
use crate::common::{RetryConfig, retry, retry_with_backoff};

/// Error type for Cassandra operations
#[derive(Debug, thiserror::Error)]
pub enum CassandraError {
    #[error("Cassandra error: {0}")]
    Scylla(#[from] NewSessionError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Shared session handle. The driver pools connections per node and accepts
/// concurrent statements, so clones of this handle need no extra locking.
pub type CassandraSession = Arc<Session>;

/// Connect using a CassandraConfig
///
/// The config's request timeout becomes the default execution profile's timeout,
/// so every statement on the session is bounded by it.
///
/// # Example
/// ```ignore
/// use database::cassandra::{CassandraConfig, connect_from_config};
///
/// let config = CassandraConfig::new(vec!["127.0.0.1:9042"]);
/// let session = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(
    config: &CassandraConfig,
) -> Result<CassandraSession, CassandraError> {
    info!(
        contact_points = ?config.contact_points,
        datacenter = ?config.local_datacenter,
        "Attempting to connect to Cassandra"
    );

    let mut profile = ExecutionProfile::builder().request_timeout(Some(config.request_timeout()));
    if let Some(ref dc) = config.local_datacenter {
        profile = profile.load_balancing_policy(
            DefaultPolicy::builder()
                .prefer_datacenter(dc.clone())
                .build(),
        );
    }

    let mut builder = SessionBuilder::new()
        .known_nodes(&config.contact_points)
        .connection_timeout(config.connect_timeout())
        .default_execution_profile_handle(profile.build().into_handle());

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        builder = builder.user(username, password);
    }

    let session: Session = builder.build().await?;

    // Verify connection
    session
        .query_unpaged("SELECT release_version FROM system.local", ())
        .await
        .map_err(|e| CassandraError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to Cassandra");
    Ok(Arc::new(session))
}

/// Connect from config, retrying with backoff while the cluster is unreachable.
///
/// Meant for process startup, where Cassandra may still be coming up alongside
/// the service.
///
/// # Example
/// ```ignore
/// use database::cassandra::connect_from_config_with_retry;
/// use database::common::RetryConfig;
///
/// let session = connect_from_config_with_retry(&config, Some(RetryConfig::new().with_max_retries(10))).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &CassandraConfig,
    retry_config: Option<RetryConfig>,
) -> Result<CassandraSession, CassandraError> {
    match retry_config {
        Some(policy) => {
            retry_with_backoff("cassandra connect", || connect_from_config(config), policy).await
        }
        None => retry("cassandra connect", || connect_from_config(config)).await,
    }
}
