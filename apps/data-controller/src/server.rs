use axum::Router;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::{AppInfo, server::ServerConfig};
use database::cassandra::{connect_from_config_with_retry, get_cluster_info};
use domain_embeddings::handlers::{self, ApiDoc};
use domain_embeddings::{CassandraRecordStore, Dispatcher, RecordStore};
use eyre::WrapErr;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// Compose the receiver, docs and health endpoints.
///
/// - `/`: CloudEvents receiver (bounded by the request timeout)
/// - `/ready`: store readiness
/// - `/health`: liveness with app name/version
/// - `/swagger-ui`: API docs
pub fn build_router<S: RecordStore + 'static>(
    dispatcher: Dispatcher<S>,
    app: AppInfo,
    server: &ServerConfig,
) -> Router {
    let api_routes = handlers::router(dispatcher);
    create_router::<ApiDoc>(api_routes, server.request_timeout).merge(health_router(app))
}

/// Connect, provision the schema, then serve until SIGINT/SIGTERM.
///
/// Nothing is served unless the keyspace and table are in place.
pub async fn run(config: Config) -> eyre::Result<()> {
    let session = connect_from_config_with_retry(&config.cassandra, None)
        .await
        .wrap_err("Cassandra connection failed")?;

    match get_cluster_info(&session).await {
        Ok(cluster) => info!(
            cluster = cluster.cluster_name.as_deref().unwrap_or("unknown"),
            datacenter = cluster.datacenter.as_deref().unwrap_or("unknown"),
            version = cluster.release_version.as_deref().unwrap_or("unknown"),
            "Connected to Cassandra cluster"
        ),
        Err(e) => tracing::warn!("Could not read cluster info: {}", e),
    }

    let store = Arc::new(CassandraRecordStore::new(
        session,
        config.store.schema.clone(),
        config.store.replication.clone(),
    ));
    store
        .ensure_schema()
        .await
        .wrap_err_with(|| format!("Failed to provision {}", config.store.schema))?;

    let app = build_router(
        Dispatcher::from_shared(Arc::clone(&store)),
        config.app,
        &config.server,
    );

    info!(
        schema = %config.store.schema,
        "Starting data-controller with graceful shutdown ({:?} timeout)",
        config.server.shutdown_timeout
    );

    create_production_app(app, &config.server, async move {
        info!("Shutting down: closing Cassandra session");
        // The router and its dispatcher are gone once serving stops, so this
        // is the last handle to the session
        drop(store);
        info!("Cassandra session closed");
    })
    .await
    .wrap_err("Server error")?;

    info!("data-controller shutdown complete");
    Ok(())
}
