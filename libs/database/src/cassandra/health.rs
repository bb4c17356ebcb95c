use scylla::client::session::Session;
use std::time::Instant;
use tracing::debug;

use super::connector::CassandraError;

/// Run the cheapest query a node can answer.
///
/// # Example
/// ```ignore
/// use database::cassandra::check_health;
///
/// check_health(&session).await?;
/// ```
pub async fn check_health(session: &Session) -> Result<(), CassandraError> {
    let start = Instant::now();
    session
        .query_unpaged("SELECT release_version FROM system.local", ())
        .await?;
    debug!(
        latency_ms = start.elapsed().as_millis() as u64,
        "Cassandra health check passed"
    );
    Ok(())
}

/// Identity of the coordinator node the session is talking to
#[derive(Debug, Clone, Default)]
pub struct ClusterInfo {
    pub cluster_name: Option<String>,
    pub datacenter: Option<String>,
    pub release_version: Option<String>,
}

/// Read cluster name, datacenter and version from `system.local`.
///
/// Missing or undecodable columns come back as `None` rather than an error.
pub async fn get_cluster_info(session: &Session) -> Result<ClusterInfo, CassandraError> {
    let result = session
        .query_unpaged(
            "SELECT cluster_name, data_center, release_version FROM system.local",
            (),
        )
        .await?;

    let mut info = ClusterInfo::default();

    if let Ok(rows_result) = result.into_rows_result()
        && let Ok(Some((cluster_name, datacenter, release_version))) = rows_result
            .maybe_first_row::<(Option<String>, Option<String>, Option<String>)>()
    {
        info.cluster_name = cluster_name;
        info.datacenter = datacenter;
        info.release_version = release_version;
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scylla::client::session_builder::SessionBuilder;

    async fn local_session() -> Session {
        SessionBuilder::new()
            .known_node("127.0.0.1:9042")
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires actual Cassandra
    async fn test_check_health() {
        let session = local_session().await;
        assert!(check_health(&session).await.is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires actual Cassandra
    async fn test_get_cluster_info() {
        let session = local_session().await;
        let info = get_cluster_info(&session).await.unwrap();
        assert!(info.release_version.is_some());
    }
}
