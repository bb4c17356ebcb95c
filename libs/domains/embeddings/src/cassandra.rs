use async_trait::async_trait;
use database::cassandra::{CassandraSession, check_health};
use scylla::statement::prepared::PreparedStatement;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::models::{ReplicationStrategy, SchemaHandle};
use crate::repository::RecordStore;

/// Cassandra/ScyllaDB-backed record store.
///
/// Table layout: `id text PRIMARY KEY, payload text`. Statements are fully
/// qualified with the keyspace and always bind their values; only the
/// validated schema identifiers are formatted into CQL.
pub struct CassandraRecordStore {
    session: CassandraSession,
    schema: SchemaHandle,
    replication: ReplicationStrategy,
    statements: OnceCell<Statements>,
}

struct Statements {
    insert: PreparedStatement,
    select: PreparedStatement,
}

impl CassandraRecordStore {
    pub fn new(
        session: CassandraSession,
        schema: SchemaHandle,
        replication: ReplicationStrategy,
    ) -> Self {
        Self {
            session,
            schema,
            replication,
            statements: OnceCell::new(),
        }
    }

    pub fn schema(&self) -> &SchemaHandle {
        &self.schema
    }

    /// Prepared on first use. A failed attempt is not cached, so a call
    /// made before the table exists can succeed later.
    async fn statements(&self) -> EmbeddingResult<&Statements> {
        self.statements
            .get_or_try_init(|| async {
                let table = self.schema.qualified_table();
                let insert = self
                    .session
                    .prepare(format!("INSERT INTO {table} (id, payload) VALUES (?, ?)"))
                    .await
                    .map_err(|e| EmbeddingError::Store(e.to_string()))?;
                let select = self
                    .session
                    .prepare(format!("SELECT payload FROM {table} WHERE id = ?"))
                    .await
                    .map_err(|e| EmbeddingError::Store(e.to_string()))?;
                debug!(table = %table, "Prepared record statements");
                Ok::<_, EmbeddingError>(Statements { insert, select })
            })
            .await
    }
}

fn create_keyspace_cql(schema: &SchemaHandle, replication: &ReplicationStrategy) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {}",
        schema.keyspace(),
        replication.to_cql()
    )
}

fn create_table_cql(schema: &SchemaHandle) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (id text PRIMARY KEY, payload text)",
        schema.qualified_table()
    )
}

#[async_trait]
impl RecordStore for CassandraRecordStore {
    #[instrument(skip(self), fields(schema = %self.schema))]
    async fn ensure_schema(&self) -> EmbeddingResult<()> {
        self.session
            .query_unpaged(create_keyspace_cql(&self.schema, &self.replication), ())
            .await
            .map_err(|e| EmbeddingError::Schema(format!("keyspace {}: {e}", self.schema.keyspace())))?;

        self.session
            .query_unpaged(create_table_cql(&self.schema), ())
            .await
            .map_err(|e| EmbeddingError::Schema(format!("table {}: {e}", self.schema)))?;

        info!("Schema is in place");
        Ok(())
    }

    #[instrument(skip(self, embeddings), fields(record_id = %id))]
    async fn put(&self, id: &str, embeddings: &str) -> EmbeddingResult<()> {
        let statements = self.statements().await?;
        self.session
            .execute_unpaged(&statements.insert, (id, embeddings))
            .await
            .map_err(|e| EmbeddingError::Store(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self), fields(record_id = %id))]
    async fn get(&self, id: &str) -> EmbeddingResult<String> {
        let statements = self.statements().await?;
        let result = self
            .session
            .execute_unpaged(&statements.select, (id,))
            .await
            .map_err(|e| EmbeddingError::Store(e.to_string()))?;

        let rows = result
            .into_rows_result()
            .map_err(|e| EmbeddingError::Store(e.to_string()))?;

        match rows.maybe_first_row::<(Option<String>,)>() {
            Ok(Some((Some(payload),))) => Ok(payload),
            Ok(Some((None,))) | Ok(None) => Err(EmbeddingError::NotFound(id.to_string())),
            Err(e) => Err(EmbeddingError::Store(e.to_string())),
        }
    }

    async fn health_check(&self) -> EmbeddingResult<()> {
        check_health(&self.session).await?;
        Ok(())
    }
}
