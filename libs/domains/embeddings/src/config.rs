use core_config::{ConfigError, FromEnv, env_or_default};

use crate::error::EmbeddingError;
use crate::models::{ReplicationStrategy, SchemaHandle, validate_identifier};

/// Where records live and how their keyspace is replicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub schema: SchemaHandle,
    pub replication: ReplicationStrategy,
}

impl FromEnv for StoreConfig {
    /// - STORE_KEYSPACE: defaults to Face
    /// - STORE_TABLE: defaults to tbl_Face
    /// - STORE_REPLICATION_STRATEGY: defaults to NetworkTopologyStrategy
    /// - STORE_REPLICATION: defaults to dc1:1
    fn from_env() -> Result<Self, ConfigError> {
        let keyspace = env_or_default("STORE_KEYSPACE", "Face");
        let table = env_or_default("STORE_TABLE", "tbl_Face");
        validate_identifier("keyspace", &keyspace).map_err(|e| invalid("STORE_KEYSPACE", e))?;
        let schema = SchemaHandle::new(keyspace, table).map_err(|e| invalid("STORE_TABLE", e))?;

        let strategy = env_or_default("STORE_REPLICATION_STRATEGY", "NetworkTopologyStrategy");
        let replication = env_or_default("STORE_REPLICATION", "dc1:1");
        let replication = ReplicationStrategy::parse(&strategy, &replication)
            .map_err(|e| invalid("STORE_REPLICATION", e))?;

        Ok(Self {
            schema,
            replication,
        })
    }
}

fn invalid(key: &str, err: EmbeddingError) -> ConfigError {
    ConfigError::ParseError {
        key: key.to_string(),
        details: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 4] = [
        "STORE_KEYSPACE",
        "STORE_TABLE",
        "STORE_REPLICATION_STRATEGY",
        "STORE_REPLICATION",
    ];

    #[test]
    fn test_store_config_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = StoreConfig::from_env().unwrap();
            assert_eq!(config, StoreConfig::default());
            assert_eq!(config.schema.qualified_table(), "Face.tbl_Face");
        });
    }

    #[test]
    fn test_store_config_custom_values() {
        temp_env::with_vars(
            [
                ("STORE_KEYSPACE", Some("embeddings")),
                ("STORE_TABLE", Some("faces")),
                ("STORE_REPLICATION_STRATEGY", Some("SimpleStrategy")),
                ("STORE_REPLICATION", Some("3")),
            ],
            || {
                let config = StoreConfig::from_env().unwrap();
                assert_eq!(config.schema.keyspace(), "embeddings");
                assert_eq!(config.schema.table(), "faces");
                assert_eq!(
                    config.replication,
                    ReplicationStrategy::Simple {
                        replication_factor: 3
                    }
                );
            },
        );
    }

    #[test]
    fn test_store_config_rejects_unsafe_identifier() {
        temp_env::with_vars(
            [
                ("STORE_KEYSPACE", Some("Face")),
                ("STORE_TABLE", Some("tbl_Face; DROP KEYSPACE Face")),
                ("STORE_REPLICATION_STRATEGY", None),
                ("STORE_REPLICATION", None),
            ],
            || {
                let err = StoreConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::ParseError { .. }));
            },
        );
    }
}
