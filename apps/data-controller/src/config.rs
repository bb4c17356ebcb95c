use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::cassandra::CassandraConfig;
use domain_embeddings::StoreConfig;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub cassandra: CassandraConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let cassandra = CassandraConfig::from_env()?; // Required - CASSANDRA_CONTACT_POINTS or CASSANDRA
        let store = StoreConfig::from_env()?; // Defaults: Face.tbl_Face, dc1:1
        let server = ServerConfig::from_env()?; // Defaults: HOST=0.0.0.0, PORT=8080

        Ok(Self {
            app: app_info!(),
            cassandra,
            store,
            server,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_cassandra() {
        temp_env::with_vars_unset(["CASSANDRA_CONTACT_POINTS", "CASSANDRA"], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_config_from_legacy_cassandra_var() {
        temp_env::with_vars(
            [
                ("CASSANDRA_CONTACT_POINTS", None),
                ("CASSANDRA", Some("cassandra:9042")),
                ("STORE_KEYSPACE", None),
                ("STORE_TABLE", None),
                ("PORT", Some("9090")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "data_controller");
                assert_eq!(config.cassandra.contact_points(), ["cassandra:9042"]);
                assert_eq!(config.store.schema.qualified_table(), "Face.tbl_Face");
                assert_eq!(config.server.port, 9090);
            },
        );
    }
}
