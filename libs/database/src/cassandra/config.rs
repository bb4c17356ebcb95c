#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};
use std::time::Duration;

/// Cassandra/ScyllaDB connection settings
///
/// Constructed manually or, with the `config` feature, from environment variables.
/// Keyspaces are not part of the connection: statements are issued fully qualified.
///
/// # Example
///
/// ```ignore
/// use database::cassandra::CassandraConfig;
///
/// let config = CassandraConfig::new(vec!["127.0.0.1:9042"])
///     .with_datacenter("dc1")
///     .with_request_timeout(20);
/// ```
#[derive(Clone, Debug)]
pub struct CassandraConfig {
    /// Contact points (host:port pairs)
    pub contact_points: Vec<String>,

    /// Optional datacenter for DC-aware load balancing
    pub local_datacenter: Option<String>,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// Per-statement timeout in seconds, enforced by the driver
    pub request_timeout_secs: u64,
}

impl CassandraConfig {
    pub fn new<S: Into<String>>(contact_points: Vec<S>) -> Self {
        Self {
            contact_points: contact_points.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the local datacenter for DC-aware load balancing
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.local_datacenter = Some(datacenter.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn contact_points(&self) -> &[String] {
        &self.contact_points
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            contact_points: vec!["127.0.0.1:9042".to_string()],
            local_datacenter: None,
            username: None,
            password: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 20,
        }
    }
}

/// Split a comma-separated contact point list, dropping blanks.
#[cfg(feature = "config")]
fn parse_contact_points(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load CassandraConfig from environment variables
///
/// - `CASSANDRA_CONTACT_POINTS` (required, `CASSANDRA` accepted as a fallback) -
///   comma-separated `host:port` list
/// - `CASSANDRA_DATACENTER` (optional)
/// - `CASSANDRA_USERNAME` / `CASSANDRA_PASSWORD` (optional)
/// - `CASSANDRA_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `CASSANDRA_REQUEST_TIMEOUT_SECS` (default: 20)
#[cfg(feature = "config")]
impl FromEnv for CassandraConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("CASSANDRA_CONTACT_POINTS")
            .or_else(|_| std::env::var("CASSANDRA"))
            .map_err(|_| ConfigError::MissingEnvVar("CASSANDRA_CONTACT_POINTS".to_string()))?;

        let contact_points = parse_contact_points(&raw);
        if contact_points.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CASSANDRA_CONTACT_POINTS".to_string(),
                details: "No valid contact points provided".to_string(),
            });
        }

        let defaults = Self::default();

        Ok(Self {
            contact_points,
            local_datacenter: std::env::var("CASSANDRA_DATACENTER").ok(),
            username: std::env::var("CASSANDRA_USERNAME").ok(),
            password: std::env::var("CASSANDRA_PASSWORD").ok(),
            connect_timeout_secs: env_parse(
                "CASSANDRA_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            request_timeout_secs: env_parse(
                "CASSANDRA_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }
}
