//! Embeddings domain models

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{EmbeddingError, EmbeddingResult};

/// Longest keyspace/table name Cassandra accepts
const MAX_IDENTIFIER_LEN: usize = 48;

/// A stored record: a unique id and an opaque embeddings payload.
///
/// Written by `insert` (upsert on the id), read by `get`, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    pub id: String,
    pub embeddings: String,
}

impl Record {
    pub fn new(id: impl Into<String>, embeddings: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            embeddings: embeddings.into(),
        }
    }
}

/// Data of an `insert` event.
///
/// Absent fields decode as empty strings so they fail validation rather than decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct InsertRequest {
    /// Record key
    #[validate(length(min = 1))]
    #[schema(example = "a@example.com")]
    pub id: String,

    /// Opaque payload stored as-is
    #[validate(length(min = 1))]
    #[schema(example = "xyz")]
    pub embeddings: String,
}

impl From<InsertRequest> for Record {
    fn from(req: InsertRequest) -> Self {
        Record::new(req.id, req.embeddings)
    }
}

/// Data of a `get` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GetRequest {
    #[validate(length(min = 1))]
    #[schema(example = "a@example.com")]
    pub id: String,
}

/// Data of every reply event, including the unsupported-operation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReplyBody {
    pub message: String,

    /// Present only on a successful `get`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<String>,
}

impl ReplyBody {
    pub const SUCCESS: &'static str = "Success";

    pub fn success() -> Self {
        Self::message(Self::SUCCESS)
    }

    pub fn with_embeddings(embeddings: impl Into<String>) -> Self {
        Self {
            message: Self::SUCCESS.to_string(),
            embeddings: Some(embeddings.into()),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            embeddings: None,
        }
    }
}

/// Check that `value` can be spliced unquoted into CQL DDL.
pub fn validate_identifier(kind: &str, value: &str) -> EmbeddingResult<()> {
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if starts_with_letter && rest_ok && value.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(EmbeddingError::Config(format!(
            "{kind} name '{value}' must be a letter followed by up to {} letters, digits or underscores",
            MAX_IDENTIFIER_LEN - 1
        )))
    }
}

/// Check that a datacenter name can sit inside a quoted CQL map key.
///
/// Datacenter names come from the cluster topology (`us-east-1`, `DC 2`), so
/// they are not held to identifier rules. Only quotes and control characters
/// are refused.
fn validate_datacenter(name: &str) -> EmbeddingResult<()> {
    if name.is_empty() {
        return Err(EmbeddingError::Config(
            "datacenter name cannot be empty".to_string(),
        ));
    }
    if name.chars().any(|c| c == '\'' || c.is_control()) {
        return Err(EmbeddingError::Config(format!(
            "datacenter name '{}' must not contain quotes or control characters",
            name.escape_debug()
        )));
    }
    Ok(())
}

/// The `(keyspace, table)` pair records live in. Fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaHandle {
    keyspace: String,
    table: String,
}

impl SchemaHandle {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> EmbeddingResult<Self> {
        let keyspace = keyspace.into();
        let table = table.into();
        validate_identifier("keyspace", &keyspace)?;
        validate_identifier("table", &table)?;
        Ok(Self { keyspace, table })
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `keyspace.table`, for statements issued without a session keyspace
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.keyspace, self.table)
    }
}

impl Default for SchemaHandle {
    fn default() -> Self {
        Self {
            keyspace: "Face".to_string(),
            table: "tbl_Face".to_string(),
        }
    }
}

impl fmt::Display for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

/// Keyspace replication used when the keyspace has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationStrategy {
    Simple { replication_factor: u32 },
    NetworkTopology { datacenters: Vec<(String, u32)> },
}

impl ReplicationStrategy {
    /// Parse a strategy name and its replication setting.
    ///
    /// `SimpleStrategy` takes a bare factor (`"3"`); `NetworkTopologyStrategy`
    /// takes `dc:factor` pairs (`"dc1:3,dc2:2"`).
    pub fn parse(strategy: &str, replication: &str) -> EmbeddingResult<Self> {
        let strategy = strategy.trim();
        if strategy.eq_ignore_ascii_case("SimpleStrategy") {
            let replication_factor = parse_factor(replication.trim())?;
            Ok(Self::Simple { replication_factor })
        } else if strategy.eq_ignore_ascii_case("NetworkTopologyStrategy") {
            let datacenters = replication
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| {
                    let (dc, factor) = entry.split_once(':').ok_or_else(|| {
                        EmbeddingError::Config(format!(
                            "replication entry '{entry}' must look like dc:factor"
                        ))
                    })?;
                    let dc = dc.trim();
                    validate_datacenter(dc)?;
                    Ok((dc.to_string(), parse_factor(factor.trim())?))
                })
                .collect::<EmbeddingResult<Vec<_>>>()?;

            if datacenters.is_empty() {
                return Err(EmbeddingError::Config(
                    "NetworkTopologyStrategy needs at least one dc:factor entry".to_string(),
                ));
            }
            Ok(Self::NetworkTopology { datacenters })
        } else {
            Err(EmbeddingError::Config(format!(
                "unknown replication strategy '{strategy}'"
            )))
        }
    }

    /// CQL map literal for `WITH replication = ...`
    pub fn to_cql(&self) -> String {
        match self {
            Self::Simple { replication_factor } => format!(
                "{{'class': 'SimpleStrategy', 'replication_factor': {replication_factor}}}"
            ),
            Self::NetworkTopology { datacenters } => {
                let mut cql = String::from("{'class': 'NetworkTopologyStrategy'");
                for (dc, factor) in datacenters {
                    cql.push_str(&format!(", '{dc}': {factor}"));
                }
                cql.push('}');
                cql
            }
        }
    }
}

impl Default for ReplicationStrategy {
    fn default() -> Self {
        Self::NetworkTopology {
            datacenters: vec![("dc1".to_string(), 1)],
        }
    }
}

fn parse_factor(raw: &str) -> EmbeddingResult<u32> {
    match raw.parse::<u32>() {
        Ok(factor) if factor > 0 => Ok(factor),
        _ => Err(EmbeddingError::Config(format!(
            "replication factor '{raw}' must be a positive integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_request_missing_fields_decode_empty() {
        let req: InsertRequest = serde_json::from_str(r#"{"id":"a@example.com"}"#).unwrap();
        assert_eq!(req.id, "a@example.com");
        assert!(req.embeddings.is_empty());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reply_body_omits_absent_embeddings() {
        let json = serde_json::to_string(&ReplyBody::success()).unwrap();
        assert_eq!(json, r#"{"message":"Success"}"#);

        let json = serde_json::to_string(&ReplyBody::with_embeddings("xyz")).unwrap();
        assert_eq!(json, r#"{"message":"Success","embeddings":"xyz"}"#);
    }

    #[test]
    fn test_identifier_rules() {
        assert!(validate_identifier("keyspace", "Face").is_ok());
        assert!(validate_identifier("table", "tbl_Face").is_ok());
        assert!(validate_identifier("table", &"a".repeat(48)).is_ok());

        let too_long = "a".repeat(49);
        for bad in ["", "1face", "_face", "face; DROP TABLE x", "fa-ce", too_long.as_str()] {
            assert!(
                matches!(validate_identifier("table", bad), Err(EmbeddingError::Config(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_schema_handle_qualified_table() {
        let schema = SchemaHandle::new("Face", "tbl_Face").unwrap();
        assert_eq!(schema.qualified_table(), "Face.tbl_Face");
        assert_eq!(schema, SchemaHandle::default());
        assert!(SchemaHandle::new("Face", "tbl.Face").is_err());
    }

    #[test]
    fn test_default_replication_is_dc1_factor_one() {
        assert_eq!(
            ReplicationStrategy::default().to_cql(),
            "{'class': 'NetworkTopologyStrategy', 'dc1': 1}"
        );
    }

    #[test]
    fn test_parse_replication_strategies() {
        let topology = ReplicationStrategy::parse("NetworkTopologyStrategy", "dc1:3, dc2:2").unwrap();
        assert_eq!(
            topology.to_cql(),
            "{'class': 'NetworkTopologyStrategy', 'dc1': 3, 'dc2': 2}"
        );

        let simple = ReplicationStrategy::parse("simplestrategy", "2").unwrap();
        assert_eq!(simple, ReplicationStrategy::Simple { replication_factor: 2 });
        assert_eq!(
            simple.to_cql(),
            "{'class': 'SimpleStrategy', 'replication_factor': 2}"
        );
    }

    #[test]
    fn test_parse_replication_rejects_bad_input() {
        assert!(ReplicationStrategy::parse("LocalStrategy", "1").is_err());
        assert!(ReplicationStrategy::parse("SimpleStrategy", "0").is_err());
        assert!(ReplicationStrategy::parse("NetworkTopologyStrategy", "").is_err());
        assert!(ReplicationStrategy::parse("NetworkTopologyStrategy", "dc1").is_err());
        assert!(ReplicationStrategy::parse("NetworkTopologyStrategy", "dc'1:1").is_err());
        assert!(ReplicationStrategy::parse("NetworkTopologyStrategy", ":1").is_err());
        assert!(ReplicationStrategy::parse("NetworkTopologyStrategy", "dc\n1:1").is_err());
    }

    #[test]
    fn test_parse_replication_accepts_topology_datacenter_names() {
        let topology =
            ReplicationStrategy::parse("NetworkTopologyStrategy", "us-east-1:3, us-east:2").unwrap();
        assert_eq!(
            topology.to_cql(),
            "{'class': 'NetworkTopologyStrategy', 'us-east-1': 3, 'us-east': 2}"
        );

        let long_name = format!("{}:1", "d".repeat(64));
        assert!(ReplicationStrategy::parse("NetworkTopologyStrategy", &long_name).is_ok());
    }
}
