//! Backup records as reported by `medusa list-backups --output json`.
//!
//! The feed is decoded leniently: unknown fields are ignored, absent fields
//! default to zero or empty, and `null` is treated like an absent field.

use serde::{Deserialize, Deserializer, Serialize};

/// Label used for timestamps and node attributes that carry no value.
pub const NONE_LABEL: &str = "none";

/// One backup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Generation kind as free text ("full" or "differential")
    #[serde(deserialize_with = "null_as_default")]
    pub backup_type: String,

    /// Unix timestamp in seconds
    #[serde(deserialize_with = "null_as_default")]
    pub started: i64,

    /// Unix timestamp in seconds, 0 or `null` while the backup is running
    #[serde(deserialize_with = "null_as_default")]
    pub finished: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub size: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub num_objects: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub completed_nodes: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub incomplete_nodes: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub missing_nodes: i64,

    #[serde(deserialize_with = "null_as_empty")]
    pub nodes: Vec<NodeRecord>,

    #[serde(deserialize_with = "null_as_empty")]
    pub incomplete_nodes_list: Vec<IncompleteNode>,

    #[serde(deserialize_with = "null_as_empty")]
    pub missing_nodes_list: Vec<String>,
}

impl BackupRecord {
    /// Whether the backup run has finished.
    pub fn is_complete(&self) -> bool {
        self.finished > 0
    }

    /// Generation kind, if the feed's label is one the exporter tracks.
    pub fn generation_kind(&self) -> Option<GenerationKind> {
        GenerationKind::from_label(&self.backup_type)
    }
}

/// One node's participation in a backup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub fqdn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub started: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub finished: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub size: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub num_objects: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub release_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub server_type: String,
}

impl NodeRecord {
    /// Identity-only record for a node that carries no telemetry.
    pub fn placeholder(fqdn: &str) -> Self {
        Self {
            fqdn: fqdn.to_string(),
            started: 0,
            finished: 0,
            size: 0,
            num_objects: 0,
            release_version: NONE_LABEL.to_string(),
            server_type: NONE_LABEL.to_string(),
        }
    }
}

/// Entry of `incomplete_nodes_list`.
///
/// Medusa releases disagree on the shape of this list: some emit full node
/// objects, others only the node FQDN. Both are accepted per element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncompleteNode {
    Record(NodeRecord),
    Fqdn(String),
}

impl IncompleteNode {
    pub fn fqdn(&self) -> &str {
        match self {
            IncompleteNode::Record(node) => &node.fqdn,
            IncompleteNode::Fqdn(fqdn) => fqdn,
        }
    }

    /// Node record to publish for this entry.
    pub fn to_record(&self) -> NodeRecord {
        match self {
            IncompleteNode::Record(node) => node.clone(),
            IncompleteNode::Fqdn(fqdn) => NodeRecord::placeholder(fqdn),
        }
    }
}

/// Backup generation kinds tracked for the "last backup" metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationKind {
    Full,
    /// Reported by Medusa as "differential"
    Incremental,
}

impl GenerationKind {
    pub const FULL_LABEL: &'static str = "full";
    pub const INCREMENTAL_LABEL: &'static str = "differential";

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            Self::FULL_LABEL => Some(GenerationKind::Full),
            Self::INCREMENTAL_LABEL => Some(GenerationKind::Incremental),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GenerationKind::Full => Self::FULL_LABEL,
            GenerationKind::Incremental => Self::INCREMENTAL_LABEL,
        }
    }
}

/// Completion status of a backup or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    Complete,
    Incomplete,
    Missing,
}

impl BackupStatus {
    /// Status of an entry found in a regular list.
    pub fn from_finished(finished: i64) -> Self {
        if finished > 0 {
            BackupStatus::Complete
        } else {
            BackupStatus::Incomplete
        }
    }

    /// Value published for `*_status` gauges.
    pub fn code(self) -> f64 {
        match self {
            BackupStatus::Complete => 0.0,
            BackupStatus::Incomplete => 1.0,
            BackupStatus::Missing => 2.0,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let json = r#"{"backup_type":"full","complete":true,"completed_nodes":1,
            "finished":1760340315,"incomplete_nodes":0,"incomplete_nodes_list":[],
            "missing_nodes":0,"missing_nodes_list":[],"name":"202510130725",
            "nodes":[{"finished":1760340315,"fqdn":"592136a8eb9f","num_objects":320,
            "release_version":"5.0.4","server_type":"cassandra","size":1507022,"started":1760340312}],
            "num_objects":320,"size":1507022,"started":1760340312,"total_nodes":1}"#;

        let record: BackupRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "202510130725");
        assert_eq!(record.generation_kind(), Some(GenerationKind::Full));
        assert!(record.is_complete());
        assert_eq!(record.nodes.len(), 1);
        assert_eq!(record.nodes[0].fqdn, "592136a8eb9f");
        assert_eq!(record.nodes[0].release_version, "5.0.4");
        assert_eq!(record.size, 1507022);
    }

    #[test]
    fn test_incomplete_nodes_accept_both_shapes() {
        let json = r#"{"name":"b","backup_type":"differential",
            "incomplete_nodes_list":[
                {"fqdn":"node1","started":10,"finished":0,"release_version":"4.1","server_type":"cassandra"},
                "node2"
            ]}"#;

        let record: BackupRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.incomplete_nodes_list.len(), 2);
        assert_eq!(record.incomplete_nodes_list[0].fqdn(), "node1");
        assert_eq!(record.incomplete_nodes_list[0].to_record().started, 10);

        let synthesized = record.incomplete_nodes_list[1].to_record();
        assert_eq!(synthesized, NodeRecord::placeholder("node2"));
        assert_eq!(synthesized.server_type, NONE_LABEL);
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let json = r#"{"name":"b","nodes":null,"missing_nodes_list":null}"#;

        let record: BackupRecord = serde_json::from_str(json).unwrap();
        assert!(record.nodes.is_empty());
        assert!(record.missing_nodes_list.is_empty());
        assert!(record.incomplete_nodes_list.is_empty());
        assert_eq!(record.finished, 0);
        assert!(!record.is_complete());
        assert_eq!(record.generation_kind(), None);
    }

    #[test]
    fn test_null_fields_of_running_backup() {
        let json = r#"{"backup_type":"full","name":"running","started":1697711900,
            "finished":null,"size":null,"num_objects":null,"completed_nodes":0,
            "incomplete_nodes":1,"missing_nodes":null,
            "nodes":[{"fqdn":"n0","started":1697711900,"finished":null,"size":null,
                "num_objects":null,"release_version":null,"server_type":"cassandra"}],
            "incomplete_nodes_list":[{"fqdn":"n1","started":1697711900,"finished":null,
                "release_version":"5.0.4","server_type":null}]}"#;

        let record: BackupRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "running");
        assert_eq!(record.finished, 0);
        assert!(!record.is_complete());
        assert_eq!(record.size, 0);
        assert_eq!(record.missing_nodes, 0);

        assert_eq!(record.nodes[0].finished, 0);
        assert_eq!(record.nodes[0].release_version, "");

        let incomplete = record.incomplete_nodes_list[0].to_record();
        assert!(matches!(record.incomplete_nodes_list[0], IncompleteNode::Record(_)));
        assert_eq!(incomplete.fqdn, "n1");
        assert_eq!(incomplete.finished, 0);
        assert_eq!(incomplete.started, 1697711900);
        assert_eq!(incomplete.server_type, "");
    }

    #[test]
    fn test_negative_counts_decode() {
        let json = r#"{"name":"corrupt","backup_type":"full","size":-1,"num_objects":-5}"#;

        let record: BackupRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.size, -1);
        assert_eq!(record.num_objects, -5);
    }

    #[test]
    fn test_generation_kind_labels() {
        assert_eq!(GenerationKind::from_label("full"), Some(GenerationKind::Full));
        assert_eq!(
            GenerationKind::from_label("differential"),
            Some(GenerationKind::Incremental)
        );
        assert_eq!(GenerationKind::from_label("Full"), None);
        assert_eq!(GenerationKind::Incremental.label(), "differential");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(BackupStatus::from_finished(1), BackupStatus::Complete);
        assert_eq!(BackupStatus::from_finished(0), BackupStatus::Incomplete);
        assert_eq!(BackupStatus::Complete.code(), 0.0);
        assert_eq!(BackupStatus::Incomplete.code(), 1.0);
        assert_eq!(BackupStatus::Missing.code(), 2.0);
    }
}
