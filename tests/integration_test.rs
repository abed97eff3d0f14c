//! Integration tests for the Medusa exporter
//!
//! Standard system commands stand in for the `medusa` binary: `echo` prints
//! the arguments it was given, `true` prints nothing and `false` fails.

#![cfg(unix)]

use medusa_exporter::{
    client::MedusaClient, config::MedusaConfig, metrics::BackupMetrics, model::BackupRecord,
    poller::Poller, publisher::SnapshotPublisher, MedusaError,
};
use std::sync::Arc;
use std::time::Duration;

/// Helper to create a client running `binary` instead of medusa
fn create_test_client(binary: &str, config_file: &str, prefix: &str) -> MedusaClient {
    MedusaClient::new(MedusaConfig {
        binary: binary.to_string(),
        config_file: config_file.to_string(),
        prefix: prefix.to_string(),
        timeout_seconds: 5,
    })
}

fn completed_backup() -> BackupRecord {
    serde_json::from_str(
        r#"{"backup_type":"full","completed_nodes":1,"finished":1697712000,
        "incomplete_nodes":0,"incomplete_nodes_list":[],"missing_nodes":0,
        "missing_nodes_list":[],"name":"b1","nodes":[{"finished":1697712000,
        "fqdn":"n1","num_objects":100,"release_version":"5.0.4","server_type":"cassandra",
        "size":1024,"started":1697711900}],"num_objects":100,"size":1024,"started":1697711900}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_passes_arguments_in_order() {
    let client = create_test_client("echo", "/etc/medusa/medusa.ini", "prod");

    let output = client.fetch().await.unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "--config-file /etc/medusa/medusa.ini --prefix prod list-backups --output json\n"
    );
}

#[tokio::test]
async fn test_fetch_without_optional_arguments() {
    let client = create_test_client("echo", "", "");

    let output = client.fetch().await.unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "list-backups --output json\n"
    );
}

#[tokio::test]
async fn test_fetch_non_zero_exit() {
    let client = create_test_client("false", "", "");

    let result = client.fetch().await;

    assert!(matches!(result, Err(MedusaError::Command(_))));
}

#[tokio::test]
async fn test_fetch_missing_binary() {
    let client = create_test_client("/nonexistent/medusa", "", "");

    let result = client.fetch().await;

    assert!(matches!(result, Err(MedusaError::Io(_))));
}

#[tokio::test]
async fn test_list_backups_empty_output_is_parse_error() {
    let client = create_test_client("true", "", "");

    let result = client.list_backups().await;

    assert!(matches!(result, Err(MedusaError::Parse(_))));
}

#[tokio::test]
async fn test_failed_fetch_clears_previous_cycle() {
    let metrics = Arc::new(BackupMetrics::new().unwrap());
    let publisher = SnapshotPublisher::new(metrics.clone(), "");

    // Values from an earlier successful cycle
    publisher.publish(Some(&[completed_backup()]), 1697712100);
    let body = metrics.encode().unwrap();
    assert!(body.contains(r#"medusa_backup_status{backup_name="b1",backup_type="full"} 0"#));
    assert!(body.contains(r#"medusa_exporter_status{prefix="no-prefix"} 1"#));

    let poller = Poller::new(
        create_test_client("false", "", ""),
        publisher,
        Duration::from_secs(600),
    );
    let tracker = poller.run_cycle().await;

    let body = metrics.encode().unwrap();
    assert!(body.contains(r#"medusa_exporter_status{prefix="no-prefix"} 0"#));
    assert!(!body.contains("medusa_backup_status{"));
    assert!(!body.contains("medusa_node_backup_size_bytes{"));
    assert!(!body.contains("medusa_backup_last_duration_seconds{"));
    assert!(!tracker.has_any_completion());
}

#[tokio::test]
async fn test_unparseable_output_sets_status_zero() {
    let metrics = Arc::new(BackupMetrics::new().unwrap());
    let publisher = SnapshotPublisher::new(metrics.clone(), "prod");

    // `echo` prints its arguments, which is not JSON
    let poller = Poller::new(
        create_test_client("echo", "", "prod"),
        publisher,
        Duration::from_secs(600),
    );
    poller.run_cycle().await;

    let body = metrics.encode().unwrap();
    assert!(body.contains(r#"medusa_exporter_status{prefix="prod"} 0"#));
    assert!(!body.contains("medusa_backup_info{"));
}

#[tokio::test]
async fn test_empty_output_sets_status_zero() {
    let metrics = Arc::new(BackupMetrics::new().unwrap());
    let publisher = SnapshotPublisher::new(metrics.clone(), "");

    let poller = Poller::new(
        create_test_client("true", "", ""),
        publisher,
        Duration::from_secs(600),
    );
    poller.run_cycle().await;

    let body = metrics.encode().unwrap();
    assert!(body.contains(r#"medusa_exporter_status{prefix="no-prefix"} 0"#));
}
