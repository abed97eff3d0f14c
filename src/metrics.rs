//! Prometheus metrics definitions.
//!
//! [`BackupMetrics`] owns the registry and one `GaugeVec` per published
//! metric. It is created once at startup and shared between the polling
//! loop, which resets and repopulates it every cycle, and the HTTP server,
//! which only encodes it.

use crate::error::{MedusaError, Result};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::{debug, error};

const BACKUP_LABELS: &[&str] = &["backup_name", "backup_type"];
const NODE_LABELS: &[&str] = &["backup_name", "backup_type", "node_fqdn"];
const LAST_BACKUP_LABELS: &[&str] = &["backup_type"];

/// Registry of all gauges published by the exporter.
#[derive(Clone)]
pub struct BackupMetrics {
    registry: Registry,

    // Exporter metrics
    pub exporter_status: GaugeVec,
    pub build_info: GaugeVec,

    // Backup metrics
    pub backup_info: GaugeVec,
    pub backup_status: GaugeVec,
    pub backup_duration_seconds: GaugeVec,
    pub backup_size_bytes: GaugeVec,
    pub backup_objects: GaugeVec,
    pub backup_completed_nodes: GaugeVec,
    pub backup_incomplete_nodes: GaugeVec,
    pub backup_missing_nodes: GaugeVec,

    // Node metrics
    pub node_backup_info: GaugeVec,
    pub node_backup_status: GaugeVec,
    pub node_backup_duration_seconds: GaugeVec,
    pub node_backup_size_bytes: GaugeVec,
    pub node_backup_objects: GaugeVec,

    // Last backup metrics
    pub backup_since_last_completion_seconds: GaugeVec,
    pub backup_last_duration_seconds: GaugeVec,
    pub backup_last_size_bytes: GaugeVec,
    pub backup_last_objects: GaugeVec,
}

fn gauge_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> Result<GaugeVec> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

impl BackupMetrics {
    /// Create all gauges in a fresh registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        // Exporter metrics
        let exporter_status = gauge_vec(
            &registry,
            "medusa_exporter_status",
            "Medusa exporter get data status.",
            &["prefix"],
        )?;
        let build_info = gauge_vec(
            &registry,
            "medusa_exporter_build_info",
            "Medusa exporter build information.",
            &["version"],
        )?;
        build_info
            .get_metric_with_label_values(&[env!("CARGO_PKG_VERSION")])?
            .set(1.0);

        // Backup metrics
        let backup_info = gauge_vec(
            &registry,
            "medusa_backup_info",
            "Backup info.",
            &["backup_name", "backup_type", "prefix", "start_time"],
        )?;
        let backup_status = gauge_vec(
            &registry,
            "medusa_backup_status",
            "Backup status.",
            BACKUP_LABELS,
        )?;
        let backup_duration_seconds = gauge_vec(
            &registry,
            "medusa_backup_duration_seconds",
            "Backup duration.",
            &["backup_name", "backup_type", "start_time", "stop_time"],
        )?;
        let backup_size_bytes = gauge_vec(
            &registry,
            "medusa_backup_size_bytes",
            "Backup size.",
            BACKUP_LABELS,
        )?;
        let backup_objects = gauge_vec(
            &registry,
            "medusa_backup_objects",
            "Number of objects in backup.",
            BACKUP_LABELS,
        )?;
        let backup_completed_nodes = gauge_vec(
            &registry,
            "medusa_backup_completed_nodes",
            "Number of completed nodes in backup.",
            BACKUP_LABELS,
        )?;
        let backup_incomplete_nodes = gauge_vec(
            &registry,
            "medusa_backup_incomplete_nodes",
            "Number of incomplete nodes in backup.",
            BACKUP_LABELS,
        )?;
        let backup_missing_nodes = gauge_vec(
            &registry,
            "medusa_backup_missing_nodes",
            "Number of missing nodes in backup.",
            BACKUP_LABELS,
        )?;

        // Node metrics
        let node_backup_info = gauge_vec(
            &registry,
            "medusa_node_backup_info",
            "Node backup info.",
            &[
                "backup_name",
                "backup_type",
                "node_fqdn",
                "prefix",
                "release_version",
                "server_type",
                "start_time",
            ],
        )?;
        let node_backup_status = gauge_vec(
            &registry,
            "medusa_node_backup_status",
            "Node backup status.",
            NODE_LABELS,
        )?;
        let node_backup_duration_seconds = gauge_vec(
            &registry,
            "medusa_node_backup_duration_seconds",
            "Node backup duration.",
            &[
                "backup_name",
                "backup_type",
                "node_fqdn",
                "start_time",
                "stop_time",
            ],
        )?;
        let node_backup_size_bytes = gauge_vec(
            &registry,
            "medusa_node_backup_size_bytes",
            "Node backup size.",
            NODE_LABELS,
        )?;
        let node_backup_objects = gauge_vec(
            &registry,
            "medusa_node_backup_objects",
            "Number of objects in node backup.",
            NODE_LABELS,
        )?;

        // Last backup metrics
        let backup_since_last_completion_seconds = gauge_vec(
            &registry,
            "medusa_backup_since_last_completion_seconds",
            "Time since last full or differential backup completion.",
            LAST_BACKUP_LABELS,
        )?;
        let backup_last_duration_seconds = gauge_vec(
            &registry,
            "medusa_backup_last_duration_seconds",
            "Backup duration for the last full or differential backup.",
            LAST_BACKUP_LABELS,
        )?;
        let backup_last_size_bytes = gauge_vec(
            &registry,
            "medusa_backup_last_size_bytes",
            "Backup size for the last full or differential backup.",
            LAST_BACKUP_LABELS,
        )?;
        let backup_last_objects = gauge_vec(
            &registry,
            "medusa_backup_last_objects",
            "Number of objects in backup for the last full or differential backup.",
            LAST_BACKUP_LABELS,
        )?;

        Ok(Self {
            registry,
            exporter_status,
            build_info,
            backup_info,
            backup_status,
            backup_duration_seconds,
            backup_size_bytes,
            backup_objects,
            backup_completed_nodes,
            backup_incomplete_nodes,
            backup_missing_nodes,
            node_backup_info,
            node_backup_status,
            node_backup_duration_seconds,
            node_backup_size_bytes,
            node_backup_objects,
            backup_since_last_completion_seconds,
            backup_last_duration_seconds,
            backup_last_size_bytes,
            backup_last_objects,
        })
    }

    /// Drop every published series except the build info.
    ///
    /// Backups and nodes come and go between cycles, so series are rebuilt
    /// from scratch instead of being updated in place.
    pub fn reset_all(&self) {
        self.exporter_status.reset();

        self.backup_info.reset();
        self.backup_status.reset();
        self.backup_duration_seconds.reset();
        self.backup_size_bytes.reset();
        self.backup_objects.reset();
        self.backup_completed_nodes.reset();
        self.backup_incomplete_nodes.reset();
        self.backup_missing_nodes.reset();

        self.node_backup_info.reset();
        self.node_backup_status.reset();
        self.node_backup_duration_seconds.reset();
        self.node_backup_size_bytes.reset();
        self.node_backup_objects.reset();

        self.backup_since_last_completion_seconds.reset();
        self.backup_last_duration_seconds.reset();
        self.backup_last_size_bytes.reset();
        self.backup_last_objects.reset();
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        thread_local! {
            static BUFFER: std::cell::RefCell<Vec<u8>> = std::cell::RefCell::new(Vec::with_capacity(8192));
        }

        BUFFER.with(|buf| {
            let mut buffer = buf.borrow_mut();
            buffer.clear();

            encoder
                .encode(&metric_families, &mut *buffer)
                .map_err(|e| MedusaError::Metrics(e.to_string()))?;

            String::from_utf8(buffer.clone()).map_err(|e| MedusaError::Metrics(e.to_string()))
        })
    }
}

/// Set one series of a gauge vector.
pub fn try_set(metric: &GaugeVec, value: f64, labels: &[&str]) -> Result<()> {
    metric.get_metric_with_label_values(labels)?.set(value);
    Ok(())
}

/// Set one series, logging what is published.
///
/// A rejected label set is logged and otherwise ignored so the rest of the
/// cycle still gets published.
pub fn set_metric(metric: &GaugeVec, name: &str, value: f64, labels: &[&str]) {
    debug!(
        metric = name,
        value,
        labels = %labels.join(","),
        "Set up metric"
    );
    if let Err(e) = try_set(metric, value, labels) {
        error!(metric = name, error = %e, "Metric set up failed");
    }
}
