//! Publishing of one polling cycle's backup list.
//!
//! Every pass resets the registry first, so a failed cycle never leaves the
//! previous cycle's values exposed as current.

use crate::derivation::{calculate_duration, format_timestamp, node_start_label, prefix_label};
use crate::metrics::{set_metric, BackupMetrics};
use crate::model::{BackupRecord, BackupStatus, NodeRecord};
use crate::tracker::GenerationTracker;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns a decoded backup list into published gauges.
#[derive(Clone)]
pub struct SnapshotPublisher {
    metrics: Arc<BackupMetrics>,
    prefix: String,
}

impl SnapshotPublisher {
    pub fn new(metrics: Arc<BackupMetrics>, prefix: impl Into<String>) -> Self {
        Self {
            metrics,
            prefix: prefix.into(),
        }
    }

    pub fn metrics(&self) -> &Arc<BackupMetrics> {
        &self.metrics
    }

    /// Publish one cycle.
    ///
    /// `backups` is `None` when fetching or decoding failed; the exporter
    /// status is then 0 and no backup series are published. `now` is the
    /// Unix time used for the "since last completion" gauge.
    ///
    /// Returns the generation state built from this cycle's records.
    pub fn publish(&self, backups: Option<&[BackupRecord]>, now: i64) -> GenerationTracker {
        let mut tracker = GenerationTracker::new();

        if let Some([]) = backups {
            warn!("No backup data returned");
        }

        self.metrics.reset_all();
        self.publish_exporter_status(backups.is_some());

        let backups = backups.unwrap_or_default();
        debug!("Publishing metrics for {} backups", backups.len());

        for backup in backups {
            self.publish_backup(backup);
            // Only completed backups are considered.
            if backup.is_complete() {
                tracker.update(backup);
            }
        }

        // Without any completed backup the last backup series stay absent.
        if tracker.has_any_completion() {
            self.publish_last_backups(&tracker, now);
        }

        tracker
    }

    fn publish_exporter_status(&self, success: bool) {
        set_metric(
            &self.metrics.exporter_status,
            "medusa_exporter_status",
            if success { 1.0 } else { 0.0 },
            &[prefix_label(&self.prefix)],
        );
    }

    fn publish_backup(&self, backup: &BackupRecord) {
        let m = &self.metrics;
        let prefix = prefix_label(&self.prefix);
        let name = backup.name.as_str();
        let backup_type = backup.backup_type.as_str();
        let start_time = format_timestamp(backup.started);
        let labels = [name, backup_type];

        set_metric(
            &m.backup_info,
            "medusa_backup_info",
            1.0,
            &[name, backup_type, prefix, &start_time],
        );
        set_metric(
            &m.backup_status,
            "medusa_backup_status",
            BackupStatus::from_finished(backup.finished).code(),
            &labels,
        );

        let (duration, stop_time) = calculate_duration(backup.started, backup.finished);
        set_metric(
            &m.backup_duration_seconds,
            "medusa_backup_duration_seconds",
            duration,
            &[name, backup_type, &start_time, &stop_time],
        );
        set_metric(
            &m.backup_size_bytes,
            "medusa_backup_size_bytes",
            backup.size as f64,
            &labels,
        );
        set_metric(
            &m.backup_objects,
            "medusa_backup_objects",
            backup.num_objects as f64,
            &labels,
        );
        set_metric(
            &m.backup_completed_nodes,
            "medusa_backup_completed_nodes",
            backup.completed_nodes as f64,
            &labels,
        );
        set_metric(
            &m.backup_incomplete_nodes,
            "medusa_backup_incomplete_nodes",
            backup.incomplete_nodes as f64,
            &labels,
        );
        set_metric(
            &m.backup_missing_nodes,
            "medusa_backup_missing_nodes",
            backup.missing_nodes as f64,
            &labels,
        );

        // Medusa should only list finished nodes here, but the status is
        // still derived from each node's own stop time.
        for node in &backup.nodes {
            self.publish_node(
                backup,
                node,
                BackupStatus::from_finished(node.finished),
            );
        }
        for node in &backup.incomplete_nodes_list {
            self.publish_node(backup, &node.to_record(), BackupStatus::Incomplete);
        }
        for fqdn in &backup.missing_nodes_list {
            self.publish_node(backup, &NodeRecord::placeholder(fqdn), BackupStatus::Missing);
        }
    }

    fn publish_node(&self, backup: &BackupRecord, node: &NodeRecord, status: BackupStatus) {
        let m = &self.metrics;
        let name = backup.name.as_str();
        let backup_type = backup.backup_type.as_str();
        let fqdn = node.fqdn.as_str();
        let start_time = node_start_label(node.started);
        let labels = [name, backup_type, fqdn];

        set_metric(
            &m.node_backup_info,
            "medusa_node_backup_info",
            1.0,
            &[
                name,
                backup_type,
                fqdn,
                prefix_label(&self.prefix),
                &node.release_version,
                &node.server_type,
                &start_time,
            ],
        );
        set_metric(
            &m.node_backup_status,
            "medusa_node_backup_status",
            status.code(),
            &labels,
        );

        let (duration, stop_time) = calculate_duration(node.started, node.finished);
        set_metric(
            &m.node_backup_duration_seconds,
            "medusa_node_backup_duration_seconds",
            duration,
            &[name, backup_type, fqdn, &start_time, &stop_time],
        );
        set_metric(
            &m.node_backup_size_bytes,
            "medusa_node_backup_size_bytes",
            node.size as f64,
            &labels,
        );
        set_metric(
            &m.node_backup_objects,
            "medusa_node_backup_objects",
            node.num_objects as f64,
            &labels,
        );
    }

    fn publish_last_backups(&self, tracker: &GenerationTracker, now: i64) {
        let m = &self.metrics;
        for summary in tracker.summaries() {
            let labels = [summary.kind.label()];
            set_metric(
                &m.backup_since_last_completion_seconds,
                "medusa_backup_since_last_completion_seconds",
                now.saturating_sub(summary.finished) as f64,
                &labels,
            );
            set_metric(
                &m.backup_last_duration_seconds,
                "medusa_backup_last_duration_seconds",
                summary.finished.saturating_sub(summary.started) as f64,
                &labels,
            );
            set_metric(
                &m.backup_last_size_bytes,
                "medusa_backup_last_size_bytes",
                summary.size as f64,
                &labels,
            );
            set_metric(
                &m.backup_last_objects,
                "medusa_backup_last_objects",
                summary.num_objects as f64,
                &labels,
            );
        }
    }
}
