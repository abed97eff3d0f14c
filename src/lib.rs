//! # Medusa Exporter
//!
//! A Prometheus metrics exporter for Medusa, the backup tool for Apache
//! Cassandra.
//!
//! ## Overview
//!
//! The exporter periodically runs `medusa list-backups --output json` and
//! publishes:
//!
//! - Per-backup metrics (status, duration, size, objects, node tallies)
//! - Per-node metrics for completed, incomplete and missing nodes
//! - Time since, duration, size and objects of the last full and
//!   differential backups
//! - Exporter status
//!
//! ## Quick Start
//!
//! ```no_run
//! use medusa_exporter::{
//!     client::MedusaClient, config::Settings, metrics::BackupMetrics, poller::Poller,
//!     publisher::SnapshotPublisher, server::start_server,
//! };
//! use std::{sync::Arc, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(None)?;
//!     let metrics = Arc::new(BackupMetrics::new()?);
//!
//!     let publisher = SnapshotPublisher::new(metrics.clone(), settings.medusa.prefix.clone());
//!     let client = MedusaClient::new(settings.medusa.clone());
//!     let interval = Duration::from_secs(settings.exporter.collect_interval_seconds);
//!     tokio::spawn(Poller::new(client, publisher, interval).run());
//!
//!     start_server("0.0.0.0:19500", "/metrics", metrics, std::future::pending()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Runs Medusa and decodes its backup list
//! - [`config`] - Configuration management
//! - [`derivation`] - Metric values and labels derived from records
//! - [`error`] - Error types and handling
//! - [`metrics`] - Prometheus metrics definitions
//! - [`model`] - Backup and node records
//! - [`poller`] - Polling loop
//! - [`publisher`] - Publishing of one polling cycle
//! - [`server`] - HTTP server for exposing metrics
//! - [`tracker`] - Last completed backup per generation kind

pub mod client;
pub mod config;
pub mod derivation;
pub mod error;
pub mod metrics;
pub mod model;
pub mod poller;
pub mod publisher;
pub mod server;
pub mod tracker;

pub use error::{MedusaError, Result};
