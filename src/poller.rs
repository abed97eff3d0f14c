//! Periodic polling of Medusa.

use crate::client::{parse_backups, MedusaClient};
use crate::model::BackupRecord;
use crate::publisher::SnapshotPublisher;
use crate::tracker::GenerationTracker;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Runs fetch, parse and publish on a fixed interval.
pub struct Poller {
    client: MedusaClient,
    publisher: SnapshotPublisher,
    interval: Duration,
}

impl Poller {
    pub fn new(client: MedusaClient, publisher: SnapshotPublisher, interval: Duration) -> Self {
        Self {
            client,
            publisher,
            interval,
        }
    }

    /// Poll forever. The first cycle runs immediately.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// Run one polling cycle.
    pub async fn run_cycle(&self) -> GenerationTracker {
        // Reference point for the time elapsed since the last completed backups.
        let now = chrono::Utc::now().timestamp();
        let backups = self.fetch_backups().await;
        self.publisher.publish(backups.as_deref(), now)
    }

    async fn fetch_backups(&self) -> Option<Vec<BackupRecord>> {
        let output = match self.client.fetch().await {
            Ok(output) => output,
            Err(e) => {
                error!(error = %e, "Get data from Medusa failed");
                return None;
            }
        };

        match parse_backups(&output) {
            Ok(backups) => {
                info!("Fetched {} backups from Medusa", backups.len());
                Some(backups)
            }
            Err(e) => {
                error!(error = %e, "Parse JSON failed");
                None
            }
        }
    }
}
