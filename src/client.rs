//! Medusa command-line client.
//!
//! Runs `medusa list-backups --output json` and decodes its output into
//! [`BackupRecord`]s.

use crate::config::MedusaConfig;
use crate::error::{MedusaError, Result};
use crate::model::BackupRecord;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Medusa client.
#[derive(Debug, Clone)]
pub struct MedusaClient {
    config: MedusaConfig,
}

impl MedusaClient {
    /// Create a new Medusa client.
    ///
    /// # Examples
    ///
    /// ```
    /// use medusa_exporter::client::MedusaClient;
    /// use medusa_exporter::config::MedusaConfig;
    ///
    /// let config = MedusaConfig {
    ///     prefix: "prod".to_string(),
    ///     ..MedusaConfig::default()
    /// };
    /// let client = MedusaClient::new(config);
    /// assert_eq!(client.args(), ["--prefix", "prod", "list-backups", "--output", "json"]);
    /// ```
    pub fn new(config: MedusaConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments passed to Medusa.
    ///
    /// Medusa takes global options before the command, so the order is
    /// config file, prefix, then the listing command.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.config.config_file.is_empty() {
            args.push("--config-file".to_string());
            args.push(self.config.config_file.clone());
        }
        if !self.config.prefix.is_empty() {
            args.push("--prefix".to_string());
            args.push(self.config.prefix.clone());
        }
        args.extend(["list-backups", "--output", "json"].map(String::from));
        args
    }

    /// Run Medusa and return its stdout.
    ///
    /// A non-zero exit is an error carrying stderr. On success, stderr is
    /// only logged, since Medusa writes its regular log lines there.
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        let args = self.args();
        debug!("Running {} {}", self.config.binary, args.join(" "));

        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = if self.config.timeout_seconds > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_seconds),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| MedusaError::Timeout(self.config.timeout_seconds))??
        } else {
            child.wait_with_output().await?
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            error!(msg = %stderr.trim_end(), "Medusa message");
            return Err(MedusaError::Command(format!(
                "{}: {}",
                output.status,
                stderr.trim_end()
            )));
        }
        if !stderr.is_empty() {
            info!(msg = %stderr.trim_end(), "Medusa message");
        }

        Ok(output.stdout)
    }

    /// Run Medusa and decode the backup list.
    pub async fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        let output = self.fetch().await?;
        parse_backups(&output)
    }
}

/// Decode the JSON backup list printed by Medusa.
pub fn parse_backups(output: &[u8]) -> Result<Vec<BackupRecord>> {
    Ok(serde_json::from_slice(output)?)
}
