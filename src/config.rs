//! Configuration management for the Medusa exporter.
//!
//! Supports loading configuration from:
//! - TOML configuration files
//! - Environment variables (with `MEDUSA_EXPORTER__` prefix)
//! - Command-line arguments (see [`Overrides`])

use crate::error::{MedusaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How Medusa is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MedusaConfig {
    /// Medusa executable (name on PATH or full path)
    pub binary: String,

    /// Medusa configuration file, passed as `--config-file` when set
    pub config_file: String,

    /// Shared storage prefix, passed as `--prefix` when set
    pub prefix: String,

    /// Upper bound for one `list-backups` run in seconds (0 = no limit)
    pub timeout_seconds: u64,
}

/// Exporter specific settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Address to listen on for metrics endpoint
    pub listen_address: String,
    /// Path under which metrics are exposed
    pub telemetry_path: String,
    /// Seconds between two Medusa polls
    pub collect_interval_seconds: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (text, json)
    pub log_format: String,
}

/// Main configuration structure for the Medusa exporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Medusa invocation settings
    pub medusa: MedusaConfig,

    /// Exporter server configuration
    pub exporter: ExporterConfig,
}

/// Values given on the command line, applied over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen_address: Option<String>,
    pub telemetry_path: Option<String>,
    pub collect_interval_seconds: Option<u64>,
    pub medusa_config_file: Option<String>,
    pub medusa_prefix: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl Default for MedusaConfig {
    fn default() -> Self {
        Self {
            binary: "medusa".to_string(),
            config_file: String::new(),
            prefix: String::new(),
            timeout_seconds: 0,
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:19500".to_string(),
            telemetry_path: "/metrics".to_string(),
            collect_interval_seconds: 600,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration from a file and environment variables.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use medusa_exporter::config::Settings;
    ///
    /// let settings = Settings::load(Some("config/medusa-exporter.toml")).unwrap();
    /// ```
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with(config_path, Overrides::default())
    }

    /// Load configuration and apply command-line overrides on top.
    pub fn load_with(config_path: Option<&str>, overrides: Overrides) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Add config file if provided
        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        // Add environment variables, e.g. MEDUSA_EXPORTER__MEDUSA__PREFIX
        builder = builder.add_source(
            config::Environment::with_prefix("MEDUSA_EXPORTER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;
        settings.apply(overrides);

        settings.validate()?;
        Ok(settings)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(v) = overrides.listen_address {
            self.exporter.listen_address = v;
        }
        if let Some(v) = overrides.telemetry_path {
            self.exporter.telemetry_path = v;
        }
        if let Some(v) = overrides.collect_interval_seconds {
            self.exporter.collect_interval_seconds = v;
        }
        if let Some(v) = overrides.medusa_config_file {
            self.medusa.config_file = v;
        }
        if let Some(v) = overrides.medusa_prefix {
            self.medusa.prefix = v;
        }
        if let Some(v) = overrides.log_level {
            self.exporter.log_level = v;
        }
        if let Some(v) = overrides.log_format {
            self.exporter.log_format = v;
        }
    }

    /// Validate configuration settings.
    fn validate(&self) -> Result<()> {
        if self.medusa.binary.is_empty() {
            return Err(invalid("Medusa binary cannot be empty"));
        }

        if self.exporter.collect_interval_seconds == 0 {
            return Err(invalid("Collect interval must be greater than zero"));
        }

        if !self.exporter.telemetry_path.starts_with('/') {
            return Err(invalid("Telemetry path must start with '/'"));
        }
        if self.exporter.telemetry_path == "/health" {
            return Err(invalid("Telemetry path '/health' is reserved"));
        }

        if !matches!(self.exporter.log_format.as_str(), "text" | "json") {
            return Err(invalid("Log format must be 'text' or 'json'"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> MedusaError {
    MedusaError::Config(config::ConfigError::Message(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.medusa.binary, "medusa");
        assert!(settings.medusa.prefix.is_empty());
        assert_eq!(settings.exporter.listen_address, "0.0.0.0:19500");
        assert_eq!(settings.exporter.telemetry_path, "/metrics");
        assert_eq!(settings.exporter.collect_interval_seconds, 600);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overrides_win() {
        let mut settings = Settings::default();
        settings.apply(Overrides {
            medusa_prefix: Some("prod".to_string()),
            collect_interval_seconds: Some(30),
            log_format: Some("json".to_string()),
            ..Overrides::default()
        });

        assert_eq!(settings.medusa.prefix, "prod");
        assert_eq!(settings.exporter.collect_interval_seconds, 30);
        assert_eq!(settings.exporter.log_format, "json");
        assert_eq!(settings.exporter.telemetry_path, "/metrics");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.exporter.collect_interval_seconds = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.exporter.telemetry_path = "metrics".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.exporter.log_format = "logfmt".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "medusa-exporter-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[medusa]\nprefix = \"staging\"\ntimeout_seconds = 30\n\n[exporter]\ncollect_interval_seconds = 60\n",
        )
        .unwrap();

        let settings = Settings::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.medusa.prefix, "staging");
        assert_eq!(settings.medusa.timeout_seconds, 30);
        assert_eq!(settings.medusa.binary, "medusa");
        assert_eq!(settings.exporter.collect_interval_seconds, 60);
        assert_eq!(settings.exporter.listen_address, "0.0.0.0:19500");
    }
}
