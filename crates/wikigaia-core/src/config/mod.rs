//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a default so an empty configuration loads.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod milestone;
pub mod realtime;
pub mod worker;
pub mod workflow;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseBackend, DatabaseConfig};
pub use self::logging::LoggingConfig;
pub use self::milestone::MilestoneConfig;
pub use self::realtime::RealtimeConfig;
pub use self::worker::WorkerConfig;
pub use self::workflow::{WorkflowConfig, WorkflowRule};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Store backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Identity-token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Vote milestone thresholds.
    #[serde(default)]
    pub milestones: MilestoneConfig,
    /// Lifecycle advance rules.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Realtime vote stream settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `WIKIGAIA__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WIKIGAIA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let mut loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.milestones.normalize();
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check cross-field invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.milestones.thresholds.is_empty() {
            return Err(AppError::configuration(
                "milestones.thresholds must contain at least one value",
            ));
        }
        if self.realtime.stale_after_seconds < self.realtime.ping_interval_seconds {
            return Err(AppError::configuration(
                "realtime.stale_after_seconds must not be shorter than the ping interval",
            ));
        }
        for rule in &self.workflow.rules {
            rule.target_status()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").expect("empty config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.milestones.thresholds, vec![50, 75, 100]);
        assert_eq!(config.realtime.ping_interval_seconds, 30);
        assert_eq!(config.realtime.stale_after_seconds, 60);
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_thresholds() {
        let mut config = AppConfig::default();
        config.milestones.thresholds.clear();
        let err = config.validate().expect_err("should reject");
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_validate_rejects_unknown_workflow_status() {
        let mut config = AppConfig::default();
        config.workflow.rules.push(WorkflowRule {
            min_votes: 10,
            status: "launched".to_string(),
        });
        assert!(config.validate().is_err());
    }
}
