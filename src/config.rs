// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.
//!
//! Every field has a default, so an empty or missing TOML file yields the
//! stock behavior: one-second ticks, a 15 second grace period after each
//! command, a one hour cooldown after a manual change, and a ten second
//! fade.
//!
//! ```toml
//! tick_interval_ms = 1000
//! grace_period_secs = 15
//! cooldown_secs = 3600
//! offline_after_secs = 3600
//! transition_ms = 10000
//! liveness_monitor = false
//! status_listen = "0.0.0.0:8089"
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::control::{ControlPolicy, to_delta};
use crate::error::ConfigError;

/// Settings for the reconciliation engine and its status endpoint.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lumenward::config::EngineConfig;
///
/// let config = EngineConfig::from_toml_str("cooldown_secs = 1800").unwrap();
/// assert_eq!(config.cooldown(), Duration::from_secs(1800));
/// assert_eq!(config.grace_period(), Duration::from_secs(15));
///
/// let config = EngineConfig::default().with_liveness_monitor(true);
/// assert!(config.liveness_monitor);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Period of the adjustment, recovery and liveness jobs, in milliseconds.
    pub tick_interval_ms: u64,
    /// Grace period after issuing a command, in seconds.
    pub grace_period_secs: u64,
    /// Cooldown after an external change, in seconds.
    pub cooldown_secs: u64,
    /// Age of the last sighting after which a light is flagged offline.
    pub offline_after_secs: u64,
    /// Fade duration sent with every command, in milliseconds.
    pub transition_ms: u64,
    /// Whether to run the liveness job.
    pub liveness_monitor: bool,
    /// Socket address for the status endpoint.
    pub status_listen: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            grace_period_secs: ControlPolicy::DEFAULT_GRACE.as_secs(),
            cooldown_secs: ControlPolicy::DEFAULT_COOLDOWN.as_secs(),
            offline_after_secs: 60 * 60,
            transition_ms: 10_000,
            liveness_monitor: false,
            status_listen: "0.0.0.0:8089".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys and
    /// `ConfigError::Invalid` if validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Self::from_toml_str(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.as_ref().display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Checks values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.grace_period_secs >= self.cooldown_secs {
            return Err(ConfigError::Invalid {
                field: "grace_period_secs",
                message: format!(
                    "must be shorter than cooldown_secs ({})",
                    self.cooldown_secs
                ),
            });
        }
        if self.status_listen.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "status_listen",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Sets the tick interval, rounded up to whole milliseconds.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms =
            u64::try_from(interval.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);
        self
    }

    /// Sets the grace period.
    #[must_use]
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period_secs = grace.as_secs();
        self
    }

    /// Sets the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_secs = cooldown.as_secs();
        self
    }

    /// Sets the offline threshold.
    #[must_use]
    pub fn with_offline_after(mut self, after: Duration) -> Self {
        self.offline_after_secs = after.as_secs();
        self
    }

    /// Sets the fade duration sent with commands.
    #[must_use]
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition_ms = u64::try_from(transition.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enables or disables the liveness job.
    #[must_use]
    pub fn with_liveness_monitor(mut self, enabled: bool) -> Self {
        self.liveness_monitor = enabled;
        self
    }

    /// Sets the status endpoint address.
    #[must_use]
    pub fn with_status_listen(mut self, listen: impl Into<String>) -> Self {
        self.status_listen = listen.into();
        self
    }

    /// Returns the tick interval, never shorter than one millisecond.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Returns the grace period.
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Returns the cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Returns the offline threshold.
    #[must_use]
    pub fn offline_after(&self) -> TimeDelta {
        to_delta(Duration::from_secs(self.offline_after_secs))
    }

    /// Returns the fade duration sent with commands.
    #[must_use]
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Returns the release windows as a [`ControlPolicy`].
    #[must_use]
    pub fn control_policy(&self) -> ControlPolicy {
        ControlPolicy::new(self.grace_period(), self.cooldown())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.grace_period(), Duration::from_secs(15));
        assert_eq!(config.cooldown(), Duration::from_secs(3600));
        assert_eq!(config.offline_after(), TimeDelta::hours(1));
        assert_eq!(config.transition(), Duration::from_secs(10));
        assert!(!config.liveness_monitor);
        assert_eq!(config.status_listen, "0.0.0.0:8089");
        assert_eq!(config.control_policy(), ControlPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn parses_overrides() {
        let config = EngineConfig::from_toml_str(
            r#"
            tick_interval_ms = 500
            grace_period_secs = 5
            liveness_monitor = true
            status_listen = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.grace_period(), Duration::from_secs(5));
        assert_eq!(config.cooldown(), Duration::from_secs(3600));
        assert!(config.liveness_monitor);
        assert_eq!(config.status_listen, "127.0.0.1:9000");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = EngineConfig::from_toml_str("tick = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_tick() {
        let err = EngineConfig::from_toml_str("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "tick_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn rejects_grace_not_shorter_than_cooldown() {
        let config = EngineConfig::default()
            .with_grace_period(Duration::from_secs(60))
            .with_cooldown(Duration::from_secs(60));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "grace_period_secs",
                ..
            })
        ));
    }

    #[test]
    fn builder_setters() {
        let config = EngineConfig::default()
            .with_tick_interval(Duration::from_millis(250))
            .with_offline_after(Duration::from_secs(90))
            .with_transition(Duration::from_millis(1500))
            .with_status_listen("[::1]:8089");

        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.offline_after(), TimeDelta::seconds(90));
        assert_eq!(config.transition_ms, 1500);
        assert_eq!(config.status_listen, "[::1]:8089");
    }

    #[test]
    fn sub_millisecond_tick_rounds_up() {
        let config = EngineConfig::default().with_tick_interval(Duration::from_micros(500));
        assert_eq!(config.tick_interval_ms, 1);
        assert_eq!(config.tick_interval(), Duration::from_millis(1));

        let config = EngineConfig::default().with_tick_interval(Duration::from_micros(1500));
        assert_eq!(config.tick_interval_ms, 2);
    }

    #[test]
    fn zero_tick_field_is_clamped() {
        let config = EngineConfig {
            tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn from_file_missing_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::from_file(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cooldown_secs = 120").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cooldown(), Duration::from_secs(120));
    }
}
