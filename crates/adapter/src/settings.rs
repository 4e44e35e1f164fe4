use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AdapterError;

/// Environment variable prefix for overrides, e.g. `PANGLE_ADAPTER__TIMEOUTS__LOAD_MS`.
pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "PANGLE_ADAPTER";
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";

const MAX_TIMEOUT_MS: u64 = 120_000;

/// Flags forwarded to the Pangle init config.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PangleSettings {
    #[serde(default)]
    pub support_multi_process: bool,
    #[serde(default)]
    pub debug_log: bool,
}

/// Upper bounds for each asynchronous wait on the partner SDK.
///
/// The partner SDK offers no deterministic completion signal for several of
/// these waits, so each one is capped here instead of hanging forever.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, PartialEq, Eq)]
pub struct TimeoutSettings {
    /// Wait for the init callback.
    #[serde(default = "default_init_ms")]
    #[validate(range(min = 1, max = 120_000))]
    pub init_ms: u64,

    /// Wait for the first load event (ad object or error).
    #[serde(default = "default_load_ms")]
    #[validate(range(min = 1, max = 120_000))]
    pub load_ms: u64,

    /// Wait for the "cached" event after the ad object arrived.
    #[serde(default = "default_cache_ms")]
    #[validate(range(min = 1, max = 120_000))]
    pub cache_ms: u64,

    /// Wait for the "shown" event after calling show.
    #[serde(default = "default_show_ms")]
    #[validate(range(min = 1, max = 120_000))]
    pub show_ms: u64,
}

fn default_init_ms() -> u64 {
    10_000
}

fn default_load_ms() -> u64 {
    30_000
}

fn default_cache_ms() -> u64 {
    5_000
}

fn default_show_ms() -> u64 {
    10_000
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            init_ms: default_init_ms(),
            load_ms: default_load_ms(),
            cache_ms: default_cache_ms(),
            show_ms: default_show_ms(),
        }
    }
}

impl TimeoutSettings {
    #[must_use]
    pub fn init(&self) -> Duration {
        Duration::from_millis(self.init_ms.min(MAX_TIMEOUT_MS))
    }

    #[must_use]
    pub fn load(&self) -> Duration {
        Duration::from_millis(self.load_ms.min(MAX_TIMEOUT_MS))
    }

    #[must_use]
    pub fn cache(&self) -> Duration {
        Duration::from_millis(self.cache_ms.min(MAX_TIMEOUT_MS))
    }

    #[must_use]
    pub fn show(&self) -> Duration {
        Duration::from_millis(self.show_ms.min(MAX_TIMEOUT_MS))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub pangle: PangleSettings,
    #[serde(default)]
    #[validate(nested)]
    pub timeouts: TimeoutSettings,
}

impl Settings {
    /// Loads the settings embedded at build time, with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the embedded TOML or an
    /// environment override is invalid.
    pub fn new() -> Result<Self, Report<AdapterError>> {
        let toml_str = include_str!("../../../pangle-adapter.toml");
        Self::from_toml(toml_str)
    }

    /// Parses settings from a TOML string, applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the TOML cannot be parsed,
    /// does not match the settings schema, or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<AdapterError>> {
        Self::from_toml_with_env_prefix(toml_str, ENVIRONMENT_VARIABLE_PREFIX)
    }

    fn from_toml_with_env_prefix(
        toml_str: &str,
        env_prefix: &str,
    ) -> Result<Self, Report<AdapterError>> {
        let environment = Environment::default()
            .prefix(env_prefix)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(AdapterError::Configuration {
                message: "Failed to build configuration sources".to_string(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(AdapterError::Configuration {
                    message: "Failed to deserialize settings".to_string(),
                })?;

        settings
            .validate()
            .change_context(AdapterError::Configuration {
                message: "Settings validation failed".to_string(),
            })?;

        Ok(settings)
    }

    /// Serializes the effective settings (after environment overrides) to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if serialization fails.
    pub fn to_canonical_toml(&self) -> Result<String, Report<AdapterError>> {
        toml::to_string(self).change_context(AdapterError::Configuration {
            message: "Failed to serialize settings".to_string(),
        })
    }
}
