//! Configuration types for deckgen

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Polling behaviour for the deck and export phases
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Wait between deck status checks when the server sends no `retry-after` (default: 3s)
    #[serde(default = "default_deck_interval", with = "duration_serde")]
    pub deck_interval: Duration,

    /// Base wait between export status checks (default: 2s)
    ///
    /// Shrinks to `max(0.3s, interval * 0.3)` once the export reports 50% progress.
    #[serde(default = "default_export_interval", with = "duration_serde")]
    pub export_interval: Duration,

    /// Wall-clock deadline for each polling phase (default: 900s)
    #[serde(default = "default_poll_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            deck_interval: default_deck_interval(),
            export_interval: default_export_interval(),
            timeout: default_poll_timeout(),
        }
    }
}

/// Main configuration for the deckgen client
///
/// Passed explicitly into [`ApiClient`](crate::client::ApiClient),
/// [`Downloader`](crate::download::Downloader) and
/// [`Orchestrator`](crate::orchestrator::Orchestrator); nothing reads the
/// environment ambiently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the presentation API (e.g. "https://api.example.com")
    #[serde(default)]
    pub base_url: String,

    /// Bearer credential sent with every API call
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Base URL for canonical deck view links (default: `base_url`)
    #[serde(default)]
    pub app_url: Option<String>,

    /// Connect and response timeout for each HTTP request (default: 30s)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Polling intervals and deadline
    #[serde(default)]
    pub polling: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

impl Config {
    /// Create a configuration for the given service and credential with default timings
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            app_url: None,
            request_timeout: default_request_timeout(),
            polling: PollConfig::default(),
        }
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults. The result is not validated; call
    /// [`Config::validate`] after applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                "config",
                format!("failed to read config file '{}': {}", path.display(), e),
            )
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::config(
                "config",
                format!("failed to parse config file '{}': {}", path.display(), e),
            )
        })
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("base_url", "base URL is required"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::config("base_url", format!("invalid base URL: {e}")))?;

        if let Some(app_url) = &self.app_url {
            url::Url::parse(app_url)
                .map_err(|e| Error::config("app_url", format!("invalid app URL: {e}")))?;
        }

        if self.api_key.trim().is_empty() {
            return Err(Error::config("api_key", "API key is required"));
        }

        let durations = [
            ("request_timeout", self.request_timeout),
            ("polling.deck_interval", self.polling.deck_interval),
            ("polling.export_interval", self.polling.export_interval),
            ("polling.timeout", self.polling.timeout),
        ];
        for (key, value) in durations {
            if value.is_zero() {
                return Err(Error::config(key, "must be greater than zero"));
            }
        }

        Ok(())
    }

    /// Canonical link to a deck in the web application
    pub fn view_url(&self, deck_id: &str) -> String {
        let base = self.app_url.as_deref().unwrap_or(&self.base_url);
        format!("{}/decks/{}", base.trim_end_matches('/'), deck_id)
    }
}

fn default_deck_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_export_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(900)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper (fractional seconds)
pub(crate) mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration in seconds: {secs}")))
    }
}
