//! Connection settings: config file, environment, then flags.

use std::{path::Path, time::Duration};

use almanac_immich::ApiConfig;
use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Shape of `almanac.toml`. Every key may also come from an `ALMANAC_`
/// environment variable, e.g. `ALMANAC_API_BASE_URL`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub api_base_url: String,
}

impl Settings {
  pub fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ALMANAC"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

/// Connection flags shared by every command that talks to the server.
#[derive(Debug, Default, Clone)]
pub struct Connection {
  pub url:          Option<String>,
  pub api_key:      Option<String>,
  pub timeout_secs: u64,
}

impl Connection {
  /// Flags override the config file.
  pub fn api_config(&self, settings: &Settings) -> Result<ApiConfig> {
    let base_url = self
      .url
      .clone()
      .filter(|u| !u.trim().is_empty())
      .or_else(|| {
        (!settings.api_base_url.trim().is_empty())
          .then(|| settings.api_base_url.clone())
      });
    let Some(base_url) = base_url else {
      bail!("no server URL: pass --url or set api_base_url in the config file");
    };
    let Some(api_key) = self.api_key.clone().filter(|k| !k.trim().is_empty())
    else {
      bail!("no API key: pass --api-key or set ALMANAC_API_KEY");
    };

    Ok(ApiConfig {
      timeout: Duration::from_secs(self.timeout_secs.max(1)),
      ..ApiConfig::new(base_url, api_key)
    })
  }
}
