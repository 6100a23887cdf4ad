use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BinderError, Result};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LANG: &str = "pt";
pub const ALLOWED_LANGS: [&str; 12] = [
  "en", "fr", "es", "it", "de", "pt", "nl", "pl", "ja", "ko", "zh-cn", "ru",
];
pub const DB_FILE_NAME: &str = "binderdex.db";

pub const ENV_API_BASE: &str = "BINDERDEX_API_BASE";
pub const ENV_DATA_DIR: &str = "BINDERDEX_DATA_DIR";

pub fn normalize_lang(lang: &str) -> Result<String> {
  let normalized = lang.trim().to_lowercase();
  if normalized.is_empty() {
    return Ok(DEFAULT_LANG.to_string());
  }
  if !ALLOWED_LANGS.contains(&normalized.as_str()) {
    return Err(BinderError::invalid(format!(
      "Unsupported language '{}'. Expected one of: {}.",
      normalized,
      ALLOWED_LANGS.join(", ")
    )));
  }
  Ok(normalized)
}

pub fn normalize_api_base(api_base: &str) -> Result<String> {
  let trimmed = api_base.trim().trim_end_matches('/');
  if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
    return Err(BinderError::invalid(format!(
      "API base must be an http(s) URL, got '{}'.",
      api_base
    )));
  }
  Ok(trimmed.to_string())
}

/// Values given on the command line; `None` falls through to the
/// environment, then to stored preferences, then to defaults.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
  pub api_base: Option<String>,
  pub data_dir: Option<PathBuf>,
  pub lang: Option<String>,
  pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct AppState {
  pub db_path: PathBuf,
  pub app_data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
  pub state: AppState,
  pub api_base_override: Option<String>,
  pub lang_override: Option<String>,
  pub timeout: Option<Duration>,
}

fn env_value(key: &str) -> Option<String> {
  env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn default_data_dir() -> Result<PathBuf> {
  dirs::data_dir()
    .map(|dir| dir.join("binderdex"))
    .ok_or_else(|| BinderError::invalid("Could not determine a data directory; pass --data-dir."))
}

impl AppConfig {
  pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
    let app_data_dir = match overrides
      .data_dir
      .or_else(|| env_value(ENV_DATA_DIR).map(PathBuf::from))
    {
      Some(dir) => dir,
      None => default_data_dir()?,
    };

    let api_base_override = overrides
      .api_base
      .or_else(|| env_value(ENV_API_BASE))
      .map(|base| normalize_api_base(&base))
      .transpose()?;

    let lang_override = overrides
      .lang
      .map(|lang| normalize_lang(&lang))
      .transpose()?;

    Ok(AppConfig {
      state: AppState {
        db_path: app_data_dir.join(DB_FILE_NAME),
        app_data_dir,
      },
      api_base_override,
      lang_override,
      timeout: overrides.timeout_secs.map(Duration::from_secs),
    })
  }

  /// Picks the effective API base given what the local store remembers.
  pub fn api_base(&self, stored: Option<String>) -> String {
    self
      .api_base_override
      .clone()
      .or(stored)
      .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
  }
}
