use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::{debug, warn};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_SETTINGS_FILE: &str = "book_search.toml";
/// Upper bound accepted by the volumes API for `maxResults`.
pub const MAX_RESULTS_LIMIT: u32 = 40;

const ENV_PREFIX: &str = "BOOK_SEARCH__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_results: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            connect_timeout_ms: 15_000,
            read_timeout_ms: 10_000,
            max_results: 10,
        }
    }
}

impl Settings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_endpoint(&self.endpoint)?;

        if self.connect_timeout_ms == 0
            || self.read_timeout_ms == 0
            || self.connect_timeout_ms == self.read_timeout_ms
        {
            return Err(ConfigError::InvalidTimeouts {
                connect_ms: self.connect_timeout_ms,
                read_ms: self.read_timeout_ms,
            });
        }

        validate_max_results(self.max_results)
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "endpoint" => self.endpoint = value.trim().to_string(),
            "connect_timeout_ms" => set_number(&mut self.connect_timeout_ms, key, value),
            "read_timeout_ms" => set_number(&mut self.read_timeout_ms, key, value),
            "max_results" => set_number(&mut self.max_results, key, value),
            other => debug!(key = other, "ignoring unknown settings key"),
        }
    }
}

/// Defaults, then the settings file, then `BOOK_SEARCH__*` environment variables.
///
/// An explicitly passed `path` must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// [`load_settings`] with the environment lookup supplied by the caller.
pub fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    match fs::read_to_string(&file) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw, &file)?,
        Err(source) if required => {
            return Err(ConfigError::Read {
                path: file.display().to_string(),
                source,
            })
        }
        Err(_) => debug!(path = %file.display(), "no settings file, using defaults"),
    }

    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

pub fn apply_file_overrides(
    settings: &mut Settings,
    raw: &str,
    path: &Path,
) -> Result<(), ConfigError> {
    let table = raw
        .parse::<toml::Table>()
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    for (key, value) in &table {
        let value = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            other => {
                warn!(key = %key, value = %other, "settings value must be a string or integer");
                continue;
            }
        };
        settings.apply(key, &value);
    }

    Ok(())
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in [
        "endpoint",
        "connect_timeout_ms",
        "read_timeout_ms",
        "max_results",
    ] {
        let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        if let Some(value) = lookup(&var) {
            settings.apply(key, &value);
        }
    }
}

pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

pub(crate) fn validate_max_results(max_results: u32) -> Result<(), ConfigError> {
    if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
        return Err(ConfigError::InvalidMaxResults {
            max: MAX_RESULTS_LIMIT,
            actual: max_results,
        });
    }
    Ok(())
}

fn set_number<T: std::str::FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(key, value, "ignoring non-numeric settings value"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
