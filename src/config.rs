//! Server configuration: an optional TOML file overlaid with environment variables.

use crate::error::ConfigError;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "COLLEGE_DIRECTORY_CONFIG";

/// Connection settings for the hosted record store.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: Option<String>,
    /// Table holding the college rows
    pub table: String,
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: "colleges".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when both a URL and a key are present.
    pub const fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    pub store: StoreConfig,
    /// Replaces the bundled fallback dataset when set
    pub dataset_path: Option<PathBuf>,
    pub catalog_ttl_secs: u64,
    pub profile_ttl_secs: u64,
    pub environment: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            dataset_path: None,
            catalog_ttl_secs: 60,
            profile_ttl_secs: 120,
            environment: "development".to_string(),
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from the default locations and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                dirs::config_dir()
                    .map(|dir| dir.join("college-directory").join("config.toml"))
                    .filter(|p| p.is_file())
            });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay environment values. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("SUPABASE_URL") {
            self.store.url = Some(url.trim().trim_end_matches('/').to_string());
        }
        if let Some(key) = get("SUPABASE_ANON_KEY") {
            self.store.api_key = Some(key.trim().to_string());
        }
        if let Some(path) = get("COLLEGE_DIRECTORY_DATASET") {
            self.dataset_path = Some(PathBuf::from(path));
        }
        if let Some(env) = get("APP_ENV") {
            self.environment = env;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.is_some() && self.store.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub const fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub const fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_ttl_secs)
    }

    /// Dataset override path with `~` expanded.
    pub fn resolved_dataset_path(&self) -> Option<PathBuf> {
        self.dataset_path
            .as_ref()
            .map(|p| PathBuf::from(expand_tilde(&p.to_string_lossy()).as_ref()))
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_leave_store_unconfigured() {
        let config = DirectoryConfig::default();
        check!(!config.store.is_configured());
        check!(config.store.table == "colleges");
        check!(config.catalog_ttl() == Duration::from_secs(60));
        check!(config.profile_ttl() == Duration::from_secs(120));
    }

    #[test]
    fn env_overrides_store_settings() {
        let mut config = DirectoryConfig::default();
        config.apply_env(env(&[
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_ANON_KEY", " key "),
            ("APP_ENV", "production"),
        ]));

        check!(config.store.url.as_deref() == Some("https://abc.supabase.co"));
        check!(config.store.api_key.as_deref() == Some("key"));
        check!(config.environment == "production");
        check!(config.store.is_configured());
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = DirectoryConfig::default();
        config.apply_env(env(&[("SUPABASE_URL", "   ")]));
        check!(config.store.url.is_none());
    }

    #[test]
    fn url_without_key_is_rejected() {
        let mut config = DirectoryConfig::default();
        config.store.url = Some("https://abc.supabase.co".to_string());
        check!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn parses_partial_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "catalog_ttl_secs = 5\n[store]\nurl = \"https://x.supabase.co\"\napi_key = \"k\"\n",
        )
        .unwrap();

        let config = DirectoryConfig::from_file(&path).unwrap();
        check!(config.catalog_ttl_secs == 5);
        check!(config.store.table == "colleges");
        check!(config.store.is_configured());
    }

    #[test]
    fn unknown_keys_are_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 20\n").unwrap();

        check!(matches!(
            DirectoryConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
