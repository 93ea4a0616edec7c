use groqmate_core::{Provider, SettingsStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the settings file location.
pub const CONFIG_PATH_VAR: &str = "GROQMATE_CONFIG";

/// A custom error type for settings loading and saving failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory; set GROQMATE_CONFIG")]
    NoHomeDir,
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The `[settings]` table: which provider to use and, optionally, which model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Persisted user settings, stored as TOML at `~/.groqmate/config.toml`.
///
/// ```toml
/// [settings]
/// provider = "gemini"
/// model = "gemini-2.0-flash"
///
/// [api_keys]
/// gemini = "..."
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    /// API keys keyed by provider name.
    pub api_keys: BTreeMap<String, String>,
}

impl Config {
    /// The settings file location, honoring `GROQMATE_CONFIG`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(".groqmate").join("config.toml"))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings to `path`, creating its parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)
    }

    /// The stored key for `provider`, falling back to its environment variable.
    pub fn get_api_key(&self, provider: Provider) -> Option<String> {
        if let Some(key) = self
            .api_keys
            .get(provider.as_str())
            .filter(|key| !key.is_empty())
        {
            return Some(key.clone());
        }
        provider
            .env_key()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }

    /// Stores `key` for `provider`; an empty key removes it.
    pub fn set_api_key(&mut self, provider: Provider, key: &str) {
        if key.is_empty() {
            self.api_keys.remove(provider.as_str());
        } else {
            self.api_keys
                .insert(provider.as_str().to_string(), key.to_string());
        }
    }

    /// Merges a `configure` invocation into the stored settings.
    ///
    /// The stored model is kept when no model is given and the provider is
    /// unchanged; switching providers without a model drops it.
    pub fn apply(&mut self, provider: Provider, model: Option<String>, api_key: Option<&str>) {
        if model.is_some() || self.settings.provider != provider {
            self.settings.model = model;
        }
        self.settings.provider = provider;
        if let Some(key) = api_key {
            self.set_api_key(provider, key);
        }
    }
}

impl SettingsStore for Config {
    fn model(&self, provider: Provider) -> Option<String> {
        if self.settings.provider == provider {
            self.settings.model.clone()
        } else {
            None
        }
    }

    fn api_key(&self, provider: Provider) -> Option<String> {
        self.get_api_key(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var(CONFIG_PATH_VAR);
            env::remove_var("GROQ_API_KEY");
            env::remove_var("GEMINI_API_KEY");
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NoHomeDir;
        assert_eq!(
            format!("{}", err),
            "Could not determine the home directory; set GROQMATE_CONFIG"
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.settings.provider, Provider::Groq);
        assert_eq!(config.settings.model, None);
    }

    #[test]
    fn test_load_parses_settings_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[settings]\nprovider = \"gemini\"\nmodel = \"gemini-1.5-pro\"\n\n[api_keys]\ngemini = \"g-key\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.provider, Provider::Gemini);
        assert_eq!(config.settings.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.api_keys.get("gemini").map(String::as_str), Some("g-key"));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings\nprovider = ").unwrap();

        match Config::load_from(&path).unwrap_err() {
            ConfigError::Parse { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_unknown_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\nprovider = \"cohere\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.provider = Provider::OpenAI;
        config.settings.model = Some("gpt-4o".to_string());
        config.set_api_key(Provider::OpenAI, "sk-test");
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_set_empty_key_removes_it() {
        let mut config = Config::default();
        config.set_api_key(Provider::Groq, "gsk-test");
        assert!(config.api_keys.contains_key("groq"));
        config.set_api_key(Provider::Groq, "");
        assert!(config.api_keys.is_empty());
    }

    #[test]
    #[serial]
    fn test_stored_key_takes_precedence_over_env() {
        clear_env_vars();
        unsafe {
            env::set_var("GROQ_API_KEY", "env-key");
        }

        let mut config = Config::default();
        assert_eq!(config.get_api_key(Provider::Groq).as_deref(), Some("env-key"));

        config.set_api_key(Provider::Groq, "stored-key");
        assert_eq!(config.get_api_key(Provider::Groq).as_deref(), Some("stored-key"));
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_missing_key_and_local_provider() {
        clear_env_vars();
        let config = Config::default();
        assert_eq!(config.get_api_key(Provider::Gemini), None);
        assert_eq!(config.get_api_key(Provider::Ollama), None);
    }

    #[test]
    fn test_stored_model_applies_only_to_stored_provider() {
        let config = Config {
            settings: Settings {
                provider: Provider::Gemini,
                model: Some("gemini-1.5-pro".to_string()),
            },
            api_keys: BTreeMap::new(),
        };
        assert_eq!(
            SettingsStore::model(&config, Provider::Gemini).as_deref(),
            Some("gemini-1.5-pro")
        );
        assert_eq!(SettingsStore::model(&config, Provider::Groq), None);
    }

    fn gemini_config() -> Config {
        let mut config = Config::default();
        config.apply(Provider::Gemini, Some("gemini-1.5-pro".to_string()), Some("old-key"));
        config
    }

    #[test]
    fn test_apply_key_only_keeps_stored_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        gemini_config().save_to(&path).unwrap();

        let mut config = Config::load_from(&path).unwrap();
        config.apply(Provider::Gemini, None, Some("new-key"));
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.settings.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(reloaded.api_keys.get("gemini").map(String::as_str), Some("new-key"));
    }

    #[test]
    fn test_apply_new_model_replaces_stored_one() {
        let mut config = gemini_config();
        config.apply(Provider::Gemini, Some("gemini-2.0-flash".to_string()), None);
        assert_eq!(config.settings.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(config.api_keys.get("gemini").map(String::as_str), Some("old-key"));
    }

    #[test]
    fn test_apply_provider_switch_drops_old_model() {
        let mut config = gemini_config();
        config.apply(Provider::Groq, None, Some("gsk-key"));

        assert_eq!(config.settings.provider, Provider::Groq);
        assert_eq!(config.settings.model, None);
        assert_eq!(config.api_keys.len(), 2);
    }

    #[test]
    #[serial]
    fn test_default_path_honors_override() {
        clear_env_vars();
        unsafe {
            env::set_var(CONFIG_PATH_VAR, "/tmp/groqmate-test/config.toml");
        }
        assert_eq!(
            Config::default_path().unwrap(),
            PathBuf::from("/tmp/groqmate-test/config.toml")
        );
        clear_env_vars();
    }
}
