//! # PMOPodcast Configuration Module
//!
//! This module provides configuration management for PMOPodcast, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Lazily loaded global access for the command line front-end
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! let config = get_config();
//!
//! let api_url = config.get_episodes_api_url()?;
//! let tick = config.get_tick_interval_ms()?;
//!
//! config.set_episodes_limit(20)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = include_str!("pmopodcast.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMOPodcast configuration"));
}

const CONFIG_DIR_NAME: &str = ".pmopodcast";
const ENV_CONFIG_DIR: &str = "PMOPODCAST_CONFIG";
const ENV_PREFIX: &str = "PMOPODCAST_CONFIG__";

const DEFAULT_EPISODES_API_URL: &str = "http://localhost:3333/episodes";
const DEFAULT_EPISODES_LIMIT: usize = 12;
const DEFAULT_EPISODES_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TICK_INTERVAL_MS: u64 = 250;
const DEFAULT_START_SHUFFLED: bool = false;
const DEFAULT_START_LOOPING: bool = false;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for u64 values with default
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u64> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().unwrap_or($default)),
                Ok(Value::String(s)) => Ok(s.trim().parse::<u64>().unwrap_or_else(|_| {
                    warn!(value = %s, default = $default, "Invalid numeric value, using default");
                    $default
                })),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<String> {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
                _ => Ok($default.to_string()),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration manager for PMOPodcast
///
/// Holds the merged YAML tree (embedded defaults, `config.yaml`, environment
/// overrides) and writes it back to disk whenever a value changes.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOPODCAST_CONFIG` environment variable
    /// 3. `.pmopodcast` in the current directory
    /// 4. `.pmopodcast` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        default_value = lower_keys_value(default_value);
        let external_value = lower_keys_value(serde_yaml::from_slice(&yaml_data)?);
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = default_value;

        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Directory holding `config.yaml`.
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["player", "tick_interval_ms"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        get_value_internal(&data, path)
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = convert_env_value(&value);
                if let Err(err) = set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %err, "Ignoring configuration override");
                }
            }
        }
    }

    impl_string_config!(
        get_episodes_api_url,
        set_episodes_api_url,
        &["episodes", "api_url"],
        DEFAULT_EPISODES_API_URL
    );

    impl_usize_config!(
        get_episodes_limit,
        set_episodes_limit,
        &["episodes", "limit"],
        DEFAULT_EPISODES_LIMIT
    );

    impl_u64_config!(
        get_episodes_timeout_secs,
        set_episodes_timeout_secs,
        &["episodes", "timeout_secs"],
        DEFAULT_EPISODES_TIMEOUT_SECS
    );

    impl_u64_config!(
        get_tick_interval_ms,
        set_tick_interval_ms,
        &["player", "tick_interval_ms"],
        DEFAULT_TICK_INTERVAL_MS
    );

    impl_bool_config!(
        get_start_shuffled,
        set_start_shuffled,
        &["player", "start_shuffled"],
        DEFAULT_START_SHUFFLED
    );

    impl_bool_config!(
        get_start_looping,
        set_start_looping,
        &["player", "start_looping"],
        DEFAULT_START_LOOPING
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["host", "logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );
}

/// Returns the global configuration instance
///
/// The instance is loaded on first access using the default directory search.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default value. A null `external` (empty file or empty
/// section) overrides nothing.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (_, Value::Null) => {}
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in(dir: &tempfile::TempDir) -> Config {
        Config::load_config(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_are_loaded_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);

        assert_eq!(config.get_episodes_limit().unwrap(), 12);
        assert_eq!(config.get_tick_interval_ms().unwrap(), 250);
        assert!(!config.get_start_shuffled().unwrap());
        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
        assert!(dir.path().join("config.yaml").exists());
    }

    #[test]
    fn test_external_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "Episodes:\n  Limit: 3\nplayer:\n  start_looping: true\n",
        )
        .unwrap();

        let config = load_in(&dir);
        assert_eq!(config.get_episodes_limit().unwrap(), 3);
        assert!(config.get_start_looping().unwrap());
        // untouched keys keep their embedded default
        assert_eq!(
            config.get_episodes_api_url().unwrap(),
            DEFAULT_EPISODES_API_URL
        );
    }

    #[test]
    fn test_setter_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);
        config.set_tick_interval_ms(100).unwrap();

        let reloaded = load_in(&dir);
        assert_eq!(reloaded.get_tick_interval_ms().unwrap(), 100);
    }

    #[test]
    fn test_empty_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yaml"), "").unwrap();

        let config = load_in(&dir);
        assert_eq!(config.get_episodes_limit().unwrap(), 12);
        config.set_start_looping(true).unwrap();

        let reloaded = load_in(&dir);
        assert!(reloaded.get_start_looping().unwrap());
        assert_eq!(reloaded.get_tick_interval_ms().unwrap(), 250);
    }

    #[test]
    fn test_merge_yaml_ignores_null_sections() {
        let mut default: Value = serde_yaml::from_str("a: 1
b:
  c: 2
").unwrap();
        let external: Value = serde_yaml::from_str("b:
").unwrap();
        merge_yaml(&mut default, &external);

        assert_eq!(get_value_internal(&default, &["b", "c"]).unwrap().as_u64(), Some(2));
        merge_yaml(&mut default, &Value::Null);
        assert_eq!(get_value_internal(&default, &["a"]).unwrap().as_u64(), Some(1));
    }

    #[test]
    fn test_merge_yaml_replaces_scalars_and_keeps_missing_keys() {
        let mut default: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n  d: 3\n").unwrap();
        let external: Value = serde_yaml::from_str("b:\n  c: 5\ne: x\n").unwrap();
        merge_yaml(&mut default, &external);

        assert_eq!(get_value_internal(&default, &["a"]).unwrap().as_u64(), Some(1));
        assert_eq!(get_value_internal(&default, &["b", "c"]).unwrap().as_u64(), Some(5));
        assert_eq!(get_value_internal(&default, &["b", "d"]).unwrap().as_u64(), Some(3));
        assert_eq!(get_value_internal(&default, &["e"]).unwrap().as_str(), Some("x"));
    }

    #[test]
    fn test_env_value_conversion() {
        assert_eq!(convert_env_value("42").as_u64(), Some(42));
        assert_eq!(convert_env_value("true"), Value::Bool(true));
        assert_eq!(
            convert_env_value("http://example.org/episodes").as_str(),
            Some("http://example.org/episodes")
        );
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let value: Value = serde_yaml::from_str("a:\n  b: 1\n").unwrap();
        assert!(get_value_internal(&value, &["a", "missing"]).is_err());
        assert!(get_value_internal(&value, &["a", "b", "c"]).is_err());
    }
}
