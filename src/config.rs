use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TABLE_NAME: &str = "meal-planner";
pub const DEFAULT_PAGE_SIZE: usize = 100;

const ENV_DATABASE_PATH: &str = "MEAL_PLANNER_DATABASE_PATH";
const ENV_TABLE_NAME: &str = "MEAL_PLANNER_TABLE_NAME";
const ENV_PAGE_SIZE: &str = "MEAL_PLANNER_PAGE_SIZE";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database holding the table
    pub database_path: ConfigValue<PathBuf>,
    /// Name of the single table all entities share
    pub table_name: ConfigValue<String>,
    /// Items evaluated per store page
    pub page_size: ConfigValue<usize>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    table_name: Option<String>,
    page_size: Option<usize>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading environment variables through `env`.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("meal-planner.db"),
            ConfigSource::Default,
        );
        let mut table_name =
            ConfigValue::new(DEFAULT_TABLE_NAME.to_string(), ConfigSource::Default);
        let mut page_size = ConfigValue::new(DEFAULT_PAGE_SIZE, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(name) = file_config.table_name {
                table_name = ConfigValue::new(name, ConfigSource::File);
            }
            if let Some(size) = file_config.page_size {
                page_size = ConfigValue::new(size, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Some(db_path) = env(ENV_DATABASE_PATH) {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(name) = env(ENV_TABLE_NAME) {
            table_name = ConfigValue::new(name, ConfigSource::Environment);
        }
        if let Some(size) = env(ENV_PAGE_SIZE) {
            let parsed = size.trim().parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue("page_size", format!("'{}' is not a number", size))
            })?;
            page_size = ConfigValue::new(parsed, ConfigSource::Environment);
        }

        let config = Self {
            database_path,
            table_name,
            page_size,
            config_file,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.value.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "table_name",
                "must not be empty".to_string(),
            ));
        }
        if self.page_size.value == 0 {
            return Err(ConfigError::InvalidValue(
                "page_size",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/meal-planner/
    /// - macOS: ~/Library/Application Support/meal-planner/
    /// - Windows: %APPDATA%/meal-planner/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meal-planner")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/meal-planner/
    /// - macOS: ~/Library/Application Support/meal-planner/
    /// - Windows: %APPDATA%/meal-planner/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meal-planner")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, reason) => {
                write!(f, "Invalid value for {}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .contains("meal-planner.db"));
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.table_name.value, "meal-planner");
        assert_eq!(config.page_size.value, 100);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "table_name: meals-test").unwrap();
        writeln!(file, "page_size: 25").unwrap();

        let config = Config::load_with_env(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.table_name.value, "meals-test");
        assert_eq!(config.page_size.value, 25);
        assert_eq!(config.page_size.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_database_path_resolves_against_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "database_path: data/meals.db\n").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(
            config.database_path.value,
            temp_dir.path().join("data/meals.db")
        );
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "table_name: fromfile\npage_size: 10\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("MEAL_PLANNER_TABLE_NAME", "fromenv"),
            ("MEAL_PLANNER_DATABASE_PATH", "/tmp/env.db"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::load_with_env(Some(config_path), |k| env.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.table_name.value, "fromenv");
        assert_eq!(config.table_name.source, ConfigSource::Environment);
        assert_eq!(config.database_path.value, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.page_size.value, 10);
        assert_eq!(config.page_size.source, ConfigSource::File);
    }

    #[test]
    fn test_invalid_page_size_from_env() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let result = Config::load_with_env(Some(config_path), |k| {
            (k == "MEAL_PLANNER_PAGE_SIZE").then(|| "lots".to_string())
        });
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for page_size: 'lots' is not a number"
        );
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "page_size: 0\n").unwrap();

        let err = Config::load_with_env(Some(config_path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("page_size", _)));
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let err = Config::load_with_env(Some(config_path), |k| {
            (k == "MEAL_PLANNER_TABLE_NAME").then(String::new)
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("table_name", _)));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with_env(Some(config_path), no_env);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
