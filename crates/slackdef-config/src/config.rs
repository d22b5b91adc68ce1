use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "SLACKDEF_CONFIG";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KNOWN_KEYS: [&str; 3] = ["output-path", "pretty", "default-definition"];

const POINTER_FILE: &str = ".slackdef_config_path";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Unknown config key '{0}' (expected one of: output-path, pretty, default-definition)")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}': expected true or false")]
    InvalidBool { key: String, value: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Where `slackdef build` writes the manifest when `-o` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Pretty-print JSON output (defaults to true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
    /// Definition file used when none is passed on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_definition: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = Self::default_path()?;

        // A pointer file next to the default config may redirect to another location
        if let Some(parent) = default.parent() {
            let pointer = parent.join(POINTER_FILE);
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(PathBuf::from(trimmed));
                }
            }
        }

        Ok(default)
    }

    fn default_path() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let default = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("slackdef")
            .join("slackdef.toml");

        #[cfg(target_os = "windows")]
        let default = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("slackdef")
            .join("slackdef.toml");

        Ok(default)
    }

    /// Point future runs at a different config file by writing the pointer file
    pub fn set_path(new_path: &Path) -> Result<(), ConfigError> {
        let default = Self::default_path()?;
        if let Some(parent) = default.parent() {
            fs::create_dir_all(parent)?;
            fs::write(parent.join(POINTER_FILE), new_path.to_string_lossy().as_bytes())?;
        }
        Ok(())
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path()?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path()?)
    }

    /// A missing file loads as the empty config
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn is_known_key(key: &str) -> bool {
        KNOWN_KEYS.contains(&key)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output-path" => self.output_path.clone(),
            "pretty" => self.pretty.map(|p| p.to_string()),
            "default-definition" => self.default_definition.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "output-path" => self.output_path = Some(value),
            "pretty" => {
                let parsed = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => {
                        return Err(ConfigError::InvalidBool {
                            key: key.to_string(),
                            value,
                        })
                    }
                };
                self.pretty = Some(parsed);
            }
            "default-definition" => self.default_definition = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.output_path.is_none() && self.pretty.is_none() && self.default_definition.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|&key| self.get(key).map(|value| (key, value)))
            .collect()
    }

    /// Whether JSON output is pretty-printed
    pub fn pretty_output(&self) -> bool {
        self.pretty.unwrap_or(true)
    }
}
