//! Persisted settings for the slackdef CLI

pub mod config;

pub use config::{Config, ConfigError, CONFIG_ENV_VAR, KNOWN_KEYS};
