//! Configuration loading and management.
//!
//! Values resolve from lowest to highest priority:
//! 1. Built-in defaults
//! 2. A YAML config file (explicit path, `TODO_SQLITE_CONFIG_PATH`,
//!    `./todo-sqlite.yaml`, then `<user config dir>/todo-sqlite/config.yaml`)
//! 3. Environment variables (`TODO_SQLITE_DB_PATH`, `TODO_SQLITE_HOST`, `TODO_SQLITE_PORT`)
//! 4. Command-line flags, applied by the binary

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default port for the todo page.
pub const DEFAULT_UI_PORT: u16 = 8501;

/// Name of the project-level config file.
pub const PROJECT_CONFIG_FILE: &str = "todo-sqlite.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("demo.db")
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiConfig {
    /// Address to bind (default: 127.0.0.1).
    #[serde(default = "default_ui_host")]
    pub host: String,

    /// Port to bind (default: 8501).
    #[serde(default = "default_ui_port")]
    pub port: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            host: default_ui_host(),
            port: default_ui_port(),
        }
    }
}

fn default_ui_host() -> String {
    "127.0.0.1".to_string()
}

fn default_ui_port() -> u16 {
    DEFAULT_UI_PORT
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Resolve configuration from file and environment.
    ///
    /// An explicit path (argument or `TODO_SQLITE_CONFIG_PATH`) must load;
    /// implicit locations are only used when the file exists.
    /// Returns the config and the file it came from, if any.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("TODO_SQLITE_CONFIG_PATH").map(PathBuf::from));

        let (mut config, source) = match explicit {
            Some(path) => (Self::load(&path)?, Some(path)),
            None => match Self::implicit_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => (Self::load(&path)?, Some(path)),
                None => (Self::default(), None),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok((config, source))
    }

    /// Config file locations searched when no path is given.
    pub fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("todo-sqlite").join("config.yaml"));
        }
        paths
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup("TODO_SQLITE_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(host) = lookup("TODO_SQLITE_HOST") {
            self.ui.host = host;
        }

        if let Some(port) = lookup("TODO_SQLITE_PORT") {
            match port.parse() {
                Ok(port) => self.ui.port = port,
                Err(_) => warn!("Ignoring invalid TODO_SQLITE_PORT value '{}'", port),
            }
        }
    }

    /// Address the HTTP server should bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.ui.host, self.ui.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_single_file_layout() {
        let config = Config::default();
        assert_eq!(config.server.db_path, PathBuf::from("demo.db"));
        assert_eq!(config.ui.port, DEFAULT_UI_PORT);
        assert_eq!(config.bind_addr(), "127.0.0.1:8501");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("ui:\n  port: 9000\n").unwrap();
        assert_eq!(config.ui.port, 9000);
        assert_eq!(config.ui.host, "127.0.0.1");
        assert_eq!(config.server.db_path, PathBuf::from("demo.db"));
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  db_path: /tmp/todos.db\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.db_path, PathBuf::from("/tmp/todos.db"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(Config::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TODO_SQLITE_DB_PATH", "other.db"),
            ("TODO_SQLITE_HOST", "0.0.0.0"),
            ("TODO_SQLITE_PORT", "8080"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.db_path, PathBuf::from("other.db"));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "TODO_SQLITE_PORT").then(|| "abc".to_string()));
        assert_eq!(config.ui.port, DEFAULT_UI_PORT);
    }
}
