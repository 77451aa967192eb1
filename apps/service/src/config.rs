use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation;

/// Policy bounds for the check interval, enforced at this boundary only; the
/// scheduler itself accepts any positive period.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 15;
pub const MAX_CHECK_INTERVAL_SECS: u64 = 300;

const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write config file: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config path available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
    #[error("check interval must be between 15 and 300 seconds, got {0}")]
    IntervalOutOfBounds(u64),
    #[error("invalid custom endpoint {name:?}: {reason}")]
    InvalidEndpoint { name: String, reason: String },
}

/// User-added monitored service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomEndpoint {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,

    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,

    #[serde(default)]
    pub custom_endpoints: Vec<CustomEndpoint>,
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

fn default_notifications_enabled() -> bool {
    true
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/aistatus/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("aistatus/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECS,
            notifications_enabled: true,
            custom_endpoints: Vec::new(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitoring")?;
        write_1(f, "Check Interval", &format!("{}s", self.check_interval_seconds))?;
        write_1(
            f,
            "Notifications",
            &if self.notifications_enabled { "enabled" } else { "disabled" },
        )?;
        write_1(f, "Custom Endpoints", &self.custom_endpoints.len())?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/aistatus/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            toml::from_str(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        fs::write(path, config_str).map_err(ConfigError::Write)
    }

    /// Reject bad values here so the check cycle never sees them: an
    /// out-of-bounds interval or a custom endpoint that could never be
    /// probed fails the load instead of surfacing later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CHECK_INTERVAL_SECS..=MAX_CHECK_INTERVAL_SECS)
            .contains(&self.check_interval_seconds)
        {
            return Err(ConfigError::IntervalOutOfBounds(self.check_interval_seconds));
        }

        for endpoint in &self.custom_endpoints {
            let name_check = validation::validate_endpoint_name(&endpoint.name);
            if !name_check.is_valid {
                return Err(ConfigError::InvalidEndpoint {
                    name: endpoint.name.clone(),
                    reason: name_check.error.unwrap_or_else(|| "invalid name".to_string()),
                });
            }

            let url_check = validation::validate_http_endpoint(&endpoint.url);
            if !url_check.is_valid {
                return Err(ConfigError::InvalidEndpoint {
                    name: endpoint.name.clone(),
                    reason: url_check.error.unwrap_or_else(|| "invalid URL".to_string()),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_writes_defaults_and_loads_them() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::from_config(Some(&path)).unwrap();

        assert!(path.exists());
        assert_eq!(config.check_interval_seconds, 60);
        assert!(config.notifications_enabled);
        assert!(config.custom_endpoints.is_empty());
    }

    #[test]
    fn written_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.check_interval_seconds = 120;
        config.custom_endpoints.push(CustomEndpoint {
            name: "My API".to_string(),
            url: "https://example.com/health".to_string(),
        });
        config.write_config(&path).unwrap();

        let loaded = Config::from_config(Some(&path)).unwrap();
        assert_eq!(loaded.check_interval_seconds, 120);
        assert_eq!(loaded.custom_endpoints.len(), 1);
        assert_eq!(loaded.custom_endpoints[0].name, "My API");
    }

    #[test]
    fn partial_file_is_filled_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "check_interval_seconds = 30\n").unwrap();

        let config = Config::from_config(Some(&path)).unwrap();

        assert_eq!(config.check_interval_seconds, 30);
        assert!(config.notifications_enabled);
        assert!(config.custom_endpoints.is_empty());
    }

    #[test]
    fn out_of_bounds_interval_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "check_interval_seconds = 5\n").unwrap();

        let result = Config::from_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::IntervalOutOfBounds(5))));
    }

    #[test]
    fn malformed_custom_endpoint_url_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[[custom_endpoints]]\nname = \"Broken\"\nurl = \"example.com/no-scheme\"\n",
        )
        .unwrap();

        let result = Config::from_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::InvalidEndpoint { name, .. }) if name == "Broken"));
    }

    #[test]
    fn non_toml_extension_is_normalized() {
        assert_eq!(
            normalize_toml_path(path::Path::new("/tmp/settings.json")),
            path::PathBuf::from("/tmp/settings.toml")
        );
        assert_eq!(
            normalize_toml_path(path::Path::new("/tmp/settings.toml")),
            path::PathBuf::from("/tmp/settings.toml")
        );
    }
}
