//! Configuration file management for mediaplan.
//!
//! Provides a TOML-based config file at `~/.config/mediaplan/config.toml` and
//! a resolution chain: env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mediaplan_core::config::FunnelDefaults;

/// Log filter used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub funnel: FunnelSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Conversion rates assumed when a plan's CAC model does not state them.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FunnelSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_to_sql_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_to_customer_rate: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `mediaplan_core=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mediaplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mediaplan` or
/// `~/.config/mediaplan`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mediaplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mediaplan")
}

/// Return the path to the mediaplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaplanConfig {
    pub funnel: FunnelDefaults,
    pub log_filter: String,
}

impl MediaplanConfig {
    /// Resolve configuration using the chain: env var > config file > default.
    ///
    /// - Lead-to-SQL rate: `MEDIAPLAN_LEAD_TO_SQL_RATE` > `funnel.lead_to_sql_rate` > 0.30
    /// - SQL-to-customer rate: `MEDIAPLAN_SQL_TO_CUSTOMER_RATE` > `funnel.sql_to_customer_rate` > 0.25
    /// - Log filter: `logging.filter` > `info` (`RUST_LOG` is applied by the subscriber itself)
    ///
    /// A missing config file is not an error; a malformed one is.
    pub fn resolve() -> Result<Self> {
        let file_config = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };

        let defaults = FunnelDefaults::default();
        let lead_to_sql_rate = rate(
            "MEDIAPLAN_LEAD_TO_SQL_RATE",
            file_config.funnel.lead_to_sql_rate,
            defaults.lead_to_sql_rate,
        )?;
        let sql_to_customer_rate = rate(
            "MEDIAPLAN_SQL_TO_CUSTOMER_RATE",
            file_config.funnel.sql_to_customer_rate,
            defaults.sql_to_customer_rate,
        )?;

        Ok(Self {
            funnel: FunnelDefaults {
                lead_to_sql_rate,
                sql_to_customer_rate,
            },
            log_filter: file_config
                .logging
                .filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

fn rate(env_var: &str, from_file: Option<f64>, default: f64) -> Result<f64> {
    let value = match std::env::var(env_var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{env_var} is not a number: {raw:?}"))?,
        Err(_) => from_file.unwrap_or(default),
    };
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{env_var} must be between 0 and 1, got {value}");
    }
    Ok(value)
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
