use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    FollowSystem,
}

/// User-facing toggles that the app keeps alongside the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub background_enabled: bool,
    pub local_save_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub backup_dir: PathBuf,
    pub preferences: Preferences,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_value = lookup("CARSTAT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = SocketAddr::from_str(bind_value.trim()).map_err(|_| {
            ConfigError::InvalidValue {
                key: "CARSTAT_BIND_ADDR",
                value: bind_value.clone(),
            }
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let backup_dir = lookup("CARSTAT_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let theme = match lookup("CARSTAT_THEME") {
            Some(value) => Theme::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                key: "CARSTAT_THEME",
                value,
            })?,
            None => Theme::default(),
        };

        let preferences = Preferences {
            theme,
            background_enabled: parse_flag(&lookup, "CARSTAT_BACKGROUND_ENABLED")?,
            local_save_enabled: parse_flag(&lookup, "CARSTAT_LOCAL_SAVE_ENABLED")?,
        };

        Ok(Self {
            bind_addr,
            database_url,
            backup_dir,
            preferences,
        })
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}
