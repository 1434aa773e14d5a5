//! Configuration file structures for the roller bot.
//!
//! The configuration is a YAML file split into three sections: the bot account,
//! the session storage and the logging destination.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Bot account
//! bot:
//!   # Name the bot answers to: "!roller roll"
//!   name: roller
//!   # Fully qualified Matrix user ID of the bot account
//!   user_id: "@roller:matrix.org"
//!   # Matrix account password
//!   token: "secret-password"
//!
//! # Session storage (optional)
//! session:
//!   dir: ./data
//!
//! # Logging (optional, logs go to stderr when `file` is not set)
//! log:
//!   dir: /var/log/roller-bot
//!   file: roller-bot.log
//!   perms: "0644"
//!   level: info
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any value can be overridden with an environment variable prefixed with
//! `ROLLER_`, sections being separated by a double underscore:
//!
//! ```bash
//! export ROLLER_BOT__TOKEN="secret-from-env"
//! export ROLLER_LOG__LEVEL="debug"
//! ```

use std::{fs, path::Path};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::error::StartupError;

/// Prefix of the environment variables overriding the configuration file.
const ENV_PREFIX: &str = "ROLLER_";

/// Root configuration structure for the roller bot.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Bot account configuration
    pub bot: Bot,
    /// Session storage configuration
    #[serde(default)]
    pub session: Session,
    /// Logging configuration
    #[serde(default)]
    pub log: Log,
}

/// Bot account configuration.
///
/// # YAML Section
///
/// ```yaml
/// bot:
///   name: roller
///   user_id: "@roller:matrix.org"
///   token: "your-password"
/// ```
#[derive(Debug, Deserialize)]
pub struct Bot {
    /// Name the bot answers to.
    ///
    /// Messages must start with `!` followed by this name to be handled.
    /// It is also used as the display name of the account.
    pub name: String,

    /// Fully qualified Matrix user ID.
    ///
    /// The Matrix ID of the bot account in the format `@username:homeserver.com`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// Used for the initial login. After a successful authentication the
    /// session is persisted and restored on the next start.
    pub token: String,
}

/// Session storage configuration.
#[derive(Debug, Deserialize)]
pub struct Session {
    /// Directory holding the Matrix session and the SDK state store.
    ///
    /// This directory contains the Matrix access token: restrict its permissions.
    #[serde(default = "default_session_dir")]
    pub dir: String,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            dir: default_session_dir(),
        }
    }
}

/// Logging configuration.
///
/// # YAML Section
///
/// ```yaml
/// log:
///   dir: /var/log/roller-bot
///   file: roller-bot.log
///   perms: "0644"
///   level: info
/// ```
#[derive(Debug, Deserialize)]
pub struct Log {
    /// Directory of the log file. Relative `file` values are resolved against it.
    pub dir: Option<String>,

    /// Log file. Logs are written to stderr when absent.
    pub file: Option<String>,

    /// Octal permissions of the log file when it is created.
    #[serde(default = "default_log_perms")]
    pub perms: String,

    /// Minimal level: `trace`, `debug`, `info`, `warn`, `error` or `crit`.
    ///
    /// `RUST_LOG` takes precedence over this value.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            dir: None,
            file: None,
            perms: default_log_perms(),
            level: default_log_level(),
        }
    }
}

fn default_session_dir() -> String {
    "data".to_owned()
}

fn default_log_perms() -> String {
    "0644".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Loads the configuration from a YAML file and the `ROLLER_` environment variables.
    ///
    /// # Errors
    ///
    /// Each cause has its own [`StartupError`] variant:
    /// - the file does not exist - [`StartupError::ConfigMissing`]
    /// - the file cannot be read - [`StartupError::ConfigNotReadable`]
    /// - the file is empty - [`StartupError::ConfigEmpty`]
    /// - the content does not match the expected structure - [`StartupError::ConfigMalformed`]
    pub fn load(path: &str) -> Result<Config, StartupError> {
        check_file(path)?;

        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| StartupError::ConfigMalformed {
                path: path.to_owned(),
                source: Box::new(e),
            })
    }
}

fn check_file(path: &str) -> Result<(), StartupError> {
    if !Path::new(path).exists() {
        return Err(StartupError::ConfigMissing(path.to_owned()));
    }

    if fs::File::open(path).is_err() {
        return Err(StartupError::ConfigNotReadable(path.to_owned()));
    }

    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Ok(()),
        Ok(metadata) if metadata.is_file() => Err(StartupError::ConfigEmpty(path.to_owned())),
        _ => Err(StartupError::ConfigNotReadable(path.to_owned())),
    }
}
