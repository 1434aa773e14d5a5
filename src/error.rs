//! Startup errors.
//!
//! Anything that prevents the bot from starting is a [`StartupError`]. Each
//! variant renders its own message; `main` prints it and exits with code 1.
//! Errors happening once the bot is running are logged instead.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Config {0} does not exist")]
    ConfigMissing(String),

    #[error("Config {0} is not readable")]
    ConfigNotReadable(String),

    #[error("Config {0} is empty")]
    ConfigEmpty(String),

    #[error("Config {path} is malformed: {source}")]
    ConfigMalformed {
        path: String,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Directory for logs {0} does not exist")]
    LogDirMissing(String),

    #[error("Error with log setup: can't open {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Error with log setup: permissions {0} are not a valid octal mode")]
    LogPerms(String),

    #[error("Error with log setup: {0}")]
    Logger(#[from] log::SetLoggerError),
}
