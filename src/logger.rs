//! Logger setup.
//!
//! Logs go through the `log` facade to `env_logger`. The [`Log`] configuration
//! picks the destination and the default level; `RUST_LOG` still wins over the
//! configured level when it is set.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    str::FromStr,
};

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::{config::Log, error::StartupError};

/// Installs the global logger described by `config`.
///
/// # Errors
///
/// Returns a [`StartupError`] when the log directory does not exist, the
/// permissions are not an octal mode, the file cannot be opened or a logger is
/// already installed. An unknown level is not an error: a warning is printed
/// and `info` is used.
pub fn setup_log(config: &Log) -> Result<(), StartupError> {
    let mut builder = Builder::new();
    builder.filter_level(parse_level(&config.level));
    builder.parse_env(Env::default());

    if let Some(path) = log_path(config)? {
        let mode = parse_perms(&config.perms)?;
        let file = open_log_file(&path, mode)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;

    Ok(())
}

/// Converts a configured level into a [`LevelFilter`].
///
/// `crit` is accepted as an alias of `error`.
pub fn parse_level(level: &str) -> LevelFilter {
    let level = level.trim();
    if level.eq_ignore_ascii_case("crit") {
        return LevelFilter::Error;
    }

    match LevelFilter::from_str(level) {
        Ok(filter) => filter,
        Err(_) => {
            eprintln!("Error with changing log level: unknown level {level}, using info");
            LevelFilter::Info
        }
    }
}

/// Parses octal file permissions such as `0644` or `0o600`.
pub fn parse_perms(perms: &str) -> Result<u32, StartupError> {
    let digits = perms.trim().trim_start_matches("0o");

    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        _ => Err(StartupError::LogPerms(perms.to_owned())),
    }
}

/// Resolves the log file path, checking the log directory on the way.
fn log_path(config: &Log) -> Result<Option<PathBuf>, StartupError> {
    if let Some(dir) = &config.dir
        && !Path::new(dir).is_dir()
    {
        return Err(StartupError::LogDirMissing(dir.clone()));
    }

    let Some(file) = &config.file else {
        return Ok(None);
    };

    let path = match &config.dir {
        Some(dir) => Path::new(dir).join(file),
        None => PathBuf::from(file),
    };

    Ok(Some(path))
}

fn open_log_file(path: &Path, mode: u32) -> Result<File, StartupError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|source| StartupError::LogFile {
        path: path.to_string_lossy().into_owned(),
        source,
    })
}
