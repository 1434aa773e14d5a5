//! Roller - A Matrix bot that rolls dice and picks among options.
//!
//! # Overview
//!
//! Roller joins the rooms it is invited to, greets them, and answers the
//! commands addressed to it by name. Everything else posted in the room is
//! ignored.
//!
//! # Configuration
//!
//! Create a `roller-bot.conf` file (YAML):
//!
//! ```yaml
//! bot:
//!   name: roller
//!   user_id: "@roller:matrix.org"
//!   token: "your-password"
//!
//! session:
//!   dir: ./data
//!
//! log:
//!   dir: /var/log/roller
//!   file: roller.log
//!   perms: "0640"
//!   level: info
//! ```
//!
//! Any value can be overridden with a `ROLLER_` environment variable, e.g.
//! `ROLLER_BOT__TOKEN`.
//!
//! # Usage
//!
//! ```bash
//! roller-bot --config roller-bot.conf
//! ```
//!
//! # Bot Commands
//!
//! - `!roller roll [sides] [count]` - Roll `count` dice with `sides` sides
//! - `!roller sample <a> <b> [...]` - Pick one of the options
//! - `!roller help` - Display help information
//!
//! # Architecture
//!
//! - [`bot`] - Routes Matrix events to the command dispatcher of each room
//! - [`commands`] - Command parsing, dispatch and the roll/sample/help actions
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`error`] - Fatal startup errors
//! - [`logger`] - Log level and log file setup
//! - [`matrix`] - Matrix client integration and session management
//! - [`utils`] - Quote-aware word and field splitting

use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{error, info};

use crate::{bot::Bot, config::Config, logger::setup_log};

mod bot;
mod commands;
mod config;
mod error;
mod logger;
mod matrix;
mod utils;

/// Command-line arguments for the Roller bot.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "roller-bot.conf")]
    config: String,

    /// Print help
    #[arg(short, long, action = ArgAction::Help, visible_alias = "usage")]
    help: Option<bool>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version, visible_alias = "ver")]
    version: Option<bool>,
}

/// Main entry point for the Roller bot.
///
/// 1. Parses command-line arguments
/// 2. Loads the configuration
/// 3. Sets up logging
/// 4. Logs in to Matrix and starts answering
///
/// Any failure before the bot starts is fatal and exits with code 1.
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_log(&config.log) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting roller-bot {}...", env!("CARGO_PKG_VERSION"));

    let bot = match Bot::new(config).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    bot.start().await;

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, error::ErrorKind};

    use super::*;

    #[test]
    fn test_args_default_config() {
        let args = Args::try_parse_from(["roller-bot"]).unwrap();
        assert_eq!(args.config, "roller-bot.conf");
    }

    #[test]
    fn test_args_config() {
        let args = Args::try_parse_from(["roller-bot", "--config", "/etc/roller.conf"]).unwrap();
        assert_eq!(args.config, "/etc/roller.conf");

        let args = Args::try_parse_from(["roller-bot", "-c", "other.conf"]).unwrap();
        assert_eq!(args.config, "other.conf");
    }

    #[test]
    fn test_args_help_and_usage() {
        for flag in ["--help", "-h", "--usage"] {
            let err = Args::try_parse_from(["roller-bot", flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_args_version() {
        for flag in ["--version", "-v", "--ver"] {
            let err = Args::try_parse_from(["roller-bot", flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_args_unknown_flag() {
        assert!(Args::try_parse_from(["roller-bot", "--verbose"]).is_err());
    }

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }
}
