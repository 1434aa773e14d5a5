//! Bot command parsing, dispatching and response formatting.
//!
//! This module provides the complete command processing pipeline of the bot.
//!
//! # Overview
//!
//! 1. **Parsing** - [`Commander`] turns a chat message into a [`CommandEvent`]
//! 2. **Lookup** - [`Registry`] maps the command keyword to a [`Command`](command::Command)
//! 3. **Execution** - [`Dispatcher`] runs the command, or answers an unknown one
//! 4. **Response** - [`text_response`] formats every reply
//!
//! # Architecture
//!
//! ```text
//! Chat Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← parse(): "!roller roll 12 5" → CommandEvent
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐     ┌──────────────────┐
//! │ Dispatcher  │ ──▶ │     Registry     │
//! └─────────────┘     └──────────────────┘
//!      │
//!      ├── known ─────▶ handle_roll / handle_sample / handle_help
//!      │
//!      └── unknown ───▶ FailureState → generic or escalation reply
//! ```
//!
//! # Available Commands
//!
//! | Command | Aliases | Arguments |
//! |---------|---------|-----------|
//! | `roll` | `брось`, `бросить`, `кинь` | `[sides] [count]` |
//! | `sample` | `random`, `выбери` | `<option> <option> ...` |
//! | `help` | `usage`, `помощь`, `помоги` | None |
//!
//! # Module Organization
//!
//! - [`commander`] - Message parsing
//! - [`command`] - Command enum and execution
//! - [`registry`] - Keyword to command mapping
//! - [`dispatcher`] - Dispatching and failure tracking
//! - [`random`] - Random source abstraction
//! - [`actions`] - Individual command handlers
//! - [`text_response`] - Reply formatters

mod actions;
pub mod command;
pub mod commander;
pub mod dispatcher;
pub mod random;
pub mod registry;
pub mod text_response;

pub use crate::commands::{
    commander::Commander, dispatcher::Dispatcher, random::StdRandom, registry::Registry,
};

/// A command sent to the bot.
///
/// Created for each message addressed to the bot and discarded once handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    /// Command keyword, e.g. `roll`
    pub command: String,
    /// Arguments following the keyword, in order
    pub args: Vec<String>,
    /// Display name of the user who sent the command
    pub sender_display_name: String,
}

/// Errors that can occur while parsing a message.
///
/// Neither variant produces a reply: the message is simply not a command for
/// this bot.
#[derive(Debug)]
pub enum CommandParseError {
    /// The message could not be parsed as a command
    UnableToParse,
    /// The command addresses another bot name
    NotForBot,
}
