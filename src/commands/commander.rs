//! Message parsing.
//!
//! This module provides the [`Commander`] struct, which turns the body of a
//! chat message into a [`CommandEvent`]. A message is addressed to the bot when
//! it starts with `!` followed by the bot name:
//!
//! ```text
//! !roller roll 12 5
//!  │      │    └──── args
//!  │      └───────── command keyword
//!  └──────────────── bot name
//! ```
//!
//! Only the first word goes through `command-parser`, to recognize the bot
//! name. The rest of the message is split with
//! [`split_words`](crate::utils::split_words): arguments stay positional even
//! when they start with `-`, and quoted options keep their quotes for the
//! `sample` handler.
//!
//! Whether the keyword is known is decided later by the
//! [`Dispatcher`](crate::commands::dispatcher::Dispatcher).

use command_parser::Parser;
use log::debug;

use crate::{
    commands::{CommandEvent, CommandParseError},
    utils::split_words,
};

/// Keyword used when the bot is addressed without any command.
const DEFAULT_COMMAND: &str = "help";

/// Parses chat messages addressed to the bot.
pub struct Commander {
    /// Command parser recognizing `!<name>`
    parser: Parser,
    /// Name the bot answers to
    name: String,
}

impl Commander {
    /// Creates a new Commander answering to `name`.
    ///
    /// The parser is configured to recognize commands starting with `!` as the command
    /// prefix and `-` as the option prefix.
    pub fn new(name: &str) -> Self {
        let parser = Parser::new('!', '-');
        Commander {
            parser,
            name: name.to_owned(),
        }
    }

    /// Parses a message body into a [`CommandEvent`].
    ///
    /// # Arguments
    ///
    /// * `body` - The raw message text, possibly spanning several lines
    /// * `sender_display_name` - Display name of the message author
    ///
    /// # Returns
    ///
    /// The command keyword (`help` when the bot is only named) and its
    /// arguments, in the order they were written.
    ///
    /// # Errors
    ///
    /// - [`CommandParseError::UnableToParse`] if the message is not a command
    /// - [`CommandParseError::NotForBot`] if the command addresses another name
    ///
    /// Both errors mean the message must be ignored silently.
    pub fn parse(
        &self,
        body: &str,
        sender_display_name: &str,
    ) -> Result<CommandEvent, CommandParseError> {
        let text = body.trim_start();
        let (head, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));

        if !head.starts_with('!') {
            return Err(CommandParseError::UnableToParse);
        }

        // For an unknown reason the parser ignores the last word, so we add a dummy word at the end
        let head = head.to_string() + " dummy";

        let command = match self.parser.parse(&head) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParseError::UnableToParse),
        };

        // Ignore commands that are not for the bot
        if command.name != self.name.as_str() {
            return Err(CommandParseError::NotForBot);
        }

        let mut words = split_words(rest).into_iter();
        let keyword = words.next().unwrap_or_else(|| DEFAULT_COMMAND.to_owned());
        let args: Vec<String> = words.collect();

        debug!("parsed message: {} {:?}", keyword, args);

        Ok(CommandEvent {
            command: keyword,
            args,
            sender_display_name: sender_display_name.to_owned(),
        })
    }

    /// Name the bot answers to.
    pub fn name(&self) -> &str {
        &self.name
    }
}
