//! Command definitions and execution.
//!
//! A [`Command`] is what a keyword resolves to once it is found in the
//! [`Registry`](crate::commands::registry::Registry). Several keywords can
//! resolve to the same command, e.g. `roll` and `брось`.

use log::debug;

use crate::commands::{
    actions::{handle_help, handle_roll, handle_sample},
    random::RandomSource,
};

/// A command the bot knows how to answer.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Command {
    /// Roll a dice: `roll [sides] [count]`
    Roll,
    /// Pick one option: `sample <option> <option> ...`
    Sample,
    /// Display help information
    Help,
}

impl Command {
    /// Keywords the command answers to.
    ///
    /// Matching is exact and case-sensitive.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Command::Roll => &["roll", "брось", "бросить", "кинь"],
            Command::Sample => &["random", "sample", "выбери"],
            Command::Help => &["help", "usage", "помощь", "помоги"],
        }
    }

    /// Every command, in the order they are registered.
    pub fn all() -> [Command; 3] {
        [Command::Roll, Command::Sample, Command::Help]
    }

    /// Runs the command and returns the replies to send, in order.
    ///
    /// # Arguments
    ///
    /// * `args` - Arguments following the command keyword
    /// * `sender` - Display name of the user who sent the command
    /// * `random` - Random source for commands that need one
    pub fn execute(
        &self,
        args: &[String],
        sender: &str,
        random: &mut dyn RandomSource,
    ) -> Vec<String> {
        debug!("executing {:?} for {}", self, sender);

        let reply = match self {
            Command::Roll => handle_roll(args, random),
            Command::Sample => handle_sample(args, random),
            Command::Help => handle_help(args),
        };

        vec![reply]
    }
}
