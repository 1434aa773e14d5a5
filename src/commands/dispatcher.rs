//! Command dispatching.
//!
//! The [`Dispatcher`] resolves the keyword of a [`CommandEvent`] through the
//! [`Registry`], runs the matching [`Command`](crate::commands::command::Command)
//! and keeps count of the unknown commands sent in a row. After more than
//! [`PATIENCE`] misses the polite answer is replaced by a random pick from
//! [`ESCALATION_MESSAGES`].
//!
//! # Flow
//!
//! ```text
//! CommandEvent → Registry::lookup() → Command::execute() → replies
//!                      │
//!                      └── no match → FailureState::record_miss() → generic or escalation reply
//! ```

use std::sync::Arc;

use log::debug;

use crate::commands::{
    CommandEvent,
    random::RandomSource,
    registry::Registry,
    text_response::{ESCALATION_MESSAGES, format_unknown_command},
};

/// Number of unknown commands in a row answered with the generic message.
pub const PATIENCE: u32 = 3;

/// Count of consecutive unknown commands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FailureState {
    misses: u32,
}

impl FailureState {
    /// Records an unknown command and returns the updated count.
    pub fn record_miss(&mut self) -> u32 {
        self.misses = self.misses.saturating_add(1);
        self.misses
    }

    /// Forgets previous misses.
    pub fn reset(&mut self) {
        self.misses = 0;
    }

    /// Current number of consecutive misses.
    pub fn misses(&self) -> u32 {
        self.misses
    }
}

/// Routes command events to their handlers.
///
/// A dispatcher owns the [`FailureState`] of one conversation. The registry is
/// shared and never modified.
pub struct Dispatcher<R: RandomSource> {
    registry: Arc<Registry>,
    random: R,
    failures: FailureState,
}

impl<R: RandomSource> Dispatcher<R> {
    /// Creates a dispatcher with a fresh [`FailureState`].
    pub fn new(registry: Arc<Registry>, random: R) -> Self {
        Dispatcher {
            registry,
            random,
            failures: FailureState::default(),
        }
    }

    /// Handles a command event and returns the replies to send.
    ///
    /// Known commands reset the failure count. Unknown commands are not an
    /// error: they increase the count and get an answer whose tone depends on
    /// how many misses happened in a row.
    pub fn dispatch(&mut self, event: &CommandEvent) -> Vec<String> {
        debug!(
            "got command from {}: {} {}",
            event.sender_display_name,
            event.command,
            event.args.join(" ")
        );

        match self.registry.lookup(&event.command) {
            Some(command) => {
                self.failures.reset();
                command.execute(&event.args, &event.sender_display_name, &mut self.random)
            }
            None => vec![self.unknown_command_reply()],
        }
    }

    /// Current failure state of the conversation.
    pub fn failures(&self) -> FailureState {
        self.failures
    }

    fn unknown_command_reply(&mut self) -> String {
        let misses = self.failures.record_miss();
        debug!("unknown command, {} in a row", misses);

        if misses > PATIENCE {
            let index = self.random.below(ESCALATION_MESSAGES.len());
            return ESCALATION_MESSAGES[index].to_owned();
        }

        format_unknown_command()
    }
}
