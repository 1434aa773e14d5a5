//! Command action handlers.
//!
//! Individual handler functions for each bot command. Each handler receives
//! the command arguments and returns the reply text.
//!
//! # Available Handlers
//!
//! - [`handle_roll`] - Roll a dice one or more times
//! - [`handle_sample`] - Pick one of the given options
//! - [`handle_help`] - Display help information
//!
//! Handlers that need randomness draw through a
//! [`RandomSource`](crate::commands::random::RandomSource) passed by the caller.

mod help;
mod roll;
mod sample;

pub use crate::commands::actions::{help::handle_help, roll::handle_roll, sample::handle_sample};
