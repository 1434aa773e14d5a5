//! Help command handler.
//!
//! Describes the `roll` and `sample` commands with usage examples.
//!
//! This is a stateless command that always returns the same help message.

use log::debug;

use crate::commands::text_response::format_help;

/// Returns the help message.
///
/// Arguments are accepted and ignored, so `help roll` answers like `help`.
pub fn handle_help(args: &[String]) -> String {
    debug!("handling help command with {} ignored argument(s)", args.len());

    format_help()
}
