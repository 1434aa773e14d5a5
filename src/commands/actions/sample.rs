//! Sample command handler.
//!
//! Picks one option out of the ones given by the user. The arguments arrive
//! with their quotes kept by the [`Commander`](crate::commands::Commander);
//! they are joined back into a single text and split again with quote-aware
//! field splitting, so `sample "Нина Ивановна" Вася` offers two options and
//! `sample чай,кофе сок` offers three.

use log::debug;

use crate::{
    commands::{
        random::RandomSource,
        text_response::{format_not_enough_options, format_sample},
    },
    utils::split_fields,
};

/// Picks a random option and returns the formatted answer.
///
/// With fewer than two arguments the user gets a guidance message and the
/// random source is left untouched.
pub fn handle_sample(args: &[String], random: &mut dyn RandomSource) -> String {
    if args.len() < 2 {
        debug!("sample needs at least two options, got {}", args.len());
        return format_not_enough_options();
    }

    let items = split_fields(&args.join(" "));
    if items.is_empty() {
        return format_not_enough_options();
    }

    debug!("sampling among {:?}", items);

    let index = random.below(items.len());
    format_sample(&items[index])
}
