//! Roll command handler.
//!
//! Rolls a dice with a configurable number of sides, possibly several times.
//! Arguments are positional: `roll [sides] [count]`. Missing or unparsable
//! values fall back to the defaults without telling the user, then both values
//! are clamped into their allowed ranges.

use log::debug;

use crate::commands::{random::RandomSource, text_response::format_roll};

/// Sides used when the first argument is missing or not an integer.
pub const DEFAULT_SIDES: i64 = 5;
/// Rolls performed when the second argument is missing or not an integer.
pub const DEFAULT_COUNT: i64 = 1;
/// Smallest dice the bot accepts.
pub const MIN_SIDES: i64 = 2;
/// Largest dice the bot accepts.
pub const MAX_SIDES: i64 = 10_000_000;
/// Upper bound on the number of rolls in one command.
pub const MAX_ROLLS: i64 = 20;

/// Rolls the dice and returns the formatted result.
///
/// Each value is drawn independently and uniformly in `[1, sides]`.
pub fn handle_roll(args: &[String], random: &mut dyn RandomSource) -> String {
    let (sides, count) = roll_parameters(args);
    debug!("rolling {} time(s) a dice with {} sides", count, sides);

    let values = (0..count)
        .map(|_| random.below(sides) + 1)
        .collect::<Vec<usize>>();

    format_roll(&values)
}

/// Resolves the effective `(sides, count)` from the command arguments.
pub fn roll_parameters(args: &[String]) -> (usize, usize) {
    let sides = parse_or_default(args.first(), DEFAULT_SIDES).clamp(MIN_SIDES, MAX_SIDES);
    let count = parse_or_default(args.get(1), DEFAULT_COUNT).clamp(1, MAX_ROLLS);

    // Both values are positive after clamping
    (sides as usize, count as usize)
}

fn parse_or_default(arg: Option<&String>, default: i64) -> i64 {
    arg.and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::commands::random::{MockRandomSource, StdRandom};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn rolled_values(reply: &str) -> Vec<usize> {
        reply
            .strip_prefix("Кубик брошен. Выпало ")
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap()
            .split(", ")
            .map(|value| value.trim_matches('*').parse().unwrap())
            .collect()
    }

    #[test]
    fn test_roll_parameters_defaults() {
        assert_eq!(roll_parameters(&[]), (5, 1));
    }

    #[test]
    fn test_roll_parameters_valid_values() {
        assert_eq!(roll_parameters(&args(&["12", "5"])), (12, 5));
    }

    #[test]
    fn test_roll_parameters_only_sides() {
        assert_eq!(roll_parameters(&args(&["100"])), (100, 1));
    }

    #[test]
    fn test_roll_parameters_invalid_values_use_defaults() {
        assert_eq!(roll_parameters(&args(&["много", "раз"])), (5, 1));
        assert_eq!(roll_parameters(&args(&["", "3"])), (5, 3));
        assert_eq!(roll_parameters(&args(&["6", "2.5"])), (6, 1));
    }

    #[test]
    fn test_roll_parameters_clamps_sides() {
        assert_eq!(roll_parameters(&args(&["1"])), (2, 1));
        assert_eq!(roll_parameters(&args(&["-40"])), (2, 1));
        assert_eq!(roll_parameters(&args(&["99999999999"])), (10_000_000, 1));
    }

    #[test]
    fn test_roll_parameters_clamps_count() {
        assert_eq!(roll_parameters(&args(&["6", "0"])), (6, 1));
        assert_eq!(roll_parameters(&args(&["6", "-3"])), (6, 1));
        assert_eq!(roll_parameters(&args(&["6", "21"])), (6, 20));
        assert_eq!(roll_parameters(&args(&["6", "20"])), (6, 20));
    }

    #[test]
    fn test_roll_parameters_out_of_range_integer_uses_default() {
        assert_eq!(
            roll_parameters(&args(&["999999999999999999999999", "3"])),
            (5, 3)
        );
    }

    #[test]
    fn test_roll_parameters_ignores_extra_args() {
        assert_eq!(roll_parameters(&args(&["8", "2", "extra"])), (8, 2));
    }

    #[test]
    fn test_handle_roll_default_single_value() {
        let mut random = StdRandom::seeded(3);
        for _ in 0..100 {
            let reply = handle_roll(&[], &mut random);
            let values = rolled_values(&reply);
            assert_eq!(values.len(), 1);
            assert!((1..=5).contains(&values[0]));
        }
    }

    #[test]
    fn test_handle_roll_twelve_sides_five_times() {
        let mut random = StdRandom::seeded(11);
        let reply = handle_roll(&args(&["12", "5"]), &mut random);
        let values = rolled_values(&reply);
        assert_eq!(values.len(), 5);
        assert!(values.iter().all(|value| (1..=12).contains(value)));
    }

    #[test]
    fn test_handle_roll_count_and_range_across_parameters() {
        let mut random = StdRandom::seeded(5);
        for (sides, count) in [(2, 1), (2, 20), (6, 3), (10_000_000, 20)] {
            let reply = handle_roll(&[sides.to_string(), count.to_string()], &mut random);
            let values = rolled_values(&reply);
            assert_eq!(values.len(), count);
            assert!(values.iter().all(|value| *value >= 1 && *value <= sides));
        }
    }

    #[test]
    fn test_handle_roll_draws_once_per_roll() {
        let mut random = MockRandomSource::new();
        random.expect_below().with(eq(20)).times(3).return_const(19usize);

        let reply = handle_roll(&args(&["20", "3"]), &mut random);
        assert_eq!(reply, "Кубик брошен. Выпало *20*, *20*, *20*.");
    }

    #[test]
    fn test_handle_roll_lowest_value_is_one() {
        let mut random = MockRandomSource::new();
        random.expect_below().with(eq(5)).times(1).return_const(0usize);

        assert_eq!(handle_roll(&[], &mut random), "Кубик брошен. Выпало *1*.");
    }
}
