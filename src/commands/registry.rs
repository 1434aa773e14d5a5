//! Keyword to command mapping.

use std::collections::HashMap;

use log::debug;

use crate::commands::command::Command;

/// Maps every command keyword to its [`Command`].
///
/// Built once at startup and only read afterwards, so a single registry can
/// be shared between conversations behind an `Arc`.
#[derive(Debug)]
pub struct Registry {
    commands: HashMap<&'static str, Command>,
}

impl Registry {
    /// Creates a registry containing every alias of every [`Command`].
    pub fn new() -> Self {
        let commands = Command::all()
            .into_iter()
            .flat_map(|command| command.aliases().iter().map(move |alias| (*alias, command)))
            .collect::<HashMap<_, _>>();

        debug!("registered {} command keywords", commands.len());

        Registry { commands }
    }

    /// Finds the command registered for `keyword`.
    ///
    /// The lookup is an exact, case-sensitive match on the whole keyword.
    pub fn lookup(&self, keyword: &str) -> Option<Command> {
        self.commands.get(keyword).copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_every_alias() {
        let registry = Registry::new();

        for keyword in ["roll", "брось", "бросить", "кинь"] {
            assert_eq!(registry.lookup(keyword), Some(Command::Roll));
        }
        for keyword in ["random", "sample", "выбери"] {
            assert_eq!(registry.lookup(keyword), Some(Command::Sample));
        }
        for keyword in ["help", "usage", "помощь", "помоги"] {
            assert_eq!(registry.lookup(keyword), Some(Command::Help));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = Registry::new();
        assert_eq!(registry.lookup("Roll"), None);
        assert_eq!(registry.lookup("HELP"), None);
        assert_eq!(registry.lookup("Брось"), None);
    }

    #[test]
    fn test_lookup_has_no_partial_match() {
        let registry = Registry::new();
        assert_eq!(registry.lookup("rol"), None);
        assert_eq!(registry.lookup("rolls"), None);
        assert_eq!(registry.lookup(" roll"), None);
        assert_eq!(registry.lookup(""), None);
    }

    #[test]
    fn test_lookup_unknown_keyword() {
        let registry = Registry::new();
        assert_eq!(registry.lookup("qqq"), None);
    }
}
