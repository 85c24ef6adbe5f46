//! REPL meta-commands (`:help`, `:type x`, ...).

/// Help text printed by `:help`.
pub const HELP: &str = "\
:help            Show this help
:clear           Clear the history
:bindings        List the names currently bound
:type <name>     Show the runtime type of a binding
:reset           Drop every binding";

/// A parsed meta-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// `:help`
    Help,
    /// `:clear`
    Clear,
    /// `:bindings`
    Bindings,
    /// `:type <name>`
    Type(String),
    /// `:reset`
    Reset,
    /// Anything else, keeping the command word
    Unknown(String),
}

impl MetaCommand {
    /// Parses `input` if it is a meta-command.
    ///
    /// # Examples
    ///
    /// ```
    /// use orchestrator::MetaCommand;
    ///
    /// assert_eq!(MetaCommand::parse(" :type  Foo "), Some(MetaCommand::Type("Foo".to_string())));
    /// assert_eq!(MetaCommand::parse(":nope"), Some(MetaCommand::Unknown("nope".to_string())));
    /// assert_eq!(MetaCommand::parse("1 + 1"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.trim().strip_prefix(':')?;
        let mut words = rest.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words.next();
        Some(match (command, argument) {
            ("help", None) => MetaCommand::Help,
            ("clear", None) => MetaCommand::Clear,
            ("bindings", None) => MetaCommand::Bindings,
            ("reset", None) => MetaCommand::Reset,
            ("type", Some(name)) if words.next().is_none() => MetaCommand::Type(name.to_string()),
            _ => MetaCommand::Unknown(command.to_string()),
        })
    }
}

/// Returns true if `input` is handled as a meta-command.
pub fn is_meta_command(input: &str) -> bool {
    input.trim_start().starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(MetaCommand::parse(":help"), Some(MetaCommand::Help));
        assert_eq!(MetaCommand::parse(":clear"), Some(MetaCommand::Clear));
        assert_eq!(MetaCommand::parse(":bindings"), Some(MetaCommand::Bindings));
        assert_eq!(MetaCommand::parse(":reset"), Some(MetaCommand::Reset));
    }

    #[test]
    fn test_type_needs_exactly_one_name() {
        assert_eq!(MetaCommand::parse(":type"), Some(MetaCommand::Unknown("type".to_string())));
        assert_eq!(MetaCommand::parse(":type a b"), Some(MetaCommand::Unknown("type".to_string())));
    }

    #[test]
    fn test_bare_colon() {
        assert_eq!(MetaCommand::parse(":"), Some(MetaCommand::Unknown(String::new())));
        assert!(is_meta_command("  :help"));
        assert!(!is_meta_command("a ? b : c"));
    }
}
