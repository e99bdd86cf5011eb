//! Slash command parser.

/// Character that marks a line as a command.
pub const COMMAND_PREFIX: char = '/';

/// Recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Current local time.
    Time,
    /// Six-sided die.
    Roll,
    /// Random quotation.
    Quote,
}

/// Command table. Names are matched by prefix, so `/time zone` and `/timer`
/// both select `Time`. Add an entry here to add a command.
pub const COMMANDS: &[(&str, Command)] = &[
    ("time", Command::Time),
    ("roll", Command::Roll),
    ("quote", Command::Quote),
];

/// Parse result.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// Prefixed line naming a known command.
    Command(Command),
    /// Prefixed line naming nothing in the table.
    Unknown,
    /// Not a command at all.
    NotCommand,
}

/// Classify a received line.
pub fn parse(text: &str) -> ParseResult {
    let Some(rest) = text.strip_prefix(COMMAND_PREFIX) else {
        return ParseResult::NotCommand;
    };

    COMMANDS
        .iter()
        .find(|(name, _)| rest.starts_with(name))
        .map_or(ParseResult::Unknown, |&(_, cmd)| ParseResult::Command(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("/time\n"), ParseResult::Command(Command::Time));
        assert_eq!(parse("/roll\n"), ParseResult::Command(Command::Roll));
        assert_eq!(parse("/quote\n"), ParseResult::Command(Command::Quote));
    }

    #[test]
    fn test_parse_ignores_arguments() {
        assert_eq!(parse("/roll 2d6\n"), ParseResult::Command(Command::Roll));
        assert_eq!(parse("/timer\n"), ParseResult::Command(Command::Time));
        assert_eq!(parse("/quote"), ParseResult::Command(Command::Quote));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(parse("/TIME\n"), ParseResult::Unknown);
        assert_eq!(parse("/Roll\n"), ParseResult::Unknown);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/help\n"), ParseResult::Unknown);
        assert_eq!(parse("/\n"), ParseResult::Unknown);
        assert_eq!(parse("/ time\n"), ParseResult::Unknown);
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("time\n"), ParseResult::NotCommand);
        assert_eq!(parse(" /time\n"), ParseResult::NotCommand);
        assert_eq!(parse("\n"), ParseResult::NotCommand);
    }
}
