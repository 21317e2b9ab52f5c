use std::num::ParseIntError;

use crate::models::{CommandName, NO_ARGUMENT, ServoCommand};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Exit,
    Command(ServoCommand),
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("ERROR: Format is [command] [#]")]
    WrongTokenCount { command: String, tokens: usize },

    #[error("Invalid argument {value:?} for '{command}': {source}")]
    InvalidArgument {
        command: String,
        value: String,
        source: ParseIntError,
    },
}

impl InputError {
    /// Format mistakes are reported and the prompt continues; a bad number
    /// ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, InputError::InvalidArgument { .. })
    }
}

/// Parses one line typed at the prompt: `<command> [#]`.
///
/// Commands without an argument ignore any extra tokens.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&word) = parts.first() else {
        return Ok(Input::Empty);
    };

    let name = CommandName::from(word);

    if name.takes_argument() && parts.len() != 2 {
        return Err(InputError::WrongTokenCount {
            command: word.to_string(),
            tokens: parts.len(),
        });
    }

    if name == CommandName::Exit {
        return Ok(Input::Exit);
    }

    let value = if name.takes_argument() {
        parts[1]
            .parse::<i32>()
            .map_err(|source| InputError::InvalidArgument {
                command: word.to_string(),
                value: parts[1].to_string(),
                source,
            })?
    } else {
        NO_ARGUMENT
    };

    Ok(Input::Command(ServoCommand::new(name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_with_argument() {
        let input = parse_input("xmove -10").unwrap();

        assert_eq!(
            input,
            Input::Command(ServoCommand::new(CommandName::XMove, -10))
        );
    }

    #[test]
    fn test_argumentless_commands() {
        assert_eq!(
            parse_input("pos").unwrap(),
            Input::Command(ServoCommand::new(CommandName::Pos, NO_ARGUMENT))
        );
        assert_eq!(
            parse_input("stop 5 6").unwrap(),
            Input::Command(ServoCommand::new(CommandName::Stop, NO_ARGUMENT))
        );
    }

    #[test]
    fn test_exit_and_blank_lines() {
        assert_eq!(parse_input("exit").unwrap(), Input::Exit);
        assert_eq!(parse_input("  exit now ").unwrap(), Input::Exit);
        assert_eq!(parse_input("   ").unwrap(), Input::Empty);
    }

    #[test]
    fn test_missing_argument_is_recoverable() {
        let err = parse_input("xmove").unwrap_err();

        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "ERROR: Format is [command] [#]");
    }

    #[test]
    fn test_too_many_tokens_is_recoverable() {
        let err = parse_input("goto 90 100").unwrap_err();

        assert!(matches!(
            err,
            InputError::WrongTokenCount { tokens: 3, .. }
        ));
    }

    #[test]
    fn test_non_integer_argument_is_fatal() {
        let err = parse_input("ymove ten").unwrap_err();

        assert!(err.is_fatal());
    }
}
