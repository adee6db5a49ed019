//! Module `command`
//!
//! Classifies one line received from a chat client.

/// A line exactly equal to this closes the sender's connection.
pub const QUIT_TOKEN: &str = "/quit";

/// Lines starting with this character are commands rather than chat.
pub const COMMAND_PREFIX: char = '/';

/// Represents one classified client line.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// The reserved quit token
    Quit,
    /// `/nick <name>`; the name is empty when the argument was missing
    Nick(String),
    /// Any other `/`-prefixed line, carrying the command word
    Unknown(String),
    /// Plain text to broadcast
    Chat(String),
}

/// Parses a line (terminator already stripped or not) into a `Command`.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']);

    if line == QUIT_TOKEN {
        return Command::Quit;
    }

    let Some(rest) = line.strip_prefix(COMMAND_PREFIX) else {
        return Command::Chat(line.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();

    match cmd {
        "nick" => Command::Nick(arg.to_string()),
        _ => Command::Unknown(cmd.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quit_token() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/quit\r\n"), Command::Quit);
        assert_eq!(
            parse_command("/quit now"),
            Command::Unknown("quit".to_string())
        );
    }

    #[test]
    fn test_parse_nick() {
        assert_eq!(
            parse_command("/nick alice"),
            Command::Nick("alice".to_string())
        );
        assert_eq!(
            parse_command("/nick   bob smith  "),
            Command::Nick("bob smith".to_string())
        );
        assert_eq!(parse_command("/nick"), Command::Nick(String::new()));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(parse_command("/who"), Command::Unknown("who".to_string()));
        assert_eq!(parse_command("/"), Command::Unknown(String::new()));
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(
            parse_command("hello /nick"),
            Command::Chat("hello /nick".to_string())
        );
        assert_eq!(parse_command("quit\n"), Command::Chat("quit".to_string()));
    }
}
