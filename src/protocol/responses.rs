//! Chat responses
//!
//! Fixed server texts and the framing of relayed chat lines and presence
//! notices. Every formatted message fits a fixed capacity; longer ones are
//! cut, never rejected.

/// Banner sent to every client right after it is accepted.
pub const WELCOME: &str = "Welcome to Simple Chat! Use /nick <nick> to set your nick.\n";

/// Reply to a `/` command the server does not know.
pub const UNSUPPORTED_COMMAND: &str = "Unsupported command\n";

/// Reply to `/nick` without a name.
pub const NICK_USAGE: &str = "Usage: /nick <nickname>\n";

/// Presence change announced to the other clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Entered,
    Left,
}

impl Presence {
    fn word(self) -> &'static str {
        match self {
            Presence::Entered => "enter",
            Presence::Left => "Quit",
        }
    }
}

/// `Player [<nickname>] enter Chat!` or `Player [<nickname>] Quit Chat!`
pub fn format_notice(nickname: &str, presence: Presence, capacity: usize) -> String {
    let msg = format!("Player [{}] {} Chat!\n", nickname, presence.word());
    truncate_message(msg, capacity)
}

/// `<nickname>> <text>`
pub fn format_chat_line(nickname: &str, text: &str, capacity: usize) -> String {
    let msg = format!("{}> {}\n", nickname, text);
    truncate_message(msg, capacity)
}

/// Cuts `msg` to at most `capacity` bytes, keeping the trailing newline.
pub fn truncate_message(mut msg: String, capacity: usize) -> String {
    if msg.len() <= capacity {
        return msg;
    }
    if capacity == 0 {
        return String::new();
    }

    truncate_utf8(&mut msg, capacity - 1);
    msg.push('\n');
    msg
}

/// Truncates `s` to at most `max_bytes`, backing off to a char boundary.
pub fn truncate_utf8(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }

    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
