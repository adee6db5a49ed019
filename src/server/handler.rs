//! Line routing
//!
//! Decides what one complete line from a client means and carries it out:
//! a rename, a reply to the sender, a chat broadcast, or a request to quit.

use log::debug;
use std::io::Write;

use crate::protocol::responses::{NICK_USAGE, UNSUPPORTED_COMMAND, format_chat_line};
use crate::protocol::{Command, parse_command};
use crate::server::ChatState;
use crate::server::broadcast::send_to_all_but;
use crate::utils::network::write_best_effort;

/// What the event loop should do with the sender after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Continue,
    Quit,
}

/// Routes one line received from the live client at `descriptor`.
pub fn route_line<S: Write>(
    state: &mut ChatState<S>,
    descriptor: usize,
    line: &str,
) -> LineAction {
    let command = parse_command(line);
    debug!("Received from {}: {:?}", descriptor, command);

    match command {
        Command::Quit => LineAction::Quit,
        Command::Nick(name) if name.is_empty() => {
            reply(state, descriptor, NICK_USAGE);
            LineAction::Continue
        }
        Command::Nick(name) => {
            let nickname: String = name.chars().take(state.max_nick_length).collect();
            if let Some(client) = state.table.get_mut(descriptor) {
                debug!(
                    "Client {} renamed {} -> {}",
                    descriptor,
                    client.nickname(),
                    nickname
                );
                client.set_nickname(nickname);
            }
            LineAction::Continue
        }
        Command::Unknown(_) => {
            reply(state, descriptor, UNSUPPORTED_COMMAND);
            LineAction::Continue
        }
        Command::Chat(text) if text.is_empty() => LineAction::Continue,
        Command::Chat(text) => {
            let Some(nickname) = state.nickname(descriptor) else {
                return LineAction::Continue;
            };
            let msg = format_chat_line(nickname, &text, state.max_message_length);
            let report = send_to_all_but(&mut state.table, Some(descriptor), msg.as_bytes());
            debug!(
                "Relayed line from {} to {}/{} clients",
                descriptor,
                report.delivered,
                report.attempted()
            );
            LineAction::Continue
        }
    }
}

/// Sends `text` to the client at `descriptor` alone.
fn reply<S: Write>(state: &mut ChatState<S>, descriptor: usize, text: &str) {
    if let Some(client) = state.table.get_mut(descriptor) {
        if let Err(e) = write_best_effort(client.stream_mut(), text.as_bytes()) {
            debug!("Reply to {} not delivered: {}", descriptor, e);
        }
    }
}
