//! Client lifecycle
//!
//! Registers freshly accepted connections and tears down departing ones,
//! announcing both to the rest of the chat.

use log::{debug, info, warn};
use std::io::Write;

use crate::client::Client;
use crate::error::TableError;
use crate::protocol::Presence;
use crate::protocol::responses::{WELCOME, format_notice};
use crate::server::ChatState;
use crate::server::broadcast::send_to_all_but;
use crate::utils::network::write_best_effort;

/// Registers a new connection at `descriptor` under its default nickname.
///
/// The stream must already be non-blocking. When the table is full the
/// stream is dropped, which closes the connection, and the other clients
/// are left untouched. On success the client gets the welcome banner and
/// every other client a join notice.
pub fn accept_new<S: Write>(
    state: &mut ChatState<S>,
    descriptor: usize,
    stream: S,
) -> Result<&mut Client<S>, TableError> {
    let client = Client::new(descriptor, stream);
    let nickname = client.nickname().to_string();

    if let Err(e) = state.table.insert(descriptor, client) {
        warn!("Rejecting connection {}: {}", descriptor, e);
        return Err(e);
    }

    if let Some(client) = state.table.get_mut(descriptor) {
        if let Err(e) = write_best_effort(client.stream_mut(), WELCOME.as_bytes()) {
            debug!("Welcome to {} not delivered: {}", descriptor, e);
        }
    }

    let notice = format_notice(&nickname, Presence::Entered, state.max_message_length);
    let report = send_to_all_but(&mut state.table, Some(descriptor), notice.as_bytes());
    debug!("Join notice for {} reached {} clients", nickname, report.delivered);

    info!(
        "Client {} connected as {} ({}/{} clients)",
        descriptor,
        nickname,
        state.table.count(),
        state.table.capacity()
    );

    state
        .table
        .get_mut(descriptor)
        .ok_or(TableError::NotFound(descriptor))
}

/// Removes the client at `descriptor` and tells everyone left that it quit.
///
/// The slot is cleared before anything else, so the departing client gets
/// no further writes. The removed client is returned so the caller can
/// detach it from the poller; dropping it closes the connection.
///
/// The event loop calls this at most once per client. A second call for
/// the same descriptor reports `NotFound`.
pub fn disconnect<S: Write>(
    state: &mut ChatState<S>,
    descriptor: usize,
    reason: &str,
) -> Result<Client<S>, TableError> {
    let client = state.table.remove(descriptor)?;

    let notice = format_notice(client.nickname(), Presence::Left, state.max_message_length);
    send_to_all_but(&mut state.table, None, notice.as_bytes());

    info!(
        "Client {} ({}) disconnected: {} ({}/{} clients)",
        descriptor,
        client.nickname(),
        reason,
        state.table.count(),
        state.table.capacity()
    );

    Ok(client)
}
