//! Broadcast router
//!
//! Fans one message out to every live client except the sender.
//!
//! Delivery is best-effort and at-most-once: each recipient gets a single
//! non-blocking write attempt. Bytes the socket does not take right away are
//! dropped, and a failed recipient does not stop delivery to the others.
//! Broken connections surface on their next read and are cleaned up there.

use log::debug;
use std::io::Write;

use crate::client::{Client, ConnectionTable};
use crate::utils::network::write_best_effort;

/// What happened to one broadcast.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients that took the whole message
    pub delivered: usize,
    /// Recipients whose socket buffer filled before the end of the message
    pub partial: Vec<usize>,
    /// Recipients whose write failed outright
    pub failed: Vec<usize>,
}

impl BroadcastReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.partial.len() + self.failed.len()
    }
}

/// Writes `bytes` to every live client whose descriptor is not `sender`.
///
/// Pass `None` as sender for server-originated notices that go to everyone.
pub fn send_to_all_but<S: Write>(
    table: &mut ConnectionTable<Client<S>>,
    sender: Option<usize>,
    bytes: &[u8],
) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    table.for_each_live_mut(|descriptor, client| {
        if sender == Some(descriptor) {
            return;
        }

        match write_best_effort(client.stream_mut(), bytes) {
            Ok(n) if n == bytes.len() => report.delivered += 1,
            Ok(n) => {
                debug!(
                    "Short write to {}: {} of {} bytes",
                    descriptor,
                    n,
                    bytes.len()
                );
                report.partial.push(descriptor);
            }
            Err(e) => {
                debug!("Write to {} failed: {}", descriptor, e);
                report.failed.push(descriptor);
            }
        }
    });

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStream;

    fn table_with(
        descriptors: &[usize],
    ) -> (ConnectionTable<Client<MemoryStream>>, Vec<MemoryStream>) {
        let mut table = ConnectionTable::new(16);
        let mut handles = Vec::new();
        for &d in descriptors {
            let stream = MemoryStream::default();
            handles.push(stream.clone());
            table.insert(d, Client::new(d, stream)).unwrap();
        }
        (table, handles)
    }

    #[test]
    fn test_sender_is_excluded() {
        let (mut table, streams) = table_with(&[3, 5, 9]);

        let report = send_to_all_but(&mut table, Some(5), b"hi\n");

        assert_eq!(report.delivered, 2);
        assert_eq!(streams[0].contents(), "hi\n");
        assert_eq!(streams[1].contents(), "");
        assert_eq!(streams[2].contents(), "hi\n");
    }

    #[test]
    fn test_no_sender_reaches_everyone_once() {
        let (mut table, streams) = table_with(&[0, 1, 2]);

        let report = send_to_all_but(&mut table, None, b"notice\n");

        assert_eq!(report.attempted(), 3);
        for stream in &streams {
            assert_eq!(stream.contents(), "notice\n");
        }
    }

    #[test]
    fn test_failed_recipient_does_not_stop_delivery() {
        let (mut table, streams) = table_with(&[2, 4, 6]);
        streams[1].break_pipe();

        let report = send_to_all_but(&mut table, None, b"x\n");

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, vec![4]);
        assert_eq!(streams[0].contents(), "x\n");
        assert_eq!(streams[2].contents(), "x\n");
    }

    #[test]
    fn test_short_write_is_not_retried() {
        let (mut table, streams) = table_with(&[1, 2]);
        streams[0].limit_to(3);

        let report = send_to_all_but(&mut table, None, b"abcdef\n");

        assert_eq!(report.partial, vec![1]);
        assert_eq!(report.delivered, 1);
        assert_eq!(streams[0].contents(), "abc");
    }
}
