//! SmallChat - a single-threaded multi-client TCP chat server.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod utils;

pub use crate::config::ServerConfig;
pub use server::ChatServer;

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::{Cell, RefCell};
    use std::io::{self, ErrorKind, Write};
    use std::rc::Rc;

    /// In-memory client socket. Clones share the same buffer, so a test can
    /// keep one handle while the connection table owns another.
    #[derive(Clone, Default)]
    pub struct MemoryStream {
        written: Rc<RefCell<Vec<u8>>>,
        broken: Rc<Cell<bool>>,
        limit: Rc<Cell<Option<usize>>>,
    }

    impl MemoryStream {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.written.borrow()).into_owned()
        }

        pub fn clear(&self) {
            self.written.borrow_mut().clear();
        }

        /// Makes every later write fail as if the peer had gone away.
        pub fn break_pipe(&self) {
            self.broken.set(true);
        }

        /// Makes the socket buffer full once `bytes` have been written.
        pub fn limit_to(&self, bytes: usize) {
            self.limit.set(Some(bytes));
        }
    }

    impl Write for MemoryStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken.get() {
                return Err(ErrorKind::BrokenPipe.into());
            }

            let mut written = self.written.borrow_mut();
            let room = match self.limit.get() {
                Some(limit) => limit.saturating_sub(written.len()),
                None => buf.len(),
            };
            if room == 0 {
                return Err(ErrorKind::WouldBlock.into());
            }

            let n = room.min(buf.len());
            written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
