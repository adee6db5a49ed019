//! Module `client`
//!
//! Defines the `Client` struct: one connected chat peer, its display name,
//! its socket, and the bytes it has sent that do not yet form a full line.

/// Nickname a client carries until it picks one with `/nick`.
pub fn default_nickname(descriptor: usize) -> String {
    format!("user:{}", descriptor)
}

/// Represents the state of a connected chat client.
///
/// The client owns its stream; dropping the client closes the connection.
pub struct Client<S> {
    descriptor: usize,
    nickname: String,
    stream: S,
    input: Vec<u8>,
}

impl<S> Client<S> {
    /// Creates a client for a freshly accepted connection with its default nickname.
    pub fn new(descriptor: usize, stream: S) -> Self {
        Self {
            descriptor,
            nickname: default_nickname(descriptor),
            stream,
            input: Vec::new(),
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns the descriptor this client lives at in the connection table.
    pub fn descriptor(&self) -> usize {
        self.descriptor
    }

    /// Returns the current display name.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Number of received bytes still waiting for a newline.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Sets the display name. Empty names are ignored.
    pub fn set_nickname(&mut self, nickname: String) {
        if !nickname.is_empty() {
            self.nickname = nickname;
        }
    }

    // --------------------
    // Input buffering
    // --------------------

    /// Appends raw bytes read from the socket.
    pub fn buffer_input(&mut self, bytes: &[u8]) {
        self.input.extend_from_slice(bytes);
    }

    /// Drains every complete line from the input buffer.
    ///
    /// Line terminators (`\n` or `\r\n`) are stripped. A line longer than
    /// `max_line_length` bytes comes out as several lines of at most that
    /// size, cut on UTF-8 character boundaries. The split does not depend on
    /// how the bytes were spread over reads.
    pub fn take_lines(&mut self, max_line_length: usize) -> Vec<String> {
        let mut lines = Vec::new();

        loop {
            let newline = self.input.iter().position(|&b| b == b'\n');
            let line_len = newline.unwrap_or(self.input.len());

            let end = if line_len > max_line_length {
                self.char_boundary_before(max_line_length)
            } else if let Some(pos) = newline {
                pos + 1
            } else {
                break;
            };

            let raw: Vec<u8> = self.input.drain(..end).collect();
            let mut line = String::from_utf8_lossy(&raw).into_owned();
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }

        lines
    }

    /// Largest cut point `<= limit` that does not split a UTF-8 sequence.
    ///
    /// Falls back to `limit` when the bytes there are not valid UTF-8, so
    /// every cut makes progress. Requires `limit < self.input.len()`.
    fn char_boundary_before(&self, limit: usize) -> usize {
        let mut end = limit;
        while end > 0 && self.input[end] & 0b1100_0000 == 0b1000_0000 {
            end -= 1;
        }
        if end == 0 { limit } else { end }
    }

    /// Consumes the client, handing back its stream.
    pub fn into_stream(self) -> S {
        self.stream
    }
}
