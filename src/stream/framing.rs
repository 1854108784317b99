//! Record framing for the chat response stream
//!
//! [`RecordFramer`] is the carry-forward buffer between the network and the
//! reader. Chunk boundaries carry no meaning: a chunk may end in the middle
//! of a line, or in the middle of a multi-byte UTF-8 character. The framer
//! keeps both kinds of partial data until a later chunk (or
//! [`RecordFramer::finish`]) completes them.

use crate::stream::escape::unescape_payload;

/// One `data: <payload>` line from the response stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    payload: String,
}

impl Record {
    /// Parse a single line (without its terminator) as a record
    ///
    /// Returns `None` when the line does not start with `prefix`. One space
    /// directly after the prefix is not part of the payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatai::stream::Record;
    ///
    /// let record = Record::parse("data: hello", "data:").unwrap();
    /// assert_eq!(record.payload(), "hello");
    /// assert!(Record::parse("event: ping", "data:").is_none());
    /// ```
    pub fn parse(line: &str, prefix: &str) -> Option<Self> {
        let rest = line.strip_prefix(prefix)?;
        let payload = rest.strip_prefix(' ').unwrap_or(rest);
        Some(Self {
            payload: payload.to_string(),
        })
    }

    /// Raw payload as received
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Whether this record is the end-of-stream sentinel
    ///
    /// The payload must equal `sentinel` exactly; a padded sentinel is
    /// ordinary text.
    pub fn is_sentinel(&self, sentinel: &str) -> bool {
        self.payload == sentinel
    }

    /// Payload with newline escapes decoded
    pub fn text(&self) -> String {
        unescape_payload(&self.payload).into_owned()
    }
}

/// Reassembles records from arbitrarily split byte chunks
#[derive(Debug)]
pub struct RecordFramer {
    prefix: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
    /// Decoded text after the last newline
    line: String,
    decode_errors: usize,
}

impl RecordFramer {
    /// Create a framer that recognizes lines starting with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pending: Vec::new(),
            line: String::new(),
            decode_errors: 0,
        }
    }

    /// Feed one chunk and return every record it completes, in order
    ///
    /// Lines without the record prefix are dropped. The text after the last
    /// newline stays buffered.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatai::stream::RecordFramer;
    ///
    /// let mut framer = RecordFramer::new("data:");
    /// assert!(framer.feed(b"data: Hel").is_empty());
    /// let records = framer.feed(b"lo\ndata: next");
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].payload(), "Hello");
    /// assert_eq!(framer.buffered(), "data: next");
    /// ```
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Record> {
        self.decode(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.line.find('\n') {
            let raw: String = self.line.drain(..=pos).collect();
            let line = raw[..pos].strip_suffix('\r').unwrap_or(&raw[..pos]);
            if let Some(record) = Record::parse(line, &self.prefix) {
                records.push(record);
            }
        }
        records
    }

    /// Finalize the buffered line at end of stream
    ///
    /// A trailing record that never received its newline is still returned.
    /// Leftover bytes of a truncated UTF-8 sequence decode to U+FFFD.
    pub fn finish(&mut self) -> Option<Record> {
        if !self.pending.is_empty() {
            tracing::warn!(
                bytes = self.pending.len(),
                "Stream ended inside a UTF-8 sequence"
            );
            self.line.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
            self.decode_errors += 1;
        }

        let line = std::mem::take(&mut self.line);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        Record::parse(line, &self.prefix)
    }

    /// Text received after the last newline
    pub fn buffered(&self) -> &str {
        &self.line
    }

    /// Number of invalid UTF-8 sequences replaced so far
    pub fn decode_errors(&self) -> usize {
        self.decode_errors
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    self.line.push_str(text);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid = start + e.valid_up_to();
                    self.line
                        .push_str(&String::from_utf8_lossy(&self.pending[start..valid]));
                    match e.error_len() {
                        Some(len) => {
                            tracing::warn!(offset = valid, "Invalid UTF-8 in response stream");
                            self.line.push(char::REPLACEMENT_CHARACTER);
                            self.decode_errors += 1;
                            start = valid + len;
                        }
                        // Incomplete sequence at the end: wait for the next chunk.
                        None => {
                            start = valid;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
    }
}
