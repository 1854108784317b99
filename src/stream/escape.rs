//! Payload unescaping
//!
//! A record cannot carry a raw newline, so the backend encodes line breaks
//! in-band. Two encodings are in use: the literal two-character sequences
//! `\n` / `\r`, and the placeholder token [`NEWLINE_TOKEN`].

use std::borrow::Cow;

/// Placeholder token the backend emits in place of a newline
pub const NEWLINE_TOKEN: &str = "<|newline|>";

/// Decode the newline escapes in a record payload
///
/// Literal `\n` and `\r` sequences are decoded first, then every
/// [`NEWLINE_TOKEN`] becomes `\n`. Payloads without escapes are returned
/// borrowed.
///
/// # Examples
///
/// ```
/// use chatai::stream::unescape_payload;
///
/// assert_eq!(unescape_payload("a\\nb"), "a\nb");
/// assert_eq!(unescape_payload("Hello<|newline|>World"), "Hello\nWorld");
/// assert_eq!(unescape_payload("plain"), "plain");
/// ```
pub fn unescape_payload(payload: &str) -> Cow<'_, str> {
    if !payload.contains('\\') && !payload.contains(NEWLINE_TOKEN) {
        return Cow::Borrowed(payload);
    }

    Cow::Owned(
        payload
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace(NEWLINE_TOKEN, "\n"),
    )
}
