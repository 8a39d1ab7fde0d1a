//! Push-event framing
//!
//! Encodes a chat line as one Server-Sent Events block:
//!
//! ```text
//! event: message
//! data: <first line>
//! data: <second line>
//!
//! ```
//!
//! Every embedded line break starts a new `data:` field, so a client always
//! sees exactly one event per published line. A trailing line break adds no
//! empty field.

use bytes::{BufMut, Bytes, BytesMut};

/// Event type announced on every frame
pub const EVENT_NAME: &str = "message";

const EVENT_PREFIX: &[u8] = b"event: ";
const DATA_PREFIX: &[u8] = b"data: ";

/// Encode `text` as a single framed event
///
/// `\r\n`, `\r` and `\n` all break lines. Trailing empty lines are dropped,
/// but the event always carries at least one `data:` field.
pub fn encode_event(text: &str) -> Bytes {
    let segments = split_lines(text);

    let mut buf = BytesMut::with_capacity(
        EVENT_PREFIX.len() + EVENT_NAME.len() + 2 + text.len() + DATA_PREFIX.len() * 2,
    );
    buf.put_slice(EVENT_PREFIX);
    buf.put_slice(EVENT_NAME.as_bytes());
    buf.put_u8(b'\n');

    for segment in segments {
        buf.put_slice(DATA_PREFIX);
        buf.put_slice(segment.as_bytes());
        buf.put_u8(b'\n');
    }

    buf.put_u8(b'\n');
    buf.freeze()
}

fn split_lines(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(at) = rest.find(['\r', '\n']) {
        segments.push(&rest[..at]);
        let skip = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[at + skip..];
    }
    segments.push(rest);

    while segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    segments
}
