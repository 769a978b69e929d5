//! Newline-delimited JSON framing.
//!
//! One [`Message`] per line. The decoder keeps whatever follows the last
//! newline in its buffer until the rest of the frame arrives, and yields every
//! complete frame found in a single read. A frame that fails to parse is
//! discarded and decoding carries on with the next one.

use crate::Message;
use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

/// Longest partial frame kept while waiting for its newline.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

const DELIMITER: u8 = b'\n';

/// Serialize a message into a single self-delimited frame.
pub fn encode(message: &Message) -> Result<Bytes> {
    let json = serde_json::to_vec(message)?;
    let mut frame = BytesMut::with_capacity(json.len() + 1);
    frame.put_slice(&json);
    frame.put_u8(DELIMITER);
    Ok(frame.freeze())
}

/// Pull every complete message out of `buffer`, leaving the unterminated tail.
pub fn decode_all(buffer: &mut BytesMut) -> Vec<Message> {
    let mut codec = LineCodec::default();
    let mut messages = Vec::new();
    while let Ok(Some(message)) = codec.decode(buffer) {
        messages.push(message);
    }
    messages
}

#[derive(Debug, Default)]
pub struct LineCodec {
    /// How far into the buffer we already know there is no delimiter.
    scanned: usize,
}

impl Decoder for LineCodec {
    type Item = Message;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Message>, Self::Error> {
        loop {
            let start = self.scanned.min(buf.len());
            let Some(offset) = buf[start..].iter().position(|b| *b == DELIMITER) else {
                if buf.len() > MAX_FRAME_LEN {
                    warn!(len = buf.len(), "discarding oversized partial frame");
                    buf.clear();
                    self.scanned = 0;
                } else {
                    self.scanned = buf.len();
                }
                return Ok(None);
            };
            let line = buf.split_to(start + offset + 1);
            self.scanned = 0;

            let line = &line[..line.len() - 1];
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<Message>(line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => {
                    debug!(error = %e, "dropping malformed frame");
                    continue;
                }
            }
        }
    }
}
