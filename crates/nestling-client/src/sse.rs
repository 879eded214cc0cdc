//! Frame decoding for the streaming chat protocol.
//!
//! Events arrive as `data: {json}` lines separated by a blank line.
//! Bytes may be split at arbitrary boundaries, so the decoder keeps the
//! trailing partial segment across reads; the decoded event sequence is
//! invariant to how the byte stream was chunked.

use nestling_models::chat::StreamFrame;

const FRAME_SEPARATOR: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";

/// Incremental frame decoder owning the buffer of one connection.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes and return every frame they complete.
    ///
    /// A segment that fails to parse is logged and skipped; it never
    /// aborts the stream.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(pos) = find_separator(&self.buffer) {
            let segment = self.buffer[..pos].to_vec();
            self.buffer.drain(..pos + FRAME_SEPARATOR.len());

            // Complete segments only, so text decoding never splits a
            // multi-byte character.
            let segment = String::from_utf8_lossy(&segment);
            for line in segment.lines() {
                let Some(data) = line.strip_prefix(DATA_PREFIX) else {
                    continue;
                };
                if data.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<StreamFrame>(data) {
                    Ok(frame) => frames.push(frame),
                    Err(err) => {
                        tracing::warn!(error = %err, data, "skipping malformed stream frame");
                    }
                }
            }
        }
        frames
    }
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer.windows(FRAME_SEPARATOR.len()).position(|window| window == FRAME_SEPARATOR)
}
