//! Frame reassembly across network chunks.

/// Accumulates raw body bytes and hands out complete frames.
///
/// Network chunk boundaries never line up with frame boundaries, so whatever
/// follows the last delimiter stays buffered until the next chunk arrives.
/// Bytes are kept raw until a whole frame is present, which keeps multi-byte
/// UTF-8 sequences split across chunks intact.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: Vec<u8>,
    /// Bytes already searched without finding a delimiter
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Extract the next complete frame, without its delimiter.
    ///
    /// Searching resumes where the previous call gave up, backed off by the
    /// longest delimiter minus one so a delimiter split across chunks is
    /// still found. A long frame arriving in many chunks is scanned once.
    pub fn next_frame(&mut self) -> Option<String> {
        let from = self.scanned.saturating_sub(MAX_DELIMITER_LEN - 1);
        let Some((end, delimiter_len)) = find_boundary(&self.buffer, from) else {
            self.scanned = self.buffer.len();
            return None;
        };
        let frame = String::from_utf8_lossy(&self.buffer[..end]).into_owned();
        self.buffer.drain(..end + delimiter_len);
        self.scanned = 0;
        Some(frame)
    }

    /// Drain whatever partial frame is left once the body has ended.
    /// Returns `None` if only whitespace remains.
    pub fn take_remainder(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.buffer).into_owned();
        self.clear();
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

const MAX_DELIMITER_LEN: usize = 4;

/// Position and length of the earliest blank-line delimiter at or after
/// `from`. Both `\n\n` and `\r\n\r\n` end a frame.
fn find_boundary(haystack: &[u8], from: usize) -> Option<(usize, usize)> {
    let tail = haystack.get(from..)?;
    let lf = find(tail, b"\n\n").map(|pos| (from + pos, 2));
    let crlf = find(tail, b"\r\n\r\n").map(|pos| (from + pos, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
