//! Stream Reader: turns a chunked response body into decoded events.

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::sse::events::StreamEvent;
use crate::sse::parser::{decode_frame, FrameBuffer};

struct ReaderState<S> {
    body: S,
    buffer: FrameBuffer,
    cancel: CancellationToken,
    finished: bool,
}

/// Consume a response body and yield its events in arrival order.
///
/// The returned stream is finite and not restartable. It ends:
/// - when the body ends, after the leftover partial frame is flushed once
/// - right after yielding a body read error
/// - as soon as `cancel` fires, without yielding anything further
///
/// Cancellation is checked before every frame and raced against every chunk
/// read, so a stalled connection is abandoned immediately.
pub fn read_events<S, E>(body: S, cancel: CancellationToken) -> impl Stream<Item = Result<StreamEvent, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: Send,
{
    let state = ReaderState {
        body,
        buffer: FrameBuffer::new(),
        cancel,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if state.cancel.is_cancelled() {
                debug!(buffered = state.buffer.len(), "Stream read cancelled");
                state.buffer.clear();
                state.finished = true;
                return None;
            }

            // Drain complete frames before reading more
            if let Some(frame) = state.buffer.next_frame() {
                if let Some(event) = decode_frame(&frame) {
                    return Some((Ok(event), state));
                }
                continue;
            }

            let next = tokio::select! {
                biased;
                _ = state.cancel.cancelled() => continue,
                chunk = state.body.next() => chunk,
            };

            match next {
                Some(Ok(chunk)) => state.buffer.push(&chunk),
                Some(Err(e)) => {
                    state.finished = true;
                    state.buffer.clear();
                    return Some((Err(e), state));
                }
                None => {
                    state.finished = true;
                    if let Some(rest) = state.buffer.take_remainder() {
                        if let Some(event) = decode_frame(&rest) {
                            return Some((Ok(event), state));
                        }
                    }
                    return None;
                }
            }
        }
    })
}
