//! SSE frame decoding
//!
//! A frame is a block of text terminated by a blank line. Only frames whose
//! first line starts with `data:` carry a payload; everything else is ignored.
//! [`FrameBuffer`] splits the raw byte stream into frames, [`decode_frame`]
//! turns one frame into at most one [`StreamEvent`]. The outgoing direction
//! is [`encode_request`].

mod buffer;
mod encode;

use tracing::warn;

use crate::error::StreamError;
use crate::sse::events::StreamEvent;
use crate::sse::payloads::FramePayload;

pub use buffer::FrameBuffer;
pub use encode::encode_request;

/// Sentinel some backends send in place of a final JSON payload
const DONE_SENTINEL: &str = "[DONE]";

/// Extract the payload of a frame's leading `data:` line, trimmed.
///
/// Returns `None` for frames that carry no payload: non-`data:` frames,
/// empty payloads and the `[DONE]` sentinel.
pub fn frame_payload(raw: &str) -> Option<&str> {
    let first_line = raw.trim().lines().next()?;
    let payload = first_line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }
    Some(payload)
}

/// Decode one frame, reporting malformed payloads as errors.
///
/// Field precedence: a non-empty `error` wins, then a `done` flag with a
/// `text` field, then a non-empty `delta`. `done` sits above `delta` because
/// its text replaces everything accumulated so far anyway.
pub fn try_decode_frame(raw: &str) -> Result<Option<StreamEvent>, StreamError> {
    let Some(payload) = frame_payload(raw) else {
        return Ok(None);
    };

    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| StreamError::MalformedFrame {
            payload: payload.to_string(),
            message: e.to_string(),
        })?;
    let parsed = FramePayload::from_value(&value).ok_or_else(|| StreamError::MalformedFrame {
        payload: payload.to_string(),
        message: "payload is not a JSON object".to_string(),
    })?;

    Ok(event_from_payload(parsed))
}

/// Decode one frame. Malformed payloads are logged and skipped so one bad
/// frame never aborts an otherwise healthy stream.
pub fn decode_frame(raw: &str) -> Option<StreamEvent> {
    match try_decode_frame(raw) {
        Ok(event) => event,
        Err(err) => {
            warn!(code = err.error_code(), "Skipping frame: {}", err);
            None
        }
    }
}

fn event_from_payload(payload: FramePayload) -> Option<StreamEvent> {
    if let Some(error) = payload.error.filter(|e| !e.is_empty()) {
        return Some(StreamEvent::Error(error));
    }

    if payload.done == Some(true) {
        if let Some(text) = payload.text {
            return Some(StreamEvent::Done(text));
        }
    }

    payload
        .delta
        .filter(|d| !d.is_empty())
        .map(StreamEvent::Delta)
}
