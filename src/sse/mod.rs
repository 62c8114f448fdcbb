//! Wire codec and Stream Reader for the chat backend's event stream.
//!
//! The backend answers one POST with a `text/event-stream` body in which
//! every frame is a single `data: <json>` line followed by a blank line:
//!
//! ```text
//! data: {"delta":"Hi"}
//!
//! data: {"done":true,"text":"Hi there!"}
//!
//! ```
//!
//! # Module structure
//! - `events` - The decoded [`StreamEvent`] type
//! - `payloads` - Internal payload deserialization struct
//! - `parser` - Frame decoding, frame reassembly and request encoding
//! - `reader` - The cancellable chunk-to-event pipeline

mod events;
mod parser;
mod payloads;
mod reader;

pub use events::StreamEvent;
pub use parser::{decode_frame, encode_request, frame_payload, try_decode_frame, FrameBuffer};
pub use reader::read_events;
