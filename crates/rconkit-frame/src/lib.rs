//! Length-prefixed packet framing for the RCON wire protocol.
//!
//! Every packet on the wire is framed as:
//! - a 4-byte little-endian total size (covering id + kind + body + terminator),
//! - a 4-byte little-endian correlation id,
//! - a 4-byte little-endian packet kind,
//! - the UTF-8 command or response body,
//! - two trailing NUL bytes.
//!
//! Decoding buffers any incomplete trailing data: one socket read is not
//! one frame. High-frequency telemetry responses regularly span reads or
//! pack several frames into one.

pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod kind;

pub use codec::{decode_frame, encode_frame, Frame, DEFAULT_MAX_BODY, FRAME_OVERHEAD, LEN_PREFIX_SIZE};
pub use error::{FrameError, Result};
#[cfg(feature = "async")]
pub use framed::RconCodec;
pub use kind::{AUTH, EXEC};
