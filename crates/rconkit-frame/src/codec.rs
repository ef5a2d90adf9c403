use std::borrow::Cow;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Width of the size prefix in bytes. The prefix itself is not counted by
/// the size it declares.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Fixed per-frame overhead covered by the size prefix:
/// id (4) + kind (4) + trailing terminator (2).
pub const FRAME_OVERHEAD: usize = 10;

/// Default maximum body size: 1 MiB.
///
/// Telemetry responses are a few KiB at most; a declared size beyond this
/// is a corrupt or hostile length prefix.
pub const DEFAULT_MAX_BODY: usize = 1024 * 1024;

/// A decoded protocol packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Correlation id matching a response to its request.
    pub id: i32,
    /// Packet kind tag (see [`crate::kind`]).
    pub kind: i32,
    /// UTF-8 body, excluding the two trailing NUL bytes.
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(id: i32, kind: i32, body: impl Into<Bytes>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }

    /// The total wire size of this frame (prefix + declared size).
    pub fn wire_size(&self) -> usize {
        LEN_PREFIX_SIZE + FRAME_OVERHEAD + self.body.len()
    }

    /// The body interpreted as UTF-8, lossily.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (all integers little-endian):
/// ```text
/// ┌───────────────┬──────────┬──────────┬──────────────┬────────────┐
/// │ Size (4B)     │ Id (4B)  │ Kind (4B)│ Body         │ 0x00 0x00  │
/// │ 10 + len(body)│          │          │ (UTF-8)      │            │
/// └───────────────┴──────────┴──────────┴──────────────┴────────────┘
/// ```
pub fn encode_frame(id: i32, kind: i32, body: &[u8], dst: &mut BytesMut) -> Result<()> {
    let max = i32::MAX as usize - FRAME_OVERHEAD;
    if body.len() > max {
        return Err(FrameError::BodyTooLarge {
            size: body.len(),
            max,
        });
    }
    dst.reserve(LEN_PREFIX_SIZE + FRAME_OVERHEAD + body.len());
    dst.put_i32_le((FRAME_OVERHEAD + body.len()) as i32);
    dst.put_i32_le(id);
    dst.put_i32_le(kind);
    dst.put_slice(body);
    dst.put_slice(&[0x00, 0x00]);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet;
/// the unconsumed bytes stay in place so the caller can append the next
/// socket read to them. On success, consumes the frame bytes from the
/// buffer.
pub fn decode_frame(src: &mut BytesMut, max_body: usize) -> Result<Option<Frame>> {
    if src.len() < LEN_PREFIX_SIZE {
        return Ok(None); // Need more data
    }

    let declared = i32::from_le_bytes(src[0..4].try_into().unwrap());
    if declared < FRAME_OVERHEAD as i32 {
        return Err(FrameError::InvalidLength { declared });
    }

    let body_len = declared as usize - FRAME_OVERHEAD;
    if body_len > max_body {
        return Err(FrameError::BodyTooLarge {
            size: body_len,
            max: max_body,
        });
    }

    let total = LEN_PREFIX_SIZE + declared as usize;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    let id = i32::from_le_bytes(src[4..8].try_into().unwrap());
    let kind = i32::from_le_bytes(src[8..12].try_into().unwrap());

    src.advance(LEN_PREFIX_SIZE + 8);
    let body = src.split_to(body_len).freeze();
    src.advance(2); // terminator

    Ok(Some(Frame { id, kind, body }))
}
