use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::codec::{decode_frame, encode_frame, Frame, DEFAULT_MAX_BODY};
use crate::error::FrameError;

/// `tokio_util` codec adapter for [`Frame`] streams.
///
/// Plug into `Framed::new(stream, RconCodec::default())` to read complete
/// frames from a TCP stream. Partial and concatenated reads are handled by
/// the decode buffer; callers always see whole frames.
#[derive(Debug, Clone)]
pub struct RconCodec {
    max_body_size: usize,
}

impl RconCodec {
    /// Create a codec with an explicit body size cap.
    pub fn new(max_body_size: usize) -> Self {
        Self { max_body_size }
    }
}

impl Default for RconCodec {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY,
        }
    }
}

impl Decoder for RconCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        let frame = decode_frame(src, self.max_body_size)?;
        if let Some(frame) = &frame {
            trace!(
                id = frame.id,
                kind = frame.kind,
                len = frame.body.len(),
                "decoded frame"
            );
        }
        Ok(frame)
    }
}

impl Encoder<Frame> for RconCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        if frame.body.len() > self.max_body_size {
            return Err(FrameError::BodyTooLarge {
                size: frame.body.len(),
                max: self.max_body_size,
            });
        }
        encode_frame(frame.id, frame.kind, &frame.body, dst)
    }
}
