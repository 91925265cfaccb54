//! Multi-frame streams for payloads larger than one frame
//!
//! Scene parameter blobs run to hundreds of bytes, so they are sent as an
//! ordered run of frames sharing one marker. The fixture reassembles by
//! arrival order; there is no acknowledgment, so frames must go out in
//! sequence with no gaps.
//!
//! The byte layout of the chunk headers lives behind [`ChunkLayout`] so a
//! different layout can be dropped in without touching command building.

use crate::constants::{
    CHUNK_CODE_CLOSING, CHUNK_CODE_OPENING, CHUNK_OPENING_FLAG, MARKER_MULTI_FRAME, MAX_PAYLOAD_SIZE,
    SUBTYPE_EFFECT_DATA,
};
use crate::error::GoveeError;
use crate::frame::Frame;

/// Strategy for laying a data stream out over frames
pub trait ChunkLayout: Send + Sync {
    /// Encode `data` behind `prefix` into frames, in transmission order
    fn encode(&self, marker: u8, prefix: &[u8], data: &[u8]) -> Result<Vec<Frame>, GoveeError>;
}

/// Indexed layout accepted by current fixtures.
///
/// ```text
/// opening:      [marker, 0x00, 0x01, count, prefix.., data..]
/// continuation: [marker, i,    17 data bytes]            i = 1, 2, ..
/// closing:      [marker, 0xFF, remaining data bytes]
/// ```
///
/// `count` is the number of frames in the stream, opening and closing
/// included. An empty data stream is a lone opening frame with `count = 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexedChunkLayout;

impl IndexedChunkLayout {
    /// Bytes of the opening payload taken by the flag and frame count
    const OPENING_HEADER_LEN: usize = 2;

    /// Continuation indices must stay clear of the closing code
    const MAX_FRAMES: usize = CHUNK_CODE_CLOSING as usize;
}

impl ChunkLayout for IndexedChunkLayout {
    fn encode(&self, marker: u8, prefix: &[u8], data: &[u8]) -> Result<Vec<Frame>, GoveeError> {
        let header_len = Self::OPENING_HEADER_LEN + prefix.len();
        if header_len >= MAX_PAYLOAD_SIZE {
            return Err(GoveeError::InvalidChunkHeader(format!(
                "prefix of {} bytes leaves no room for data",
                prefix.len()
            )));
        }

        let opening_capacity = MAX_PAYLOAD_SIZE - header_len;
        let opening_len = data.len().min(opening_capacity);
        let (head, rest) = data.split_at(opening_len);

        // Everything after the opening chunk: full continuation frames, then a
        // closing frame carrying the tail (a full 17 bytes when the rest
        // divides evenly).
        let (middle, tail) = if rest.is_empty() {
            (rest, rest)
        } else {
            let tail_len = match rest.len() % MAX_PAYLOAD_SIZE {
                0 => MAX_PAYLOAD_SIZE,
                n => n,
            };
            rest.split_at(rest.len() - tail_len)
        };

        let continuation_count = middle.len() / MAX_PAYLOAD_SIZE;
        let count = if data.is_empty() { 1 } else { continuation_count + 2 };
        if count > Self::MAX_FRAMES {
            return Err(GoveeError::InvalidPayload {
                len: data.len(),
                max: opening_capacity + (Self::MAX_FRAMES - 1) * MAX_PAYLOAD_SIZE,
            });
        }

        let mut opening = Vec::with_capacity(MAX_PAYLOAD_SIZE);
        opening.push(CHUNK_OPENING_FLAG);
        opening.push(count as u8);
        opening.extend_from_slice(prefix);
        opening.extend_from_slice(head);

        let mut frames = Vec::with_capacity(count);
        frames.push(Frame::build(marker, CHUNK_CODE_OPENING.into(), &opening)?);
        if data.is_empty() {
            return Ok(frames);
        }

        for (index, chunk) in middle.chunks(MAX_PAYLOAD_SIZE).enumerate() {
            frames.push(Frame::build(marker, (index + 1) as u32, chunk)?);
        }
        frames.push(Frame::build(marker, CHUNK_CODE_CLOSING.into(), tail)?);

        Ok(frames)
    }
}

/// Split `data` into frames using the default [`IndexedChunkLayout`]
pub fn split_into_frames(marker: u8, prefix: &[u8], data: &[u8]) -> Result<Vec<Frame>, GoveeError> {
    IndexedChunkLayout.encode(marker, prefix, data)
}

/// Frames for a scene parameter blob (marker `0xA3`, sub-type `0x02`)
pub fn effect_frames(layout: &dyn ChunkLayout, params: &[u8]) -> Result<Vec<Frame>, GoveeError> {
    layout.encode(MARKER_MULTI_FRAME, &[SUBTYPE_EFFECT_DATA], params)
}
