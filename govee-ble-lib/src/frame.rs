use std::fmt;

use bytes::Bytes;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::constants::{CHECKSUM_SPAN, FRAME_SIZE, MARKER_COMMAND, MAX_PAYLOAD_SIZE};
use crate::error::GoveeError;

/// One 20-byte unit written to the control characteristic.
///
/// Layout on the wire:
/// - Byte 0: marker (`0x33` direct command, `0xA3` multi-frame stream)
/// - Byte 1: command or sub-type code
/// - Bytes 2..19: payload, zero-padded
/// - Byte 19: XOR of bytes 0..19
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct Frame {
    marker: u8,
    code: u8,
    payload: [u8; MAX_PAYLOAD_SIZE],
    checksum: u8,
}

impl Frame {
    /// Build a frame, zero-padding the payload and appending the checksum.
    ///
    /// Only the low 8 bits of `code` are used. Payloads longer than
    /// [`MAX_PAYLOAD_SIZE`] are rejected rather than truncated.
    pub fn build(marker: u8, code: u32, payload: &[u8]) -> Result<Self, GoveeError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(GoveeError::InvalidPayload {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut padded = [0u8; MAX_PAYLOAD_SIZE];
        padded[..payload.len()].copy_from_slice(payload);

        let mut frame = Frame {
            marker,
            code: (code & 0xFF) as u8,
            payload: padded,
            checksum: 0,
        };
        frame.checksum = checksum(&frame.as_bytes()[..CHECKSUM_SPAN]);
        Ok(frame)
    }

    /// Build a direct command frame (marker `0x33`)
    pub fn command(code: u8, payload: &[u8]) -> Result<Self, GoveeError> {
        Self::build(MARKER_COMMAND, code.into(), payload)
    }

    /// Parse a received frame, rejecting wrong lengths and corrupt checksums
    pub fn parse(bytes: &[u8]) -> Result<Self, GoveeError> {
        let frame = Frame::read_from_bytes(bytes).map_err(|_| GoveeError::InvalidFrameLength(bytes.len()))?;
        let expected = checksum(&bytes[..CHECKSUM_SPAN]);
        if frame.checksum != expected {
            return Err(GoveeError::ChecksumMismatch {
                expected,
                actual: frame.checksum,
            });
        }
        Ok(frame)
    }

    pub fn marker(&self) -> u8 {
        self.marker
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// The full padded payload (always 17 bytes)
    pub fn payload(&self) -> &[u8; MAX_PAYLOAD_SIZE] {
        &self.payload
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Get the raw frame as a byte array
    pub fn to_array(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

/// XOR of every byte
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

impl From<Frame> for Bytes {
    fn from(frame: Frame) -> Self {
        Bytes::copy_from_slice(frame.as_bytes())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("marker", &format_args!("{:#04x}", self.marker))
            .field("code", &format_args!("{:#04x}", self.code))
            .field("payload", &hex::encode(self.payload))
            .field("checksum", &format_args!("{:#04x}", self.checksum))
            .finish()
    }
}
