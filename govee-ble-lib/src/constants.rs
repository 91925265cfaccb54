// Protocol constants for Govee BLE light strips

use uuid::Uuid;

/// Size of every frame written to the control characteristic (20 bytes)
pub const FRAME_SIZE: usize = 20;

/// Payload bytes available in one frame: marker, code and checksum take the rest
pub const MAX_PAYLOAD_SIZE: usize = FRAME_SIZE - 3;

/// Number of bytes covered by the XOR checksum
pub const CHECKSUM_SPAN: usize = FRAME_SIZE - 1;

/// Marker byte for direct single-frame commands
pub const MARKER_COMMAND: u8 = 0x33;

/// Marker byte for the multi-frame sub-protocol
pub const MARKER_MULTI_FRAME: u8 = 0xA3;

/// Sub-type prefix identifying scene/effect parameter streams
pub const SUBTYPE_EFFECT_DATA: u8 = 0x02;

/// Code of the opening frame in a multi-frame stream
pub const CHUNK_CODE_OPENING: u8 = 0x00;

/// Code of the closing frame in a multi-frame stream
pub const CHUNK_CODE_CLOSING: u8 = 0xFF;

/// First payload byte of an opening frame
pub const CHUNK_OPENING_FLAG: u8 = 0x01;

/// Segment selector used by segmented color commands (all segments)
pub const SEGMENT_SELECT_ALL: [u8; 2] = [0xFF, 0x7F];

/// GATT characteristic accepting command frames
pub const CONTROL_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00010203_0405_0607_0809_0a0b0c0d2b11);

/// Connection attempts before giving up
pub const DEFAULT_CONNECT_ATTEMPTS: u8 = 3;
