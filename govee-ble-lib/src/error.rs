use std::io;
use thiserror::Error;
use uuid::Uuid;

use crate::effects::EffectRef;

/// The primary error type for the `govee-ble-lib` library.
#[derive(Error, Debug)]
pub enum GoveeError {
    #[error("Invalid payload: {len} bytes exceeds the {max}-byte frame capacity")]
    InvalidPayload { len: usize, max: usize },

    #[error("Invalid chunk header: {0}")]
    InvalidChunkHeader(String),

    #[error("Effect {effect} not found in catalog for model {model}")]
    EffectNotFound { model: String, effect: EffectRef },

    #[error("Invalid effect name: {0}")]
    InvalidEffectName(String),

    #[error("Could not connect after {attempts} attempts")]
    ConnectFailed { attempts: u8 },

    #[error("Write of frame {index}/{total} failed: {reason}")]
    WriteFailed { index: usize, total: usize, reason: String },

    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Invalid frame length: {0}")]
    InvalidFrameLength(usize),

    #[error("Control characteristic {0} not found on peripheral")]
    CharacteristicNotFound(Uuid),

    #[error("Peripheral {0} is not known to the adapter")]
    PeripheralNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BLE error: {0}")]
    Ble(#[from] btleplug::Error),

    #[error("Timeout during BLE operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}
