//! Link establishment and frame delivery
//!
//! Connection attempts are retried up to a fixed bound; writes are not.
//! Frames are written without response, so a successful delivery means the
//! transport accepted every frame, not that the fixture applied them.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::DEFAULT_CONNECT_ATTEMPTS;
use crate::error::GoveeError;
use crate::frame::Frame;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens write-capable links to one peripheral
#[async_trait]
pub trait Connector: Send + Sync {
    type Link: Link + 'static;

    /// Make one connection attempt
    async fn connect(&self) -> Result<Self::Link, GoveeError>;
}

/// An established session to the control characteristic
#[async_trait]
pub trait Link: Send + Sync {
    /// Hand one frame to the transport (write without response)
    async fn write(&self, frame: &Frame) -> Result<(), GoveeError>;

    /// Give the link back
    async fn release(&self) -> Result<(), GoveeError>;
}

/// Tunables for connecting and writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub connect_attempts: u8,
    pub retry_delay: Duration,
    pub write_timeout: Duration,
    pub release_after_intent: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            release_after_intent: true,
        }
    }
}

impl SessionConfig {
    pub fn with_connect_attempts(mut self, attempts: u8) -> Self {
        self.connect_attempts = attempts;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn with_release_after_intent(mut self, release: bool) -> Self {
        self.release_after_intent = release;
        self
    }
}

/// Frames handed to the transport for one intent.
///
/// The fixture never acknowledges writes, so this is not proof the light
/// changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub frames: usize,
}

/// Try to connect up to `config.connect_attempts` times, at least once.
///
/// Individual failures are logged and swallowed; only exhausting every
/// attempt is reported, as `ConnectFailed`.
pub async fn connect_with_retry<C: Connector>(connector: &C, config: &SessionConfig) -> Result<C::Link, GoveeError> {
    let attempts = config.connect_attempts.max(1);
    for attempt in 1..=attempts {
        match connector.connect().await {
            Ok(link) => {
                info!("Connected on attempt {}/{}", attempt, attempts);
                return Ok(link);
            }
            Err(e) => {
                warn!("Connection attempt {}/{} failed: {}", attempt, attempts, e);
                if attempt < attempts && !config.retry_delay.is_zero() {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }
    Err(GoveeError::ConnectFailed { attempts })
}

/// Write `frames` over `link` in order, stopping at the first failure.
///
/// Frames written before a failure stay applied on the device.
pub async fn deliver<L: Link + ?Sized>(
    link: &L,
    frames: &[Frame],
    config: &SessionConfig,
) -> Result<DeliveryReport, GoveeError> {
    let total = frames.len();
    for (i, frame) in frames.iter().enumerate() {
        let index = i + 1;
        debug!("Writing frame {}/{}: {}", index, total, frame);
        let reason = match timeout(config.write_timeout, link.write(frame)).await {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(elapsed) => GoveeError::from(elapsed).to_string(),
        };
        return Err(GoveeError::WriteFailed { index, total, reason });
    }
    Ok(DeliveryReport { frames: total })
}
