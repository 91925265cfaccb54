//! Common test utilities and shared imports

// Not every test file uses every helper
#![allow(dead_code, unused_imports)]

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

pub use govee_ble_lib::command::{Command, LedCommand, LedMode, LightIntent, Rgb, TurnOn};
pub use govee_ble_lib::constants::{MARKER_COMMAND, MARKER_MULTI_FRAME, SUBTYPE_EFFECT_DATA};
pub use govee_ble_lib::effects::{CatalogDirectory, CatalogDocument, EffectCatalog, EffectRef};
pub use govee_ble_lib::error::GoveeError;
pub use govee_ble_lib::frame::Frame;
pub use govee_ble_lib::model::{Capabilities, DeviceIdentity};
pub use govee_ble_lib::transport::{Connector, Link, SessionConfig};

/// Route library logs to the test harness; set `RUST_LOG` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Directory holding the fixture effect catalogs
pub fn fixture_catalog_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/jsons")
}

/// Config with no pauses so retry tests run instantly
pub fn fast_config() -> SessionConfig {
    SessionConfig::default()
        .with_retry_delay(Duration::ZERO)
        .with_write_timeout(Duration::from_millis(200))
}

pub fn to_hex(frames: &[Frame]) -> Vec<String> {
    frames.iter().map(|f| f.to_string()).collect()
}

/// What the fake device recorded
#[derive(Debug, Default)]
pub struct FakeState {
    pub connect_attempts: AtomicUsize,
    pub releases: AtomicUsize,
    pub written: Mutex<Vec<Frame>>,
}

impl FakeState {
    pub fn attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<Frame> {
        self.written.lock().unwrap().clone()
    }
}

/// How a fake link misbehaves
#[derive(Debug, Clone, Copy, Default)]
pub enum WriteFault {
    #[default]
    None,
    /// Fail the write of this 1-based frame index
    FailAt(usize),
    /// Never complete the write of this 1-based frame index
    HangAt(usize),
}

/// Connector that fails a set number of attempts before succeeding
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub state: Arc<FakeState>,
    pub failures_before_success: usize,
    pub fault: WriteFault,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures_before_success: usize) -> Self {
        Self {
            failures_before_success,
            ..Self::default()
        }
    }

    pub fn with_fault(mut self, fault: WriteFault) -> Self {
        self.fault = fault;
        self
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Link = FakeLink;

    async fn connect(&self) -> Result<FakeLink, GoveeError> {
        let attempt = self.state.connect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            return Err(GoveeError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("attempt {} refused", attempt),
            )));
        }
        Ok(FakeLink {
            state: Arc::clone(&self.state),
            fault: self.fault,
        })
    }
}

#[derive(Debug)]
pub struct FakeLink {
    state: Arc<FakeState>,
    fault: WriteFault,
}

#[async_trait]
impl Link for FakeLink {
    async fn write(&self, frame: &Frame) -> Result<(), GoveeError> {
        let index = self.state.written.lock().unwrap().len() + 1;
        match self.fault {
            WriteFault::FailAt(n) if n == index => {
                return Err(GoveeError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "link dropped")));
            }
            WriteFault::HangAt(n) if n == index => std::future::pending::<()>().await,
            _ => {}
        }
        // Give a concurrent intent the chance to run between frames
        tokio::task::yield_now().await;
        self.state.written.lock().unwrap().push(*frame);
        Ok(())
    }

    async fn release(&self) -> Result<(), GoveeError> {
        self.state.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
