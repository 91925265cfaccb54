use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::command::{CommandBuilder, LightIntent, Rgb, TurnOn};
use crate::effects::{EffectCatalog, EffectRef, EmptyCatalog};
use crate::error::GoveeError;
use crate::frame::Frame;
use crate::model::{Capabilities, DeviceIdentity};
use crate::multipacket::{ChunkLayout, IndexedChunkLayout};
use crate::transport::{Connector, DeliveryReport, Link, SessionConfig, connect_with_retry, deliver};

/// Last state sent to the light. `None` means never set through this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightState {
    pub is_on: Option<bool>,
    pub brightness: Option<u8>,
    pub rgb: Option<Rgb>,
    pub effect: Option<EffectRef>,
}

impl LightState {
    fn record(&mut self, intent: &LightIntent) {
        match intent {
            LightIntent::TurnOff => self.is_on = Some(false),
            LightIntent::TurnOn(on) => {
                self.is_on = Some(true);
                if let Some(brightness) = on.brightness {
                    self.brightness = Some(brightness);
                }
                if let Some(rgb) = on.rgb {
                    self.rgb = Some(rgb);
                    self.effect = None;
                }
                if let Some(effect) = on.effect {
                    self.effect = Some(effect);
                }
            }
        }
    }
}

/// Releases a link on every exit from an intent.
///
/// A completed or failed intent releases through [`LinkGuard::release`]. If
/// the intent future is dropped first, the release is spawned on the current
/// runtime instead.
struct LinkGuard<L: Link + 'static> {
    link: Arc<L>,
    pending_release: bool,
}

impl<L: Link + 'static> LinkGuard<L> {
    fn new(link: L, release: bool) -> Self {
        Self {
            link: Arc::new(link),
            pending_release: release,
        }
    }

    fn link(&self) -> &L {
        &self.link
    }

    async fn release(mut self) -> Result<(), GoveeError> {
        if !std::mem::take(&mut self.pending_release) {
            return Ok(());
        }
        self.link.release().await
    }
}

impl<L: Link + 'static> Drop for LinkGuard<L> {
    fn drop(&mut self) {
        if !self.pending_release {
            return;
        }
        let link = Arc::clone(&self.link);
        match Handle::try_current() {
            Ok(handle) => {
                debug!("Intent interrupted; releasing link in the background");
                handle.spawn(async move {
                    if let Err(e) = link.release().await {
                        warn!("Failed to release link after interrupted intent: {}", e);
                    }
                });
            }
            Err(_) => warn!("Intent interrupted outside a runtime; link not released"),
        }
    }
}

/// A Govee light reachable through `C`.
///
/// Every intent holds the device lock from connect to the last write, so two
/// intents for the same light never interleave their frames.
pub struct GoveeLight<C: Connector> {
    identity: DeviceIdentity,
    capabilities: Capabilities,
    connector: C,
    catalog: Arc<dyn EffectCatalog>,
    layout: Arc<dyn ChunkLayout>,
    config: SessionConfig,
    state: Mutex<LightState>,
}

impl<C: Connector> GoveeLight<C> {
    /// Create a light with no effect catalog and default settings
    pub fn new(identity: DeviceIdentity, connector: C) -> Self {
        let capabilities = Capabilities::resolve(identity.model());
        info!("{}: {}", identity, capabilities);
        Self {
            identity,
            capabilities,
            connector,
            catalog: Arc::new(EmptyCatalog),
            layout: Arc::new(IndexedChunkLayout),
            config: SessionConfig::default(),
            state: Mutex::new(LightState::default()),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn EffectCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_chunk_layout(mut self, layout: Arc<dyn ChunkLayout>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Last state successfully handed to the transport
    pub async fn state(&self) -> LightState {
        *self.state.lock().await
    }

    /// Display names of every effect the catalog has for this model
    pub fn effect_names(&self) -> Vec<String> {
        self.catalog
            .effects(self.identity.model())
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    }

    /// Frames `intent` would produce, without touching the link
    pub fn frames_for(&self, intent: &LightIntent) -> Result<Vec<Frame>, GoveeError> {
        CommandBuilder::new(
            self.identity.model(),
            self.capabilities,
            self.catalog.as_ref(),
            self.layout.as_ref(),
        )
        .build(intent)
    }

    pub async fn turn_on(&self, request: TurnOn) -> Result<DeliveryReport, GoveeError> {
        self.apply(LightIntent::TurnOn(request)).await
    }

    pub async fn turn_off(&self) -> Result<DeliveryReport, GoveeError> {
        self.apply(LightIntent::TurnOff).await
    }

    /// Build and send every frame for `intent` over one link.
    ///
    /// Frames are built before connecting, so encoding errors never reach
    /// the device. State is only updated once every frame was written. The
    /// link is released even if this future is dropped mid-intent.
    pub async fn apply(&self, intent: LightIntent) -> Result<DeliveryReport, GoveeError> {
        let frames = self.frames_for(&intent)?;

        let mut state = self.state.lock().await;
        let link = connect_with_retry(&self.connector, &self.config).await?;
        let guard = LinkGuard::new(link, self.config.release_after_intent);
        let result = deliver(guard.link(), &frames, &self.config).await;

        if let Err(e) = guard.release().await {
            warn!("{}: failed to release link: {}", self.identity, e);
        }

        let report = result?;
        state.record(&intent);
        info!("{}: handed {} frames to transport", self.identity, report.frames);
        Ok(report)
    }
}
