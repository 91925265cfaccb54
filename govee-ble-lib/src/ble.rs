use async_trait::async_trait;
use btleplug::api::{BDAddr, Central, Characteristic, Manager as _, Peripheral as _, WriteType};
use btleplug::platform::{Manager, Peripheral};
use tracing::{debug, info};

use crate::constants::CONTROL_CHARACTERISTIC;
use crate::error::GoveeError;
use crate::frame::Frame;
use crate::transport::{Connector, Link};

/// Connects to a peripheral the host adapter already knows about
#[derive(Debug, Clone)]
pub struct BtleplugConnector {
    peripheral: Peripheral,
}

impl BtleplugConnector {
    pub fn new(peripheral: Peripheral) -> Self {
        Self { peripheral }
    }
}

#[async_trait]
impl Connector for BtleplugConnector {
    type Link = BtleplugLink;

    async fn connect(&self) -> Result<BtleplugLink, GoveeError> {
        if !self.peripheral.is_connected().await? {
            debug!("Connecting to {}", self.peripheral.address());
            self.peripheral.connect().await?;
        }
        self.peripheral.discover_services().await?;

        let control = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == CONTROL_CHARACTERISTIC)
            .ok_or(GoveeError::CharacteristicNotFound(CONTROL_CHARACTERISTIC))?;

        Ok(BtleplugLink {
            peripheral: self.peripheral.clone(),
            control,
        })
    }
}

/// Connected peripheral plus its control characteristic
#[derive(Debug, Clone)]
pub struct BtleplugLink {
    peripheral: Peripheral,
    control: Characteristic,
}

#[async_trait]
impl Link for BtleplugLink {
    async fn write(&self, frame: &Frame) -> Result<(), GoveeError> {
        self.peripheral
            .write(&self.control, &frame.to_array(), WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    async fn release(&self) -> Result<(), GoveeError> {
        if self.peripheral.is_connected().await? {
            self.peripheral.disconnect().await?;
            debug!("Disconnected from {}", self.peripheral.address());
        }
        Ok(())
    }
}

/// Find a peripheral by address among those the first adapter has seen.
///
/// No scan is started; discovery belongs to the host platform.
pub async fn find_peripheral(address: &str) -> Result<Peripheral, GoveeError> {
    let wanted: BDAddr = address
        .parse()
        .map_err(|_| GoveeError::PeripheralNotFound(address.to_string()))?;

    let manager = Manager::new().await?;
    let adapter = manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GoveeError::PeripheralNotFound(address.to_string()))?;
    info!("Using adapter {}", adapter.adapter_info().await?);

    adapter
        .peripherals()
        .await?
        .into_iter()
        .find(|p| p.address() == wanted)
        .ok_or_else(|| GoveeError::PeripheralNotFound(address.to_string()))
}
