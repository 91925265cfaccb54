pub mod ble;
pub mod command;
pub mod constants;
pub mod device;
pub mod effects;
pub mod error;
pub mod frame;
pub mod model;
pub mod multipacket;
pub mod transport;


// Re-export the main types for easy access
pub use command::{Command, LightIntent, Rgb, TurnOn, build_commands};
pub use device::{GoveeLight, LightState};
pub use effects::{CatalogDirectory, EffectCatalog, EffectRef};
pub use error::GoveeError;
pub use frame::Frame;
pub use model::{Capabilities, DeviceIdentity};
pub use transport::{Connector, DeliveryReport, Link, SessionConfig};
