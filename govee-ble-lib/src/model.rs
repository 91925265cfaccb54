use std::fmt;

use strum_macros::Display;

/// Models whose color command addresses per-segment lighting
pub const SEGMENTED_MODELS: &[&str] = &["H6053", "H6072", "H6102", "H6199", "H617A", "H617C"];

/// Models that take brightness as a 0-100 percentage
pub const PERCENT_BRIGHTNESS_MODELS: &[&str] = &["H617A"];

/// How a model expects its color command laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ColorLayout {
    /// Flat RGB triple
    #[default]
    #[strum(to_string = "flat")]
    Flat,
    /// Per-segment layout addressing every segment at once
    #[strum(to_string = "segmented")]
    Segmented,
}

/// Range a model expects for the brightness level byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum BrightnessScale {
    /// 0-255, sent as is
    #[default]
    #[strum(to_string = "raw")]
    Raw,
    /// 0-100, rescaled from 0-255
    #[strum(to_string = "percent")]
    Percent,
}

impl BrightnessScale {
    /// Convert a 0-255 level into the byte this scale puts on the wire
    pub fn scale(&self, level: u8) -> u8 {
        match self {
            BrightnessScale::Raw => level,
            BrightnessScale::Percent => (u16::from(level) * 100 / 255) as u8,
        }
    }
}

/// Per-model protocol facets, resolved once per device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub color_layout: ColorLayout,
    pub brightness_scale: BrightnessScale,
}

impl Capabilities {
    /// Look up a model id. Unknown models get flat color and raw brightness.
    pub fn resolve(model: &str) -> Self {
        let color_layout = if SEGMENTED_MODELS.contains(&model) {
            ColorLayout::Segmented
        } else {
            ColorLayout::Flat
        };
        let brightness_scale = if PERCENT_BRIGHTNESS_MODELS.contains(&model) {
            BrightnessScale::Percent
        } else {
            BrightnessScale::Raw
        };
        Self {
            color_layout,
            brightness_scale,
        }
    }

    pub fn is_segmented(&self) -> bool {
        self.color_layout == ColorLayout::Segmented
    }

    pub fn uses_percent_brightness(&self) -> bool {
        self.brightness_scale == BrightnessScale::Percent
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color: {}, brightness: {}", self.color_layout, self.brightness_scale)
    }
}

/// Who a device is: its link-layer address and declared model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    address: String,
    model: String,
}

impl DeviceIdentity {
    pub fn new(address: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            address: address.into().to_uppercase(),
            model: model.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Address with the separators stripped, stable across sessions
    pub fn unique_id(&self) -> String {
        self.address.replace(':', "")
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.address)
    }
}
