use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

use crate::constants::SEGMENT_SELECT_ALL;
use crate::effects::{EffectCatalog, EffectRef};
use crate::error::GoveeError;
use crate::frame::Frame;
use crate::model::{Capabilities, ColorLayout};
use crate::multipacket::{ChunkLayout, IndexedChunkLayout, effect_frames};

/// Command codes carried in byte 1 of a direct frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum LedCommand {
    Power = 0x01,
    Brightness = 0x04,
    Color = 0x05,
}

/// First payload byte of a color command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum LedMode {
    Manual = 0x02,
    Scenes = 0x05,
    Microphone = 0x06,
    Segments = 0x15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self { red, green, blue }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Parses `R,G,B` with decimal components
impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("expected R,G,B, got {:?}", s));
        };
        let component = |v: &str| v.parse::<u8>().map_err(|e| format!("invalid component {:?}: {}", v, e));
        Ok(Rgb::new(component(r)?, component(g)?, component(b)?))
    }
}

/// A single device-level command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Power(bool),
    /// Brightness on the 0-255 scale; rescaled per model when encoded
    Brightness(u8),
    Color(Rgb),
    Effect(EffectRef),
}

/// Fields of a "turn on" request; anything left `None` is not touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnOn {
    pub brightness: Option<u8>,
    pub rgb: Option<Rgb>,
    pub effect: Option<EffectRef>,
}

impl TurnOn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_rgb(mut self, rgb: impl Into<Rgb>) -> Self {
        self.rgb = Some(rgb.into());
        self
    }

    pub fn with_effect(mut self, effect: EffectRef) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// What the caller wants the light to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightIntent {
    TurnOn(TurnOn),
    TurnOff,
}

impl LightIntent {
    /// Commands in the order they must reach the device
    pub fn commands(&self) -> Vec<Command> {
        match self {
            LightIntent::TurnOff => vec![Command::Power(false)],
            LightIntent::TurnOn(on) => {
                let mut commands = vec![Command::Power(true)];
                commands.extend(on.brightness.map(Command::Brightness));
                commands.extend(on.rgb.map(Command::Color));
                commands.extend(on.effect.map(Command::Effect));
                commands
            }
        }
    }
}

/// Translates commands into frames for one device
pub struct CommandBuilder<'a> {
    model: &'a str,
    capabilities: Capabilities,
    catalog: &'a dyn EffectCatalog,
    layout: &'a dyn ChunkLayout,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(
        model: &'a str,
        capabilities: Capabilities,
        catalog: &'a dyn EffectCatalog,
        layout: &'a dyn ChunkLayout,
    ) -> Self {
        Self {
            model,
            capabilities,
            catalog,
            layout,
        }
    }

    /// Frames for one command, in transmission order
    pub fn encode(&self, command: &Command) -> Result<Vec<Frame>, GoveeError> {
        match *command {
            Command::Power(on) => Ok(vec![Frame::command(LedCommand::Power.into(), &[u8::from(on)])?]),
            Command::Brightness(level) => {
                let level = self.capabilities.brightness_scale.scale(level);
                Ok(vec![Frame::command(LedCommand::Brightness.into(), &[level])?])
            }
            Command::Color(rgb) => Ok(vec![self.color_frame(rgb)?]),
            Command::Effect(effect) => {
                let params = self.catalog.lookup(self.model, effect)?;
                effect_frames(self.layout, &params)
            }
        }
    }

    /// Frames for a whole intent. Nothing is returned if any command fails
    /// to encode, so a bad effect never results in a partial send.
    pub fn build(&self, intent: &LightIntent) -> Result<Vec<Frame>, GoveeError> {
        let mut frames = Vec::new();
        for command in intent.commands() {
            frames.extend(self.encode(&command)?);
        }
        Ok(frames)
    }

    fn color_frame(&self, rgb: Rgb) -> Result<Frame, GoveeError> {
        let Rgb { red, green, blue } = rgb;
        match self.capabilities.color_layout {
            ColorLayout::Flat => Frame::command(LedCommand::Color.into(), &[LedMode::Manual.into(), red, green, blue]),
            ColorLayout::Segmented => {
                #[rustfmt::skip]
                let payload = [
                    LedMode::Segments.into(), 0x01, red, green, blue,
                    0x00, 0x00, 0x00, 0x00, 0x00,
                    SEGMENT_SELECT_ALL[0], SEGMENT_SELECT_ALL[1],
                ];
                Frame::command(LedCommand::Color.into(), &payload)
            }
        }
    }
}

/// Frames for `intent` using the default chunk layout
pub fn build_commands(
    intent: &LightIntent,
    model: &str,
    capabilities: Capabilities,
    catalog: &dyn EffectCatalog,
) -> Result<Vec<Frame>, GoveeError> {
    CommandBuilder::new(model, capabilities, catalog, &IndexedChunkLayout).build(intent)
}
