//! Color frame encoding.

use crate::layout::Position;
use crate::protocol::{scale_channel, BYTES_PER_LED, FRAME_HEADER, HEADER_SIZE};
use crate::{Color, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Where frame colors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingMode {
    /// Colors are sampled from the host's color source.
    #[default]
    Canvas,
    /// Every LED shows the forced color.
    Forced,
}

impl FromStr for LightingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "canvas" => Ok(LightingMode::Canvas),
            "forced" => Ok(LightingMode::Forced),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for LightingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightingMode::Canvas => write!(f, "canvas"),
            LightingMode::Forced => write!(f, "forced"),
        }
    }
}

/// User-tunable rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Lighting mode.
    #[serde(default)]
    pub mode: LightingMode,

    /// Color written to every LED on shutdown.
    #[serde(default = "default_shutdown_color")]
    pub shutdown_color: Color,

    /// Color written to every LED in forced mode.
    #[serde(default = "default_forced_color")]
    pub forced_color: Color,
}

fn default_shutdown_color() -> Color {
    Color::BLACK
}

fn default_forced_color() -> Color {
    Color::WHITE
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: LightingMode::default(),
            shutdown_color: default_shutdown_color(),
            forced_color: default_forced_color(),
        }
    }
}

impl RenderSettings {
    /// Sets the shutdown color from a hex string. Keeps the old value on error.
    pub fn set_shutdown_color(&mut self, hex: &str) -> Result<()> {
        self.shutdown_color = hex.parse()?;
        Ok(())
    }

    /// Sets the forced color from a hex string. Keeps the old value on error.
    pub fn set_forced_color(&mut self, hex: &str) -> Result<()> {
        self.forced_color = hex.parse()?;
        Ok(())
    }

    /// Sets the lighting mode by name. Keeps the old value on error.
    pub fn set_mode(&mut self, mode: &str) -> Result<()> {
        self.mode = mode.parse()?;
        Ok(())
    }
}

/// Per-position color provider supplied by the host each render cycle.
pub trait ColorSource {
    /// Returns the color at grid coordinate (x, y).
    fn color_at(&self, x: u16, y: u16) -> Color;
}

impl<F> ColorSource for F
where
    F: Fn(u16, u16) -> Color,
{
    fn color_at(&self, x: u16, y: u16) -> Color {
        self(x, y)
    }
}

impl ColorSource for Color {
    fn color_at(&self, _x: u16, _y: u16) -> Color {
        *self
    }
}

/// Builds a complete color frame.
///
/// LEDs are emitted in `positions` order. With `shutdown` set every LED gets
/// the shutdown color; otherwise forced mode overrides the source. Channels
/// go out as G, R, B, each scaled by [`scale_channel`].
pub fn encode_frame<S>(
    positions: &[Position],
    source: &S,
    settings: &RenderSettings,
    shutdown: bool,
) -> Vec<u8>
where
    S: ColorSource + ?Sized,
{
    let mut frame = Vec::with_capacity(HEADER_SIZE + positions.len() * BYTES_PER_LED);
    frame.extend_from_slice(&FRAME_HEADER);

    for pos in positions {
        let color = if shutdown {
            settings.shutdown_color
        } else if settings.mode == LightingMode::Forced {
            settings.forced_color
        } else {
            source.color_at(pos.x, pos.y)
        };

        // The controller expects GRB
        frame.push(scale_channel(color.g));
        frame.push(scale_channel(color.r));
        frame.push(scale_channel(color.b));
    }

    debug!(
        "Encoded {} frame ({} LEDs, {} bytes)",
        if shutdown { "shutdown" } else { "color" },
        positions.len(),
        frame.len()
    );
    frame
}
