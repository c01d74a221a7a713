//! Built-in color sources.
//!
//! The daemon stands in for a lighting host: each tick it freezes the
//! configured effect at the current time and hands that snapshot to the
//! session as its color source.

use cnvs_hw::layout::GRID_SIZE;
use cnvs_hw::{Color, ColorSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effect selection from the `[effect]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Effect {
    /// One color everywhere.
    Solid { color: Color },
    /// Left-to-right blend between two colors.
    Gradient { from: Color, to: Color },
    /// Hue sweep across the mat, scrolling over time.
    Rainbow {
        /// Full hue cycles per second.
        #[serde(default = "default_speed")]
        speed: f32,
    },
}

fn default_speed() -> f32 {
    0.1
}

impl Default for Effect {
    fn default() -> Self {
        Effect::Rainbow {
            speed: default_speed(),
        }
    }
}

impl Effect {
    /// Freezes the effect at `elapsed` since the daemon started.
    pub fn at(&self, elapsed: Duration) -> Snapshot<'_> {
        Snapshot {
            effect: self,
            seconds: elapsed.as_secs_f32(),
        }
    }
}

/// An effect evaluated at a fixed point in time.
pub struct Snapshot<'a> {
    effect: &'a Effect,
    seconds: f32,
}

impl ColorSource for Snapshot<'_> {
    fn color_at(&self, x: u16, _y: u16) -> Color {
        let u = x as f32 / (GRID_SIZE.0 - 1) as f32;
        match *self.effect {
            Effect::Solid { color } => color,
            Effect::Gradient { from, to } => from.lerp(to, u),
            Effect::Rainbow { speed } => hsv_to_rgb((u + self.seconds * speed).rem_euclid(1.0)),
        }
    }
}

/// Fully saturated, full brightness color for hue `h` in [0, 1].
fn hsv_to_rgb(h: f32) -> Color {
    // rem_euclid of a tiny negative value rounds up to exactly 1.0
    let h = if h >= 1.0 { 0.0 } else { h.max(0.0) };
    let sector = h * 6.0;
    let f = sector.fract();
    let up = (f * 255.0).round() as u8;
    let down = 255 - up;
    match sector as u8 {
        0 => Color::new(255, up, 0),
        1 => Color::new(down, 255, 0),
        2 => Color::new(0, 255, up),
        3 => Color::new(0, down, 255),
        4 => Color::new(up, 0, 255),
        _ => Color::new(255, 0, down),
    }
}
