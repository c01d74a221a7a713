//! Static device description: LED positions, labels and user options.
//!
//! The position table runs clockwise around the mat starting at the top-left
//! edge, and its order is the byte order of every color frame.

use crate::{Color, LightingMode};
use serde::Serialize;

/// Number of addressable LEDs.
pub const LED_COUNT: usize = 50;

/// Grid size of the mat in position units (width, height).
pub const GRID_SIZE: (u16, u16) = (22, 7);

/// A LED coordinate on the position grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

const fn p(x: u16, y: u16) -> Position {
    Position { x, y }
}

/// LED positions in wire order.
#[rustfmt::skip]
pub const POSITIONS: [Position; LED_COUNT] = [
    // Top edge, left to right
    p(1, 0), p(2, 0), p(3, 0), p(4, 0), p(5, 0), p(6, 0), p(7, 0), p(8, 0), p(9, 0), p(10, 0),
    p(11, 0), p(12, 0), p(13, 0), p(14, 0), p(15, 0), p(16, 0), p(17, 0), p(18, 0), p(19, 0),
    p(20, 0),
    // Right edge, top to bottom
    p(21, 1), p(21, 2), p(21, 3), p(21, 4), p(21, 5),
    // Bottom edge, right to left
    p(20, 6), p(19, 6), p(18, 6), p(17, 6), p(16, 6), p(15, 6), p(14, 6), p(13, 6), p(12, 6),
    p(11, 6), p(10, 6), p(9, 6), p(8, 6), p(7, 6), p(6, 6), p(5, 6), p(4, 6), p(3, 6), p(2, 6),
    p(1, 6),
    // Left edge, bottom to top
    p(0, 5), p(0, 4), p(0, 3), p(0, 2), p(0, 1),
];

/// LED labels, index-aligned with [`POSITIONS`].
pub const LED_NAMES: [&str; LED_COUNT] = [
    "LED 1", "LED 2", "LED 3", "LED 4", "LED 5", "LED 6", "LED 7", "LED 8", "LED 9", "LED 10",
    "LED 11", "LED 12", "LED 13", "LED 14", "LED 15", "LED 16", "LED 17", "LED 18", "LED 19",
    "LED 20", "LED 21", "LED 22", "LED 23", "LED 24", "LED 25", "LED 26", "LED 27", "LED 28",
    "LED 29", "LED 30", "LED 31", "LED 32", "LED 33", "LED 34", "LED 35", "LED 36", "LED 37",
    "LED 38", "LED 39", "LED 40", "LED 41", "LED 42", "LED 43", "LED 44", "LED 45", "LED 46",
    "LED 47", "LED 48", "LED 49", "LED 50",
];

/// A user-configurable option exposed to hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeviceOption {
    Color {
        property: &'static str,
        label: &'static str,
        default: Color,
    },
    Combobox {
        property: &'static str,
        label: &'static str,
        values: Vec<LightingMode>,
        default: LightingMode,
    },
}

/// Everything a host needs to place and configure the device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub name: &'static str,
    pub size: (u16, u16),
    pub default_position: (u16, u16),
    pub default_scale: f32,
    pub vendor_id: u16,
    pub product_ids: [u16; 2],
    pub positions: &'static [Position],
    pub names: &'static [&'static str],
    pub options: Vec<DeviceOption>,
}

impl DeviceInfo {
    /// Returns the CNVS description.
    pub fn cnvs() -> Self {
        Self {
            name: "HYTE CNVS",
            size: GRID_SIZE,
            default_position: (50, 50),
            default_scale: 1.0,
            vendor_id: crate::CNVS_VID,
            product_ids: crate::CNVS_PIDS,
            positions: &POSITIONS,
            names: &LED_NAMES,
            options: vec![
                DeviceOption::Color {
                    property: "shutdown_color",
                    label: "Shutdown Color",
                    default: Color::BLACK,
                },
                DeviceOption::Combobox {
                    property: "mode",
                    label: "Lighting Mode",
                    values: vec![LightingMode::Canvas, LightingMode::Forced],
                    default: LightingMode::Canvas,
                },
                DeviceOption::Color {
                    property: "forced_color",
                    label: "Forced Color",
                    default: Color::WHITE,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_positions_inside_grid_and_unique() {
        let mut seen = HashSet::new();
        for pos in POSITIONS {
            assert!(pos.x < GRID_SIZE.0 && pos.y < GRID_SIZE.1, "{pos:?} out of grid");
            assert!(seen.insert((pos.x, pos.y)), "{pos:?} repeated");
        }
    }

    #[test]
    fn test_positions_order() {
        assert_eq!(POSITIONS[0], p(1, 0));
        assert_eq!(POSITIONS[19], p(20, 0));
        assert_eq!(POSITIONS[20], p(21, 1));
        assert_eq!(POSITIONS[25], p(20, 6));
        assert_eq!(POSITIONS[44], p(1, 6));
        assert_eq!(POSITIONS[49], p(0, 1));
    }

    #[test]
    fn test_names_match_positions() {
        for (i, name) in LED_NAMES.iter().enumerate() {
            assert_eq!(*name, format!("LED {}", i + 1));
        }
    }

    #[test]
    fn test_device_info_defaults() {
        let info = DeviceInfo::cnvs();
        assert_eq!(info.positions.len(), LED_COUNT);
        assert_eq!(info.names.len(), LED_COUNT);
        assert_eq!(info.options.len(), 3);
        assert!(matches!(
            info.options[1],
            DeviceOption::Combobox { default: LightingMode::Canvas, .. }
        ));
    }
}
