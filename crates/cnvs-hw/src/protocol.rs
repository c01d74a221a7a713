//! CNVS wire protocol definitions.
//!
//! Protocol structure:
//! - Handshake: `FF DC 05 00`, sent once after every successful open
//! - Power off: `FF DC 08`
//! - Color frame: 7-byte header + 3 bytes per LED in G, R, B order
//!
//! Every channel on the wire is attenuated to 70% and floor-truncated, so the
//! brightest value the device ever receives is 178. The product is taken in
//! double precision, which puts 90, 170 and 180 one step below the exact
//! decimal result; existing hosts send those values and so do we.

use crate::layout::LED_COUNT;

/// Command signature byte.
pub const SIGNATURE: u8 = 0xFF;

/// Control command group (handshake, power off).
pub const CONTROL: u8 = 0xDC;

/// Color data command group.
pub const COLOR_DATA: u8 = 0xEE;

/// Initialization command sent right after the port opens.
pub const HANDSHAKE: [u8; 4] = [SIGNATURE, CONTROL, 0x05, 0x00];

/// Power-off command sent on shutdown.
pub const POWER_OFF: [u8; 3] = [SIGNATURE, CONTROL, 0x08];

/// Header size of a color frame.
pub const HEADER_SIZE: usize = 7;

/// Color frame header. Byte 5 is the LED count (0x32 = 50).
pub const FRAME_HEADER: [u8; HEADER_SIZE] =
    [SIGNATURE, COLOR_DATA, 0x02, 0x01, 0x00, LED_COUNT as u8, 0x00];

/// Bytes per LED in the payload.
pub const BYTES_PER_LED: usize = 3;

/// Size of a complete color frame for the CNVS.
pub const FRAME_SIZE: usize = HEADER_SIZE + LED_COUNT * BYTES_PER_LED;

/// Brightness scale applied to every channel.
pub const CHANNEL_SCALE: f64 = 0.70;

/// Scales a channel for the wire: `floor(value * 0.70)`.
#[inline]
pub fn scale_channel(value: u8) -> u8 {
    (value as f64 * CHANNEL_SCALE).floor() as u8
}
