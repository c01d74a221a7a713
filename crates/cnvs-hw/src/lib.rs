//! CNVS Hardware Library
//!
//! Drives the HYTE CNVS addressable LED desk mat over its USB serial link:
//! device discovery, connection lifecycle with reconnect-on-demand, and the
//! fixed frame protocol.

pub mod color;
pub mod error;
pub mod frame;
pub mod layout;
pub mod protocol;
pub mod serial;
pub mod session;

pub use color::Color;
pub use error::{Error, Result};
pub use frame::{encode_frame, ColorSource, LightingMode, RenderSettings};
pub use layout::{DeviceInfo, Position, LED_COUNT};
pub use serial::{Connection, EndpointInfo, LinkSettings, SerialTransport, Transport};
pub use session::Session;

/// USB vendor ID of the CNVS controller.
pub const CNVS_VID: u16 = 0x3402;

/// USB product IDs the CNVS controller enumerates with.
pub const CNVS_PIDS: [u16; 2] = [0x0B00, 0x0B01];
