//! Serial link to the CNVS controller.
//!
//! The controller enumerates as a USB CDC serial port. [`Transport`] is the
//! capability the rest of the crate consumes; [`SerialTransport`] implements
//! it on top of the system serial ports.

mod connection;
mod locator;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use connection::Connection;
pub use locator::{is_cnvs, locate};
pub use transport::{EndpointInfo, LinkSettings, SerialTransport, Transport};
