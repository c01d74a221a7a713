//! Serial transport capability and its system serial port implementation.

use crate::{Error, Result};
use std::io::Write;
use std::time::Duration;
use tokio_serial::{DataBits, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

/// LED controller baud rate.
const BAUD_RATE: u32 = 115_200;

/// Upper bound for a single blocking write.
const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// A serial endpoint as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    /// Port name or path (e.g. `/dev/ttyACM0`, `COM3`).
    pub name: String,
    /// USB vendor ID, if the port is a USB device.
    pub vendor_id: Option<u16>,
    /// USB product ID, if the port is a USB device.
    pub product_id: Option<u16>,
}

/// Line parameters used when opening a port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub timeout: Duration,
}

impl Default for LinkSettings {
    /// 115200 baud, 8-N-1.
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            timeout: WRITE_TIMEOUT,
        }
    }
}

/// Serial primitives the connection manager is built on.
///
/// All calls are synchronous and bounded.
pub trait Transport {
    /// Lists the serial endpoints currently present.
    fn list_endpoints(&self) -> Result<Vec<EndpointInfo>>;

    /// Opens `endpoint` with the given line settings.
    fn open(&mut self, endpoint: &str, settings: &LinkSettings) -> Result<()>;

    /// Returns true if `endpoint` is open and still responding.
    ///
    /// A handle whose device stopped responding is released here, so a
    /// dead port is never held past the first failed query.
    fn is_open(&mut self, endpoint: &str) -> bool;

    /// Writes all bytes to the open port.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Closes the open port, if any.
    fn close(&mut self);

    /// Human-readable details about `endpoint`, for logging.
    fn describe(&self, endpoint: &str) -> Option<String>;
}

/// Open port together with the name it was opened under.
struct OpenPort {
    name: String,
    port: Box<dyn SerialPort>,
}

/// [`Transport`] backed by the system's serial ports.
#[derive(Default)]
pub struct SerialTransport {
    open: Option<OpenPort>,
}

impl SerialTransport {
    /// Creates a transport with no open port.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for SerialTransport {
    fn list_endpoints(&self) -> Result<Vec<EndpointInfo>> {
        let ports = tokio_serial::available_ports()?;
        Ok(ports
            .into_iter()
            .map(|port| {
                let (vendor_id, product_id) = match &port.port_type {
                    SerialPortType::UsbPort(usb) => (Some(usb.vid), Some(usb.pid)),
                    _ => (None, None),
                };
                EndpointInfo {
                    name: port.port_name,
                    vendor_id,
                    product_id,
                }
            })
            .collect())
    }

    fn open(&mut self, endpoint: &str, settings: &LinkSettings) -> Result<()> {
        self.close();

        let port = tokio_serial::new(endpoint, settings.baud_rate)
            .data_bits(settings.data_bits)
            .parity(settings.parity)
            .stop_bits(settings.stop_bits)
            .timeout(settings.timeout)
            .open()
            .map_err(|source| Error::Open {
                endpoint: endpoint.to_string(),
                source,
            })?;

        debug!("Opened {} at {} baud", endpoint, settings.baud_rate);
        self.open = Some(OpenPort {
            name: endpoint.to_string(),
            port,
        });
        Ok(())
    }

    fn is_open(&mut self, endpoint: &str) -> bool {
        match &self.open {
            Some(open) if open.name == endpoint => {
                // An unplugged CDC device fails the input queue query
                if open.port.bytes_to_read().is_ok() {
                    return true;
                }
                info!("Serial port {} stopped responding, releasing it", open.name);
                self.open = None;
                false
            }
            _ => false,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let open = self.open.as_mut().ok_or(Error::NotConnected)?;
        open.port.write_all(bytes)?;
        open.port.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        self.open = None;
    }

    fn describe(&self, endpoint: &str) -> Option<String> {
        let ports = tokio_serial::available_ports().ok()?;
        let port = ports.into_iter().find(|p| p.port_name == endpoint)?;
        Some(match port.port_type {
            SerialPortType::UsbPort(usb) => format!(
                "USB {:04X}:{:04X} manufacturer={} product={} serial={}",
                usb.vid,
                usb.pid,
                usb.manufacturer.as_deref().unwrap_or("?"),
                usb.product.as_deref().unwrap_or("?"),
                usb.serial_number.as_deref().unwrap_or("?"),
            ),
            other => format!("{other:?}"),
        })
    }
}
