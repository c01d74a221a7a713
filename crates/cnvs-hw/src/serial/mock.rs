//! Recording transport for unit tests.

use super::transport::{EndpointInfo, LinkSettings, Transport};
use crate::{Error, Result};

/// A call observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(String),
    Write(Vec<u8>),
    Close,
}

/// In-memory transport that records every open, write and close.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub endpoints: Vec<EndpointInfo>,
    pub fail_list: bool,
    pub fail_open: bool,
    /// Number of upcoming writes that fail.
    pub fail_writes: usize,
    open: Option<String>,
    unplugged: bool,
    events: Vec<Event>,
}

pub fn usb_endpoint(name: &str, vid: u16, pid: u16) -> EndpointInfo {
    EndpointInfo {
        name: name.to_string(),
        vendor_id: Some(vid),
        product_id: Some(pid),
    }
}

/// Endpoint name used by [`MockTransport::cnvs`].
pub const CNVS_PORT: &str = "/dev/ttyACM0";

impl MockTransport {
    pub fn with_endpoints(endpoints: Vec<EndpointInfo>) -> Self {
        Self {
            endpoints,
            ..Self::default()
        }
    }

    /// A transport with one CNVS attached.
    pub fn cnvs() -> Self {
        Self::with_endpoints(vec![
            usb_endpoint("/dev/ttyS0", 0x0000, 0x0000),
            usb_endpoint(CNVS_PORT, 0x3402, 0x0B00),
        ])
    }

    /// Simulates the device disappearing without a close.
    ///
    /// The handle stays held until the next liveness query notices.
    pub fn unplug(&mut self) {
        self.unplugged = true;
    }

    /// Returns true while a port handle is held, dead or alive.
    pub fn holds_port(&self) -> bool {
        self.open.is_some()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn writes(&self) -> Vec<&[u8]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| wanted(e)).count()
    }
}

impl Transport for MockTransport {
    fn list_endpoints(&self) -> Result<Vec<EndpointInfo>> {
        if self.fail_list {
            return Err(Error::Write(std::io::Error::other("enumeration failed")));
        }
        Ok(self.endpoints.clone())
    }

    fn open(&mut self, endpoint: &str, settings: &LinkSettings) -> Result<()> {
        assert_eq!(*settings, LinkSettings::default());
        self.events.push(Event::Open(endpoint.to_string()));
        if self.fail_open {
            return Err(Error::Open {
                endpoint: endpoint.to_string(),
                source: tokio_serial::Error::new(tokio_serial::ErrorKind::NoDevice, "open failed"),
            });
        }
        self.open = Some(endpoint.to_string());
        self.unplugged = false;
        Ok(())
    }

    fn is_open(&mut self, endpoint: &str) -> bool {
        if self.unplugged {
            self.open = None;
        }
        self.open.as_deref() == Some(endpoint)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.events.push(Event::Write(bytes.to_vec()));
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(Error::Write(std::io::Error::other("write failed")));
        }
        Ok(())
    }

    fn close(&mut self) {
        self.events.push(Event::Close);
        self.open = None;
    }

    fn describe(&self, endpoint: &str) -> Option<String> {
        Some(format!("mock {endpoint}"))
    }
}
