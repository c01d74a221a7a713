//! Connection lifecycle: open, handshake, liveness, teardown.

use super::transport::{LinkSettings, Transport};
use crate::protocol::HANDSHAKE;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Owns the transport and the endpoint it talks to.
///
/// The link is either connected or not, and that is always whatever the
/// transport reports right now. Reconnection only happens when
/// [`ensure_connected`](Self::ensure_connected) is called.
pub struct Connection<T: Transport> {
    transport: T,
    endpoint: Option<String>,
    settings: LinkSettings,
}

impl<T: Transport> Connection<T> {
    /// Creates an unconnected manager for `endpoint`.
    pub fn new(transport: T, endpoint: Option<String>) -> Self {
        Self {
            transport,
            endpoint,
            settings: LinkSettings::default(),
        }
    }

    /// Returns the endpoint found at discovery, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the underlying transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Queries the transport for liveness of the endpoint.
    pub fn is_connected(&mut self) -> bool {
        match self.endpoint.as_deref() {
            Some(endpoint) => self.transport.is_open(endpoint),
            None => false,
        }
    }

    /// Opens the link and sends the handshake unless it is already up.
    ///
    /// The handshake goes out exactly once per successful open. A failed
    /// handshake closes the port again so the next call starts over.
    pub fn ensure_connected(&mut self) -> Result<()> {
        let endpoint = self.endpoint.as_deref().ok_or(Error::NoEndpoint)?;

        if self.transport.is_open(endpoint) {
            return Ok(());
        }

        debug!("Connecting to {}", endpoint);
        self.transport.open(endpoint, &self.settings)?;

        info!("Connected to CNVS on {}", endpoint);
        if let Some(description) = self.transport.describe(endpoint) {
            info!("Device info: {}", description);
        }

        debug!("Sending handshake: {:02X?}", HANDSHAKE);
        if let Err(e) = self.transport.write(&HANDSHAKE) {
            warn!("Handshake failed, closing {}", endpoint);
            self.transport.close();
            return Err(Error::Handshake(Box::new(e)));
        }

        Ok(())
    }

    /// Writes raw bytes if the link is up.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        self.transport.write(bytes)
    }

    /// Closes the link if it is open. Safe to call repeatedly.
    ///
    /// A link that already died is released by the liveness query, so no
    /// close is issued for it.
    pub fn teardown(&mut self) {
        if self.is_connected() {
            self.transport.close();
            info!("Disconnected from serial port");
        }
    }
}
