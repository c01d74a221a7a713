//! Device session: the render and shutdown entry points a host drives.

use crate::frame::{encode_frame, ColorSource, RenderSettings};
use crate::layout::{Position, POSITIONS};
use crate::protocol::POWER_OFF;
use crate::serial::{locate, Connection, Transport};
use crate::Result;
use tracing::{debug, info, warn};

/// One CNVS session, from discovery to shutdown.
///
/// Calls must not overlap; the host invokes [`on_render`](Self::on_render)
/// periodically and [`on_shutdown`](Self::on_shutdown) once at the end.
pub struct Session<T: Transport> {
    connection: Connection<T>,
    positions: &'static [Position],
    settings: RenderSettings,
}

impl<T: Transport> Session<T> {
    /// Locates the device and tries a first connection.
    ///
    /// Discovery happens only here. If the device is not found the session
    /// stays idle; plugging it in later requires a new session.
    pub fn start(transport: T, settings: RenderSettings) -> Self {
        let endpoint = locate(&transport);
        Self::open(transport, endpoint, settings)
    }

    /// Uses a known endpoint instead of discovery.
    pub fn with_endpoint(transport: T, endpoint: &str, settings: RenderSettings) -> Self {
        Self::open(transport, Some(endpoint.to_string()), settings)
    }

    fn open(transport: T, endpoint: Option<String>, settings: RenderSettings) -> Self {
        let mut session = Self {
            connection: Connection::new(transport, endpoint),
            positions: &POSITIONS,
            settings,
        };
        if session.connection.endpoint().is_some() {
            if let Err(e) = session.connection.ensure_connected() {
                warn!("Failed to connect to CNVS: {}", e);
            }
        }
        session
    }

    /// Current render settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render settings, for host-side updates.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// The connection manager.
    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    /// Returns true if a device endpoint is known.
    pub fn has_device(&self) -> bool {
        self.connection.endpoint().is_some()
    }

    /// Returns true if the link is currently up.
    pub fn is_connected(&mut self) -> bool {
        self.connection.is_connected()
    }

    /// Renders one frame.
    ///
    /// Reconnects first if the link dropped. The colors are gathered and
    /// encoded even when that fails; the frame is then dropped and the
    /// connection error returned for the caller to report. Write failures
    /// are returned the same way. The next call simply tries again.
    pub fn on_render<S: ColorSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let connected = self.connection.ensure_connected();
        if let Err(e) = &connected {
            debug!("Render without a link: {}", e);
        }

        let frame = encode_frame(self.positions, source, &self.settings, false);
        connected?;
        self.connection.send(&frame)
    }

    /// Turns the LEDs off and closes the link.
    ///
    /// Sends the power-off command followed by a frame of the shutdown
    /// color, then tears the connection down. Every step is best-effort.
    /// Does nothing if no device was ever found or the link is already down.
    pub fn on_shutdown(&mut self) {
        if !self.has_device() {
            return;
        }
        if !self.connection.is_connected() {
            debug!("Serial port not connected, skipping shutdown sequence");
            return;
        }

        if let Err(e) = self.connection.send(&POWER_OFF) {
            warn!("Failed to send power off command: {}", e);
        }

        let frame = encode_frame(self.positions, &self.settings.shutdown_color, &self.settings, true);
        if let Err(e) = self.connection.send(&frame) {
            warn!("Failed to write shutdown colors: {}", e);
        }

        self.connection.teardown();
        info!("CNVS shut down");
    }
}
