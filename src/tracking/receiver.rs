//! Face mesh receiver
//!
//! Receives JSON-over-UDP mesh packets from the external face tracker, one
//! packet per rendered frame. The tracker process itself (camera capture,
//! mesh fitting) lives outside this crate.

use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::TrackingConfig;
use crate::error::{MustachioError, TrackingError};
use crate::tracking::mesh::MeshPacket;

/// JSON-over-UDP mesh packet receiver
pub struct MeshReceiver {
    config: TrackingConfig,
    socket: Option<UdpSocket>,
    latest: Arc<RwLock<Option<MeshPacket>>>,
}

impl MeshReceiver {
    /// Create a new mesh receiver (does not bind yet)
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            config: config.clone(),
            socket: None,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Bind the UDP socket and start receiving
    pub fn start(&mut self) -> Result<(), MustachioError> {
        let addr = format!("{}:{}", self.config.listen_address, self.config.port);

        let socket = UdpSocket::bind(&addr)
            .map_err(|e| TrackingError::Receiver(format!("Failed to bind to {}: {}", addr, e)))?;

        socket
            .set_nonblocking(true)
            .map_err(|e| TrackingError::Receiver(format!("Failed to set non-blocking: {}", e)))?;

        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .ok();

        tracing::info!("Mesh receiver listening on {}", addr);
        self.socket = Some(socket);

        Ok(())
    }

    /// Process one incoming packet if available (non-blocking).
    ///
    /// Returns the packet that arrived this call, or `None` when the socket
    /// is idle or not started.
    pub async fn process(&self) -> Result<Option<MeshPacket>, MustachioError> {
        let socket = match &self.socket {
            Some(s) => s,
            None => return Ok(None),
        };

        let mut buf = [0u8; 65536];

        match socket.recv(&mut buf) {
            Ok(size) if size > 0 => {
                let packet: MeshPacket = serde_json::from_slice(&buf[..size])
                    .map_err(|e| TrackingError::Parse(format!("JSON parse error: {}", e)))?;

                let mut latest = self.latest.write().await;
                *latest = Some(packet.clone());

                Ok(Some(packet))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // No data available
                Ok(None)
            }
            Err(e) => Err(TrackingError::Receiver(format!("Receive error: {}", e)).into()),
        }
    }

    /// Get the most recently received packet
    pub async fn latest(&self) -> Option<MeshPacket> {
        self.latest.read().await.clone()
    }

    /// Stop the receiver
    pub fn stop(&mut self) {
        self.socket = None;
        tracing::info!("Mesh receiver stopped");
    }
}
