//! mustachio - Headless Face-Overlay Anchoring Service
//!
//! A small Rust service that anchors 2D overlay images to a tracked face:
//! - Receives face mesh vertex packets from an external tracker (JSON/UDP)
//! - Computes a 3D anchor just outside each configured facial feature
//! - Cycles each feature's overlay image on user activation events
//! - Broadcasts per-frame placements to downstream consumers

pub mod config;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod tracking;

pub use config::Config;
pub use error::{MustachioError, Result};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use tracking::{AnchorFrame, FaceSession, MeshPacket};

/// Application state shared across all components
#[derive(Debug)]
pub struct AppState {
    /// Current configuration
    pub config: RwLock<Config>,
    /// Session for the currently tracked face, if any
    pub session: RwLock<Option<FaceSession>>,
    /// Channel for per-frame anchor updates
    pub frame_tx: broadcast::Sender<AnchorFrame>,
    /// Shutdown signal
    pub shutdown_tx: broadcast::Sender<()>,
    /// Consecutive packets without a detected face
    lost_frames: AtomicU32,
}

impl AppState {
    /// Create a new application state with the given configuration
    pub fn new(config: Config) -> Arc<Self> {
        let (frame_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        Arc::new(Self {
            config: RwLock::new(config),
            session: RwLock::new(None),
            frame_tx,
            shutdown_tx,
            lost_frames: AtomicU32::new(0),
        })
    }

    /// Apply one tracker packet.
    ///
    /// Creates the face session on the first detected face, drops it after
    /// the configured grace period without one, and returns the computed
    /// anchor frame (also broadcast to subscribers) when a face was applied.
    pub async fn handle_packet(&self, packet: &MeshPacket) -> Result<Option<AnchorFrame>> {
        let mesh = match packet.mesh() {
            Some(mesh) => mesh,
            None => {
                self.handle_face_lost().await;
                return Ok(None);
            }
        };

        self.lost_frames.store(0, Ordering::Relaxed);

        let mut session = self.session.write().await;
        if session.is_none() {
            let config = self.config.read().await;
            tracing::info!("Face acquired, starting overlay session");
            *session = Some(FaceSession::new(&config.overlay)?);
        }
        let Some(session) = session.as_mut() else {
            return Ok(None);
        };

        let frame = session.apply_mesh(&mesh);
        let _ = self.frame_tx.send(frame.clone());
        Ok(Some(frame))
    }

    /// Count a no-face packet, dropping the session once the grace period expires.
    async fn handle_face_lost(&self) {
        let mut session = self.session.write().await;
        if session.is_none() {
            return;
        }

        let lost = self.lost_frames.fetch_add(1, Ordering::Relaxed) + 1;
        let grace = self.config.read().await.tracking.lost_grace_frames;

        if lost >= grace {
            tracing::info!("Face lost for {} frames, ending overlay session", lost);
            *session = None;
        }
    }

    /// Cycle the overlay for a feature.
    ///
    /// With `None`, the first configured feature is advanced. Returns the new
    /// overlay identifier, or `None` when no face is currently tracked (the
    /// event is dropped, matching a tap landing while no face is on screen).
    pub async fn advance_overlay(&self, feature: Option<&str>) -> Result<Option<String>> {
        let mut session = self.session.write().await;
        let session = match session.as_mut() {
            Some(s) => s,
            None => return Ok(None),
        };

        let feature = match feature {
            Some(name) => name.to_string(),
            None => match session.feature_names().next() {
                Some(name) => name.to_string(),
                None => return Ok(None),
            },
        };

        let next = session.advance(&feature)?;
        tracing::info!("Overlay for {} advanced to {}", feature, next);
        Ok(Some(next))
    }

    /// Whether a face session is currently active
    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Subscribe to anchor frame updates
    pub fn subscribe_frames(&self) -> broadcast::Receiver<AnchorFrame> {
        self.frame_tx.subscribe()
    }

    /// Subscribe to shutdown signal
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    fn detected_packet() -> MeshPacket {
        serde_json::from_value(serde_json::json!({
            "face_detected": true,
            "vertices": [
                [0.0, 0.0, 0.1],
                [0.0, 0.01, 0.1],
                [0.0, 0.02, 0.1],
                [0.0, 0.03, 0.1],
                [0.0, 0.04, 0.1],
                [0.0, 0.05, 0.1],
                [0.0, 0.02, 0.09]
            ]
        }))
        .unwrap()
    }

    fn lost_packet() -> MeshPacket {
        serde_json::from_value(serde_json::json!({ "face_detected": false })).unwrap()
    }

    fn test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.tracking.lost_grace_frames = 3;
        AppState::new(config)
    }

    #[tokio::test]
    async fn test_session_created_on_first_detection() {
        let state = test_state();
        assert!(!state.has_session().await);

        let frame = state.handle_packet(&detected_packet()).await.unwrap();
        assert!(state.has_session().await);

        // Default config binds "nose" to vertex 6
        let frame = frame.unwrap();
        assert_eq!(frame.anchors["nose"].overlay, "nose01");
    }

    #[tokio::test]
    async fn test_session_survives_brief_loss() {
        let state = test_state();
        state.handle_packet(&detected_packet()).await.unwrap();

        state.handle_packet(&lost_packet()).await.unwrap();
        state.handle_packet(&lost_packet()).await.unwrap();
        assert!(state.has_session().await);

        // Redetection resets the grace counter
        state.handle_packet(&detected_packet()).await.unwrap();
        state.handle_packet(&lost_packet()).await.unwrap();
        state.handle_packet(&lost_packet()).await.unwrap();
        assert!(state.has_session().await);
    }

    #[tokio::test]
    async fn test_session_dropped_after_grace() {
        let state = test_state();
        state.handle_packet(&detected_packet()).await.unwrap();

        for _ in 0..3 {
            state.handle_packet(&lost_packet()).await.unwrap();
        }
        assert!(!state.has_session().await);
    }

    #[tokio::test]
    async fn test_selector_state_does_not_survive_session() {
        let state = test_state();
        state.handle_packet(&detected_packet()).await.unwrap();

        let next = state.advance_overlay(None).await.unwrap();
        assert_eq!(next.as_deref(), Some("nose02"));

        for _ in 0..3 {
            state.handle_packet(&lost_packet()).await.unwrap();
        }

        // New session starts back at the first option
        let frame = state
            .handle_packet(&detected_packet())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame.anchors["nose"].overlay, "nose01");
    }

    #[tokio::test]
    async fn test_advance_without_session_is_dropped() {
        let state = test_state();
        let next = state.advance_overlay(None).await.unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_frames_broadcast_to_subscribers() {
        let state = test_state();
        let mut rx = state.subscribe_frames();

        state.handle_packet(&detected_packet()).await.unwrap();
        let frame = rx.recv().await.unwrap();
        assert!(frame.anchors.contains_key("nose"));
    }
}
