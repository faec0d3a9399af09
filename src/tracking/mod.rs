//! Tracking module
//!
//! Boundary to the external face tracker and the per-face session state it
//! drives:
//! - JSON-over-UDP mesh packet ingestion
//! - per-frame anchor computation for each configured feature

pub mod mesh;
pub mod receiver;
pub mod session;

pub use mesh::{FaceMesh, MeshPacket};
pub use receiver::MeshReceiver;
pub use session::{AnchorFrame, AnchorUpdate, FaceSession};
