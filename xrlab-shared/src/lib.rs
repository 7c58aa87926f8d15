//! Shared types for XR Lab.
//!
//! Geometry helpers used by the interaction runtime and the binary per-frame
//! controller snapshot format exchanged with the host XR layer.

pub mod math;
pub mod snapshot;

pub use snapshot::{RawControllerPose, RawFrame, SnapshotError};
