//! Binary per-frame controller snapshots.
//!
//! A snapshot file is `XRF1`, a little-endian `u32` frame count, then that many
//! tightly packed [`RawFrame`] records. The records are plain `#[repr(C)]` data so
//! a host can write them straight out of its XR input loop.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3};
use thiserror::Error;

pub const MAGIC: [u8; 4] = *b"XRF1";
const HEADER_LEN: usize = 8;

/// Trigger button bit in [`RawControllerPose::buttons`].
pub const BUTTON_TRIGGER: u32 = 1 << 0;
/// Squeeze (grip) button bit.
pub const BUTTON_SQUEEZE: u32 = 1 << 1;
/// Set while the controller is connected and tracked.
pub const FLAG_CONNECTED: u32 = 1 << 31;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot is {0} bytes, shorter than the header")]
    TooShort(usize),
    #[error("bad magic {0:?}, expected XRF1")]
    BadMagic([u8; 4]),
    #[error("header declares {declared} frames but the body holds {available}")]
    Truncated { declared: usize, available: usize },
}

/// One controller as sampled by the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RawControllerPose {
    pub grip: [f32; 3],
    pub pointer_origin: [f32; 3],
    pub pointer_direction: [f32; 3],
    pub buttons: u32,
    pub thumbstick: [f32; 2],
}

impl RawControllerPose {
    pub fn is_connected(&self) -> bool {
        self.buttons & FLAG_CONNECTED != 0
    }

    pub fn is_pressed(&self, button: u32) -> bool {
        self.buttons & button != 0
    }

    pub fn grip(&self) -> Vec3 {
        Vec3::from_array(self.grip)
    }

    pub fn pointer_origin(&self) -> Vec3 {
        Vec3::from_array(self.pointer_origin)
    }

    pub fn pointer_direction(&self) -> Vec3 {
        Vec3::from_array(self.pointer_direction)
    }

    pub fn thumbstick(&self) -> Vec2 {
        Vec2::from_array(self.thumbstick)
    }
}

/// Everything the host samples for one rendered frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RawFrame {
    /// Seconds since the previous frame.
    pub dt: f32,
    pub head_position: [f32; 3],
    /// Head orientation as x, y, z, w.
    pub head_rotation: [f32; 4],
    pub left: RawControllerPose,
    pub right: RawControllerPose,
}

impl RawFrame {
    pub fn head_position(&self) -> Vec3 {
        Vec3::from_array(self.head_position)
    }

    pub fn head_rotation(&self) -> Quat {
        let [x, y, z, w] = self.head_rotation;
        let q = Quat::from_xyzw(x, y, z, w);
        if q.length_squared() > 0.0 {
            q.normalize()
        } else {
            Quat::IDENTITY
        }
    }
}

/// Serialize frames into the snapshot file layout.
pub fn encode_frames(frames: &[RawFrame]) -> Vec<u8> {
    let body: &[u8] = bytemuck::cast_slice(frames);
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Parse a snapshot file. The input need not be aligned.
pub fn decode_frames(data: &[u8]) -> Result<Vec<RawFrame>, SnapshotError> {
    if data.len() < HEADER_LEN {
        return Err(SnapshotError::TooShort(data.len()));
    }
    let magic = [data[0], data[1], data[2], data[3]];
    if magic != MAGIC {
        return Err(SnapshotError::BadMagic(magic));
    }
    let declared = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;

    let frame_len = std::mem::size_of::<RawFrame>();
    let body = &data[HEADER_LEN..];
    let available = body.len() / frame_len;
    if available < declared {
        return Err(SnapshotError::Truncated { declared, available });
    }

    Ok(body
        .chunks_exact(frame_len)
        .take(declared)
        .map(bytemuck::pod_read_unaligned::<RawFrame>)
        .collect())
}
