//! Teleport targeting through the miniature.
//!
//! `Idle -> Aiming -> (Idle | Committed -> Idle)`. The candidate lives only
//! while the steering gesture is held.

use glam::Vec3;

/// A floor point picked in the miniature plus the facing to land with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportCandidate {
    /// Miniature-space floor point.
    pub point: Vec3,
    pub yaw: f32,
}

/// World-space destination produced on commit. `position` is the eye point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportCommit {
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TeleportState {
    #[default]
    Idle,
    Aiming(TeleportCandidate),
}

impl TeleportState {
    pub fn candidate(&self) -> Option<&TeleportCandidate> {
        match self {
            Self::Idle => None,
            Self::Aiming(candidate) => Some(candidate),
        }
    }

    /// Advance one frame.
    ///
    /// `steering` is whether the gesture is held this frame and `hit` is the
    /// candidate the pointer produced, if any. Returns a candidate to commit
    /// when the gesture was released while aiming.
    pub fn update(&mut self, steering: bool, hit: Option<TeleportCandidate>) -> Option<TeleportCandidate> {
        if steering {
            *self = match hit {
                Some(candidate) => Self::Aiming(candidate),
                None => Self::Idle,
            };
            return None;
        }
        match std::mem::take(self) {
            Self::Aiming(candidate) => Some(candidate),
            Self::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }
}

/// Map a committed miniature point back into the world and raise it to eye
/// height.
pub fn commit_to_world(candidate: &TeleportCandidate, wim_scale: f32, eye_height: f32) -> TeleportCommit {
    let floor = candidate.point / wim_scale;
    TeleportCommit {
        position: Vec3::new(floor.x, floor.y + eye_height, floor.z),
        yaw: candidate.yaw,
    }
}
