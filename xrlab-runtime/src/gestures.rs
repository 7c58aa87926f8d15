use glam::Vec3;

use crate::input::HeadPose;

/// Fires once when its condition becomes true, then waits for the condition
/// to drop before it can fire again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeToggle {
    armed: bool,
}

impl Default for EdgeToggle {
    fn default() -> Self {
        Self { armed: true }
    }
}

impl EdgeToggle {
    pub fn update(&mut self, condition: bool) -> bool {
        if !condition {
            self.armed = true;
            return false;
        }
        std::mem::replace(&mut self.armed, false)
    }
}

/// Both grips at or above the headset.
pub fn hands_above_head(head: &HeadPose, left: Vec3, right: Vec3) -> bool {
    left.y >= head.position.y && right.y >= head.position.y
}

/// Left hand at or to the right of the right hand, as the user sees it.
pub fn hands_crossed(head: &HeadPose, left: Vec3, right: Vec3) -> bool {
    head.to_local(left).x >= head.to_local(right).x
}
