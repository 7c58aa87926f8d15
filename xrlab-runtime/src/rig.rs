use glam::{Quat, Vec3};
use xrlab_shared::math::forward_from_yaw;

/// Where the user stands. `position` is the eye point, already raised by the
/// eye height above whatever floor the user is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserRig {
    pub position: Vec3,
    pub yaw: f32,
}

impl UserRig {
    pub fn standing_at(floor: Vec3, eye_height: f32, yaw: f32) -> Self {
        Self {
            position: floor + Vec3::Y * eye_height,
            yaw,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    /// Floor point under the eyes.
    pub fn floor_position(&self, eye_height: f32) -> Vec3 {
        self.position - Vec3::Y * eye_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_adds_eye_height() {
        let rig = UserRig::standing_at(Vec3::new(1.0, 0.0, 2.0), 1.6, 0.0);
        assert_eq!(rig.position, Vec3::new(1.0, 1.6, 2.0));
        assert!(rig.floor_position(1.6).abs_diff_eq(Vec3::new(1.0, 0.0, 2.0), 1e-6));
        assert!(rig.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_rotation_matches_forward() {
        let rig = UserRig::standing_at(Vec3::ZERO, 1.6, 1.2);
        assert!((rig.rotation() * Vec3::NEG_Z).abs_diff_eq(rig.forward(), 1e-5));
    }
}
