//! Lever-driven vehicle.
//!
//! Each lever remembers where its hand was (head-local) when grabbed. Pushing
//! the hand away from that start point tilts the lever forward.

use glam::{Quat, Vec3};
use xrlab_shared::math::forward_from_yaw;

use crate::config::VehicleConfig;
use crate::input::Hand;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lever {
    /// Head-local grip position when the grab began.
    pub start: Option<Vec3>,
    pub deflection: f32,
}

impl Lever {
    pub fn grab(&mut self, head_local: Vec3) {
        self.start = Some(head_local);
        self.deflection = 0.0;
    }

    pub fn release(&mut self) {
        self.start = None;
        self.deflection = 0.0;
    }

    pub fn is_grabbed(&self) -> bool {
        self.start.is_some()
    }

    /// Track the hand. Forward (head-local -Z) motion is positive.
    pub fn update(&mut self, head_local: Vec3, limit: f32) {
        if let Some(start) = self.start {
            self.deflection = (start.z - head_local.z).clamp(-limit, limit);
        }
    }

    /// Visual tilt of the handle about its pivot.
    pub fn tilt(&self) -> Quat {
        Quat::from_rotation_x(-self.deflection)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VehicleCommand {
    #[default]
    Idle,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl VehicleCommand {
    pub fn is_moving(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

pub fn command_for(left: f32, right: f32, deadzone: f32) -> VehicleCommand {
    let pushed = |d: f32| d > deadzone;
    let pulled = |d: f32| d < -deadzone;
    match (pushed(left), pulled(left), pushed(right), pulled(right)) {
        (true, _, true, _) => VehicleCommand::Forward,
        (_, true, _, true) => VehicleCommand::Backward,
        (true, _, _, true) => VehicleCommand::TurnRight,
        (_, true, true, _) => VehicleCommand::TurnLeft,
        _ => VehicleCommand::Idle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionChange {
    Started,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub position: Vec3,
    pub yaw: f32,
    pub speed: f32,
    pub turning_speed: f32,
    pub active: bool,
    pub seat_offset: Vec3,
    pub left: Lever,
    pub right: Lever,
    moving: bool,
}

impl Vehicle {
    pub fn new(config: &VehicleConfig, speed: f32, turning_speed: f32) -> Self {
        Self {
            position: config.start_position,
            yaw: config.start_yaw,
            speed,
            turning_speed,
            active: false,
            seat_offset: config.seat_offset,
            left: Lever::default(),
            right: Lever::default(),
            moving: false,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Seat position in world space (floor level).
    pub fn seat_position(&self) -> Vec3 {
        self.position + self.rotation() * self.seat_offset
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn lever(&self, hand: Hand) -> &Lever {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn lever_mut(&mut self, hand: Hand) -> &mut Lever {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    pub fn enter(&mut self) {
        self.active = true;
    }

    pub fn exit(&mut self) -> Option<MotionChange> {
        self.active = false;
        self.left.release();
        self.right.release();
        self.set_moving(false)
    }

    /// Current command from the levers. Idle unless active with both levers held.
    pub fn command(&self, deadzone: f32) -> VehicleCommand {
        if !self.active || !self.left.is_grabbed() || !self.right.is_grabbed() {
            return VehicleCommand::Idle;
        }
        command_for(self.left.deflection, self.right.deflection, deadzone)
    }

    /// Move for one frame. Reports idle/moving transitions.
    pub fn drive(&mut self, command: VehicleCommand, dt: f32) -> Option<MotionChange> {
        match command {
            VehicleCommand::Forward => self.position += forward_from_yaw(self.yaw) * self.speed * dt,
            VehicleCommand::Backward => self.position -= forward_from_yaw(self.yaw) * self.speed * dt,
            VehicleCommand::TurnLeft => self.yaw += self.turning_speed * dt,
            VehicleCommand::TurnRight => self.yaw -= self.turning_speed * dt,
            VehicleCommand::Idle => {}
        }
        self.set_moving(command.is_moving())
    }

    fn set_moving(&mut self, moving: bool) -> Option<MotionChange> {
        if moving == self.moving {
            return None;
        }
        self.moving = moving;
        Some(if moving {
            MotionChange::Started
        } else {
            MotionChange::Stopped
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    const TOLERANCE: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn vehicle() -> Vehicle {
        Vehicle::new(&VehicleConfig::default(), 3.0, 1.0)
    }

    fn set_levers(v: &mut Vehicle, left: f32, right: f32) {
        v.left.grab(Vec3::ZERO);
        v.right.grab(Vec3::ZERO);
        v.left.update(Vec3::new(0.0, 0.0, -left), FRAC_PI_4);
        v.right.update(Vec3::new(0.0, 0.0, -right), FRAC_PI_4);
    }

    // ── levers ──

    #[test]
    fn test_lever_pushed_forward_is_positive() {
        let mut lever = Lever::default();
        lever.grab(Vec3::new(0.2, -0.4, -0.3));
        lever.update(Vec3::new(0.2, -0.4, -0.5), FRAC_PI_4);
        assert!(approx_eq(lever.deflection, 0.2));
    }

    #[test]
    fn test_lever_clamps_to_limit() {
        let mut lever = Lever::default();
        lever.grab(Vec3::ZERO);
        lever.update(Vec3::new(0.0, 0.0, -3.0), FRAC_PI_4);
        assert_eq!(lever.deflection, FRAC_PI_4);
        lever.update(Vec3::new(0.0, 0.0, 3.0), FRAC_PI_4);
        assert_eq!(lever.deflection, -FRAC_PI_4);
    }

    #[test]
    fn test_released_lever_zeroes() {
        let mut lever = Lever::default();
        lever.grab(Vec3::ZERO);
        lever.update(Vec3::new(0.0, 0.0, -0.5), FRAC_PI_4);
        lever.release();
        assert_eq!(lever.deflection, 0.0);
        lever.update(Vec3::new(0.0, 0.0, -0.5), FRAC_PI_4);
        assert_eq!(lever.deflection, 0.0);
    }

    // ── commands ──

    #[test]
    fn test_command_table() {
        assert_eq!(command_for(0.3, 0.3, 0.15), VehicleCommand::Forward);
        assert_eq!(command_for(-0.3, -0.3, 0.15), VehicleCommand::Backward);
        assert_eq!(command_for(0.3, -0.3, 0.15), VehicleCommand::TurnRight);
        assert_eq!(command_for(-0.3, 0.3, 0.15), VehicleCommand::TurnLeft);
        assert_eq!(command_for(0.3, 0.1, 0.15), VehicleCommand::Idle);
        assert_eq!(command_for(0.15, 0.15, 0.15), VehicleCommand::Idle);
    }

    #[test]
    fn test_inactive_vehicle_ignores_levers() {
        let mut v = vehicle();
        set_levers(&mut v, 0.5, 0.5);
        assert_eq!(v.command(0.15), VehicleCommand::Idle);
        v.enter();
        assert_eq!(v.command(0.15), VehicleCommand::Forward);
    }

    #[test]
    fn test_one_lever_is_not_enough() {
        let mut v = vehicle();
        v.enter();
        v.left.grab(Vec3::ZERO);
        v.left.update(Vec3::new(0.0, 0.0, -0.5), FRAC_PI_4);
        assert_eq!(v.command(0.15), VehicleCommand::Idle);
    }

    // ── driving ──

    #[test]
    fn test_forward_moves_along_facing() {
        let mut v = vehicle();
        v.enter();
        v.drive(VehicleCommand::Forward, 0.5);
        assert!(v.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.5), TOLERANCE));
        v.drive(VehicleCommand::Backward, 0.5);
        assert!(v.position.abs_diff_eq(Vec3::ZERO, TOLERANCE));
    }

    #[test]
    fn test_turn_left_increases_yaw() {
        let mut v = vehicle();
        v.drive(VehicleCommand::TurnLeft, 0.25);
        assert!(approx_eq(v.yaw, 0.25));
        v.drive(VehicleCommand::TurnRight, 0.5);
        assert!(approx_eq(v.yaw, -0.25));
    }

    #[test]
    fn test_motion_cues_on_transitions_only() {
        let mut v = vehicle();
        assert_eq!(v.drive(VehicleCommand::Idle, 0.1), None);
        assert_eq!(v.drive(VehicleCommand::Forward, 0.1), Some(MotionChange::Started));
        assert_eq!(v.drive(VehicleCommand::TurnLeft, 0.1), None);
        assert_eq!(v.drive(VehicleCommand::Idle, 0.1), Some(MotionChange::Stopped));
    }

    #[test]
    fn test_exit_while_moving_stops() {
        let mut v = vehicle();
        v.enter();
        v.drive(VehicleCommand::Forward, 0.1);
        assert_eq!(v.exit(), Some(MotionChange::Stopped));
        assert!(!v.active);
        assert!(!v.left.is_grabbed());
    }

    #[test]
    fn test_seat_follows_yaw() {
        let mut v = vehicle();
        v.seat_offset = Vec3::new(0.0, 0.3, 0.3);
        v.yaw = std::f32::consts::PI;
        assert!(v.seat_position().abs_diff_eq(Vec3::new(0.0, 0.3, -0.3), TOLERANCE));
    }
}
