//! Two-handed manipulation.
//!
//! Every frame the grip is held, the motion of both hands since the previous
//! frame is decomposed into a translation of their midpoint, a rotation of the
//! hand-to-hand vector, and (with the second grip held) a change in hand
//! separation. The deltas are incremental, so releasing and re-grabbing never
//! snaps the object back to a reference pose.

use glam::{Quat, Vec3};
use xrlab_shared::math::{midpoint, normalize_or_none, rotation_between, EPSILON};

use crate::input::TrackedPoint;

/// Hand positions and grip states sampled for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BimanualInput {
    pub left: TrackedPoint,
    pub right: TrackedPoint,
    /// Drives translation and rotation.
    pub right_grip_held: bool,
    /// Additionally enables scaling.
    pub left_grip_held: bool,
}

/// Per-frame result. A `None` step was skipped because its input was degenerate
/// or its gesture was not held.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BimanualDelta {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<f32>,
}

impl BimanualDelta {
    pub fn is_empty(&self) -> bool {
        self.translation.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

/// Midpoint motion. Skipped when the midpoint did not move.
pub fn translation_step(left: &TrackedPoint, right: &TrackedPoint) -> Option<Vec3> {
    let delta = midpoint(left.current, right.current) - midpoint(left.previous, right.previous);
    // A zero delta has no direction to translate along.
    normalize_or_none(delta)?;
    Some(delta)
}

/// Rotation carrying last frame's hand-to-hand direction onto this frame's.
/// Skipped when either vector has no length or the two are parallel.
pub fn rotation_step(left: &TrackedPoint, right: &TrackedPoint) -> Option<Quat> {
    let previous = right.previous - left.previous;
    let current = right.current - left.current;
    let (axis, angle) = rotation_between(previous, current)?;
    Some(Quat::from_axis_angle(axis, angle))
}

/// Ratio of hand separation now to hand separation last frame.
/// Skipped when last frame's separation was zero or the ratio collapses.
pub fn scale_step(left: &TrackedPoint, right: &TrackedPoint) -> Option<f32> {
    let previous = (right.previous - left.previous).length();
    if previous <= EPSILON {
        return None;
    }
    let factor = (right.current - left.current).length() / previous;
    if factor.is_finite() && factor > EPSILON {
        Some(factor)
    } else {
        None
    }
}

/// Run the three sub-steps in their fixed order. Each is independent: a
/// skipped step never blocks the others.
pub fn solve(input: &BimanualInput) -> BimanualDelta {
    if !input.right_grip_held {
        return BimanualDelta::default();
    }
    let translation = translation_step(&input.left, &input.right);
    let rotation = rotation_step(&input.left, &input.right);
    let scale = if input.left_grip_held {
        scale_step(&input.left, &input.right)
    } else {
        None
    };
    if translation.is_none() && rotation.is_none() {
        log::trace!("bimanual frame without translation or rotation");
    }
    BimanualDelta {
        translation,
        rotation,
        scale,
    }
}

/// The object being manipulated, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationTarget {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl ManipulationTarget {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Translate, then rotate about the object's own origin in world space,
    /// then scale component-wise.
    pub fn apply(&mut self, delta: &BimanualDelta) {
        if let Some(t) = delta.translation {
            self.position += t;
        }
        if let Some(q) = delta.rotation {
            self.rotation = (q * self.rotation).normalize();
        }
        if let Some(s) = delta.scale {
            self.scale *= s;
        }
    }
}

/// Small handheld copy of the manipulated object shown between the hands.
/// Rendering aid only; it never feeds back into the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiniaturePreview {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl MiniaturePreview {
    pub fn follow(target: &ManipulationTarget, left: Vec3, right: Vec3, preview_scale: f32) -> Self {
        Self {
            position: midpoint(left, right),
            rotation: target.rotation,
            scale: target.scale * preview_scale,
        }
    }
}

/// Guide line drawn from the left grip to the right grip while manipulating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub start: Vec3,
    pub end: Vec3,
}

impl GuideLine {
    pub fn between(left: Vec3, right: Vec3) -> Self {
        Self { start: left, end: right }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit direction from the left grip, `None` when the grips coincide.
    pub fn direction(&self) -> Option<Vec3> {
        normalize_or_none(self.end - self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const TOLERANCE: f32 = 1e-5;

    fn point(previous: Vec3, current: Vec3) -> TrackedPoint {
        TrackedPoint { current, previous }
    }

    fn held(left: TrackedPoint, right: TrackedPoint, scaling: bool) -> BimanualInput {
        BimanualInput {
            left,
            right,
            right_grip_held: true,
            left_grip_held: scaling,
        }
    }

    fn target() -> ManipulationTarget {
        ManipulationTarget::new(Vec3::new(0.0, 1.0, -2.0), Quat::IDENTITY, Vec3::ONE)
    }

    // ── translation ──

    #[test]
    fn test_translation_moves_by_midpoint_delta() {
        let left = point(Vec3::new(-0.3, 1.0, 0.0), Vec3::new(-0.3, 1.2, 0.0));
        let right = point(Vec3::new(0.3, 1.0, 0.0), Vec3::new(0.3, 1.0, 0.4));
        let delta = solve(&held(left, right, false));
        let expected = Vec3::new(0.0, 0.1, 0.2);
        assert!(delta.translation.unwrap().abs_diff_eq(expected, TOLERANCE));

        let mut t = target();
        t.apply(&delta);
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 1.1, -1.8), TOLERANCE));
    }

    #[test]
    fn test_translation_is_additive() {
        let a = Vec3::new(-0.3, 1.0, 0.0);
        let b = Vec3::new(0.3, 1.0, 0.0);
        let shift1 = Vec3::new(0.1, 0.0, 0.05);
        let shift2 = Vec3::new(-0.02, 0.3, 0.0);

        let mut stepped = target();
        stepped.apply(&solve(&held(point(a, a + shift1), point(b, b + shift1), false)));
        stepped.apply(&solve(&held(
            point(a + shift1, a + shift1 + shift2),
            point(b + shift1, b + shift1 + shift2),
            false,
        )));

        let mut once = target();
        once.apply(&solve(&held(
            point(a, a + shift1 + shift2),
            point(b, b + shift1 + shift2),
            false,
        )));

        assert!(stepped.position.abs_diff_eq(once.position, TOLERANCE));
    }

    // ── rotation ──

    #[test]
    fn test_rotation_unchanged_when_vectors_equal() {
        let left = point(Vec3::new(-0.3, 1.0, 0.0), Vec3::new(-0.2, 1.0, 0.0));
        let right = point(Vec3::new(0.3, 1.0, 0.0), Vec3::new(0.4, 1.0, 0.0));
        let delta = solve(&held(left, right, false));
        assert!(delta.rotation.is_none());

        let mut t = target();
        t.apply(&delta);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_rotation_quarter_turn_about_y() {
        // Right hand swings from +X to -Z around a fixed left hand
        let left = point(Vec3::ZERO, Vec3::ZERO);
        let right = point(Vec3::X, Vec3::NEG_Z);
        let q = rotation_step(&left, &right).unwrap();
        assert!((q * Vec3::X).abs_diff_eq(Vec3::NEG_Z, TOLERANCE));
        assert!((q.to_axis_angle().1 - FRAC_PI_2).abs() < TOLERANCE);
    }

    #[test]
    fn test_rotation_composes_with_existing_orientation() {
        let left = point(Vec3::ZERO, Vec3::ZERO);
        let right = point(Vec3::X, Vec3::NEG_Z);
        let mut t = target();
        t.rotation = Quat::from_rotation_x(0.4);
        t.apply(&solve(&held(left, right, false)));
        let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(0.4);
        assert!(t.rotation.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn test_rotation_nearly_identical_vectors_no_nan() {
        let left = point(Vec3::ZERO, Vec3::ZERO);
        let right = point(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1e-8, 0.0));
        if let Some(q) = rotation_step(&left, &right) {
            assert!(q.is_finite());
        }
    }

    // ── scale ──

    #[test]
    fn test_scale_requires_second_grip() {
        let left = point(Vec3::new(-0.25, 1.0, 0.0), Vec3::new(-0.5, 1.0, 0.0));
        let right = point(Vec3::new(0.25, 1.0, 0.0), Vec3::new(0.5, 1.0, 0.0));
        assert!(solve(&held(left, right, false)).scale.is_none());
        assert_eq!(solve(&held(left, right, true)).scale, Some(2.0));
    }

    #[test]
    fn test_scale_round_trip() {
        let mut t = target();
        t.apply(&BimanualDelta { scale: Some(2.0), ..Default::default() });
        assert_eq!(t.scale, Vec3::splat(2.0));
        t.apply(&BimanualDelta { scale: Some(0.5), ..Default::default() });
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_scale_is_component_wise() {
        let mut t = ManipulationTarget::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, 5.0, 2.0));
        t.apply(&BimanualDelta { scale: Some(1.5), ..Default::default() });
        assert_eq!(t.scale, Vec3::new(1.5, 7.5, 3.0));
    }

    #[test]
    fn test_scale_skipped_when_hands_were_together() {
        let left = point(Vec3::ONE, Vec3::ZERO);
        let right = point(Vec3::ONE, Vec3::X);
        assert!(scale_step(&left, &right).is_none());
    }

    // ── degenerate frames ──

    #[test]
    fn test_still_hands_skip_everything() {
        let left = TrackedPoint::at_rest(Vec3::new(-0.3, 1.0, 0.0));
        let right = TrackedPoint::at_rest(Vec3::new(0.3, 1.0, 0.0));
        let delta = solve(&held(left, right, true));
        assert!(delta.translation.is_none());
        assert!(delta.rotation.is_none());
        assert_eq!(delta.scale, Some(1.0));

        let mut t = target();
        let before = t;
        t.apply(&delta);
        assert_eq!(t, before);
    }

    #[test]
    fn test_coincident_hands_skip_without_panic() {
        let p = TrackedPoint::at_rest(Vec3::new(0.1, 1.0, 0.0));
        let delta = solve(&held(p, p, true));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_nothing_without_right_grip() {
        let left = point(Vec3::ZERO, Vec3::Y);
        let right = point(Vec3::X, Vec3::new(1.0, 1.0, 0.0));
        let input = BimanualInput {
            left,
            right,
            right_grip_held: false,
            left_grip_held: true,
        };
        assert!(solve(&input).is_empty());
    }

    // ── preview ──

    #[test]
    fn test_preview_follows_midpoint_and_target() {
        let t = ManipulationTarget::new(Vec3::ZERO, Quat::from_rotation_z(0.3), Vec3::new(2.0, 4.0, 2.0));
        let preview = MiniaturePreview::follow(&t, Vec3::new(-0.2, 1.0, 0.0), Vec3::new(0.4, 1.2, 0.0), 0.1);
        assert!(preview.position.abs_diff_eq(Vec3::new(0.1, 1.1, 0.0), TOLERANCE));
        assert_eq!(preview.rotation, t.rotation);
        assert!(preview.scale.abs_diff_eq(Vec3::new(0.2, 0.4, 0.2), TOLERANCE));
    }

    #[test]
    fn test_guide_line_spans_the_hands() {
        let line = GuideLine::between(Vec3::new(-0.3, 1.0, 0.0), Vec3::new(0.3, 1.0, 0.0));
        assert!((line.length() - 0.6).abs() < TOLERANCE);
        assert!(line.direction().unwrap().abs_diff_eq(Vec3::X, TOLERANCE));
        assert!(GuideLine::between(Vec3::ONE, Vec3::ONE).direction().is_none());
    }
}
