//! Laser selection and pointer attachment.
//!
//! A trigger press picks along the pointer ray. An ordinary node becomes the
//! hand's selection and rides the pointer while the trigger is held; a lever
//! handle of the same hand starts a lever grab instead. Selection outlives the
//! trigger: releasing detaches the node but keeps it selected so the grips can
//! manipulate it.

use glam::{Quat, Vec3};
use xrlab_shared::math::Ray;

use crate::input::Hand;
use crate::scene::{NodeId, NodeKind, Scene};

/// What a pick landed on, from one hand's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Object(NodeId),
    Lever(Hand),
    Nothing,
}

/// Interpret a picked node for `hand`. Lever handles only answer to their
/// own hand.
pub fn classify_pick(scene: &Scene, hand: Hand, node: Option<NodeId>) -> PickTarget {
    let Some(id) = node else {
        return PickTarget::Nothing;
    };
    match scene.node(id).map(|n| n.kind) {
        Some(NodeKind::LeverHandle(owner)) if owner == hand => PickTarget::Lever(hand),
        Some(NodeKind::LeverHandle(_)) | Some(NodeKind::Group) | None => PickTarget::Nothing,
        Some(NodeKind::Prop) | Some(NodeKind::Block) => PickTarget::Object(id),
    }
}

/// Orientation of a pointer whose forward (-Z) runs along `direction`.
pub fn pointer_rotation(direction: Vec3) -> Quat {
    match direction.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(Vec3::NEG_Z, dir),
        None => Quat::IDENTITY,
    }
}

/// A node's pose expressed in pointer space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerAttachment {
    pub node: NodeId,
    pub local_position: Vec3,
    pub local_rotation: Quat,
}

impl PointerAttachment {
    pub fn capture(scene: &Scene, node: NodeId, pointer: &Ray) -> Self {
        let rotation = pointer_rotation(pointer.direction);
        let inverse = rotation.inverse();
        Self {
            node,
            local_position: inverse * (scene.absolute_position(node) - pointer.origin),
            local_rotation: (inverse * scene.absolute_rotation(node)).normalize(),
        }
    }

    /// World pose for the pointer's current placement.
    pub fn world_pose(&self, pointer: &Ray) -> (Vec3, Quat) {
        let rotation = pointer_rotation(pointer.direction);
        (
            pointer.origin + rotation * self.local_position,
            (rotation * self.local_rotation).normalize(),
        )
    }

    pub fn follow(&self, scene: &mut Scene, pointer: &Ray) {
        let (position, rotation) = self.world_pose(pointer);
        scene.set_world_pose(self.node, position, rotation);
    }

    /// Slide the node along the pointer. Positive distances move it away.
    pub fn push_along(&mut self, distance: f32) {
        self.local_position += Vec3::NEG_Z * distance;
    }
}

/// Depth motion for one frame of thumbstick deflection. Pushing the stick
/// forward reports negative `y` and moves the node away.
pub fn depth_distance(axis_y: f32, dt: f32, speed: f32) -> f32 {
    -axis_y * dt * speed
}

/// Selection state of one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSelection {
    pub hand: Hand,
    pub selected: Option<NodeId>,
    pub attachment: Option<PointerAttachment>,
    pub grabbing_lever: bool,
    /// Attachment paused while both hands manipulate the selection.
    pub suspended: bool,
}

impl HandSelection {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            selected: None,
            attachment: None,
            grabbing_lever: false,
            suspended: false,
        }
    }

    /// Trigger press. Drops the previous selection and picks anew.
    pub fn press(&mut self, scene: &Scene, pointer: &Ray, max_distance: f32) -> PickTarget {
        self.clear();
        let hit = scene.pick_with_ray(pointer, max_distance);
        let target = classify_pick(scene, self.hand, hit.map(|h| h.node));
        match target {
            PickTarget::Object(node) => {
                log::info!(
                    "{} hand selected '{}'",
                    self.hand.label(),
                    scene.node(node).map_or("?", |n| n.name.as_str())
                );
                self.selected = Some(node);
                self.attachment = Some(PointerAttachment::capture(scene, node, pointer));
            }
            PickTarget::Lever(_) => {
                log::debug!("{} hand grabbed its lever", self.hand.label());
                self.grabbing_lever = true;
            }
            PickTarget::Nothing => {}
        }
        target
    }

    /// Trigger release. Returns true when a lever grab ended.
    pub fn release(&mut self) -> bool {
        self.attachment = None;
        self.suspended = false;
        std::mem::take(&mut self.grabbing_lever)
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.attachment = None;
        self.grabbing_lever = false;
        self.suspended = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some() && !self.suspended
    }

    pub fn suspend(&mut self) {
        if self.attachment.is_some() {
            self.suspended = true;
        }
    }

    /// Resume following with the offset the node has now.
    pub fn recapture(&mut self, scene: &Scene, pointer: &Ray) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        if let Some(attachment) = self.attachment.as_mut() {
            *attachment = PointerAttachment::capture(scene, attachment.node, pointer);
        }
    }

    /// Move the attached node with the pointer, applying any depth motion first.
    pub fn follow(&mut self, scene: &mut Scene, pointer: &Ray, depth: f32) {
        if self.suspended {
            return;
        }
        if let Some(attachment) = self.attachment.as_mut() {
            if depth != 0.0 {
                attachment.push_along(depth);
            }
            attachment.follow(scene, pointer);
        }
    }
}
