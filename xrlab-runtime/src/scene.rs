use glam::{Mat4, Quat, Vec3};
use xrlab_shared::math::{ray_box_intersection, Ray};

use crate::input::Hand;
use crate::transform;

pub type NodeId = usize;

/// What a node stands for, as far as interaction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Pure transform parent.
    Group,
    /// Anything the laser can select and the hands can manipulate.
    Prop,
    /// One block of the destructible building.
    Block,
    /// A vehicle lever handle, grabbable by the matching hand only.
    LeverHandle(Hand),
}

/// Local transform state (mutable, written by interaction code).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub dirty: bool,
}

impl TransformState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            dirty: true,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// A scene node with its transform and picking volume.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent_index: Option<NodeId>,
    pub transform: TransformState,
    /// Cached by [`transform::compute_world_transforms`]; trusted only while
    /// this node and its ancestors are clean.
    pub world_transform: Mat4,
    /// Local-space half size of the pick box.
    pub half_extents: Vec3,
    pub pickable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Flat node arena. Children refer to parents by index.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        transform: TransformState,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.into(),
            kind,
            parent_index: parent.filter(|&p| p < id),
            transform,
            world_transform: Mat4::IDENTITY,
            half_extents: Vec3::ZERO,
            pickable: false,
        });
        id
    }

    /// Give a node a pick box and make it pickable.
    pub fn make_pickable(&mut self, id: NodeId, half_extents: Vec3) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.half_extents = half_extents;
            node.pickable = true;
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        transform::world_matrix(self, id)
    }

    pub fn absolute_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    pub fn absolute_rotation(&self, id: NodeId) -> Quat {
        transform::world_rotation(self, id)
    }

    fn parent_matrix(&self, id: NodeId) -> Mat4 {
        match self.nodes.get(id).and_then(|n| n.parent_index) {
            Some(parent) => self.world_matrix(parent),
            None => Mat4::IDENTITY,
        }
    }

    fn parent_rotation(&self, id: NodeId) -> Quat {
        match self.nodes.get(id).and_then(|n| n.parent_index) {
            Some(parent) => self.absolute_rotation(parent),
            None => Quat::IDENTITY,
        }
    }

    /// Place a node at a world position and orientation. Local scale is kept.
    pub fn set_world_pose(&mut self, id: NodeId, position: Vec3, rotation: Quat) {
        if id >= self.nodes.len() {
            return;
        }
        let local_position = self.parent_matrix(id).inverse().transform_point3(position);
        let local_rotation = (self.parent_rotation(id).inverse() * rotation).normalize();
        let t = &mut self.nodes[id].transform;
        t.position = local_position;
        t.rotation = local_rotation;
        t.dirty = true;
    }

    /// Move a node by a world-space offset.
    pub fn translate_world(&mut self, id: NodeId, delta: Vec3) {
        let position = self.absolute_position(id) + delta;
        let rotation = self.absolute_rotation(id);
        self.set_world_pose(id, position, rotation);
    }

    /// Rotate a node about its own origin by a world-space rotation.
    pub fn rotate_world(&mut self, id: NodeId, rotation: Quat) {
        let position = self.absolute_position(id);
        let current = self.absolute_rotation(id);
        self.set_world_pose(id, position, (rotation * current).normalize());
    }

    /// Re-parent a node while keeping its world position and orientation.
    /// Refuses (returns false) when the new parent is the node or one of its
    /// descendants.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> bool {
        if id >= self.nodes.len() {
            return false;
        }
        if let Some(p) = parent {
            if p >= self.nodes.len() || self.is_ancestor_or_self(id, p) {
                log::warn!("refusing to parent node {id} under {p}");
                return false;
            }
        }
        let position = self.absolute_position(id);
        let rotation = self.absolute_rotation(id);
        self.nodes[id].parent_index = parent;
        self.set_world_pose(id, position, rotation);
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        for _ in 0..=self.nodes.len() {
            if node == ancestor {
                return true;
            }
            match self.nodes[node].parent_index {
                Some(p) => node = p,
                None => return false,
            }
        }
        true
    }

    /// Nearest pickable node hit by `ray` within `max_distance`.
    pub fn pick_with_ray(&self, ray: &Ray, max_distance: f32) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        for (id, node) in self.nodes.iter().enumerate() {
            if !node.pickable {
                continue;
            }
            let world = self.world_matrix(id);
            let Some(distance) = ray_box_intersection(ray, &world, node.half_extents) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(PickHit {
                    node: id,
                    distance,
                    point: ray.at(distance),
                });
            }
        }
        best
    }
}
