//! World-in-Miniature mapping.
//!
//! The miniature hangs off a single root. Children of the root keep the
//! absolute world coordinates of their sources; the root applies the uniform
//! scale, so a world point `p` sits at `scale * p` in miniature space and at
//! `root_position + root_rotation * (scale * p)` in the host scene.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use xrlab_shared::math::{ray_plane_intersection, Ray};

use crate::scene::NodeId;

/// Miniature counterpart of one world node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorEntry {
    pub source: NodeId,
    /// Source's absolute position when the mirror was created.
    pub recorded_position: Vec3,
    /// Position under the miniature root, in unscaled world units.
    pub local_position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

#[derive(Debug, Clone)]
pub struct WimMapper {
    scale: f32,
    floor_half_extent: f32,
    root_position: Vec3,
    root_rotation: Quat,
    mirrors: Vec<MirrorEntry>,
    by_source: HashMap<NodeId, usize>,
}

impl WimMapper {
    /// `scale` must be in (0, 1); config validation enforces it.
    pub fn new(scale: f32, floor_half_extent: f32) -> Self {
        Self {
            scale,
            floor_half_extent,
            root_position: Vec3::ZERO,
            root_rotation: Quat::IDENTITY,
            mirrors: Vec::new(),
            by_source: HashMap::new(),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn root_position(&self) -> Vec3 {
        self.root_position
    }

    pub fn set_root_pose(&mut self, position: Vec3, rotation: Quat) {
        self.root_position = position;
        self.root_rotation = rotation.normalize();
    }

    pub fn world_to_miniature(&self, world: Vec3) -> Vec3 {
        world * self.scale
    }

    pub fn miniature_to_world(&self, miniature: Vec3) -> Vec3 {
        miniature / self.scale
    }

    /// Where a miniature-space point is drawn in the host scene.
    pub fn miniature_to_host(&self, miniature: Vec3) -> Vec3 {
        self.root_position + self.root_rotation * miniature
    }

    pub fn host_to_miniature(&self, host: Vec3) -> Vec3 {
        self.root_rotation.inverse() * (host - self.root_position)
    }

    /// Create the miniature counterpart of `source`. Mirrors are created once;
    /// a second call for the same source returns the existing entry's index.
    pub fn add_mirror(&mut self, source: NodeId, world_position: Vec3, rotation: Quat, scale: Vec3) -> usize {
        if let Some(&index) = self.by_source.get(&source) {
            return index;
        }
        let index = self.mirrors.len();
        self.mirrors.push(MirrorEntry {
            source,
            recorded_position: world_position,
            local_position: world_position,
            rotation,
            scale,
        });
        self.by_source.insert(source, index);
        index
    }

    pub fn mirror(&self, source: NodeId) -> Option<&MirrorEntry> {
        self.by_source.get(&source).map(|&i| &self.mirrors[i])
    }

    pub fn mirrors(&self) -> &[MirrorEntry] {
        &self.mirrors
    }

    /// Copy a source's live absolute pose into its miniature counterpart.
    /// Returns false when the source has no mirror.
    pub fn sync_mirror(&mut self, source: NodeId, position: Vec3, rotation: Quat) -> bool {
        let Some(&index) = self.by_source.get(&source) else {
            return false;
        };
        let entry = &mut self.mirrors[index];
        entry.local_position = position;
        entry.rotation = rotation;
        true
    }

    /// Host-scene position of a mirrored object.
    pub fn mirrored_host_position(&self, source: NodeId) -> Option<Vec3> {
        self.mirror(source)
            .map(|m| self.miniature_to_host(self.world_to_miniature(m.local_position)))
    }

    /// Cast a host-space ray at the miniature floor. Returns the hit in
    /// miniature space.
    pub fn pick_floor(&self, ray: &Ray) -> Option<Vec3> {
        let local = Ray::new(
            self.host_to_miniature(ray.origin),
            self.root_rotation.inverse() * ray.direction,
        );
        let t = ray_plane_intersection(&local, Vec3::ZERO, Vec3::Y)?;
        let hit = local.at(t);
        let half = self.floor_half_extent * self.scale;
        if hit.x.abs() > half || hit.z.abs() > half {
            return None;
        }
        Some(Vec3::new(hit.x, 0.0, hit.z))
    }
}
