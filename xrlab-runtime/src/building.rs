//! The destructible block building.

use glam::Vec3;

use crate::config::BuildingConfig;
use crate::scene::{NodeId, NodeKind, Scene, TransformState};

/// Physics state of one block. Bodies sleep until the building is destroyed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockBody {
    pub node: NodeId,
    pub mass: f32,
    pub awake: bool,
    /// Force to hand to the physics host on its next step.
    pub pending_force: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub root: NodeId,
    pub blocks: Vec<BlockBody>,
    pub material: usize,
    destroy_force: Vec3,
}

impl Building {
    /// Lay out `n * n * n` unit blocks under a root that stretches them
    /// vertically.
    pub fn build(scene: &mut Scene, config: &BuildingConfig, mass: f32) -> Self {
        let root = scene.add_node(
            "building",
            NodeKind::Group,
            TransformState::at(config.origin).with_scale(Vec3::new(1.0, config.vertical_scale, 1.0)),
            None,
        );
        let n = config.blocks_per_side;
        let mut blocks = Vec::with_capacity(n * n * n);
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    let local = Vec3::new(x as f32, y as f32 + 0.5, z as f32);
                    let node = scene.add_node(
                        format!("block_{x}_{y}_{z}"),
                        NodeKind::Block,
                        TransformState::at(local),
                        Some(root),
                    );
                    blocks.push(BlockBody {
                        node,
                        mass,
                        awake: false,
                        pending_force: None,
                    });
                }
            }
        }
        log::debug!("built {} blocks at {}", blocks.len(), config.origin);
        Self {
            root,
            blocks,
            material: 0,
            destroy_force: config.destroy_force,
        }
    }

    pub fn set_material(&mut self, index: usize) {
        self.material = index;
    }

    /// Wake every block with the given mass and queue the upward push.
    /// Returns the building's world position for the explosion cue.
    pub fn destroy(&mut self, scene: &Scene, mass: f32) -> Vec3 {
        for block in &mut self.blocks {
            block.mass = mass;
            block.awake = true;
            block.pending_force = Some(self.destroy_force);
        }
        log::info!("building destroyed ({} blocks, mass {mass})", self.blocks.len());
        scene.absolute_position(self.root)
    }

    /// Drain forces queued since the last call.
    pub fn take_pending_forces(&mut self) -> Vec<(NodeId, Vec3)> {
        self.blocks
            .iter_mut()
            .filter_map(|b| b.pending_force.take().map(|f| (b.node, f)))
            .collect()
    }
}
