use glam::{Mat4, Quat, Vec3};

use crate::scene::{NodeId, Scene};

/// Refresh the cached world matrix of every node and clear the dirty flags.
/// Parents are resolved before children; a no-op when nothing moved.
pub fn compute_world_transforms(scene: &mut Scene) {
    if !scene.nodes.iter().any(|n| n.transform.dirty) {
        return;
    }
    let mut worlds: Vec<Mat4> = Vec::with_capacity(scene.nodes.len());
    for (i, node) in scene.nodes.iter().enumerate() {
        let t = &node.transform;
        let local = compose_local_transform(t.position, t.rotation, t.scale);
        let world = match node.parent_index {
            Some(p) if p < i => worlds[p] * local,
            // Re-parented under a later node: walk the chain instead.
            Some(_) => chain_matrix(scene, i),
            None => local,
        };
        worlds.push(world);
    }
    for (node, world) in scene.nodes.iter_mut().zip(worlds) {
        node.world_transform = world;
        node.transform.dirty = false;
    }
}

/// World matrix of one node. Served from the cache unless the node or one
/// of its ancestors changed since the last [`compute_world_transforms`].
pub fn world_matrix(scene: &Scene, id: NodeId) -> Mat4 {
    let Some(node) = scene.nodes.get(id) else {
        return Mat4::IDENTITY;
    };
    if chain_is_clean(scene, id) {
        node.world_transform
    } else {
        chain_matrix(scene, id)
    }
}

fn chain_is_clean(scene: &Scene, id: NodeId) -> bool {
    let n = scene.nodes.len();
    let mut current = Some(id);
    let mut steps = 0;
    while let Some(i) = current {
        if i >= n || steps > n {
            return false;
        }
        if scene.nodes[i].transform.dirty {
            return false;
        }
        current = scene.nodes[i].parent_index;
        steps += 1;
    }
    true
}

/// Compose parent * local up the chain from the current local transforms.
fn chain_matrix(scene: &Scene, id: NodeId) -> Mat4 {
    let n = scene.nodes.len();
    let mut world = Mat4::IDENTITY;
    let mut current = Some(id);
    // A chain longer than the node count means a cycle; stop there.
    let mut steps = 0;
    while let Some(i) = current {
        if i >= n || steps > n {
            break;
        }
        let t = &scene.nodes[i].transform;
        world = compose_local_transform(t.position, t.rotation, t.scale) * world;
        current = scene.nodes[i].parent_index;
        steps += 1;
    }
    world
}

/// Orientation of one node in world space, ignoring scale.
pub fn world_rotation(scene: &Scene, id: NodeId) -> Quat {
    let n = scene.nodes.len();
    let mut rotation = Quat::IDENTITY;
    let mut current = Some(id);
    let mut steps = 0;
    while let Some(i) = current {
        if i >= n || steps > n {
            break;
        }
        rotation = scene.nodes[i].transform.rotation * rotation;
        current = scene.nodes[i].parent_index;
        steps += 1;
    }
    rotation.normalize()
}

/// Compose a local transform matrix from position, rotation, and scale.
pub fn compose_local_transform(position: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}
