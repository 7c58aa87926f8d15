use glam::{Mat4, Quat, Vec3};

/// Lengths at or below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Midpoint of two points.
pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

/// `acos` with its argument clamped into [-1, 1].
///
/// Dot products of unit vectors drift slightly outside that range under
/// floating-point rounding, where `acos` would return NaN.
pub fn clamped_acos(cos: f32) -> f32 {
    cos.clamp(-1.0, 1.0).acos()
}

/// Normalize `v`, or `None` when it is too short to have a direction.
pub fn normalize_or_none(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    if len > EPSILON && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Axis and angle of the shortest rotation carrying direction `from` onto `to`.
///
/// Returns `None` when either input has no direction or when the two are
/// parallel (anti-parallel included), since no unique axis exists.
pub fn rotation_between(from: Vec3, to: Vec3) -> Option<(Vec3, f32)> {
    let from = normalize_or_none(from)?;
    let to = normalize_or_none(to)?;
    let angle = clamped_acos(from.dot(to));
    let axis = normalize_or_none(from.cross(to))?;
    Some((axis, angle))
}

/// Yaw (rotation about +Y) that turns the default forward (-Z) onto `forward`.
/// Only the horizontal part of `forward` is used.
pub fn yaw_of(forward: Vec3) -> Option<f32> {
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    let flat = normalize_or_none(flat)?;
    Some((-flat.x).atan2(-flat.z))
}

/// Horizontal forward direction for a yaw angle. Inverse of [`yaw_of`].
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Yaw component of an orientation.
pub fn yaw_of_rotation(rotation: Quat) -> f32 {
    yaw_of(rotation * Vec3::NEG_Z).unwrap_or(0.0)
}

/// Facing yaw for a pair of hands: the direction perpendicular to the
/// left-to-right vector on the horizontal plane.
pub fn facing_from_hands(left: Vec3, right: Vec3) -> Option<f32> {
    yaw_of(Vec3::Y.cross(right - left))
}

/// A half-line in 3D space with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray expressed in another frame.
    pub fn transformed(&self, m: &Mat4) -> Ray {
        let origin = m.transform_point3(self.origin);
        let end = m.transform_point3(self.at(1.0));
        Ray::new(origin, end - origin)
    }
}

/// Ray-plane intersection. Returns the ray parameter of the hit, if in front.
pub fn ray_plane_intersection(ray: &Ray, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None; // Parallel to the plane
    }
    let t = (point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        None
    } else {
        Some(t)
    }
}

/// Ray vs. an oriented box given by its world matrix and local half extents.
/// Returns the world-space distance to the nearest hit in front of the ray.
pub fn ray_box_intersection(ray: &Ray, world: &Mat4, half_extents: Vec3) -> Option<f32> {
    if world.determinant().abs() < 1e-12 {
        return None;
    }
    let local = ray.transformed(&world.inverse());
    if local.direction == Vec3::ZERO {
        return None;
    }

    // Slab test
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let o = local.origin[axis];
        let d = local.direction[axis];
        let h = half_extents[axis];
        if d.abs() < 1e-8 {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None; // Box entirely behind the ray
    }
    let t_local = if t_min >= 0.0 { t_min } else { 0.0 };

    // Local parameters are in scaled units; measure the hit in world space.
    let world_hit = world.transform_point3(local.at(t_local));
    Some((world_hit - ray.origin).length())
}
