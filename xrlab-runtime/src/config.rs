use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("wim.scale must be in (0, 1), got {0}")]
    WimScale(f32),
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("menu.material_count must be at least 1")]
    NoMaterials,
    #[error("building.blocks_per_side must be at least 1")]
    EmptyBuilding,
}

/// Tunables for one interaction session. Every field has a default so a
/// config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub manipulation: ManipulationConfig,
    pub wim: WimConfig,
    pub vehicle: VehicleConfig,
    pub building: BuildingConfig,
    pub menu: MenuConfig,
    pub user: UserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    /// Scale of the handheld preview relative to the manipulated object.
    pub preview_scale: f32,
    /// Maximum laser pick distance in meters.
    pub laser_length: f32,
    /// Thumbstick depth movement along the laser, meters per second.
    pub depth_speed: f32,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            preview_scale: 0.1,
            laser_length: 10.0,
            depth_speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WimConfig {
    /// Miniature size relative to the world.
    pub scale: f32,
    /// Offset of the miniature root from the left grip.
    pub hand_offset: Vec3,
    /// Half the side length of the square world floor.
    pub floor_half_extent: f32,
    /// Forward thumbstick deflection that starts teleport aiming.
    pub teleport_threshold: f32,
}

impl Default for WimConfig {
    fn default() -> Self {
        Self {
            scale: 0.01,
            hand_offset: Vec3::new(0.0, 0.1, 0.0),
            floor_half_extent: 50.0,
            teleport_threshold: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub start_position: Vec3,
    pub start_yaw: f32,
    /// Where the user sits, in vehicle-local coordinates (floor level).
    pub seat_offset: Vec3,
    pub left_handle_offset: Vec3,
    pub right_handle_offset: Vec3,
    pub handle_half_extents: Vec3,
    /// Largest lever deflection in either direction.
    pub lever_limit: f32,
    /// Deflection both levers must exceed before the vehicle moves.
    pub lever_deadzone: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            start_position: Vec3::ZERO,
            start_yaw: 0.0,
            seat_offset: Vec3::new(0.0, 0.3, 0.3),
            left_handle_offset: Vec3::new(-0.2, 1.0, -0.1),
            right_handle_offset: Vec3::new(0.2, 1.0, -0.1),
            handle_half_extents: Vec3::new(0.03, 0.1, 0.03),
            lever_limit: FRAC_PI_4,
            lever_deadzone: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub origin: Vec3,
    pub vertical_scale: f32,
    pub blocks_per_side: usize,
    /// Upward force applied to every block on destruction.
    pub destroy_force: Vec3,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(-15.0, 0.65, 15.0),
            vertical_scale: 5.0,
            blocks_per_side: 5,
            destroy_force: Vec3::new(0.0, 5.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub material_count: usize,
    pub block_mass: f32,
    pub vehicle_speed: f32,
    pub turning_speed: f32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            material_count: 16,
            block_mass: 1.0,
            vehicle_speed: 3.0,
            turning_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub eye_height: f32,
    pub start_position: Vec3,
    /// Crossing this z coordinate unlocks the destroy button.
    pub goal_z: f32,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            start_position: Vec3::ZERO,
            goal_z: 5.0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let wim_scale = self.wim.scale;
        if !(wim_scale > 0.0 && wim_scale < 1.0) {
            return Err(ConfigError::WimScale(wim_scale));
        }
        positive("manipulation.preview_scale", self.manipulation.preview_scale)?;
        positive("manipulation.laser_length", self.manipulation.laser_length)?;
        non_negative("manipulation.depth_speed", self.manipulation.depth_speed)?;
        positive("wim.floor_half_extent", self.wim.floor_half_extent)?;
        positive("wim.teleport_threshold", self.wim.teleport_threshold)?;
        positive("vehicle.lever_limit", self.vehicle.lever_limit)?;
        positive("vehicle.lever_deadzone", self.vehicle.lever_deadzone)?;
        positive("building.vertical_scale", self.building.vertical_scale)?;
        non_negative("user.eye_height", self.user.eye_height)?;
        if self.building.blocks_per_side == 0 {
            return Err(ConfigError::EmptyBuilding);
        }
        if self.menu.material_count == 0 {
            return Err(ConfigError::NoMaterials);
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
