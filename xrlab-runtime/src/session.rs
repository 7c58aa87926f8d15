//! One interaction session: every piece of state the frame loop touches,
//! owned in one place and advanced by [`Session::update`].

use glam::{Quat, Vec3};
use xrlab_shared::math::{facing_from_hands, yaw_of};
use xrlab_shared::RawFrame;

use crate::bimanual::{self, BimanualInput, GuideLine, ManipulationTarget, MiniaturePreview};
use crate::building::Building;
use crate::config::{ConfigError, SessionConfig};
use crate::gestures::{hands_above_head, hands_crossed, EdgeToggle};
use crate::input::{FrameInput, Hand, InputEvent, InputState};
use crate::menu::{MenuAction, MenuEffect, MenuState, Slider};
use crate::rig::UserRig;
use crate::scene::{NodeId, NodeKind, Scene, TransformState};
use crate::selection::{depth_distance, HandSelection, PickTarget};
use crate::teleport::{commit_to_world, TeleportCandidate, TeleportCommit, TeleportState};
use crate::transform;
use crate::vehicle::{Lever, MotionChange, Vehicle, VehicleCommand};
use crate::wim::WimMapper;

/// Sounds the host should play this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    MenuEnter,
    MenuExit,
    ButtonClick,
    MaterialClick,
    VehicleMode,
    MotionStarted,
    MotionStopped,
    Explosion { position: Vec3 },
}

/// What one frame produced for the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutput {
    pub cues: Vec<AudioCue>,
    pub teleported: Option<TeleportCommit>,
    /// Host-space position of the teleport marker while aiming.
    pub teleport_marker: Option<Vec3>,
    pub preview: Option<MiniaturePreview>,
    /// Left-to-right grip line shown alongside the preview.
    pub guide_line: Option<GuideLine>,
    pub vehicle_command: VehicleCommand,
}

pub struct Session {
    config: SessionConfig,
    scene: Scene,
    input: InputState,
    left: HandSelection,
    right: HandSelection,
    manipulating: bool,
    wim: WimMapper,
    teleport: TeleportState,
    vehicle: Vehicle,
    vehicle_node: NodeId,
    handle_nodes: [NodeId; 2],
    vehicle_toggle: EdgeToggle,
    menu_toggle: EdgeToggle,
    menu: MenuState,
    building: Building,
    rig: UserRig,
    frame_count: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut scene = Scene::new();
        let menu = MenuState::new(&config.menu);

        let vehicle = Vehicle::new(&config.vehicle, menu.sliders.vehicle_speed, menu.sliders.turning_speed);
        let vehicle_node = scene.add_node(
            "vehicle",
            NodeKind::Group,
            TransformState::at(vehicle.position).with_rotation(vehicle.rotation()),
            None,
        );
        let mut handle_nodes = [0; 2];
        for (i, (hand, offset)) in [
            (Hand::Left, config.vehicle.left_handle_offset),
            (Hand::Right, config.vehicle.right_handle_offset),
        ]
        .into_iter()
        .enumerate()
        {
            let id = scene.add_node(
                format!("{}_lever", hand.label()),
                NodeKind::LeverHandle(hand),
                TransformState::at(offset),
                Some(vehicle_node),
            );
            // Pickable only while driving.
            if let Some(node) = scene.node_mut(id) {
                node.half_extents = config.vehicle.handle_half_extents;
            }
            handle_nodes[i] = id;
        }

        let building = Building::build(&mut scene, &config.building, menu.sliders.block_mass);
        transform::compute_world_transforms(&mut scene);

        let mut wim = WimMapper::new(config.wim.scale, config.wim.floor_half_extent);
        for id in std::iter::once(vehicle_node).chain(building.blocks.iter().map(|b| b.node)) {
            let scale = scene.node(id).map_or(Vec3::ONE, |n| n.transform.scale);
            wim.add_mirror(id, scene.absolute_position(id), scene.absolute_rotation(id), scale);
        }

        let rig = UserRig::standing_at(config.user.start_position, config.user.eye_height, 0.0);
        log::info!(
            "session ready: {} nodes, {} mirrored",
            scene.num_nodes(),
            wim.mirrors().len()
        );

        Ok(Self {
            config,
            scene,
            input: InputState::new(),
            left: HandSelection::new(Hand::Left),
            right: HandSelection::new(Hand::Right),
            manipulating: false,
            wim,
            teleport: TeleportState::Idle,
            vehicle,
            vehicle_node,
            handle_nodes,
            vehicle_toggle: EdgeToggle::default(),
            menu_toggle: EdgeToggle::default(),
            menu,
            building,
            rig,
            frame_count: 0,
        })
    }

    /// Add a grabbable box and its miniature counterpart.
    pub fn add_prop(&mut self, name: &str, position: Vec3, half_extents: Vec3) -> NodeId {
        let id = self
            .scene
            .add_node(name, NodeKind::Prop, TransformState::at(position), None);
        self.scene.make_pickable(id, half_extents);
        self.wim
            .add_mirror(id, position, Quat::IDENTITY, Vec3::ONE);
        transform::compute_world_transforms(&mut self.scene);
        id
    }

    pub fn push(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Queue the events hidden in a raw snapshot. Returns its `dt`.
    pub fn ingest_raw(&mut self, raw: &RawFrame) -> f32 {
        self.input.ingest_raw(raw)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rig(&self) -> &UserRig {
        &self.rig
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn building(&self) -> &Building {
        &self.building
    }

    pub fn wim(&self) -> &WimMapper {
        &self.wim
    }

    pub fn teleport_state(&self) -> &TeleportState {
        &self.teleport
    }

    pub fn selection(&self, hand: Hand) -> &HandSelection {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn is_manipulating(&self) -> bool {
        self.manipulating
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Forces queued by destruction, for the physics host.
    pub fn take_block_forces(&mut self) -> Vec<(NodeId, Vec3)> {
        self.building.take_pending_forces()
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f32) -> FrameOutput {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let frame = self.input.begin_frame(dt);
        let mut out = FrameOutput::default();

        for &action in &frame.menu_actions {
            self.apply_menu_action(action, &mut out);
        }
        for hand in Hand::BOTH {
            self.update_selection(hand, &frame);
        }
        self.update_manipulation(&frame, &mut out);
        self.update_gestures(&frame, &mut out);
        self.update_vehicle(&frame, &mut out);
        self.check_goal();
        self.update_teleport(&frame, &mut out);
        self.sync_mirrors();
        transform::compute_world_transforms(&mut self.scene);

        self.frame_count += 1;
        out
    }

    fn apply_menu_action(&mut self, action: MenuAction, out: &mut FrameOutput) {
        match self.menu.apply(action) {
            MenuEffect::Ignored => {}
            MenuEffect::PageOpened(page) | MenuEffect::PageClosed(page) => {
                log::debug!("menu page '{}' toggled", page.label());
                out.cues.push(AudioCue::ButtonClick);
            }
            MenuEffect::DestroyLocked => {
                log::debug!("destroy pressed before reaching the goal");
            }
            MenuEffect::DestroyRequested => {
                let position = self.building.destroy(&self.scene, self.menu.sliders.block_mass);
                out.cues.push(AudioCue::Explosion { position });
            }
            MenuEffect::MaterialChanged(index) => {
                self.building.set_material(index);
                out.cues.push(AudioCue::MaterialClick);
            }
            MenuEffect::SliderChanged(slider, value) => match slider {
                Slider::VehicleSpeed => self.vehicle.speed = value,
                Slider::TurningSpeed => self.vehicle.turning_speed = value,
                // Block mass is read when the building is destroyed.
                Slider::BlockMass => {}
            },
        }
    }

    fn update_selection(&mut self, hand: Hand, frame: &FrameInput) {
        let sample = *frame.controller(hand);
        let selection = match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        };
        // The menu takes over the left laser while it is shown.
        let laser_enabled = !(hand == Hand::Left && self.menu.active);

        if sample.trigger.just_pressed && sample.connected && laser_enabled {
            let target = selection.press(&self.scene, &sample.pointer, self.config.manipulation.laser_length);
            if let PickTarget::Lever(owner) = target {
                self.vehicle
                    .lever_mut(owner)
                    .grab(frame.head.to_local(sample.grip.current));
            }
        }
        if sample.trigger.just_released && selection.release() {
            self.vehicle.lever_mut(hand).release();
            tilt_handle(&mut self.scene, self.handle_nodes[slot(hand)], self.vehicle.lever(hand));
        }

        let depth = if sample.trigger.pressed {
            depth_distance(sample.thumbstick.y, frame.dt, self.config.manipulation.depth_speed)
        } else {
            0.0
        };
        selection.follow(&mut self.scene, &sample.pointer, depth);
    }

    fn update_manipulation(&mut self, frame: &FrameInput, out: &mut FrameOutput) {
        let target = self.right.selected;
        let held = frame.right.squeeze.pressed && frame.both_connected() && target.is_some();

        if !held {
            if self.manipulating {
                log::debug!("bimanual manipulation ended");
                self.manipulating = false;
                self.right.recapture(&self.scene, &frame.right.pointer);
            }
            return;
        }
        let Some(node) = target else {
            return;
        };
        if !self.manipulating {
            log::debug!("bimanual manipulation started");
            self.manipulating = true;
            self.right.suspend();
        }

        let delta = bimanual::solve(&BimanualInput {
            left: frame.left.grip,
            right: frame.right.grip,
            right_grip_held: true,
            left_grip_held: frame.left.squeeze.pressed,
        });
        let scale = self.scene.node(node).map_or(Vec3::ONE, |n| n.transform.scale);
        let mut manipulated = ManipulationTarget::new(
            self.scene.absolute_position(node),
            self.scene.absolute_rotation(node),
            scale,
        );
        manipulated.apply(&delta);
        self.scene
            .set_world_pose(node, manipulated.position, manipulated.rotation);
        if let Some(n) = self.scene.node_mut(node) {
            n.transform.scale = manipulated.scale;
            n.transform.dirty = true;
        }

        out.preview = Some(MiniaturePreview::follow(
            &manipulated,
            frame.left.grip.current,
            frame.right.grip.current,
            self.config.manipulation.preview_scale,
        ));
        out.guide_line = Some(GuideLine::between(frame.left.grip.current, frame.right.grip.current));
    }

    fn update_gestures(&mut self, frame: &FrameInput, out: &mut FrameOutput) {
        let connected = frame.both_connected();
        let left = frame.left.grip.current;
        let right = frame.right.grip.current;

        let raised = connected && hands_above_head(&frame.head, left, right);
        if self.vehicle_toggle.update(raised) {
            if self.vehicle.active {
                self.exit_vehicle(out);
            } else {
                self.enter_vehicle(out);
            }
        }

        let crossed = connected && hands_crossed(&frame.head, left, right);
        if self.menu_toggle.update(crossed) {
            if self.menu.active {
                self.menu.disable();
                log::info!("menu hidden");
                out.cues.push(AudioCue::MenuExit);
            } else {
                self.menu.activate();
                self.left.release();
                log::info!("menu shown");
                out.cues.push(AudioCue::MenuEnter);
            }
        }
    }

    fn enter_vehicle(&mut self, out: &mut FrameOutput) {
        self.vehicle.enter();
        self.set_levers_pickable(true);
        self.teleport.cancel();
        self.rig.position = self.vehicle.seat_position() + Vec3::Y * self.config.user.eye_height;
        log::info!("entered vehicle at {}", self.vehicle.position);
        out.cues.push(AudioCue::VehicleMode);
    }

    fn exit_vehicle(&mut self, out: &mut FrameOutput) {
        if self.vehicle.exit() == Some(MotionChange::Stopped) {
            out.cues.push(AudioCue::MotionStopped);
        }
        self.set_levers_pickable(false);
        for hand in Hand::BOTH {
            let selection = match hand {
                Hand::Left => &mut self.left,
                Hand::Right => &mut self.right,
            };
            if selection.grabbing_lever {
                selection.release();
            }
            tilt_handle(&mut self.scene, self.handle_nodes[slot(hand)], self.vehicle.lever(hand));
        }
        self.rig.position.y = self.config.user.eye_height;
        log::info!("left vehicle");
    }

    fn set_levers_pickable(&mut self, pickable: bool) {
        for id in self.handle_nodes {
            if let Some(node) = self.scene.node_mut(id) {
                node.pickable = pickable;
            }
        }
    }

    fn update_vehicle(&mut self, frame: &FrameInput, out: &mut FrameOutput) {
        if !self.vehicle.active {
            return;
        }
        let limit = self.config.vehicle.lever_limit;
        for hand in Hand::BOTH {
            let local = frame.head.to_local(frame.controller(hand).grip.current);
            self.vehicle.lever_mut(hand).update(local, limit);
            tilt_handle(&mut self.scene, self.handle_nodes[slot(hand)], self.vehicle.lever(hand));
        }

        let command = self.vehicle.command(self.config.vehicle.lever_deadzone);
        let yaw_before = self.vehicle.yaw;
        match self.vehicle.drive(command, frame.dt) {
            Some(MotionChange::Started) => out.cues.push(AudioCue::MotionStarted),
            Some(MotionChange::Stopped) => out.cues.push(AudioCue::MotionStopped),
            None => {}
        }
        out.vehicle_command = command;

        self.scene
            .set_world_pose(self.vehicle_node, self.vehicle.position, self.vehicle.rotation());
        self.rig.position = self.vehicle.seat_position() + Vec3::Y * self.config.user.eye_height;
        self.rig.yaw += self.vehicle.yaw - yaw_before;
    }

    fn check_goal(&mut self) {
        if !self.menu.destruction_unlocked && self.rig.position.z > self.config.user.goal_z {
            self.menu.destruction_unlocked = true;
            log::info!("goal reached, destruction unlocked");
        }
    }

    fn update_teleport(&mut self, frame: &FrameInput, out: &mut FrameOutput) {
        if frame.left.connected {
            let yaw = yaw_of(frame.left.pointer.direction).unwrap_or(0.0);
            self.wim.set_root_pose(
                frame.left.grip.current + self.config.wim.hand_offset,
                Quat::from_rotation_y(yaw),
            );
        }

        // A gate dropping cancels the aim; only the stick itself commits.
        let allowed = frame.both_connected() && !self.vehicle.active && self.right.attachment.is_none();
        if !allowed {
            if self.teleport.candidate().is_some() {
                log::debug!("teleport aim cancelled");
            }
            self.teleport.cancel();
            return;
        }

        let steering = frame.right.thumbstick.y < -self.config.wim.teleport_threshold;
        let hit = if steering {
            self.wim.pick_floor(&frame.right.pointer).map(|point| TeleportCandidate {
                point,
                yaw: facing_from_hands(frame.left.grip.current, frame.right.grip.current)
                    .unwrap_or(self.rig.yaw),
            })
        } else {
            None
        };

        if let Some(candidate) = self.teleport.update(steering, hit) {
            let commit = commit_to_world(&candidate, self.wim.scale(), self.config.user.eye_height);
            log::info!("teleported to {} facing {:.2}", commit.position, commit.yaw);
            self.rig.position = commit.position;
            self.rig.yaw = commit.yaw;
            out.teleported = Some(commit);
        }
        out.teleport_marker = self
            .teleport
            .candidate()
            .map(|c| self.wim.miniature_to_host(c.point));
    }

    fn sync_mirrors(&mut self) {
        for id in [self.left.selected, self.right.selected, Some(self.vehicle_node)]
            .into_iter()
            .flatten()
        {
            let position = self.scene.absolute_position(id);
            let rotation = self.scene.absolute_rotation(id);
            self.wim.sync_mirror(id, position, rotation);
        }
    }
}

fn slot(hand: Hand) -> usize {
    match hand {
        Hand::Left => 0,
        Hand::Right => 1,
    }
}

fn tilt_handle(scene: &mut Scene, handle: NodeId, lever: &Lever) {
    if let Some(node) = scene.node_mut(handle) {
        node.transform.rotation = lever.tilt();
        node.transform.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuButton;
    use std::f32::consts::FRAC_PI_2;

    const TOLERANCE: f32 = 1e-4;
    const DT: f32 = 0.016;

    fn session() -> Session {
        Session::new(SessionConfig::default()).unwrap()
    }

    fn connect(s: &mut Session) {
        s.push(InputEvent::ControllerConnected { hand: Hand::Left });
        s.push(InputEvent::ControllerConnected { hand: Hand::Right });
    }

    fn pose(s: &mut Session, hand: Hand, grip: Vec3, direction: Vec3) {
        s.push(InputEvent::PoseUpdated {
            hand,
            grip,
            pointer_origin: grip,
            pointer_direction: direction,
        });
    }

    /// Both hands low and apart, pointing forward.
    fn rest_hands(s: &mut Session) {
        pose(s, Hand::Left, Vec3::new(-0.3, 1.0, -0.3), Vec3::NEG_Z);
        pose(s, Hand::Right, Vec3::new(0.3, 1.0, -0.3), Vec3::NEG_Z);
    }

    fn ready_session() -> Session {
        let mut s = session();
        connect(&mut s);
        rest_hands(&mut s);
        s.update(DT);
        s
    }

    // ── construction ──

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SessionConfig::default();
        config.wim.scale = 2.0;
        assert!(matches!(Session::new(config), Err(ConfigError::WimScale(_))));
    }

    #[test]
    fn test_building_and_vehicle_are_mirrored() {
        let s = session();
        assert_eq!(s.wim().mirrors().len(), 126);
        assert_eq!(s.rig().position, Vec3::new(0.0, 1.6, 0.0));
    }

    // ── selection and manipulation ──

    #[test]
    fn test_trigger_selects_prop_and_depth_moves_it() {
        let mut s = ready_session();
        let prop = s.add_prop("crate", Vec3::new(0.3, 1.0, -3.0), Vec3::splat(0.25));

        s.push(InputEvent::TriggerPressed { hand: Hand::Right });
        s.update(DT);
        assert_eq!(s.selection(Hand::Right).selected, Some(prop));

        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: -0.5 });
        s.update(0.5);
        let p = s.scene().absolute_position(prop);
        assert!(p.abs_diff_eq(Vec3::new(0.3, 1.0, -3.75), TOLERANCE), "p={p}");
        let mirrored = s.wim().mirror(prop).unwrap().local_position;
        assert!(mirrored.abs_diff_eq(p, TOLERANCE));
    }

    #[test]
    fn test_bimanual_translates_selected_prop() {
        let mut s = ready_session();
        let prop = s.add_prop("crate", Vec3::new(0.3, 1.0, -3.0), Vec3::splat(0.25));
        s.push(InputEvent::TriggerPressed { hand: Hand::Right });
        s.update(DT);
        s.push(InputEvent::TriggerReleased { hand: Hand::Right });
        s.push(InputEvent::SqueezePressed { hand: Hand::Right });
        s.update(DT);
        assert!(s.is_manipulating());

        pose(&mut s, Hand::Left, Vec3::new(-0.3, 1.2, -0.3), Vec3::NEG_Z);
        pose(&mut s, Hand::Right, Vec3::new(0.3, 1.2, -0.3), Vec3::NEG_Z);
        let out = s.update(DT);
        let p = s.scene().absolute_position(prop);
        assert!(p.abs_diff_eq(Vec3::new(0.3, 1.2, -3.0), TOLERANCE), "p={p}");
        let preview = out.preview.unwrap();
        assert!(preview.position.abs_diff_eq(Vec3::new(0.0, 1.2, -0.3), TOLERANCE));
        assert!(preview.scale.abs_diff_eq(Vec3::splat(0.1), TOLERANCE));
        let line = out.guide_line.unwrap();
        assert_eq!(line.start, Vec3::new(-0.3, 1.2, -0.3));
        assert!((line.length() - 0.6).abs() < TOLERANCE);

        s.push(InputEvent::SqueezeReleased { hand: Hand::Right });
        let out = s.update(DT);
        assert!(!s.is_manipulating());
        assert!(out.preview.is_none());
        assert!(out.guide_line.is_none());
    }

    #[test]
    fn test_bimanual_scale_with_both_grips() {
        let mut s = ready_session();
        let prop = s.add_prop("crate", Vec3::new(0.3, 1.0, -3.0), Vec3::splat(0.25));
        s.push(InputEvent::TriggerPressed { hand: Hand::Right });
        s.push(InputEvent::TriggerReleased { hand: Hand::Right });
        s.push(InputEvent::SqueezePressed { hand: Hand::Right });
        s.push(InputEvent::SqueezePressed { hand: Hand::Left });
        s.update(DT);

        pose(&mut s, Hand::Left, Vec3::new(-0.6, 1.0, -0.3), Vec3::NEG_Z);
        pose(&mut s, Hand::Right, Vec3::new(0.6, 1.0, -0.3), Vec3::NEG_Z);
        s.update(DT);
        let scale = s.scene().node(prop).unwrap().transform.scale;
        assert!(scale.abs_diff_eq(Vec3::splat(2.0), TOLERANCE), "scale={scale}");
    }

    #[test]
    fn test_reconnected_hand_does_not_jump_the_target() {
        let mut s = ready_session();
        let prop = s.add_prop("crate", Vec3::new(0.3, 1.0, -3.0), Vec3::splat(0.25));
        s.push(InputEvent::TriggerPressed { hand: Hand::Right });
        s.push(InputEvent::TriggerReleased { hand: Hand::Right });
        s.update(DT);
        s.push(InputEvent::ControllerDisconnected { hand: Hand::Left });
        s.update(DT);

        // Back two metres to the left, grabbing in the same frame
        s.push(InputEvent::ControllerConnected { hand: Hand::Left });
        pose(&mut s, Hand::Left, Vec3::new(-2.3, 1.0, -0.3), Vec3::NEG_Z);
        s.push(InputEvent::SqueezePressed { hand: Hand::Right });
        s.update(DT);
        assert!(s.is_manipulating());
        let p = s.scene().absolute_position(prop);
        assert!(p.abs_diff_eq(Vec3::new(0.3, 1.0, -3.0), TOLERANCE), "p={p}");

        pose(&mut s, Hand::Left, Vec3::new(-2.1, 1.0, -0.3), Vec3::NEG_Z);
        s.update(DT);
        let p = s.scene().absolute_position(prop);
        assert!(p.abs_diff_eq(Vec3::new(0.4, 1.0, -3.0), TOLERANCE), "p={p}");
    }

    // ── gestures ──

    #[test]
    fn test_crossed_hands_toggle_menu_once() {
        let mut s = ready_session();
        pose(&mut s, Hand::Left, Vec3::new(0.2, 1.0, -0.3), Vec3::NEG_Z);
        pose(&mut s, Hand::Right, Vec3::new(-0.2, 1.0, -0.3), Vec3::NEG_Z);
        let out = s.update(DT);
        assert!(s.menu().active);
        assert_eq!(out.cues, vec![AudioCue::MenuEnter]);

        let out = s.update(DT);
        assert!(s.menu().active);
        assert!(out.cues.is_empty());

        rest_hands(&mut s);
        s.update(DT);
        pose(&mut s, Hand::Left, Vec3::new(0.2, 1.0, -0.3), Vec3::NEG_Z);
        pose(&mut s, Hand::Right, Vec3::new(-0.2, 1.0, -0.3), Vec3::NEG_Z);
        let out = s.update(DT);
        assert!(!s.menu().active);
        assert_eq!(out.cues, vec![AudioCue::MenuExit]);
    }

    #[test]
    fn test_raised_hands_enter_vehicle() {
        let mut s = ready_session();
        pose(&mut s, Hand::Left, Vec3::new(-0.3, 1.8, -0.3), Vec3::NEG_Z);
        pose(&mut s, Hand::Right, Vec3::new(0.3, 1.8, -0.3), Vec3::NEG_Z);
        let out = s.update(DT);
        assert!(s.vehicle().active);
        assert!(out.cues.contains(&AudioCue::VehicleMode));
        let seat = s.vehicle().seat_position();
        assert!(s.rig().position.abs_diff_eq(seat + Vec3::Y * 1.6, TOLERANCE));
    }

    // ── menu ──

    #[test]
    fn test_destroy_after_goal() {
        let mut s = ready_session();
        s.menu.activate();
        s.push(InputEvent::MenuButtonPressed { button: MenuButton::Destroy });
        let out = s.update(DT);
        assert!(out.cues.is_empty());
        assert!(s.building().blocks.iter().all(|b| !b.awake));

        s.rig.position.z = 6.0;
        s.update(DT);
        assert!(s.menu().destruction_unlocked);
        s.push(InputEvent::MenuButtonPressed { button: MenuButton::Destroy });
        let out = s.update(DT);
        assert!(matches!(out.cues.as_slice(), [AudioCue::Explosion { .. }]));
        assert_eq!(s.take_block_forces().len(), 125);
    }

    #[test]
    fn test_speed_slider_reaches_vehicle() {
        let mut s = ready_session();
        s.menu.activate();
        s.push(InputEvent::MenuButtonPressed { button: MenuButton::Physics });
        s.push(InputEvent::SliderChanged { slider: Slider::VehicleSpeed, value: 7.0 });
        let out = s.update(DT);
        assert_eq!(s.vehicle().speed, 7.0);
        assert_eq!(out.cues, vec![AudioCue::ButtonClick]);
    }

    // ── teleport ──

    /// Point the right laser straight down at miniature (0.1, 0, 0.2), i.e.
    /// world (10, 0, 20), with the stick at `stick_y`. Returns the host-space
    /// aim point and the frame's output.
    fn aim_into_miniature(s: &mut Session, stick_y: f32) -> (Vec3, FrameOutput) {
        // Miniature root sits 10 cm above the left grip, facing -Z
        let root = Vec3::new(-0.3, 1.1, -0.3);
        let aim_at = root + Vec3::new(0.1, 0.0, 0.2);
        pose(s, Hand::Right, aim_at + Vec3::Y * 0.2, Vec3::NEG_Y);
        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: stick_y });
        let out = s.update(DT);
        (aim_at, out)
    }

    #[test]
    fn test_teleport_through_miniature() {
        let mut s = ready_session();
        let (aim_at, out) = aim_into_miniature(&mut s, -1.0);
        assert!(matches!(s.teleport_state(), TeleportState::Aiming(_)));
        assert!(out.teleport_marker.unwrap().abs_diff_eq(aim_at, TOLERANCE));

        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: 0.0 });
        let out = s.update(DT);
        let commit = out.teleported.unwrap();
        assert!(commit.position.abs_diff_eq(Vec3::new(10.0, 1.6, 20.0), 1e-2), "{:?}", commit);
        assert_eq!(s.rig().position, commit.position);

        // Landed past the goal plane
        s.update(DT);
        assert!(s.menu().destruction_unlocked);
    }

    #[test]
    fn test_teleport_release_without_hit_stays_put() {
        let mut s = ready_session();
        // Level with nothing below the miniature floor
        pose(&mut s, Hand::Right, Vec3::new(0.3, 1.0, -0.3), Vec3::Z);
        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: -1.0 });
        s.update(DT);
        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: 0.0 });
        let out = s.update(DT);
        assert!(out.teleported.is_none());
        assert_eq!(s.rig().position, Vec3::new(0.0, 1.6, 0.0));
    }

    #[test]
    fn test_stick_below_threshold_never_aims() {
        let mut s = ready_session();
        let (_, out) = aim_into_miniature(&mut s, -0.5);
        assert_eq!(*s.teleport_state(), TeleportState::Idle);
        assert!(out.teleport_marker.is_none());

        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: 0.0 });
        let out = s.update(DT);
        assert!(out.teleported.is_none());
        assert_eq!(s.rig().position, Vec3::new(0.0, 1.6, 0.0));
    }

    #[test]
    fn test_grabbing_with_right_laser_cancels_aim() {
        let mut s = ready_session();
        // Something under the right laser, below the miniature
        let prop = s.add_prop("crate", Vec3::new(-0.2, 0.5, -0.1), Vec3::splat(0.1));
        aim_into_miniature(&mut s, -1.0);
        assert!(matches!(s.teleport_state(), TeleportState::Aiming(_)));

        // Stick still held
        s.push(InputEvent::TriggerPressed { hand: Hand::Right });
        let out = s.update(DT);
        assert_eq!(s.selection(Hand::Right).selected, Some(prop));
        assert!(out.teleported.is_none());
        assert!(out.teleport_marker.is_none());
        assert_eq!(*s.teleport_state(), TeleportState::Idle);

        let out = s.update(DT);
        assert!(out.teleported.is_none());
        assert_eq!(s.rig().position, Vec3::new(0.0, 1.6, 0.0));
    }

    #[test]
    fn test_disconnect_while_aiming_cancels() {
        let mut s = ready_session();
        aim_into_miniature(&mut s, -1.0);
        assert!(matches!(s.teleport_state(), TeleportState::Aiming(_)));

        s.push(InputEvent::ControllerDisconnected { hand: Hand::Left });
        let out = s.update(DT);
        assert!(out.teleported.is_none());
        assert_eq!(*s.teleport_state(), TeleportState::Idle);
        assert_eq!(s.rig().position, Vec3::new(0.0, 1.6, 0.0));
    }

    #[test]
    fn test_teleport_yaw_from_hands() {
        let mut s = ready_session();
        let root = Vec3::new(0.0, 1.1, 0.3);
        pose(&mut s, Hand::Left, Vec3::new(0.0, 1.0, 0.3), Vec3::NEG_Z);
        pose(&mut s, Hand::Right, root + Vec3::new(0.0, 0.2, -0.3), Vec3::new(0.0, -0.2, 0.3));
        s.push(InputEvent::AxisChanged { hand: Hand::Right, x: 0.0, y: -1.0 });
        s.update(DT);
        let candidate = *s.teleport_state().candidate().unwrap();
        // Left hand behind the right one: the user faces -X
        assert!((candidate.yaw - FRAC_PI_2).abs() < TOLERANCE, "yaw={}", candidate.yaw);
    }
}
