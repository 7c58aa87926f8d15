use std::collections::VecDeque;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use xrlab_shared::math::Ray;
use xrlab_shared::snapshot::{BUTTON_SQUEEZE, BUTTON_TRIGGER};
use xrlab_shared::{RawControllerPose, RawFrame};

use crate::menu::{MenuAction, MenuButton, Slider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Discrete input delivered by the host. Queued and drained once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    ControllerConnected { hand: Hand },
    ControllerDisconnected { hand: Hand },
    TriggerPressed { hand: Hand },
    TriggerReleased { hand: Hand },
    SqueezePressed { hand: Hand },
    SqueezeReleased { hand: Hand },
    AxisChanged { hand: Hand, x: f32, y: f32 },
    PoseUpdated {
        hand: Hand,
        grip: Vec3,
        pointer_origin: Vec3,
        pointer_direction: Vec3,
    },
    HeadUpdated { position: Vec3, rotation: Quat },
    MenuButtonPressed { button: MenuButton },
    MaterialSelected { index: usize },
    SliderChanged { slider: Slider, value: f32 },
}

/// Headset pose in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 0.0),
            rotation: Quat::IDENTITY,
        }
    }
}

impl HeadPose {
    /// Express a world point in the head's frame (x right, y up, -z forward).
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }
}

/// A position sample that remembers the previous frame's value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedPoint {
    pub current: Vec3,
    pub previous: Vec3,
}

impl TrackedPoint {
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            current: position,
            previous: position,
        }
    }

    pub fn delta(&self) -> Vec3 {
        self.current - self.previous
    }
}

/// Held state plus the edges seen since the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub pressed: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

/// One controller as seen by a single frame's update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSample {
    pub connected: bool,
    pub grip: TrackedPoint,
    pub pointer: Ray,
    pub trigger: ButtonState,
    pub squeeze: ButtonState,
    pub thumbstick: Vec2,
}

/// Immutable per-frame snapshot of everything the host reported.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    pub dt: f32,
    pub head: HeadPose,
    pub left: ControllerSample,
    pub right: ControllerSample,
    pub menu_actions: Vec<MenuAction>,
}

impl FrameInput {
    pub fn controller(&self, hand: Hand) -> &ControllerSample {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn both_connected(&self) -> bool {
        self.left.connected && self.right.connected
    }
}

#[derive(Debug, Clone, Copy)]
struct ControllerState {
    connected: bool,
    grip: Vec3,
    previous_grip: Vec3,
    pointer_origin: Vec3,
    pointer_direction: Vec3,
    trigger: ButtonState,
    squeeze: ButtonState,
    thumbstick: Vec2,
    /// No pose seen since the last connect.
    fresh: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            connected: false,
            grip: Vec3::ZERO,
            previous_grip: Vec3::ZERO,
            pointer_origin: Vec3::ZERO,
            pointer_direction: Vec3::NEG_Z,
            trigger: ButtonState::default(),
            squeeze: ButtonState::default(),
            thumbstick: Vec2::ZERO,
            fresh: true,
        }
    }
}

impl ControllerState {
    fn press(button: &mut ButtonState) {
        if !button.pressed {
            button.pressed = true;
            button.just_pressed = true;
        }
    }

    fn release(button: &mut ButtonState) {
        if button.pressed {
            button.pressed = false;
            button.just_released = true;
        }
    }

    fn sample(&self) -> ControllerSample {
        ControllerSample {
            connected: self.connected,
            grip: TrackedPoint {
                current: self.grip,
                previous: self.previous_grip,
            },
            pointer: Ray::new(self.pointer_origin, self.pointer_direction),
            trigger: self.trigger,
            squeeze: self.squeeze,
            thumbstick: self.thumbstick,
        }
    }
}

/// Host-facing input queue and the controller state it accumulates.
pub struct InputState {
    queue: VecDeque<InputEvent>,
    left: ControllerState,
    right: ControllerState,
    head: HeadPose,
    last_raw: Option<RawFrame>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            left: ControllerState::default(),
            right: ControllerState::default(),
            head: HeadPose::default(),
            last_raw: None,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Translate a raw snapshot into events by diffing it against the previous
    /// one. Returns the frame's `dt`.
    pub fn ingest_raw(&mut self, raw: &RawFrame) -> f32 {
        let previous = self.last_raw.unwrap_or_default();

        self.push(InputEvent::HeadUpdated {
            position: raw.head_position(),
            rotation: raw.head_rotation(),
        });
        for hand in Hand::BOTH {
            let (before, now) = match hand {
                Hand::Left => (&previous.left, &raw.left),
                Hand::Right => (&previous.right, &raw.right),
            };
            for event in diff_controller(hand, before, now) {
                self.queue.push_back(event);
            }
        }

        self.last_raw = Some(*raw);
        raw.dt
    }

    /// Drain the queue and produce this frame's snapshot.
    ///
    /// The previous grip positions are the values the last snapshot reported
    /// as current, so a controller with no new pose reports a zero delta.
    pub fn begin_frame(&mut self, dt: f32) -> FrameInput {
        for controller in [&mut self.left, &mut self.right] {
            controller.previous_grip = controller.grip;
            controller.trigger.just_pressed = false;
            controller.trigger.just_released = false;
            controller.squeeze.just_pressed = false;
            controller.squeeze.just_released = false;
        }

        let mut menu_actions = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            self.apply(event, &mut menu_actions);
        }

        FrameInput {
            dt,
            head: self.head,
            left: self.left.sample(),
            right: self.right.sample(),
            menu_actions,
        }
    }

    fn controller_mut(&mut self, hand: Hand) -> &mut ControllerState {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    fn apply(&mut self, event: InputEvent, menu_actions: &mut Vec<MenuAction>) {
        match event {
            InputEvent::ControllerConnected { hand } => {
                log::info!("{} controller connected", hand.label());
                let c = self.controller_mut(hand);
                c.connected = true;
                c.fresh = true;
            }
            InputEvent::ControllerDisconnected { hand } => {
                log::info!("{} controller disconnected", hand.label());
                let c = self.controller_mut(hand);
                c.connected = false;
                // A lost controller cannot keep holding a button.
                ControllerState::release(&mut c.trigger);
                ControllerState::release(&mut c.squeeze);
                c.thumbstick = Vec2::ZERO;
                c.previous_grip = c.grip;
            }
            InputEvent::TriggerPressed { hand } => {
                ControllerState::press(&mut self.controller_mut(hand).trigger)
            }
            InputEvent::TriggerReleased { hand } => {
                ControllerState::release(&mut self.controller_mut(hand).trigger)
            }
            InputEvent::SqueezePressed { hand } => {
                ControllerState::press(&mut self.controller_mut(hand).squeeze)
            }
            InputEvent::SqueezeReleased { hand } => {
                ControllerState::release(&mut self.controller_mut(hand).squeeze)
            }
            InputEvent::AxisChanged { hand, x, y } => {
                self.controller_mut(hand).thumbstick = Vec2::new(x, y);
            }
            InputEvent::PoseUpdated {
                hand,
                grip,
                pointer_origin,
                pointer_direction,
            } => {
                let c = self.controller_mut(hand);
                if !c.connected {
                    log::trace!("ignoring pose for disconnected {} controller", hand.label());
                    return;
                }
                // The first pose after a connect has no motion behind it.
                if c.fresh {
                    c.previous_grip = grip;
                    c.fresh = false;
                }
                c.grip = grip;
                c.pointer_origin = pointer_origin;
                c.pointer_direction = pointer_direction;
            }
            InputEvent::HeadUpdated { position, rotation } => {
                self.head = HeadPose { position, rotation };
            }
            InputEvent::MenuButtonPressed { button } => {
                menu_actions.push(MenuAction::Button(button));
            }
            InputEvent::MaterialSelected { index } => {
                menu_actions.push(MenuAction::Material(index));
            }
            InputEvent::SliderChanged { slider, value } => {
                menu_actions.push(MenuAction::Slider(slider, value));
            }
        }
    }
}

fn diff_controller(hand: Hand, before: &RawControllerPose, now: &RawControllerPose) -> Vec<InputEvent> {
    let mut events = Vec::new();

    if now.is_connected() && !before.is_connected() {
        events.push(InputEvent::ControllerConnected { hand });
    } else if !now.is_connected() {
        if before.is_connected() {
            events.push(InputEvent::ControllerDisconnected { hand });
        }
        return events;
    }

    events.push(InputEvent::PoseUpdated {
        hand,
        grip: now.grip(),
        pointer_origin: now.pointer_origin(),
        pointer_direction: now.pointer_direction(),
    });

    match (before.is_pressed(BUTTON_TRIGGER), now.is_pressed(BUTTON_TRIGGER)) {
        (false, true) => events.push(InputEvent::TriggerPressed { hand }),
        (true, false) => events.push(InputEvent::TriggerReleased { hand }),
        _ => {}
    }
    match (before.is_pressed(BUTTON_SQUEEZE), now.is_pressed(BUTTON_SQUEEZE)) {
        (false, true) => events.push(InputEvent::SqueezePressed { hand }),
        (true, false) => events.push(InputEvent::SqueezeReleased { hand }),
        _ => {}
    }
    let stick = now.thumbstick();
    if stick != before.thumbstick() {
        events.push(InputEvent::AxisChanged { hand, x: stick.x, y: stick.y });
    }

    events
}
