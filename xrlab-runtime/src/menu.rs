//! Hand-attached menu: a nav bar with two mutually exclusive pages and a
//! destroy button that stays locked until the user reaches the goal.

use serde::{Deserialize, Serialize};

use crate::config::MenuConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuButton {
    Materials,
    Physics,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuPage {
    Materials,
    Physics,
}

impl MenuPage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Materials => "Building Material",
            Self::Physics => "Physics/Vehicle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    BlockMass,
    VehicleSpeed,
    TurningSpeed,
}

impl Slider {
    pub const ALL: &'static [Slider] = &[Slider::BlockMass, Slider::VehicleSpeed, Slider::TurningSpeed];

    /// Inclusive value range.
    pub fn range(&self) -> (f32, f32) {
        match self {
            Self::BlockMass => (0.01, 200.0),
            Self::VehicleSpeed => (1.0, 10.0),
            Self::TurningSpeed => (0.01, 3.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BlockMass => "Building Block Mass",
            Self::VehicleSpeed => "Vehicle Speed: Forward",
            Self::TurningSpeed => "Vehicle Speed: Rotational",
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    Button(MenuButton),
    Material(usize),
    Slider(Slider, f32),
}

/// What a menu action changed, for the session to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEffect {
    Ignored,
    PageOpened(MenuPage),
    PageClosed(MenuPage),
    DestroyRequested,
    DestroyLocked,
    MaterialChanged(usize),
    SliderChanged(Slider, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderValues {
    pub block_mass: f32,
    pub vehicle_speed: f32,
    pub turning_speed: f32,
}

impl SliderValues {
    pub fn get(&self, slider: Slider) -> f32 {
        match slider {
            Slider::BlockMass => self.block_mass,
            Slider::VehicleSpeed => self.vehicle_speed,
            Slider::TurningSpeed => self.turning_speed,
        }
    }

    fn set(&mut self, slider: Slider, value: f32) {
        match slider {
            Slider::BlockMass => self.block_mass = value,
            Slider::VehicleSpeed => self.vehicle_speed = value,
            Slider::TurningSpeed => self.turning_speed = value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuState {
    pub active: bool,
    pub page: Option<MenuPage>,
    pub material_index: usize,
    pub material_count: usize,
    pub sliders: SliderValues,
    pub destruction_unlocked: bool,
}

impl MenuState {
    pub fn new(config: &MenuConfig) -> Self {
        Self {
            active: false,
            page: None,
            material_index: 0,
            material_count: config.material_count,
            sliders: SliderValues {
                block_mass: Slider::BlockMass.clamp(config.block_mass),
                vehicle_speed: Slider::VehicleSpeed.clamp(config.vehicle_speed),
                turning_speed: Slider::TurningSpeed.clamp(config.turning_speed),
            },
            destruction_unlocked: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Hide the menu. Pages are reset so the next activation starts closed.
    pub fn disable(&mut self) {
        self.active = false;
        self.page = None;
    }

    pub fn apply(&mut self, action: MenuAction) -> MenuEffect {
        if !self.active {
            return MenuEffect::Ignored;
        }
        match action {
            MenuAction::Button(MenuButton::Materials) => self.toggle_page(MenuPage::Materials),
            MenuAction::Button(MenuButton::Physics) => self.toggle_page(MenuPage::Physics),
            MenuAction::Button(MenuButton::Destroy) => {
                if self.destruction_unlocked {
                    MenuEffect::DestroyRequested
                } else {
                    MenuEffect::DestroyLocked
                }
            }
            MenuAction::Material(index) => {
                if self.page != Some(MenuPage::Materials) || index >= self.material_count {
                    return MenuEffect::Ignored;
                }
                self.material_index = index;
                MenuEffect::MaterialChanged(index)
            }
            MenuAction::Slider(slider, value) => {
                if self.page != Some(MenuPage::Physics) || !value.is_finite() {
                    return MenuEffect::Ignored;
                }
                let value = slider.clamp(value);
                self.sliders.set(slider, value);
                MenuEffect::SliderChanged(slider, value)
            }
        }
    }

    fn toggle_page(&mut self, page: MenuPage) -> MenuEffect {
        if self.page == Some(page) {
            self.page = None;
            MenuEffect::PageClosed(page)
        } else {
            self.page = Some(page);
            MenuEffect::PageOpened(page)
        }
    }
}
