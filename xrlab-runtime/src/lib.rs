//! XR Lab interaction runtime
//!
//! Frame-driven interaction logic for a two-controller headset session:
//! bimanual manipulation, world-in-miniature teleport, lever-driven vehicle,
//! hand menu and a destructible building. The host feeds input events (or raw
//! snapshots), calls [`Session::update`] once per frame and applies the
//! returned transforms and cues.

pub mod bimanual;
pub mod building;
pub mod config;
pub mod gestures;
pub mod input;
pub mod menu;
pub mod rig;
pub mod scene;
pub mod selection;
pub mod session;
pub mod teleport;
pub mod transform;
pub mod vehicle;
pub mod wim;

pub use config::{ConfigError, SessionConfig};
pub use input::{Hand, InputEvent};
pub use session::{AudioCue, FrameOutput, Session};
