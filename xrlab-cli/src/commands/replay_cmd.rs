use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;
use xrlab_runtime::{AudioCue, FrameOutput, InputEvent, Session, SessionConfig};
use xrlab_shared::snapshot::{decode_frames, RawFrame};

use crate::replay_log::ReplayLog;

const LOG_CAPACITY: usize = 10_000;

/// A grabbable box placed before the first frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropSpec {
    pub name: String,
    pub position: Vec3,
    #[serde(default = "default_half_extents")]
    pub half_extents: Vec3,
}

fn default_half_extents() -> Vec3 {
    Vec3::splat(0.25)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceFrame {
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default)]
    pub events: Vec<InputEvent>,
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

/// Human-written trace: props plus a list of frames of input events.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EventTrace {
    pub props: Vec<PropSpec>,
    pub frames: Vec<TraceFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Events(EventTrace),
    Raw(Vec<RawFrame>),
}

impl Trace {
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Events(t) => t.frames.len(),
            Self::Raw(frames) => frames.len(),
        }
    }
}

/// Load a trace; `.xrf` files are binary snapshots, anything else is TOML.
pub fn load_trace(path: &Path) -> anyhow::Result<Trace> {
    let is_binary = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xrf"));
    if is_binary {
        let data = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let frames = decode_frames(&data)
            .map_err(|e| anyhow::anyhow!("Bad snapshot file {}: {e}", path.display()))?;
        Ok(Trace::Raw(frames))
    } else {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        Ok(Trace::Events(parse_event_trace(&content)?))
    }
}

pub fn parse_event_trace(content: &str) -> anyhow::Result<EventTrace> {
    let trace: EventTrace = toml::from_str(content)?;
    if let Some((i, _)) = trace
        .frames
        .iter()
        .enumerate()
        .find(|(_, f)| !(f.dt.is_finite() && f.dt >= 0.0))
    {
        anyhow::bail!("Frame {i} has an invalid dt");
    }
    Ok(trace)
}

/// Totals for a finished replay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplaySummary {
    pub frames: usize,
    pub teleports: usize,
    pub cues: BTreeMap<&'static str, usize>,
    pub final_position: Vec3,
    pub final_yaw: f32,
    pub destruction_unlocked: bool,
}

fn cue_name(cue: &AudioCue) -> &'static str {
    match cue {
        AudioCue::MenuEnter => "menu_enter",
        AudioCue::MenuExit => "menu_exit",
        AudioCue::ButtonClick => "button_click",
        AudioCue::MaterialClick => "material_click",
        AudioCue::VehicleMode => "vehicle_mode",
        AudioCue::MotionStarted => "motion_started",
        AudioCue::MotionStopped => "motion_stopped",
        AudioCue::Explosion { .. } => "explosion",
    }
}

fn describe(out: &FrameOutput) -> Option<String> {
    let mut parts = Vec::new();
    for cue in &out.cues {
        match cue {
            AudioCue::Explosion { position } => parts.push(format!("explosion at {position}")),
            other => parts.push(cue_name(other).to_string()),
        }
    }
    if let Some(commit) = &out.teleported {
        parts.push(format!(
            "teleport to {} facing {:.1}°",
            commit.position,
            commit.yaw.to_degrees()
        ));
    }
    if let Some(preview) = &out.preview {
        parts.push(format!("preview at {}", preview.position));
    }
    if out.vehicle_command.is_moving() {
        parts.push(format!("vehicle {:?}", out.vehicle_command));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Drive a fresh session through every frame of `trace`.
pub fn replay(trace: &Trace, config: SessionConfig, log: &mut ReplayLog, verbose: bool) -> anyhow::Result<ReplaySummary> {
    let mut session = Session::new(config)?;
    let mut summary = ReplaySummary::default();

    let mut record = |session: &Session, out: FrameOutput, summary: &mut ReplaySummary| {
        for cue in &out.cues {
            *summary.cues.entry(cue_name(cue)).or_default() += 1;
        }
        if out.teleported.is_some() {
            summary.teleports += 1;
        }
        let frame = session.frame_count().saturating_sub(1);
        match describe(&out) {
            Some(text) => log.push(frame, text),
            None if verbose => log.push(frame, format!("user at {}", session.rig().position)),
            None => {}
        }
        summary.frames += 1;
    };

    match trace {
        Trace::Events(events) => {
            for prop in &events.props {
                session.add_prop(&prop.name, prop.position, prop.half_extents);
            }
            for frame in &events.frames {
                for event in &frame.events {
                    session.push(event.clone());
                }
                let out = session.update(frame.dt);
                record(&session, out, &mut summary);
            }
        }
        Trace::Raw(frames) => {
            for raw in frames {
                let dt = session.ingest_raw(raw);
                let out = session.update(dt);
                record(&session, out, &mut summary);
            }
        }
    }

    summary.final_position = session.rig().position;
    summary.final_yaw = session.rig().yaw;
    summary.destruction_unlocked = session.menu().destruction_unlocked;
    Ok(summary)
}

pub fn run(trace_path: &Path, config: SessionConfig, verbose: bool) -> anyhow::Result<()> {
    let trace = load_trace(trace_path)?;
    log::info!(
        "replaying {} frames from {}",
        trace.frame_count(),
        trace_path.display()
    );

    let mut log = ReplayLog::new(LOG_CAPACITY);
    let summary = replay(&trace, config, &mut log, verbose)?;

    print!("{}", log.render());
    println!("frames:    {}", summary.frames);
    println!("teleports: {}", summary.teleports);
    for (name, count) in &summary.cues {
        println!("cue {name}: {count}");
    }
    println!(
        "user at {} facing {:.1}°",
        summary.final_position,
        summary.final_yaw.to_degrees()
    );
    if summary.destruction_unlocked {
        println!("destruction unlocked");
    }
    Ok(())
}
