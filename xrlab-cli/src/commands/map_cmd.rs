use glam::Vec3;
use xrlab_runtime::wim::WimMapper;
use xrlab_runtime::SessionConfig;

/// World point to miniature space, or back with `inverse`.
pub fn map_point(point: Vec3, scale: f32, inverse: bool) -> anyhow::Result<Vec3> {
    if !(scale > 0.0 && scale < 1.0) {
        anyhow::bail!("Miniature scale must be in (0, 1), got {scale}");
    }
    let wim = WimMapper::new(scale, f32::INFINITY);
    Ok(if inverse {
        wim.miniature_to_world(point)
    } else {
        wim.world_to_miniature(point)
    })
}

pub fn run(point: Vec3, inverse: bool, scale: Option<f32>, config: &SessionConfig) -> anyhow::Result<()> {
    let scale = scale.unwrap_or(config.wim.scale);
    let mapped = map_point(point, scale, inverse)?;
    let (from, to) = if inverse {
        ("miniature", "world")
    } else {
        ("world", "miniature")
    };
    println!("{from} {point} -> {to} {mapped} (scale {scale})");
    Ok(())
}
