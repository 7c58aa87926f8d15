use std::fmt;
use std::path::{Path, PathBuf};

use xrlab_runtime::SessionConfig;

pub const CONFIG_DIR: &str = ".xrlab";
pub const CONFIG_FILE: &str = "config.toml";

/// Where the effective config was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with --config
    Explicit(PathBuf),
    /// .xrlab/config.toml in the current directory or an ancestor
    Project(PathBuf),
    /// The per-user config directory
    Global(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (user)", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SessionConfig,
    pub source: ConfigSource,
}

/// Per-user config file, e.g. ~/.config/xrlab/config.toml.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("xrlab").join(CONFIG_FILE))
}

/// Walk up from `start` looking for .xrlab/config.toml.
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Parse and validate one config file.
pub fn read_config(path: &Path) -> anyhow::Result<SessionConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let config: SessionConfig = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
    Ok(config)
}

/// Resolve the effective config from the current directory.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    load_config_from(&std::env::current_dir()?, explicit, global_config_path())
}

/// Resolve the effective config: --config, then the project file, then the
/// user file, then defaults.
pub fn load_config_from(
    start: &Path,
    explicit: Option<&Path>,
    global: Option<PathBuf>,
) -> anyhow::Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(LoadedConfig {
            config: read_config(path)?,
            source: ConfigSource::Explicit(path.to_path_buf()),
        });
    }
    if let Some(path) = find_project_config(start) {
        return Ok(LoadedConfig {
            config: read_config(&path)?,
            source: ConfigSource::Project(path),
        });
    }
    if let Some(path) = global.filter(|p| p.is_file()) {
        return Ok(LoadedConfig {
            config: read_config(&path)?,
            source: ConfigSource::Global(path),
        });
    }
    Ok(LoadedConfig {
        config: SessionConfig::default(),
        source: ConfigSource::Defaults,
    })
}
