use std::path::{Path, PathBuf};

use xrlab_runtime::SessionConfig;

use crate::project::{global_config_path, LoadedConfig, CONFIG_DIR, CONFIG_FILE};

/// Write the default config to `target`. Refuses to clobber unless `force`.
pub fn write_default_config(target: &Path, force: bool) -> anyhow::Result<()> {
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            target.display()
        );
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&SessionConfig::default())?;
    std::fs::write(target, content)?;
    Ok(())
}

pub fn init(global: bool, force: bool) -> anyhow::Result<()> {
    let target: PathBuf = if global {
        global_config_path()
            .ok_or_else(|| anyhow::anyhow!("No user config directory on this platform"))?
    } else {
        std::env::current_dir()?.join(CONFIG_DIR).join(CONFIG_FILE)
    };
    write_default_config(&target, force)?;
    println!("Wrote {}", target.display());
    Ok(())
}

pub fn show(loaded: &LoadedConfig) -> anyhow::Result<()> {
    println!("# source: {}", loaded.source);
    print!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{load_config_from, ConfigSource};

    #[test]
    fn test_init_round_trips_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);
        write_default_config(&target, false).unwrap();

        let loaded = load_config_from(dir.path(), None, None).unwrap();
        assert_eq!(loaded.source, ConfigSource::Project(target));
        assert_eq!(loaded.config, SessionConfig::default());
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.toml");
        std::fs::write(&target, "[wim]\nscale = 0.02\n").unwrap();

        assert!(write_default_config(&target, false).is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "[wim]\nscale = 0.02\n");

        write_default_config(&target, true).unwrap();
        assert!(std::fs::read_to_string(&target).unwrap().contains("[vehicle]"));
    }
}
