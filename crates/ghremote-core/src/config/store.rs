//! Config store for loading ghremote.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::RemoteConfig;

const CONFIG_FILE: &str = "ghremote.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at `<config dir>/ghremote/ghremote.toml`.
    pub fn from_default_location() -> anyhow::Result<Self> {
        let global_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("ghremote");
        Ok(Self::from_dir(&global_dir))
    }

    pub fn from_dir(dir: &Path) -> Self {
        Self::from_path(dir.join(CONFIG_FILE))
    }

    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config, falling back to defaults when the file is absent.
    pub fn load(&self) -> anyhow::Result<RemoteConfig> {
        if !self.config_path.exists() {
            return Ok(RemoteConfig::default());
        }
        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!(
                "Failed to read config file: {}",
                self.config_path.display()
            )
        })?;
        parse_config_str(&content).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }

    pub fn save(&self, config: &RemoteConfig) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

pub fn parse_config_str(content: &str) -> anyhow::Result<RemoteConfig> {
    let config: RemoteConfig = toml::from_str(content)?;
    if config.host.trim().is_empty() {
        anyhow::bail!("host must not be empty");
    }
    if config.default_ref.trim().is_empty() {
        anyhow::bail!("default_ref must not be empty");
    }
    Ok(config)
}
