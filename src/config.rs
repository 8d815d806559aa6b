use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Startup defaults for the tray icon
///
/// All fields are optional; the file only saves typing the same commands on
/// every launch. The defaults are applied before command-line commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial icon title
    pub title: Option<String>,

    /// Initial icon tooltip
    pub tooltip: Option<String>,

    /// Initial icon image, same grammar as the `icon` command
    pub icon: Option<String>,

    /// Protocol commands applied at startup
    pub commands: Vec<String>,
}

impl Config {
    /// Get the configuration directory path (~/.tray-control)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".tray-control"))
    }

    /// Get the configuration file path (~/.tray-control/config)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config"))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;

        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            log::info!("Config file not found, creating default");
            let config = Config::default();
            config.save_to(&config_file)?;
            Ok(config)
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        log::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Protocol lines equivalent to the configured defaults, in the order
    /// they should be applied.
    pub fn startup_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();
        if let Some(title) = &self.title {
            commands.push(format!("title={}", title));
        }
        if let Some(tooltip) = &self.tooltip {
            commands.push(format!("tooltip={}", tooltip));
        }
        if let Some(icon) = &self.icon {
            commands.push(format!("icon={}", icon));
        }
        commands.extend(self.commands.iter().cloned());
        commands
    }
}
