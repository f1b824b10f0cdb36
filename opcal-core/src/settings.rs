//! Durable local settings.
//!
//! The privacy-mode flag is the only durable local setting the engine
//! carries: read once at startup, written through on toggle, and
//! broadcast over a watch channel so every open view of the same store
//! stays synchronized. Long-running views call [`SharedSettings::refresh`]
//! periodically to pick up toggles made by other processes. The shared
//! state object is passed explicitly to whatever needs it; there is no
//! ambient singleton.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{OpcalError, OpcalResult};

/// Settings persisted at ~/.config/opcal/config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// When set, views mask entry titles in rendered output.
    #[serde(default)]
    pub privacy_mode: bool,
}

impl Settings {
    pub fn config_path() -> OpcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| OpcalError::Config("Could not determine config directory".into()))?
            .join("opcal");
        Ok(config_dir.join("config.toml"))
    }

    /// Read from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> OpcalResult<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| OpcalError::Config(format!("Could not read settings file: {e}")))?;
        toml::from_str(&content).map_err(|e| OpcalError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> OpcalResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                OpcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| OpcalError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| OpcalError::Config(format!("Could not write settings file: {e}")))?;
        Ok(())
    }
}

/// Shared settings state with cross-view synchronization.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    path: PathBuf,
    tx: watch::Sender<Settings>,
}

impl SharedSettings {
    /// Initialization read at startup, against the default store path.
    pub fn load() -> OpcalResult<Self> {
        Self::open(Settings::config_path()?)
    }

    /// Open a view of the store at `path`.
    pub fn open(path: PathBuf) -> OpcalResult<Self> {
        let settings = Settings::load_from(&path)?;
        let (tx, _) = watch::channel(settings);
        Ok(SharedSettings { path, tx })
    }

    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Write-through setter: persists, then broadcasts to subscribers.
    pub fn set_privacy_mode(&self, privacy_mode: bool) -> OpcalResult<()> {
        let mut settings = self.current();
        settings.privacy_mode = privacy_mode;
        settings.save_to(&self.path)?;
        self.tx.send_replace(settings);
        Ok(())
    }

    /// Re-read the store and broadcast if another view changed it on
    /// disk. Subscribers are only woken when the state actually moves.
    pub fn refresh(&self) -> OpcalResult<()> {
        let on_disk = Settings::load_from(&self.path)?;
        self.tx.send_if_modified(|current| {
            if *current == on_disk {
                false
            } else {
                *current = on_disk;
                true
            }
        });
        Ok(())
    }

    /// Subscription for any view that needs to follow changes.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }
}
