//! Bank configuration file

use std::fs;
use std::path::{Path, PathBuf};

use nf_core::NotchConfig;

use crate::StateResult;

const CONFIG_FILE_NAME: &str = "notch.json";

/// JSON file storage for [`NotchConfig`]
pub trait ConfigFile: Sized {
    /// Load from the standard location
    fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Load from `path`, falling back to defaults when the file is missing,
    /// malformed or invalid
    fn load_from<P: AsRef<Path>>(path: P) -> Self;

    /// Save to the standard location
    fn save(&self) -> StateResult<()> {
        self.save_to(default_config_path())
    }

    fn save_to<P: AsRef<Path>>(&self, path: P) -> StateResult<()>;
}

impl ConfigFile for NotchConfig {
    fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str::<NotchConfig>(&content) {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    log::warn!("{}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("{}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    fn save_to<P: AsRef<Path>>(&self, path: P) -> StateResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Get default configuration file path
pub fn default_config_path() -> PathBuf {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library/Application Support/NotchBank"))
            .unwrap_or_else(|| PathBuf::from("."))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("NotchBank"))
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        // Linux/other
        dirs::config_dir()
            .map(|d| d.join("notchbank"))
            .unwrap_or_else(|| PathBuf::from("."))
    };
    base.join(CONFIG_FILE_NAME)
}
