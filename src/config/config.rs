// src/config/config.rs

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use std::fs;
use std::path::{Path, PathBuf};

use crate::globals::{
    user_config_dir, KEY_APPLY_AT_STARTUP, KEY_AUTOSTART, KEY_ENFORCE, KEY_GOVERNOR,
};

/// Boolean settings exposed as menu checkmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Enforce,
    ApplyAtStartup,
    Autostart,
}

impl Toggle {
    pub const ALL: [Toggle; 3] = [Toggle::Enforce, Toggle::ApplyAtStartup, Toggle::Autostart];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Enforce => KEY_ENFORCE,
            Self::ApplyAtStartup => KEY_APPLY_AT_STARTUP,
            Self::Autostart => KEY_AUTOSTART,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Enforce => "Enforce",
            Self::ApplyAtStartup => "Apply at Startup",
            Self::Autostart => "Autostart",
        }
    }
}

pub fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    for toggle in Toggle::ALL {
        map.insert(toggle.key().to_string(), Value::Bool(false));
    }
    map
}

pub struct ConfigStore {
    path: PathBuf,
    settings: Map<String, Value>,
}

impl ConfigStore {
    /// Loads `<user config dir>/<app_name>.json` over `defaults`.
    pub fn load(app_name: &str, defaults: Map<String, Value>) -> Self {
        let path = user_config_dir().join(format!("{}.json", app_name));
        Self::load_from(path, defaults)
    }

    /// A missing or unparsable file leaves `defaults` untouched.
    pub fn load_from(path: PathBuf, defaults: Map<String, Value>) -> Self {
        let mut settings = defaults;
        match read_settings(&path) {
            Ok(file_settings) => {
                for (key, value) in file_settings {
                    settings.insert(key, value);
                }
            }
            Err(e) => tracing::info!("while loading {}: {:#}", path.display(), e),
        }
        Self { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn is_enabled(&self, toggle: Toggle) -> bool {
        self.get_bool(toggle.key())
    }

    pub fn governor(&self) -> Option<&str> {
        self.get_string(KEY_GOVERNOR)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.settings.insert(key.to_string(), value.into());
        self.sync()
    }

    /// Rewrites the whole file.
    pub fn sync(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(&self.settings)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn read_settings(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)?;
    let map = serde_json::from_str::<Map<String, Value>>(&content)?;
    Ok(map)
}
