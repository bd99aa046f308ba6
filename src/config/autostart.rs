// src/config/autostart.rs

use anyhow::{Context, Result};

use std::fs;
use std::path::{Path, PathBuf};

use crate::globals::APP_NAME;

/// XDG autostart entry that launches this program at login.
pub struct Autostart {
    path: PathBuf,
    exec: PathBuf,
}

impl Autostart {
    pub fn new(config_dir: &Path, exec: PathBuf) -> Self {
        Self {
            path: config_dir
                .join("autostart")
                .join(format!("{}.desktop", APP_NAME)),
            exec,
        }
    }

    pub fn for_current_exe(config_dir: &Path) -> Result<Self> {
        let exec = std::env::current_exe().context("cannot locate the running executable")?;
        Ok(Self::new(config_dir, exec))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry(&self, enabled: bool) -> String {
        let exec = quote_exec_arg(&self.exec.display().to_string());
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Version=1.0\n\
             Name={name}\n\
             Comment=Switch CPU governor from notification area\n\
             Exec={exec}\n\
             Hidden={hidden}\n",
            name = APP_NAME,
            exec = exec,
            hidden = !enabled,
        )
    }

    pub fn set(&self, enabled: bool) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, self.entry(enabled))
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::info!(enabled, path = %self.path.display(), "autostart entry updated");
        Ok(())
    }
}

const RESERVED: &[char] = &[
    ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
    ')', '`',
];

// Exec= quoting: reserved characters force double quotes, and inside them
// `"`, `` ` ``, `$` and `\` take a backslash. The value is then escaped as a
// desktop-entry string, which doubles every backslash.
fn quote_exec_arg(arg: &str) -> String {
    let arg = arg.replace('%', "%%");
    if !arg.contains(RESERVED) {
        return arg;
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted.replace('\\', "\\\\")
}
