// src/power_helper.rs

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::globals::{escalation_helper, APP_NAME};

// Check if a command exists
pub fn does_command_exist(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

// ============================================================================
// Governor writes
// ============================================================================

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("failed to launch {helper}: {source}")]
    Launch {
        helper: String,
        #[source]
        source: io::Error,
    },

    #[error("authorization dismissed or denied")]
    NotAuthorized,

    #[error("{helper} exited with {status}{detail}")]
    Rejected {
        helper: String,
        status: ExitStatus,
        detail: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait GovernorWriter {
    /// Writes `governor` into every path, returning once the write is confirmed.
    fn write(&mut self, governor: &str, paths: &[PathBuf]) -> Result<(), ApplyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    /// Already privileged; write the files ourselves.
    Direct,
    /// Run `<helper> tee <paths>` and feed the governor on stdin.
    Helper(String),
}

pub struct PrivilegedWriter {
    escalation: Escalation,
}

impl PrivilegedWriter {
    pub fn new(escalation: Escalation) -> Self {
        Self { escalation }
    }

    pub fn detect() -> Self {
        let escalation = if nix::unistd::Uid::effective().is_root() {
            Escalation::Direct
        } else {
            let helper = escalation_helper();
            if !does_command_exist(&helper) {
                tracing::warn!("{} not found, governor changes will fail", helper);
            }
            Escalation::Helper(helper)
        };
        tracing::info!(?escalation, "governor write method");
        Self::new(escalation)
    }
}

impl GovernorWriter for PrivilegedWriter {
    fn write(&mut self, governor: &str, paths: &[PathBuf]) -> Result<(), ApplyError> {
        match &self.escalation {
            Escalation::Direct => write_direct(governor, paths),
            Escalation::Helper(helper) => write_with_helper(helper, governor, paths),
        }
    }
}

fn write_direct(governor: &str, paths: &[PathBuf]) -> Result<(), ApplyError> {
    for path in paths {
        fs::write(path, format!("{}\n", governor)).map_err(|source| ApplyError::Write {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}

fn write_with_helper(helper: &str, governor: &str, paths: &[PathBuf]) -> Result<(), ApplyError> {
    let launch_err = |source| ApplyError::Launch {
        helper: helper.to_string(),
        source,
    };

    tracing::debug!(helper, governor, cores = paths.len(), "running escalation helper");
    let mut child = Command::new(helper)
        .arg("tee")
        .args(paths)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(launch_err)?;

    if let Some(mut stdin) = child.stdin.take() {
        // a cancelled helper exits without reading stdin
        let _ = writeln!(stdin, "{}", governor);
    }

    let output = child.wait_with_output().map_err(launch_err)?;
    if output.status.success() {
        return Ok(());
    }

    if is_pkexec(helper) && matches!(output.status.code(), Some(126) | Some(127)) {
        return Err(ApplyError::NotAuthorized);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = match stderr.trim() {
        "" => String::new(),
        msg => format!(": {}", msg),
    };
    Err(ApplyError::Rejected {
        helper: helper.to_string(),
        status: output.status,
        detail,
    })
}

fn is_pkexec(helper: &str) -> bool {
    Path::new(helper).file_name().map_or(false, |name| name == "pkexec")
}

// ============================================================================
// Desktop notifications
// ============================================================================

pub trait Notifier {
    fn notify(&self, message: &str);
}

pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("notify: {}", message);
        let status = Command::new("notify-send")
            .args(["--app-name", &self.app_name, message])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if !status.success() => {
                tracing::warn!("notify-send exited with {}", status)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("notify-send failed: {}", e),
        }
    }
}
