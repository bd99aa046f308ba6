// src/globals.rs

use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "thegovernor";

pub const SYSFS_CPU_DIR: &str = "/sys/devices/system/cpu";

pub const SYSFS_ROOT_ENV: &str = "THEGOVERNOR_SYSFS_ROOT";
pub const ESCALATION_ENV: &str = "THEGOVERNOR_ESCALATION";

pub const DEFAULT_ESCALATION_HELPER: &str = "pkexec";

pub const SCALING_GOVERNOR: &str = "cpufreq/scaling_governor";
pub const SCALING_AVAILABLE_GOVERNORS: &str = "cpufreq/scaling_available_governors";
pub const SCALING_CUR_FREQ: &str = "cpufreq/scaling_cur_freq";

// Settings keys
pub const KEY_ENFORCE: &str = "enforce";
pub const KEY_APPLY_AT_STARTUP: &str = "apply_at_startup";
pub const KEY_AUTOSTART: &str = "autostart";
pub const KEY_GOVERNOR: &str = "governor";

pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Time given to concurrent writers of the governor file before it is read back.
pub const SETTLE_DELAY: Duration = Duration::from_millis(250);

pub fn sysfs_cpu_dir() -> PathBuf {
    std::env::var_os(SYSFS_ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SYSFS_CPU_DIR))
}

pub fn escalation_helper() -> String {
    std::env::var(ESCALATION_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ESCALATION_HELPER.to_string())
}

/// Per-user configuration directory, `$XDG_CONFIG_HOME` or `~/.config`.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| {
        tracing::warn!("no user config directory found, using the working directory");
        PathBuf::from(".")
    })
}
