// src/cpufreq.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::globals::{
    sysfs_cpu_dir, SCALING_AVAILABLE_GOVERNORS, SCALING_CUR_FREQ, SCALING_GOVERNOR,
};

// ============================================================================
// Governor set
// ============================================================================

/// Governors offered by the kernel, in the order sysfs lists them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorSet {
    names: Vec<String>,
}

impl GovernorSet {
    pub fn parse(line: &str) -> Self {
        Self {
            names: line.split_whitespace().map(String::from).collect(),
        }
    }

    pub fn contains(&self, governor: &str) -> bool {
        self.position(governor).is_some()
    }

    pub fn position(&self, governor: &str) -> Option<usize> {
        self.names.iter().position(|g| g == governor)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// Sysfs reader
// ============================================================================

pub struct CpuFreq {
    root: PathBuf,
    governor_paths: Vec<PathBuf>,
}

impl CpuFreq {
    pub fn discover() -> Result<Self> {
        Self::with_root(sysfs_cpu_dir())
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let governor_paths = enumerate_control_paths(&root);
        if governor_paths.is_empty() {
            bail!(
                "no cpufreq scaling_governor files found under {}",
                root.display()
            );
        }
        tracing::debug!(count = governor_paths.len(), root = %root.display(), "found governor control files");
        Ok(Self { root, governor_paths })
    }

    pub fn governor_paths(&self) -> &[PathBuf] {
        &self.governor_paths
    }

    pub fn core_count(&self) -> usize {
        self.governor_paths.len()
    }

    /// The control file whose changes are tracked (cpu0's).
    pub fn watch_path(&self) -> &Path {
        &self.governor_paths[0]
    }

    pub fn available_governors(&self) -> Result<GovernorSet> {
        let path = self.root.join("cpu0").join(SCALING_AVAILABLE_GOVERNORS);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let set = GovernorSet::parse(content.lines().next().unwrap_or(""));
        if set.is_empty() {
            bail!("{} lists no governors", path.display());
        }
        Ok(set)
    }

    pub fn current_governor(&self) -> Result<String> {
        let path = self.root.join("cpu0").join(SCALING_GOVERNOR);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(content.trim().to_string())
    }

    /// Highest `scaling_cur_freq` across cores, in kHz. Unreadable cores are skipped.
    pub fn max_frequency_khz(&self) -> u64 {
        cpu_dirs(&self.root)
            .into_iter()
            .filter_map(|(_, dir)| fs::read_to_string(dir.join(SCALING_CUR_FREQ)).ok())
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }
}

/// Per-core `scaling_governor` files under `root`, ordered by CPU number.
pub fn enumerate_control_paths(root: &Path) -> Vec<PathBuf> {
    cpu_dirs(root)
        .into_iter()
        .map(|(_, dir)| dir.join(SCALING_GOVERNOR))
        .filter(|path| path.is_file())
        .collect()
}

fn cpu_dirs(root: &Path) -> Vec<(u32, PathBuf)> {
    let mut dirs: Vec<(u32, PathBuf)> = match fs::read_dir(root) {
        Ok(entries) => entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let index = cpu_index(&name.to_string_lossy())?;
                Some((index, entry.path()))
            })
            .collect(),
        Err(e) => {
            tracing::warn!("cannot list {}: {}", root.display(), e);
            Vec::new()
        }
    };
    dirs.sort_by_key(|(index, _)| *index);
    dirs
}

fn cpu_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("cpu")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::fs;
    use std::path::Path;

    /// Lays out `cpuN/cpufreq/*` files the way sysfs does.
    pub fn fake_cpu(root: &Path, index: u32, governor: &str, freq_khz: Option<u64>) {
        let dir = root.join(format!("cpu{}", index)).join("cpufreq");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("scaling_governor"), format!("{}\n", governor)).unwrap();
        fs::write(
            dir.join("scaling_available_governors"),
            "performance powersave \n",
        )
        .unwrap();
        if let Some(khz) = freq_khz {
            fs::write(dir.join("scaling_cur_freq"), format!("{}\n", khz)).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::fake_cpu;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_governor_set_parse() {
        let set = GovernorSet::parse("performance  powersave schedutil\n");
        assert_eq!(set.len(), 3);
        assert_eq!(set.position("powersave"), Some(1));
        assert!(!set.contains("ondemand"));
        assert_eq!(set.get(2), Some("schedutil"));
    }

    #[test]
    fn test_enumerate_orders_numerically() {
        let dir = TempDir::new().unwrap();
        for i in [10, 2, 0, 1] {
            fake_cpu(dir.path(), i, "performance", None);
        }
        fs::create_dir_all(dir.path().join("cpuidle")).unwrap();
        fs::create_dir_all(dir.path().join("cpufreq")).unwrap();
        // offline core without cpufreq
        fs::create_dir_all(dir.path().join("cpu11")).unwrap();

        let paths = enumerate_control_paths(dir.path());
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.parent().unwrap().parent().unwrap().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["cpu0", "cpu1", "cpu2", "cpu10"]);
    }

    #[test]
    fn test_with_root_requires_control_files() {
        let dir = TempDir::new().unwrap();
        assert!(CpuFreq::with_root(dir.path()).is_err());
    }

    #[test]
    fn test_reads_governors() {
        let dir = TempDir::new().unwrap();
        fake_cpu(dir.path(), 0, "powersave", None);
        fake_cpu(dir.path(), 1, "powersave", None);

        let cpufreq = CpuFreq::with_root(dir.path()).unwrap();
        assert_eq!(cpufreq.core_count(), 2);
        assert_eq!(cpufreq.current_governor().unwrap(), "powersave");
        let available = cpufreq.available_governors().unwrap();
        assert_eq!(available.iter().collect::<Vec<_>>(), vec!["performance", "powersave"]);
        assert!(cpufreq.watch_path().ends_with("cpu0/cpufreq/scaling_governor"));
    }

    #[test]
    fn test_missing_available_governors_fails() {
        let dir = TempDir::new().unwrap();
        fake_cpu(dir.path(), 0, "performance", None);
        fs::remove_file(dir.path().join("cpu0/cpufreq/scaling_available_governors")).unwrap();

        let cpufreq = CpuFreq::with_root(dir.path()).unwrap();
        assert!(cpufreq.available_governors().is_err());
    }

    #[test]
    fn test_max_frequency_skips_unreadable() {
        let dir = TempDir::new().unwrap();
        fake_cpu(dir.path(), 0, "performance", Some(1_200_000));
        fake_cpu(dir.path(), 1, "performance", Some(3_400_000));
        fake_cpu(dir.path(), 2, "performance", None);
        fake_cpu(dir.path(), 3, "performance", None);
        fs::write(dir.path().join("cpu3/cpufreq/scaling_cur_freq"), "garbage").unwrap();

        let cpufreq = CpuFreq::with_root(dir.path()).unwrap();
        assert_eq!(cpufreq.max_frequency_khz(), 3_400_000);
    }

    #[test]
    fn test_max_frequency_defaults_to_zero() {
        let dir = TempDir::new().unwrap();
        fake_cpu(dir.path(), 0, "performance", None);

        let cpufreq = CpuFreq::with_root(dir.path()).unwrap();
        assert_eq!(cpufreq.max_frequency_khz(), 0);
    }
}
