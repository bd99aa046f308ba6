pub mod globals;
pub mod config;
pub mod cpufreq;
pub mod core;
pub mod gui;
pub mod power_helper;
pub mod watcher;

// Re-exports
pub use globals::*;
pub use config::{ConfigStore, Toggle};
pub use crate::core::{Event, GovernorController};
