// src/config/mod.rs

pub mod autostart;
pub mod config;

pub use autostart::Autostart;
pub use config::{defaults, ConfigStore, Toggle};
