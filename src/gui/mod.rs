// src/gui/mod.rs

pub mod icon;
pub mod tray;

pub use tray::{GovernorTray, TrayStatus};
