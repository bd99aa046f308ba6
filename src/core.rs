// src/core.rs

use std::ops::ControlFlow;
use std::time::Instant;

use anyhow::{bail, Result};
use crossbeam_channel::{at, never, select, tick, Receiver};

use crate::config::{Autostart, ConfigStore, Toggle};
use crate::cpufreq::{CpuFreq, GovernorSet};
use crate::globals::{KEY_GOVERNOR, POLL_INTERVAL, SETTLE_DELAY};
use crate::gui::TrayStatus;
use crate::power_helper::{GovernorWriter, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UserSelected(String),
    Toggled(Toggle),
    GovernorFileChanged,
    Quit,
}

/// What the controller needs from the tray icon.
pub trait TrayView {
    fn show_frequency(&mut self, khz: u64);
    fn show_status(&mut self, status: TrayStatus);
    fn select_governor(&mut self, index: usize);
    fn show_toggle(&mut self, toggle: Toggle, enabled: bool);
}

pub struct Outputs {
    pub writer: Box<dyn GovernorWriter>,
    pub notifier: Box<dyn Notifier>,
    pub view: Box<dyn TrayView>,
}

// ============================================================================
// Controller
// ============================================================================

pub struct GovernorController {
    cpufreq: CpuFreq,
    governors: GovernorSet,
    selected: String,
    config: ConfigStore,
    autostart: Autostart,
    writer: Box<dyn GovernorWriter>,
    notifier: Box<dyn Notifier>,
    view: Box<dyn TrayView>,
    icon_freq: Option<u64>,
    shown_status: Option<TrayStatus>,
    settle_deadline: Option<Instant>,
}

impl GovernorController {
    pub fn new(
        cpufreq: CpuFreq,
        governors: GovernorSet,
        selected: String,
        config: ConfigStore,
        autostart: Autostart,
        outputs: Outputs,
    ) -> Result<Self> {
        if !governors.contains(&selected) {
            bail!("current governor '{}' is not an available governor", selected);
        }
        Ok(Self {
            cpufreq,
            governors,
            selected,
            config,
            autostart,
            writer: outputs.writer,
            notifier: outputs.notifier,
            view: outputs.view,
            icon_freq: None,
            shown_status: None,
            settle_deadline: None,
        })
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle_deadline
    }

    /// Draws the first icon, then applies the saved governor if asked to.
    pub fn startup(&mut self) {
        self.poll();
        let saved = self.config.governor().map(str::to_string);
        if let Some(saved) = saved {
            if saved != self.selected && self.config.is_enabled(Toggle::ApplyAtStartup) {
                tracing::info!("applying saved governor '{}' at startup", saved);
                self.select(&saved);
            }
        }
    }

    pub fn run(&mut self, events: &Receiver<Event>) {
        let ticker = tick(POLL_INTERVAL);
        loop {
            let settle = match self.settle_deadline {
                Some(deadline) => at(deadline),
                None => never(),
            };
            select! {
                recv(events) -> event => match event {
                    Ok(event) => {
                        if self.handle(event).is_break() {
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::warn!("all event sources closed");
                        break;
                    }
                },
                recv(ticker) -> _ => self.poll(),
                recv(settle) -> _ => self.settle_change(),
            }
        }
        tracing::info!("controller stopped");
    }

    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        tracing::debug!(?event, "handling event");
        match event {
            Event::UserSelected(governor) => self.select(&governor),
            Event::Toggled(toggle) => self.toggle(toggle),
            Event::GovernorFileChanged => {
                // coalesce bursts into the first deadline
                self.settle_deadline
                    .get_or_insert_with(|| Instant::now() + SETTLE_DELAY);
            }
            Event::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    pub fn select(&mut self, governor: &str) {
        if !self.governors.contains(governor) {
            tracing::warn!("ignoring unknown governor '{}'", governor);
            return;
        }
        if governor == self.selected {
            self.persist_selected();
            return;
        }
        self.apply(governor);
    }

    /// Reads the governor file once writers have settled and reacts to a foreign change.
    pub fn settle_change(&mut self) {
        self.settle_deadline = None;

        let observed = match self.cpufreq.current_governor() {
            Ok(governor) => governor,
            Err(e) => {
                tracing::warn!("cannot read current governor: {:#}", e);
                return;
            }
        };
        if observed == self.selected {
            return;
        }
        if !self.governors.contains(&observed) {
            tracing::warn!("external governor '{}' is not in the available set", observed);
            return;
        }

        if self.config.is_enabled(Toggle::Enforce) {
            tracing::info!("'{}' set externally, enforcing '{}'", observed, self.selected);
            let wanted = self.selected.clone();
            self.apply(&wanted);
        } else {
            tracing::info!("'{}' set externally", observed);
            self.adopt(&observed);
        }
    }

    pub fn poll(&mut self) {
        let khz = self.cpufreq.max_frequency_khz();
        if self.icon_freq != Some(khz) {
            self.view.show_frequency(khz);
            self.icon_freq = Some(khz);
        }
        self.refresh_status();
    }

    pub fn toggle(&mut self, toggle: Toggle) {
        let enabled = !self.config.is_enabled(toggle);
        if let Err(e) = self.config.set(toggle.key(), enabled) {
            tracing::warn!("could not save settings: {:#}", e);
        }
        if toggle == Toggle::Autostart {
            if let Err(e) = self.autostart.set(enabled) {
                tracing::warn!("{:#}", e);
                self.notifier
                    .notify(&format!("could not update autostart entry: {:#}", e));
            }
        }
        tracing::info!("{} {}", toggle.label(), if enabled { "on" } else { "off" });
        self.view.show_toggle(toggle, enabled);
    }

    // Writes first; state follows only a confirmed write.
    fn apply(&mut self, governor: &str) -> bool {
        if let Err(e) = self.writer.write(governor, self.cpufreq.governor_paths()) {
            tracing::error!("could not apply '{}' governor: {}", governor, e);
            self.notifier
                .notify(&format!("could not apply '{}' governor: {}", governor, e));
            return false;
        }
        tracing::info!("applied '{}' governor", governor);
        self.adopt(governor);
        true
    }

    fn adopt(&mut self, governor: &str) {
        self.selected = governor.to_string();
        self.persist_selected();
        if let Some(index) = self.governors.position(governor) {
            self.view.select_governor(index);
        }
        self.refresh_status();
        self.notifier
            .notify(&format!("'{}' governor active", self.selected));
    }

    fn persist_selected(&mut self) {
        if let Err(e) = self.config.set(KEY_GOVERNOR, self.selected.as_str()) {
            tracing::warn!("could not save settings: {:#}", e);
        }
    }

    fn refresh_status(&mut self) {
        let status = TrayStatus {
            governor: self.selected.clone(),
            cores: self.cpufreq.core_count(),
            max_khz: self.icon_freq.unwrap_or(0),
        };
        if self.shown_status.as_ref() != Some(&status) {
            self.view.show_status(status.clone());
            self.shown_status = Some(status);
        }
    }
}
