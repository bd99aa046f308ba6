use crossbeam_channel::Sender;
use ksni::menu::{CheckmarkItem, RadioGroup, RadioItem, StandardItem};
use ksni::{Category, Handle, Icon, MenuItem, ToolTip, Tray, TrayService};

use crate::config::{ConfigStore, Toggle};
use crate::core::{Event, TrayView};
use crate::cpufreq::GovernorSet;
use crate::globals::APP_NAME;

use super::icon::{ghz_label, render_frequency};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrayStatus {
    pub governor: String,
    pub cores: usize,
    pub max_khz: u64,
}

impl TrayStatus {
    pub fn tooltip(&self) -> String {
        format!(
            "active governor: {}\n{} cores @ {} GHz max",
            self.governor,
            self.cores,
            ghz_label(self.max_khz)
        )
    }
}

pub struct GovernorTray {
    governors: Vec<String>,
    selected: usize,
    toggles: Vec<(Toggle, bool)>,
    icon: Option<Icon>,
    status: TrayStatus,
    events: Sender<Event>,
}

impl GovernorTray {
    pub fn new(
        governors: &GovernorSet,
        selected: &str,
        config: &ConfigStore,
        events: Sender<Event>,
    ) -> Self {
        Self {
            governors: governors.iter().map(String::from).collect(),
            selected: governors.position(selected).unwrap_or(0),
            toggles: Toggle::ALL
                .iter()
                .map(|&t| (t, config.is_enabled(t)))
                .collect(),
            icon: None,
            status: TrayStatus {
                governor: selected.to_string(),
                ..Default::default()
            },
            events,
        }
    }

    pub fn spawn(self) -> Handle<GovernorTray> {
        let service = TrayService::new(self);
        let handle = service.handle();
        service.spawn();
        tracing::info!("{} tray icon is running via D-Bus", APP_NAME);
        handle
    }

    fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::warn!("controller is gone, dropping menu action");
        }
    }

    fn is_checked(&self, toggle: Toggle) -> bool {
        self.toggles
            .iter()
            .find(|(t, _)| *t == toggle)
            .map_or(false, |(_, on)| *on)
    }
}

impl Tray for GovernorTray {
    fn id(&self) -> String {
        APP_NAME.into()
    }

    fn title(&self) -> String {
        APP_NAME.into()
    }

    fn category(&self) -> Category {
        Category::Hardware
    }

    // Left click is reserved; the menu opens on right click.
    fn activate(&mut self, _x: i32, _y: i32) {}

    fn icon_pixmap(&self) -> Vec<Icon> {
        self.icon.iter().cloned().collect()
    }

    fn tool_tip(&self) -> ToolTip {
        ToolTip {
            title: APP_NAME.into(),
            description: self.status.tooltip(),
            icon_name: String::new(),
            icon_pixmap: Vec::new(),
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        let mut items = vec![
            MenuItem::RadioGroup(RadioGroup {
                selected: self.selected,
                select: Box::new(|tray: &mut Self, index| {
                    if let Some(governor) = tray.governors.get(index).cloned() {
                        tray.send(Event::UserSelected(governor));
                    }
                }),
                options: self
                    .governors
                    .iter()
                    .map(|g| RadioItem {
                        label: g.clone(),
                        ..Default::default()
                    })
                    .collect(),
            }),
            MenuItem::Separator,
        ];

        for toggle in Toggle::ALL {
            items.push(MenuItem::Checkmark(CheckmarkItem {
                label: toggle.label().into(),
                checked: self.is_checked(toggle),
                activate: Box::new(move |tray: &mut Self| tray.send(Event::Toggled(toggle))),
                ..Default::default()
            }));
        }

        items.push(MenuItem::Separator);
        items.push(MenuItem::Standard(StandardItem {
            label: "Quit".into(),
            icon_name: "application-exit".into(),
            activate: Box::new(|tray: &mut Self| tray.send(Event::Quit)),
            ..Default::default()
        }));
        items
    }
}

impl TrayView for Handle<GovernorTray> {
    fn show_frequency(&mut self, khz: u64) {
        let icon = render_frequency(khz);
        self.update(move |tray: &mut GovernorTray| tray.icon = Some(icon));
    }

    fn show_status(&mut self, status: TrayStatus) {
        self.update(move |tray: &mut GovernorTray| tray.status = status);
    }

    fn select_governor(&mut self, index: usize) {
        self.update(move |tray: &mut GovernorTray| tray.selected = index);
    }

    fn show_toggle(&mut self, toggle: Toggle, enabled: bool) {
        self.update(move |tray: &mut GovernorTray| {
            for (t, on) in tray.toggles.iter_mut() {
                if *t == toggle {
                    *on = enabled;
                }
            }
        });
    }
}
