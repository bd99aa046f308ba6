// src/bin/thegovernor.rs

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use thegovernor::config::{defaults, Autostart, ConfigStore};
use thegovernor::core::{Event, GovernorController, Outputs};
use thegovernor::cpufreq::CpuFreq;
use thegovernor::globals::{user_config_dir, APP_NAME};
use thegovernor::gui::GovernorTray;
use thegovernor::power_helper::{DesktopNotifier, Notifier, PrivilegedWriter};
use thegovernor::watcher;

/// Takes no options; everything is driven from the tray menu.
#[derive(Parser, Debug)]
#[command(name = "thegovernor", version)]
#[command(about = "Switch the CPU frequency scaling governor from the notification area", long_about = None)]
struct Args {}

fn main() -> Result<()> {
    let _args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cpufreq = CpuFreq::discover().context("cpufreq is not available")?;
    let governors = cpufreq.available_governors()?;
    let current = cpufreq.current_governor()?;
    tracing::info!(
        governor = %current,
        cores = cpufreq.core_count(),
        "starting {}", APP_NAME
    );

    let config = ConfigStore::load(APP_NAME, defaults());
    let notifier = DesktopNotifier::new();
    let (tx, rx) = crossbeam_channel::unbounded::<Event>();

    let watch_tx = tx.clone();
    let _watch = match watcher::watch(cpufreq.watch_path(), move |_| {
        let _ = watch_tx.send(Event::GovernorFileChanged);
    }) {
        Ok(watch) => Some(watch),
        Err(e) => {
            tracing::warn!("{:#}", e);
            notifier.notify(&format!(
                "could not watch {}: {:#}",
                cpufreq.watch_path().display(),
                e
            ));
            None
        }
    };

    let handle = GovernorTray::new(&governors, &current, &config, tx).spawn();
    let autostart = Autostart::for_current_exe(&user_config_dir())?;

    let outputs = Outputs {
        writer: Box::new(PrivilegedWriter::detect()),
        notifier: Box::new(notifier),
        view: Box::new(handle.clone()),
    };
    let mut controller =
        GovernorController::new(cpufreq, governors, current, config, autostart, outputs)?;
    controller.startup();
    controller.run(&rx);

    handle.shutdown();
    Ok(())
}
