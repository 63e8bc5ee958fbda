//! UPS Lite Daemon
//!
//! Hosts the battery indicator on a Raspberry Pi fitted with a UPS Lite v1.3.
//!
//! Startup sequence:
//! 1. Set up logging
//! 2. Load configuration
//! 3. Select the hardware backend (real or mock)
//! 4. Load the plugin and tick it until SIGINT/SIGTERM

mod host;
mod renderer;

use anyhow::{Context, Result};
use host::Host;
use renderer::StatusRenderer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use upslite_config::{PowerSettings, UpsLiteConfig};
use upslite_hal::mock::{MOCK_DEVICE_ENV, MockBackend, MockPower};
use upslite_hal::{BusFactory, ShutdownAction, SystemPower};
use upslite_plugin::{UpsLite, View};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logging();

    info!("UPS Lite daemon starting...");

    let config = UpsLiteConfig::load_default().context("Failed to load configuration")?;
    if !config.enabled {
        info!("Battery indicator disabled in configuration, exiting");
        return Ok(());
    }

    let (factory, power) = select_backend(&config.power);

    let view = View::new(
        config.display.width,
        config.display.height,
        Box::new(StatusRenderer::new(config.display.status_file.clone())),
    );

    let mut host = Host::new(view, Duration::from_secs(config.poll_interval_secs));
    host.register(Box::new(UpsLite::from_config(factory, power, &config)));

    info!(
        "Polling every {}s, shutdown at {}%",
        config.poll_interval_secs, config.shutdown
    );
    host.run().await?;

    info!("UPS Lite daemon stopped");
    Ok(())
}

/// Setup logging to console
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(false))
        .init();
}

/// Pick real hardware, or the mock backend when requested or unavailable
fn select_backend(power: &PowerSettings) -> (Box<dyn BusFactory>, Arc<dyn ShutdownAction>) {
    if std::env::var_os(MOCK_DEVICE_ENV).is_some() {
        info!("Using mock UPS ({} is set)", MOCK_DEVICE_ENV);
        return mock_backend();
    }

    hardware_backend(power)
}

#[cfg(feature = "rpi")]
fn hardware_backend(power: &PowerSettings) -> (Box<dyn BusFactory>, Arc<dyn ShutdownAction>) {
    (
        Box::new(upslite_hal::RpiBackend),
        Arc::new(system_power(power)),
    )
}

#[cfg(not(feature = "rpi"))]
fn hardware_backend(_power: &PowerSettings) -> (Box<dyn BusFactory>, Arc<dyn ShutdownAction>) {
    warn!("Built without Raspberry Pi support, using mock UPS");
    mock_backend()
}

fn mock_backend() -> (Box<dyn BusFactory>, Arc<dyn ShutdownAction>) {
    (Box::new(MockBackend::from_env()), Arc::new(MockPower::new()))
}

/// Build the power-off action from the configured command line
#[cfg_attr(not(feature = "rpi"), allow(dead_code))]
fn system_power(power: &PowerSettings) -> SystemPower {
    match power.command.split_first() {
        Some((program, args)) => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            SystemPower::with_command(program, &args)
        }
        None => {
            warn!("Empty power command, falling back to shutdown -h now");
            SystemPower::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_power_from_settings() {
        let power = system_power(&PowerSettings {
            command: vec!["halt".into(), "-p".into()],
        });
        assert_eq!(power.program(), "halt");
        assert_eq!(power.args(), ["-p"]);
    }

    #[test]
    fn test_system_power_empty_command() {
        let power = system_power(&PowerSettings { command: vec![] });
        assert_eq!(power.program(), "shutdown");
    }
}
