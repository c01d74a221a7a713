//! CNVS Daemon
//!
//! Drives a HYTE CNVS desk mat from the built-in effects until SIGINT or
//! SIGTERM, then turns it off.

mod config;
mod effects;
mod throttle;

use anyhow::{Context, Result};
use clap::Parser;
use cnvs_hw::serial::is_cnvs;
use cnvs_hw::{DeviceInfo, SerialTransport, Session, Transport};
use std::time::{Duration, Instant};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use throttle::{ErrorThrottle, Report};

#[derive(Parser)]
#[command(name = "cnvsd")]
#[command(about = "Lighting daemon for the HYTE CNVS")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Print the device description as JSON and exit
    #[arg(long)]
    describe: bool,

    /// Render a single frame and exit, leaving the colors on the device
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    if cli.describe {
        let json = serde_json::to_string_pretty(&DeviceInfo::cnvs())?;
        println!("{json}");
        return Ok(());
    }

    if cli.list_ports {
        return list_ports();
    }

    let config = load_config(&cli.config)?;

    let transport = SerialTransport::new();
    let mut session = match config.device.explicit_port() {
        Some(port) => Session::with_endpoint(transport, port, config.lighting),
        None => Session::start(transport, config.lighting),
    };

    if !session.has_device() {
        // Discovery only runs at startup
        warn!("No CNVS found; restart the daemon after connecting it");
        return Ok(());
    }

    if cli.once {
        session
            .on_render(&config.effect.at(Duration::ZERO))
            .context("Failed to render frame")?;
        info!("Frame sent");
        return Ok(());
    }

    run(session, config, cli.config).await
}

/// Loads the config file, falling back to defaults if it does not exist.
fn load_config(path: &str) -> Result<Config> {
    if !std::path::Path::new(path).exists() {
        warn!("Configuration file {} not found, using defaults", path);
        return Ok(Config::default());
    }
    let config = Config::load(path).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", path);
    Ok(config)
}

/// Re-reads the config file into the running session.
///
/// Replaces the render settings and the effect. Returns whether the render
/// interval changed. On error the session and `config` are left untouched.
fn reload<T: Transport>(
    session: &mut Session<T>,
    config: &mut Config,
    path: &str,
) -> Result<bool> {
    let reloaded = Config::load(path).with_context(|| format!("Failed to reload {path}"))?;
    if reloaded.device != config.device {
        warn!("Device selection changes take effect after a restart");
    }

    *session.settings_mut() = reloaded.lighting;
    let refresh_changed = reloaded.refresh != config.refresh;
    *config = reloaded;
    info!("Reloaded configuration from: {}", path);
    Ok(refresh_changed)
}

fn render_interval(refresh: u64) -> Interval {
    let mut ticker = tokio::time::interval(Duration::from_millis(refresh));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

fn list_ports() -> Result<()> {
    let ports = SerialTransport::new()
        .list_endpoints()
        .context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports detected.");
    }
    for port in &ports {
        let ids = match (port.vendor_id, port.product_id) {
            (Some(vid), Some(pid)) => format!("{vid:04X}:{pid:04X}"),
            _ => "-".to_string(),
        };
        let marker = if is_cnvs(port) { "  <- CNVS" } else { "" };
        println!("{:<24} {}{}", port.name, ids, marker);
    }
    Ok(())
}

/// Renders on a fixed interval until a termination signal, then shuts the
/// device down. SIGHUP reloads the lighting and effect settings.
async fn run(
    mut session: Session<SerialTransport>,
    mut config: Config,
    path: String,
) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let mut ticker = render_interval(config.refresh);
    let started = Instant::now();
    let mut throttle = ErrorThrottle::new();

    info!("Rendering every {} ms", config.refresh);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = config.effect.at(started.elapsed());
                match session.on_render(&snapshot) {
                    Ok(()) => {
                        if let Some(count) = throttle.success() {
                            info!("Rendering recovered after {} errors", count);
                        }
                    }
                    Err(e) => match throttle.failure(Instant::now()) {
                        Some(Report::First) => warn!("Render error: {}", e),
                        Some(Report::Repeated { count, since }) => warn!(
                            "Render error (repeated {} times in {:?}): {}",
                            count, since, e
                        ),
                        None => {}
                    },
                }
            }
            _ = sighup.recv() => {
                match reload(&mut session, &mut config, &path) {
                    Ok(true) => ticker = render_interval(config.refresh),
                    Ok(false) => {}
                    Err(e) => warn!("Keeping current configuration: {:#}", e),
                }
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    session.on_shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnvs_hw::{Color, LightingMode, RenderSettings};
    use effects::Effect;
    use std::path::PathBuf;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("cnvsd-test-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    /// A session whose port never opens, so no hardware is touched.
    fn offline_session() -> Session<SerialTransport> {
        Session::with_endpoint(
            SerialTransport::new(),
            "/nonexistent/cnvsd-test",
            RenderSettings::default(),
        )
    }

    #[test]
    fn test_reload_applies_new_file() {
        let path = temp_config(
            "reload-good",
            r##"
refresh = 50

[lighting]
mode = "forced"
forced_color = "#102030"

[effect]
kind = "solid"
color = "#FF0000"
"##,
        );
        let mut session = offline_session();
        let mut config = Config::default();

        let refresh_changed = reload(&mut session, &mut config, path.to_str().unwrap()).unwrap();

        assert!(refresh_changed);
        assert_eq!(config.refresh, 50);
        assert_eq!(
            config.effect,
            Effect::Solid {
                color: Color::new(255, 0, 0)
            }
        );
        assert_eq!(session.settings().mode, LightingMode::Forced);
        assert_eq!(session.settings().forced_color, Color::new(0x10, 0x20, 0x30));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reload_reports_unchanged_refresh() {
        let path = temp_config("reload-same", "refresh = 33\n");
        let mut session = offline_session();
        let mut config = Config::default();

        assert!(!reload(&mut session, &mut config, path.to_str().unwrap()).unwrap());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reload_rejects_bad_file() {
        let path = temp_config(
            "reload-bad",
            "refresh = 50\n[lighting]\nforced_color = \"#GG0000\"\n",
        );
        let mut session = offline_session();
        session.settings_mut().set_shutdown_color("#010203").unwrap();
        let before = *session.settings();
        let mut config = Config::default();

        assert!(reload(&mut session, &mut config, path.to_str().unwrap()).is_err());

        assert_eq!(config, Config::default());
        assert_eq!(*session.settings(), before);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reload_missing_file_keeps_current() {
        let mut session = offline_session();
        let mut config = Config {
            refresh: 100,
            ..Config::default()
        };

        assert!(reload(&mut session, &mut config, "/nonexistent/cnvsd.toml").is_err());
        assert_eq!(config.refresh, 100);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config("/nonexistent/cnvsd.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_reads_file() {
        let path = temp_config("load", "refresh = 20\n");
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.refresh, 20);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cnvsd"]);
        assert_eq!(cli.config, "config/default.toml");
        assert!(!cli.verbose && !cli.list_ports && !cli.describe && !cli.once);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["cnvsd", "-c", "/etc/cnvs.toml", "-v", "--once"]);
        assert_eq!(cli.config, "/etc/cnvs.toml");
        assert!(cli.verbose);
        assert!(cli.once);
    }

    #[test]
    fn test_describe_json() {
        let json = serde_json::to_value(DeviceInfo::cnvs()).unwrap();
        assert_eq!(json["name"], "HYTE CNVS");
        assert_eq!(json["positions"].as_array().unwrap().len(), 50);
        assert_eq!(json["positions"][0]["x"], 1);
        assert_eq!(json["options"][0]["default"], "#000000");
        assert_eq!(json["options"][1]["type"], "combobox");
        assert_eq!(json["options"][1]["default"], "canvas");
        assert_eq!(json["options"][2]["default"], "#FFFFFF");
    }
}
