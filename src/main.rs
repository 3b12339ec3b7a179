//! Headless driver for the ctview viewport.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ctview::api::{HttpBackend, RequestThread};
use ctview::message::{Message, NavigationMessage};
use ctview::model::WindowPreset;
use ctview::replay::{parse_script, run_script};
use ctview::state::SeriesRef;
use ctview::{AppConfig, Severity, ViewerRuntime, ViewportController};

#[derive(Debug, Parser)]
#[command(name = "ctview", version, about = "CT series viewport and measurement driver")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open a series, replay scripted UI events and save the final viewport
    Replay {
        #[arg(long)]
        study: String,
        #[arg(long)]
        series: String,
        /// JSON array of UI events
        #[arg(long)]
        script: Option<PathBuf>,
        /// Where to write the composed viewport as PNG
        #[arg(long)]
        out: Option<PathBuf>,
        /// Server URL overriding the configuration
        #[arg(long)]
        server: Option<String>,
        /// Initial window preset overriding the configuration
        #[arg(long, value_parser = parse_preset)]
        preset: Option<WindowPreset>,
    },
    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        write_default: bool,
    },
}

fn parse_preset(text: &str) -> Result<WindowPreset, String> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|_| format!("unknown preset '{text}' (soft_tissue, bone, lung, custom)"))
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn init_logging(config: &AppConfig) {
    let mut builder = env_logger::Builder::new();
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(config.log_level.to_level_filter());
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(&config);

    match cli.command {
        Commands::Replay {
            study,
            series,
            script,
            out,
            server,
            preset,
        } => replay(
            &config,
            SeriesRef::new(study, series),
            script,
            out,
            server,
            preset,
        ),
        Commands::Config { write_default } => {
            let path = match cli.config {
                Some(path) => path,
                None => AppConfig::default_path().context("Could not determine config directory")?,
            };
            if write_default {
                AppConfig::default().save(&path)?;
                println!("Wrote default configuration to {}", path.display());
            } else {
                println!("{}", path.display());
                println!("{}", config.to_json()?);
            }
            Ok(())
        }
    }
}

fn replay(
    config: &AppConfig,
    series: SeriesRef,
    script: Option<PathBuf>,
    out: Option<PathBuf>,
    server: Option<String>,
    preset: Option<WindowPreset>,
) -> Result<()> {
    let steps = match &script {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            parse_script(&json).with_context(|| format!("Invalid script {}", path.display()))?
        }
        None => Vec::new(),
    };

    let server_url = server.as_deref().unwrap_or(&config.server_url);
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let backend = HttpBackend::new(server_url, timeout)?;
    let worker = RequestThread::spawn(backend).context("Failed to start request thread")?;

    let controller = ViewportController::new(
        config.viewport.width,
        config.viewport.height,
        preset.unwrap_or(config.default_preset),
    );
    let mut runtime = ViewerRuntime::new(controller, worker);

    runtime.dispatch(Message::Navigation(NavigationMessage::OpenSeries(series)));
    runtime.settle(timeout);
    if let Some(status) = runtime.controller().status() {
        println!("{status}");
    }

    for status in run_script(&mut runtime, &steps, timeout) {
        match status.severity {
            Severity::Error => eprintln!("{status}"),
            _ => println!("{status}"),
        }
    }
    println!("Cursor: {}", runtime.controller().cursor_readout());

    if let Some(out) = out {
        let pixmap = runtime.controller_mut().render()?;
        let png = ctview_ui::encode_png(&pixmap)?;
        std::fs::write(&out, png).with_context(|| format!("Failed to write {}", out.display()))?;
        log::info!("Wrote viewport to {}", out.display());
    }
    Ok(())
}
