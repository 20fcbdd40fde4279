//! Armlink headless control station CLI.
//!
//! Provides three modes of operation:
//! - `run`: Drive the control station at a fixed tick rate
//! - `play`: Load a sequence document, play it once (or looped), and exit
//! - `info`: Print workspace crate versions and the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::{Parser, Subcommand};

use armlink_arm::ArmModel;
use armlink_core::{ArmlinkError, DocumentError, StationConfig, TickClock};
use armlink_input::MappingTable;
use armlink_rig::ArmlinkRigPlugin;
use armlink_sequencer::Sequencer;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Armlink robot arm control station.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Station configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the control station at the configured tick rate.
    Run,

    /// Play a sequence document and exit when it finishes.
    Play {
        /// Sequence document (JSON). Overrides the configured one.
        sequence: Option<PathBuf>,

        /// Loop playback instead of exiting at the end.
        #[arg(short, long)]
        looped: bool,
    },

    /// Print crate information and the effective configuration.
    Info,
}

// ---------------------------------------------------------------------------
// Station assembly
// ---------------------------------------------------------------------------

fn load_config(path: Option<&PathBuf>) -> Result<StationConfig, ArmlinkError> {
    match path {
        Some(path) => Ok(StationConfig::from_file(path)?),
        None => Ok(StationConfig::default()),
    }
}

fn read_document(path: &PathBuf) -> Result<String, DocumentError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Build the station app from a configuration: schedule runner at the
/// configured cadence, logging, the full rig, and any startup documents.
fn build_station(config: &StationConfig) -> Result<App, ArmlinkError> {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(
            config.tick_ms,
        ))),
    );
    app.add_plugins(LogPlugin::default());
    app.add_plugins(ArmlinkRigPlugin);

    let arm = match &config.arm_config {
        Some(path) => {
            let mut arm = ArmModel::default();
            arm.import_json(&read_document(path)?)?;
            arm
        }
        None => ArmModel::standard_arm(),
    };
    app.insert_resource(arm);

    if let Some(path) = &config.mappings {
        app.world_mut()
            .resource_mut::<MappingTable>()
            .import_json(&read_document(path)?)?;
    }

    {
        let mut sequencer = app.world_mut().resource_mut::<Sequencer>();
        if let Some(path) = &config.sequence {
            sequencer.import_json(&read_document(path)?)?;
        }
        sequencer.set_loop(config.loop_playback);
    }

    info!(
        "station configured: tick={}ms ({:.0} Hz), loop={}",
        config.tick_ms,
        config.tick_hz(),
        config.loop_playback
    );
    Ok(app)
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_station(config: &StationConfig) -> Result<(), ArmlinkError> {
    let mut app = build_station(config)?;
    app.run();
    Ok(())
}

fn run_play(
    config: &StationConfig,
    sequence: Option<&PathBuf>,
    looped: bool,
) -> Result<(), ArmlinkError> {
    let mut config = config.clone();
    if let Some(path) = sequence {
        config.sequence = Some(path.clone());
    }
    config.loop_playback = config.loop_playback || looped;
    if config.sequence.is_none() {
        return Err(DocumentError::Invalid {
            document: "sequence".into(),
            message: "no sequence given (argument or config)".into(),
        }
        .into());
    }

    let mut app = build_station(&config)?;
    app.finish();
    app.cleanup();

    {
        let world = app.world_mut();
        let now = world.resource::<TickClock>().now_ms();
        world.resource_mut::<Sequencer>().play(now);
    }

    let tick = Duration::from_millis(config.tick_ms);
    while app.world().resource::<Sequencer>().is_playing() {
        app.update();
        std::thread::sleep(tick);
    }
    Ok(())
}

fn run_info(config: &StationConfig) {
    println!("armlink v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  armlink-core      {}", env!("CARGO_PKG_VERSION"));
    println!("  armlink-arm       {}", env!("CARGO_PKG_VERSION"));
    println!("  armlink-sequencer {}", env!("CARGO_PKG_VERSION"));
    println!("  armlink-input     {}", env!("CARGO_PKG_VERSION"));
    println!("  armlink-transport {}", env!("CARGO_PKG_VERSION"));
    println!("  armlink-rig       {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("tick: {}ms ({:.0} Hz)", config.tick_ms, config.tick_hz());
    println!(
        "arm config: {}",
        config
            .arm_config
            .as_deref()
            .map_or("standard arm".into(), |p| p.display().to_string())
    );
    println!("loop playback: {}", config.loop_playback);
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Some(Commands::Play { sequence, looped }) => {
            run_play(&config, sequence.as_ref(), looped)
        }
        Some(Commands::Info) => {
            run_info(&config);
            Ok(())
        }
        Some(Commands::Run) | None => run_station(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
