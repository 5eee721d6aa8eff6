//! Stridekit CLI - play input scripts through the locomotion controller

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stridekit::config::MovementConfig;
use stridekit::game::{InputScript, Simulation, SimulationSnapshot};

#[derive(Parser)]
#[command(name = "stridekit")]
#[command(about = "First-person locomotion controller sandbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an input script on a flat floor and print per-frame snapshots
    Run {
        /// Path to the input script (TOML)
        script: PathBuf,
        /// Movement config file (default: built-in tuning)
        #[arg(short, long, env = "STRIDEKIT_CONFIG")]
        config: Option<PathBuf>,
        /// Add a ceiling whose underside sits at this height above the floor
        #[arg(long)]
        ceiling: Option<f32>,
        /// Override the number of frames in the script
        #[arg(long)]
        frames: Option<u64>,
        /// Print a snapshot every N frames
        #[arg(long, default_value = "1")]
        every: u64,
        /// Emit one JSON object per line instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the effective movement config as TOML
    Config {
        /// Movement config file (default: built-in tuning)
        #[arg(short, long, env = "STRIDEKIT_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stridekit=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            script,
            config,
            ceiling,
            frames,
            every,
            json,
        } => run_script(&script, config.as_deref(), ceiling, frames, every, json),
        Commands::Config { config } => print_config(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<MovementConfig> {
    match path {
        Some(path) => MovementConfig::from_file(path)
            .with_context(|| format!("loading movement config from {}", path.display())),
        None => Ok(MovementConfig::default()),
    }
}

// =============================================================================
// Run Command
// =============================================================================

fn run_script(
    script_path: &Path,
    config_path: Option<&Path>,
    ceiling: Option<f32>,
    frames: Option<u64>,
    every: u64,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let script = InputScript::from_file(script_path)?;
    script.validate_keys(&config.keys)?;

    let bindings = config.keys.clone();
    let mut sim = Simulation::with_flat_floor(config);
    if let Some(height) = ceiling {
        anyhow::ensure!(height > 0.0, "ceiling height must be positive, got {}", height);
        sim.physics.add_static_box([0.0, height + 0.5, 0.0], [200.0, 1.0, 200.0]);
    }

    let total = frames.unwrap_or(script.frames);
    let every = every.max(1);
    let frame_dt = script.frame_dt();
    info!(frames = total, frame_dt, script = %script_path.display(), "running input script");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !json {
        writeln!(
            out,
            "{:>6} {:>7}  {:<9} {:>24} {:>7} {:>5}  {}",
            "frame", "time", "state", "position", "speed", "scale", "flags"
        )?;
    }

    for frame in 0..total {
        script.apply(frame, &mut sim, &bindings);
        let steps = sim.advance_frame(frame_dt);
        if (frame + 1) % every == 0 || frame + 1 == total {
            let snapshot = sim.snapshot(steps);
            if json {
                writeln!(out, "{}", serde_json::to_string(&snapshot)?)?;
            } else {
                writeln!(out, "{}", format_snapshot(&snapshot))?;
            }
        }
    }

    let final_snapshot = sim.snapshot(0);
    info!(
        state = ?final_snapshot.controller.state,
        x = final_snapshot.position[0],
        y = final_snapshot.position[1],
        z = final_snapshot.position[2],
        "script finished"
    );
    Ok(())
}

fn format_snapshot(s: &SimulationSnapshot) -> String {
    let c = &s.controller;
    let mut flags = Vec::new();
    if c.grounded {
        flags.push("grounded");
    }
    if !c.overhead_clear {
        flags.push("blocked");
    }
    if c.flags.is_crouching {
        flags.push("crouch");
    }
    if c.flags.is_small {
        flags.push("small");
    }
    if !c.flags.ready_to_jump {
        flags.push("cooldown");
    }
    format!(
        "{:>6} {:>7.3}  {:<9} ({:>6.2},{:>6.2},{:>6.2}) {:>7.2} {:>5.2}  {}",
        s.frame,
        s.time,
        format!("{:?}", c.state),
        s.position[0],
        s.position[1],
        s.position[2],
        c.move_speed,
        c.scale[1],
        flags.join(",")
    )
}

// =============================================================================
// Config Command
// =============================================================================

fn print_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let text = toml::to_string_pretty(&config).context("serializing movement config")?;
    print!("{}", text);
    Ok(())
}
