mod analyzer;
mod app;
mod canvas;
mod capture;
mod config;
mod controls;
mod draw;
mod growth;
mod help;
mod logging;
mod mode;
mod palette;
mod particles;
mod pattern;
mod settings;
mod terminal;
mod visualizer;

use capture::Source;
use clap::{Parser, Subcommand};
use config::{CliOverrides, VisualizerConfig};
use mode::Mode;
use settings::Settings;
use std::io;

#[derive(Parser)]
#[command(name = "audiobloom")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Audio-reactive generative patterns in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the visualizer (bloom, snowflake, spores, flow)
    Run {
        /// Audio source: system, mic, synth, none
        #[arg(short = 'S', long)]
        source: Option<Source>,

        /// Starting pattern: bloom, snowflake, spores, flow (or 0-3)
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Animation speed (seconds per frame)
        #[arg(short, long)]
        time: Option<f32>,

        /// Braille dots per canvas unit (smaller shows more of the scene)
        #[arg(short = 'x', long)]
        scale: Option<f32>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write a debug log to /tmp/audiobloom.log
        #[arg(short, long)]
        debug: bool,
    },

    /// Show the settings file location and the effective settings
    Config,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            mode,
            time,
            scale,
            seed,
            debug,
        } => {
            logging::init(debug)?;
            let settings = Settings::load();
            let config = VisualizerConfig::resolve(
                CliOverrides {
                    source,
                    mode,
                    time_step: time,
                    scale,
                    seed,
                    debug,
                },
                &settings.visualizer,
            );
            app::run(config)?;
        }
        Commands::Config => {
            let path = Settings::config_path();
            let settings = Settings::load_from(&path);
            let config = VisualizerConfig::resolve(CliOverrides::default(), &settings.visualizer);
            let status = if path.exists() { "" } else { " (not found, using defaults)" };
            println!("settings: {}{}", path.display(), status);
            println!("source    = {}", config.source);
            println!("mode      = {}", config.mode);
            println!("time_step = {}", config.time_step);
            println!("scale     = {}", config.scale);
        }
    }

    Ok(())
}
