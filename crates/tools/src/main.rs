use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formats::{FlightRange, FlightRecord, parse_flights};
use scene::config::SceneConfig;
use tools::{export_tracks, summarize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "flightglobe", about = "Inspect and export flight globe data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one line per flight: endpoints, angle, arc length, duration.
    Inspect {
        flights: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Slice of the table, e.g. `0..100` or `250..`.
        #[arg(long)]
        range: Option<FlightRange>,
    },
    /// Write sampled tracks and control points as JSON.
    Export {
        flights: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        range: Option<FlightRange>,
        /// Points per track; defaults to `flights.track_samples`.
        #[arg(long)]
        samples: Option<u32>,
    },
    /// Show the scene configuration.
    Config {
        #[arg(long)]
        print_default: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Inspect {
            flights,
            config,
            range,
        } => {
            let config = load_config(config.as_deref())?;
            let records = load_flights(&flights)?;
            let range = range.unwrap_or(config.flights.range);
            let rows = summarize(&records, range, &config).context("building flight paths")?;
            println!(
                "{:>5}  {:>18} -> {:>18}  {:>8}  {:>7}  {:>12}",
                "#", "start", "end", "angle", "arc", "duration"
            );
            for row in &rows {
                println!("{row}");
            }
            info!(total = records.len(), shown = rows.len(), "inspected flights");
        }
        Command::Export {
            flights,
            out,
            config,
            range,
            samples,
        } => {
            let config = load_config(config.as_deref())?;
            let records = load_flights(&flights)?;
            let range = range.unwrap_or(config.flights.range);
            let samples = samples.unwrap_or(config.flights.track_samples);
            let tracks = export_tracks(&records, range, &config, samples)
                .context("building flight paths")?;
            let payload = serde_json::to_string_pretty(&tracks)?;
            fs::write(&out, payload).with_context(|| format!("writing {}", out.display()))?;
            info!(tracks = tracks.len(), out = %out.display(), "exported tracks");
        }
        Command::Config { print_default } => {
            if !print_default {
                anyhow::bail!("nothing to do; try --print-default");
            }
            println!("{}", serde_json::to_string_pretty(&SceneConfig::default())?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SceneConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_flights(path: &Path) -> Result<Vec<FlightRecord>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_flights(&text).with_context(|| format!("parsing {}", path.display()))
}
