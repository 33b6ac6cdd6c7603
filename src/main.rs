use anyhow::Result;
use clap::{Parser, Subcommand};
use cue_sync::sync::{evaluate, CueSchedule, DuckingState};
use cue_sync::{AppConfig, AudioDecoder, CueParser, DuckingRenderer, PlaybackSimulator};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "cue-sync")]
#[command(about = "SFX cue ducking synchronizer", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./cue-sync.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the duck window in seconds
    #[arg(long, global = true)]
    window: Option<f64>,

    /// Override the ducked volume (0.0 - 1.0)
    #[arg(long, global = true)]
    ducked_volume: Option<f32>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cues in a file and flag malformed timestamps
    Inspect {
        #[arg(value_name = "CUES")]
        cues: PathBuf,

        /// Media duration, to show timeline marker positions
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Evaluate the ducking state at a single playback time
    At {
        #[arg(value_name = "CUES")]
        cues: PathBuf,

        /// Playback position in seconds
        #[arg(short, long)]
        time: f64,
    },

    /// Play the cue list against a synthetic clock
    Simulate {
        #[arg(value_name = "CUES")]
        cues: PathBuf,

        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Clock ticks per second
        #[arg(long)]
        rate: Option<f64>,

        /// Number of times the media loops
        #[arg(long)]
        loops: Option<u32>,

        /// Export the report to file (supports .json, .md)
        #[arg(long)]
        export_report: Option<PathBuf>,
    },

    /// Apply ducking to an audio file and write a WAV
    Render {
        #[arg(value_name = "CUES")]
        cues: PathBuf,

        #[arg(value_name = "AUDIO")]
        audio: PathBuf,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        /// Clock ticks per second
        #[arg(long)]
        rate: Option<f64>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    // Flags win over the file, so check only once they are applied
    let mut config = AppConfig::read_from(cli.config.as_deref())?;
    if let Some(window) = cli.window {
        config.ducking.window_secs = window;
    }
    if let Some(volume) = cli.ducked_volume {
        config.ducking.ducked_volume = volume;
    }
    config.validate()?;
    Ok(config)
}

fn load_schedule(path: &Path) -> Result<CueSchedule> {
    let cues = CueParser::parse_json(path)?;
    info!(path = %path.display(), cues = cues.len(), "loaded cue list");
    Ok(CueSchedule::new(cues))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let Some(command) = cli.command else {
        println!("ℹ️  No command given. Try: cue-sync simulate cues.json --duration 15");
        return Ok(());
    };

    match command {
        Commands::Inspect { cues, duration } => {
            let records = CueParser::parse_json(&cues)?;
            println!("📋 {}", cues.display());
            print!("{}", CueParser::summarize(&records));

            if let Some(duration) = duration {
                let schedule = CueSchedule::new(records);
                println!("\n📍 Timeline markers ({:.2}s):", duration);
                for (cue, pos) in schedule.iter().zip(schedule.marker_positions(duration)) {
                    println!("  {:>5.1}%  {}", pos, cue.effect());
                }
            }
        }
        Commands::At { cues, time } => {
            let schedule = load_schedule(&cues)?;
            let result = evaluate(time, &schedule, &DuckingState::inactive(), &config.ducking);
            println!("{}", serde_json::to_string_pretty(&result.state)?);
        }
        Commands::Simulate {
            cues,
            duration,
            rate,
            loops,
            export_report,
        } => {
            if let Some(rate) = rate {
                config.playback.tick_rate_hz = rate;
            }
            if let Some(loops) = loops {
                config.playback.loop_count = loops;
            }

            let schedule = load_schedule(&cues)?;
            let report =
                PlaybackSimulator::new(config.ducking, config.playback).run(schedule, duration)?;

            println!("🎬 Simulated {} ticks", report.ticks);
            for event in &report.transitions {
                match &event.state.active_effect {
                    Some(effect) => println!(
                        "  {:>8.3}s  🔊 Ducking for {} (volume {})",
                        event.wall_time, effect, event.state.applied_volume
                    ),
                    None => println!(
                        "  {:>8.3}s  🔈 Released (volume {})",
                        event.wall_time, event.state.applied_volume
                    ),
                }
            }
            println!(
                "\n📊 {} duck(s), {:.2}s ducked",
                report.duck_count(),
                report.ducked_secs
            );

            if let Some(path) = export_report {
                report.export(&path)?;
                println!("\n📄 Report exported to: {}", path.display());
            }
        }
        Commands::Render {
            cues,
            audio,
            output,
            rate,
        } => {
            if let Some(rate) = rate {
                config.playback.tick_rate_hz = rate;
            }

            let schedule = load_schedule(&cues)?;
            println!("🎵 Decoding {}", audio.display());
            let decoded = AudioDecoder::decode(&audio)?;
            let ducked =
                DuckingRenderer::new(config.ducking, config.playback).apply(&decoded, schedule)?;
            DuckingRenderer::export(&output, &ducked)?;
            println!(
                "✓ Ducked audio ({:.2}s) written to: {}",
                ducked.duration_secs(),
                output.display()
            );
        }
    }

    Ok(())
}
