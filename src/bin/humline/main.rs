//! humline - stochastic interference synthesizer
//!
//! Run with: cargo run -- <command>
//!
//! - `humline render` - offline batch render to WAV
//! - `humline bounce` - live graph (ring mod, tape, arc) rendered to WAV
//! - `humline play`   - live engine on the default output device
//! - `humline presets` - list built-in presets

mod play;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use humline::params::presets;
use humline::render::{bounce, wav};
use humline::{OfflineRenderer, ParameterSet, RenderConfig};

#[derive(Parser)]
#[command(name = "humline")]
#[command(about = "Mains hum, contact sparks and tape wobble, live or offline")]
#[command(version)]
struct Cli {
    /// Debug-level logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Offline batch render (centred envelope, uniform sparks) to WAV
    Render(RenderArgs),

    /// Render the live graph without a device, to WAV
    Bounce(BounceArgs),

    /// Play the live graph on the default output device
    Play(PlayArgs),

    /// List built-in presets
    Presets,
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long, default_value_t = 1.0)]
    duration: f32,
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,
    #[arg(long, default_value_t = 0.6)]
    threshold: f32,
    #[arg(long, default_value_t = 500.0)]
    smoothness: f32,
    #[arg(long, default_value_t = 30.0)]
    spark_gain: f32,
    #[arg(long, default_value_t = 0.5)]
    hum_gain: f32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(short, long, default_value = "humline.wav")]
    out: PathBuf,
}

/// Where a live parameter set comes from.
#[derive(Args)]
struct SourceArgs {
    /// Built-in preset name (see `humline presets`)
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,
    /// TOML file with a full or partial parameter set
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct BounceArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, default_value_t = 5.0)]
    seconds: f32,
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(short, long, default_value = "bounce.wav")]
    out: PathBuf,
}

#[derive(Args)]
struct PlayArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Bounce(args) => run_bounce(args),
        Commands::Play(args) => {
            let params = load_params(&args.source)?;
            play::run(params, args.seconds, args.seed)
        }
        Commands::Presets => {
            list_presets();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "humline=debug" } else { "humline=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn run_render(args: RenderArgs) -> EyreResult<()> {
    let config = RenderConfig {
        duration_seconds: args.duration,
        sample_rate: args.sample_rate,
        threshold: args.threshold,
        smoothness: args.smoothness,
        spark_gain: args.spark_gain,
        hum_gain: args.hum_gain,
    };

    let mut renderer = OfflineRenderer::new(config);
    if let Some(seed) = args.seed {
        renderer = renderer.with_seed(seed);
    }
    let output = renderer.render().wrap_err("offline render failed")?;

    let wav = output.to_wav().wrap_err("WAV encoding failed")?;
    write_file(&args.out, &wav)?;
    println!(
        "{}: {:.2} s, {} samples, contact closed {:.0}% of the time",
        args.out.display(),
        output.duration(),
        output.len(),
        output.connected_ratio(config.threshold) * 100.0
    );
    Ok(())
}

fn run_bounce(args: BounceArgs) -> EyreResult<()> {
    let params = load_params(&args.source)?;
    let samples = bounce(params, args.seconds, args.sample_rate, args.seed)
        .wrap_err("bounce failed")?;

    let wav = wav::encode_wav(&samples, args.sample_rate).wrap_err("WAV encoding failed")?;
    write_file(&args.out, &wav)?;
    println!("{}: {} samples", args.out.display(), samples.len());
    Ok(())
}

/// Preset, config file, or the default preset.
fn load_params(source: &SourceArgs) -> EyreResult<ParameterSet> {
    if let Some(name) = &source.preset {
        let preset = presets::by_name(name).ok_or_else(|| eyre!("unknown preset '{name}'"))?;
        info!(preset = preset.name, "preset loaded");
        return Ok(preset.params);
    }

    if let Some(path) = &source.config {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let params: ParameterSet = toml::from_str(&text)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        info!(config = %path.display(), "parameters loaded");
        return Ok(params);
    }

    Ok(ParameterSet::default())
}

fn write_file(path: &Path, bytes: &[u8]) -> EyreResult<()> {
    std::fs::write(path, bytes).wrap_err_with(|| format!("failed to write {}", path.display()))
}

fn list_presets() {
    for preset in presets::PRESETS.iter() {
        let p = &preset.params;
        println!("{:<16} {}", preset.name, preset.description);
        println!(
            "{:<16} threshold {:.2}  smoothness {:>4.0}  spark {:>5.1}  noise {:.2}  hum {:.2}  volume {:.2}",
            "", p.threshold, p.smoothness, p.spark_gain, p.noise_gain, p.hum_gain, p.master_volume
        );
    }
}
