//! `fft-tool`: forward and inverse spectral transforms over a directory of
//! images.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spectrum_core::{
    DisplayScaling, FileSystemStorage, LogFormat, LoggingConfig, OutputKeys, Pipeline, RunJournal,
    SpectrumConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fft-tool",
    version,
    about = "Store an image's centered spectrum as magnitude/phase images and invert it"
)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage root that every key is resolved against (overrides config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Append a JSON line per run to this file (overrides config)
    #[arg(long, global = true)]
    journal: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Image -> magnitude and phase images
    Forward(ForwardArgs),
    /// Magnitude and phase images -> image
    Inverse(InverseArgs),
}

#[derive(Args, Debug)]
struct ForwardArgs {
    /// Key of the input image
    input: String,
    /// Key for the magnitude image; derived from the input name when omitted
    #[arg(requires = "phase")]
    magnitude: Option<String>,
    /// Key for the phase image
    phase: Option<String>,
    /// Also write the bounds as a standalone JSON record under this key
    #[arg(long)]
    metadata: Option<String>,
}

#[derive(Args, Debug)]
struct InverseArgs {
    magnitude: String,
    phase: String,
    output: String,
    /// Read bounds from this JSON record instead of the magnitude sidecar
    #[arg(long)]
    metadata: Option<String>,
    /// min-max or preserve (overrides config)
    #[arg(long)]
    scaling: Option<DisplayScaling>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SpectrumConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SpectrumConfig::default(),
    };
    if let Some(root) = cli.root {
        config.storage.root = root;
    }
    if let Some(journal) = cli.journal {
        config.logging.journal = Some(journal);
    }
    if let Command::Inverse(InverseArgs {
        scaling: Some(scaling),
        ..
    }) = &cli.command
    {
        config.pipeline.scaling = *scaling;
    }

    init_tracing(&config.logging);
    debug!(
        config = ?cli.config,
        root = %config.storage.root.display(),
        scaling = ?config.pipeline.scaling,
        journal = ?config.logging.journal,
        "configuration resolved"
    );

    let storage = FileSystemStorage::new(&config.storage.root);
    let mut pipeline = Pipeline::new(storage, config.pipeline.clone());
    if let Some(path) = &config.logging.journal {
        pipeline = pipeline.with_journal(RunJournal::new(path));
    }

    match cli.command {
        Command::Forward(args) => run_forward(&pipeline, args),
        Command::Inverse(args) => run_inverse(&pipeline, args),
    }
}

fn run_forward(pipeline: &Pipeline<FileSystemStorage>, args: ForwardArgs) -> Result<()> {
    let keys = match (args.magnitude, args.phase) {
        (Some(magnitude), Some(phase)) => OutputKeys { magnitude, phase },
        _ => OutputKeys::derive(&args.input, &pipeline.config().output_prefix)
            .with_context(|| format!("deriving output names for '{}'", args.input))?,
    };

    let report = pipeline
        .forward(
            &args.input,
            &keys.magnitude,
            &keys.phase,
            args.metadata.as_deref(),
        )
        .with_context(|| format!("forward transform of '{}' failed", args.input))?;

    println!("FFT complete ({}x{}).", report.height, report.width);
    println!("  magnitude: {}", report.magnitude_key);
    println!("  phase:     {}", report.phase_key);
    if let Some(key) = &report.metadata_key {
        println!("  metadata:  {}", key);
    }
    println!(
        "  mag_min = {}, mag_max = {}",
        report.metadata.mag_min, report.metadata.mag_max
    );
    Ok(())
}

fn run_inverse(pipeline: &Pipeline<FileSystemStorage>, args: InverseArgs) -> Result<()> {
    let report = pipeline
        .inverse(
            &args.magnitude,
            &args.phase,
            &args.output,
            args.metadata.as_deref(),
        )
        .with_context(|| {
            format!(
                "inverse transform of '{}' + '{}' failed",
                args.magnitude, args.phase
            )
        })?;

    println!(
        "Inverse FFT complete ({}x{}, {:?} scaling). Image saved to {}",
        report.height, report.width, report.scaling, report.output_key
    );
    Ok(())
}

/// Diagnostics go to stderr so stdout carries only the run summary.
fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(err) = installed {
        eprintln!("warning: tracing subscriber not installed: {err}");
    }
}
