//! Sketchy dataset CLI
//!
//! Subcommands prepare the train/test layout, sample triplet batches from a
//! prepared split, and score retrieval from feature files.

use super::config::CliConfigBuilder;
use crate::{
    evaluate_retrieval, events, prepare_dataset, services::create_cli_progress_reporter, spans,
    tracing_config::init_cli_tracing, FeatureSet, Triplet, TripletIndex, TripletLoader,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use instant::Instant;
use tracing::{debug, info};

/// Default source photo root of the rendered Sketchy database
pub const DEFAULT_SOURCE_PHOTO_ROOT: &str =
    "~/train_data/rendered_256x256/256x256/photo/tx_000000000000";
/// Default source sketch root of the rendered Sketchy database
pub const DEFAULT_SOURCE_SKETCH_ROOT: &str =
    "~/train_data/rendered_256x256/256x256/sketch/tx_000000000000";

/// Sketch-based image retrieval dataset tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "sketchy-dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console, global = true)]
    pub log_format: CliLogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split photos and sketches into train/test buckets and reconcile orphans
    Prepare(PrepareArgs),
    /// Sample triplet batches from a prepared split
    Triplets(TripletArgs),
    /// Score sketch-to-photo retrieval from feature files
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct PrepareArgs {
    /// Path to the source photo root (`<category>/<photo>`)
    #[arg(long, default_value = DEFAULT_SOURCE_PHOTO_ROOT)]
    pub source_photo_root: String,

    /// Path to the source sketch root (`<category>/<sketch>`)
    #[arg(long, default_value = DEFAULT_SOURCE_SKETCH_ROOT)]
    pub source_sketch_root: String,

    /// Training dataset root directory
    #[arg(long, default_value = crate::config::DEFAULT_TARGET)]
    pub target: String,

    /// Remove everything in the target root before splitting (yes/no, bare flag = yes)
    #[arg(
        long,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = parse_bool,
        action = ArgAction::Set
    )]
    pub clean_target: bool,

    /// File listing test photos, relative to the photo root
    #[arg(long, default_value = crate::config::DEFAULT_TEST_IMAGE_FILES)]
    pub test_image_files: String,

    /// File listing test sketches, relative to the sketch root
    #[arg(long, default_value = crate::config::DEFAULT_TEST_SKETCH_FILES)]
    pub test_sketch_files: String,

    /// Only consider files whose name matches this glob (e.g. "*.jpg")
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Ignore dot-files such as `.DS_Store`
    #[arg(long)]
    pub skip_hidden: bool,

    /// Write a JSON summary of the run to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Show a progress bar instead of stage log lines
    #[arg(long)]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct TripletArgs {
    /// Photo bucket of a prepared split, e.g. `dataset/photo-train`
    #[arg(long)]
    pub photo_root: String,

    /// Sketch bucket of the same split, e.g. `dataset/sketch-triplet-train`
    #[arg(long)]
    pub sketch_root: String,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of epochs to sample
    #[arg(long, default_value_t = 1)]
    pub epochs: u64,

    /// Seed for reproducible shuffling and negative sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep anchors in index order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Keep the trailing incomplete batch
    #[arg(long)]
    pub keep_last: bool,

    /// Write sampled batches as JSON instead of printing them
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Feature file of the sketch queries
    #[arg(long)]
    pub sketch_features: PathBuf,

    /// Feature file of the photo gallery
    #[arg(long)]
    pub photo_features: PathBuf,

    /// Comma-separated recall/precision cut-offs
    #[arg(long, value_delimiter = ',', default_value = "1,5,10")]
    pub top_k: Vec<usize>,

    /// Write metrics as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliLogFormat {
    /// Colored human-readable output
    Console,
    /// Plain compact output for CI logs
    Compact,
    /// JSON lines (needs the `tracing-json` feature)
    Json,
}

#[derive(Serialize)]
struct SampledEpoch {
    epoch: u64,
    batches: Vec<Vec<Triplet>>,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = CliConfigBuilder::tracing_format(cli.log_format);
    let session_id =
        init_cli_tracing(cli.verbose, format).context("Failed to initialize tracing")?;
    if cli.log_format == CliLogFormat::Json && cfg!(not(feature = "tracing-json")) {
        events::warning_with_recommendation(
            "JSON logs are not compiled in, using compact output",
            "rebuild with --features tracing-json",
        );
    }

    let command_name = match &cli.command {
        Command::Prepare(_) => "prepare",
        Command::Triplets(_) => "triplets",
        Command::Evaluate(_) => "evaluate",
    };
    let span = spans::session(&session_id, command_name);
    let _enter = span.enter();

    let start_time = Instant::now();
    let result = match &cli.command {
        Command::Prepare(args) => run_prepare(args, cli.verbose),
        Command::Triplets(args) => run_triplets(args),
        Command::Evaluate(args) => run_evaluate(args),
    };

    if let Err(err) = &result {
        events::error_with_context(&**err, command_name);
    }
    events::performance_metric(command_name, start_time.elapsed().as_millis() as u64);
    result
}

fn run_prepare(args: &PrepareArgs, verbose: u8) -> Result<()> {
    let config = CliConfigBuilder::prepare_config(args).context("Invalid prepare arguments")?;
    info!(
        photo_root = %config.source_photo_root.display(),
        sketch_root = %config.source_sketch_root.display(),
        target = %config.target.display(),
        "Preparing dataset"
    );

    let reporter = create_cli_progress_reporter(args.progress, verbose > 0);
    let summary =
        prepare_dataset(&config, reporter.as_ref()).context("Dataset preparation failed")?;

    if !summary.reconcile.unmatched.is_empty() {
        events::warning_with_recommendation(
            &format!(
                "{} photo(s) have no sketches in either split",
                summary.reconcile.unmatched.len()
            ),
            "check the sketch tree for missing categories",
        );
    }

    if let Some(report) = &args.report {
        summary
            .save_json(report)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        events::progress(&format!("Report written to {}", report.display()), "📝");
    }

    println!("{}", summary.layout.training_arguments());
    Ok(())
}

fn run_triplets(args: &TripletArgs) -> Result<()> {
    let loader_config = CliConfigBuilder::loader_config(args).context("Invalid loader arguments")?;
    let photo_root = CliConfigBuilder::expand_tilde(&args.photo_root);
    let sketch_root = CliConfigBuilder::expand_tilde(&args.sketch_root);

    let index = TripletIndex::build(&photo_root, &sketch_root)
        .context("Failed to index prepared split")?;
    let loader = TripletLoader::new(&index, loader_config).context("Failed to create loader")?;
    info!(
        anchors = index.len(),
        categories = index.categories().len(),
        batches_per_epoch = loader.len(),
        "Sampling triplets"
    );

    let epochs: Vec<SampledEpoch> = (0..args.epochs)
        .map(|epoch| SampledEpoch {
            epoch,
            batches: loader.epoch(epoch).collect(),
        })
        .collect();

    match &args.output {
        Some(path) => write_json(path, &epochs)?,
        None => print_epochs(&epochs),
    }
    Ok(())
}

fn print_epochs(epochs: &[SampledEpoch]) {
    for sampled in epochs {
        for (batch_idx, batch) in sampled.batches.iter().enumerate() {
            for triplet in batch {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    sampled.epoch,
                    batch_idx,
                    triplet.anchor.display(),
                    triplet.positive.display(),
                    triplet.negative.display()
                );
            }
        }
    }
}

fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let config = CliConfigBuilder::eval_config(args).context("Invalid evaluation arguments")?;
    let sketches = FeatureSet::load(&args.sketch_features).with_context(|| {
        format!(
            "Failed to load sketch features: {}",
            args.sketch_features.display()
        )
    })?;
    let photos = FeatureSet::load(&args.photo_features).with_context(|| {
        format!(
            "Failed to load photo features: {}",
            args.photo_features.display()
        )
    })?;
    debug!(sketch_model = %sketches.model, photo_model = %photos.model, "Loaded features");

    let metrics = evaluate_retrieval(&sketches, &photos, &config)?;
    println!("{}", metrics);

    if let Some(path) = &args.output {
        write_json(path, &metrics)?;
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    events::progress(&format!("Wrote {}", path.display()), "📝");
    Ok(())
}

/// Parse a yes/no style boolean
pub fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err("Boolean value expected.".to_string()),
    }
}
