use clap::Parser;
use serde::Deserialize;
use sgmatch::{
    process_scene, resolve_scene, run_batch, AggregationPaths, SgmMatcher, SgmParams,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

/// Environment variable consulted when `--dataset` is not given.
const DATASET_ENV: &str = "MIDDLEBURY_DATASET_PATH";
const DATASET_FALLBACK: &str = "dataset";

#[derive(Parser, Debug)]
#[command(author, version, about = "Semi-global stereo matching over Middlebury-style datasets")]
struct Cli {
    /// Dataset root directory (falls back to MIDDLEBURY_DATASET_PATH).
    #[arg(short, long, value_name = "DIR")]
    dataset: Option<PathBuf>,
    /// Process a single scene by name instead of the whole dataset.
    #[arg(short, long, value_name = "NAME")]
    scene: Option<String>,
    /// Output directory for the per-scene images.
    #[arg(short, long, value_name = "DIR", default_value = "results")]
    output: PathBuf,
    /// JSON file overriding matcher parameters.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print an example parameter config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PathsConfig {
    Four,
    Eight,
}

impl From<PathsConfig> for AggregationPaths {
    fn from(value: PathsConfig) -> Self {
        match value {
            PathsConfig::Four => AggregationPaths::Four,
            PathsConfig::Eight => AggregationPaths::Eight,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ParamsJson {
    min_disparity: i32,
    num_disparities: usize,
    block_size: usize,
    /// Defaults to `8 * 3 * block_size^2` when omitted.
    p1: Option<u32>,
    /// Defaults to `32 * 3 * block_size^2` when omitted.
    p2: Option<u32>,
    disp12_max_diff: i32,
    uniqueness_ratio: u32,
    speckle_window_size: usize,
    speckle_range: i32,
    paths: PathsConfig,
}

impl Default for ParamsJson {
    fn default() -> Self {
        let cfg = SgmParams::default();
        Self {
            min_disparity: cfg.min_disparity,
            num_disparities: cfg.num_disparities,
            block_size: cfg.block_size,
            p1: None,
            p2: None,
            disp12_max_diff: cfg.disp12_max_diff,
            uniqueness_ratio: cfg.uniqueness_ratio,
            speckle_window_size: cfg.speckle_window_size,
            speckle_range: cfg.speckle_range,
            paths: PathsConfig::Eight,
        }
    }
}

impl From<ParamsJson> for SgmParams {
    fn from(value: ParamsJson) -> Self {
        let block_area = (value.block_size * value.block_size) as u32;
        Self {
            min_disparity: value.min_disparity,
            num_disparities: value.num_disparities,
            block_size: value.block_size,
            p1: value.p1.unwrap_or(8 * 3 * block_area),
            p2: value.p2.unwrap_or(32 * 3 * block_area),
            disp12_max_diff: value.disp12_max_diff,
            uniqueness_ratio: value.uniqueness_ratio,
            speckle_window_size: value.speckle_window_size,
            speckle_range: value.speckle_range,
            paths: value.paths.into(),
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("sgmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(ExitCode::SUCCESS);
    }

    let params: SgmParams = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let json: ParamsJson = serde_json::from_str(&text)?;
            json.into()
        }
        None => SgmParams::default(),
    };
    let matcher = SgmMatcher::new(params)?;

    let dataset = cli
        .dataset
        .or_else(|| std::env::var_os(DATASET_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DATASET_FALLBACK));
    if !dataset.is_dir() {
        return Err(format!("dataset root {} is not a directory", dataset.display()).into());
    }

    match cli.scene {
        Some(scene) => run_single_scene(&matcher, &dataset, &scene, &cli.output),
        None => run_dataset(&matcher, &dataset, &cli.output),
    }
}

fn run_single_scene(
    matcher: &SgmMatcher,
    dataset: &PathBuf,
    scene: &str,
    output: &PathBuf,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let record = resolve_scene(&dataset.join(scene))?;
    let (result, warnings) = process_scene(matcher, &record, output);
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    let outputs = result?;
    println!("{scene}: wrote {}", outputs.disparity.display());
    Ok(ExitCode::SUCCESS)
}

fn run_dataset(
    matcher: &SgmMatcher,
    dataset: &PathBuf,
    output: &PathBuf,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let report = run_batch(matcher, dataset, output)?;
    if report.outcomes.is_empty() {
        return Err(format!("no scenes found under {}", dataset.display()).into());
    }

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(outputs) => println!("ok      {}: {}", outcome.scene, outputs.disparity.display()),
            Err(err) => println!("failed  {}: {err}", outcome.scene),
        }
        for warning in &outcome.warnings {
            eprintln!("warning ({}): {warning}", outcome.scene);
        }
    }
    let succeeded = report.succeeded().count();
    let failed = report.failed().count();
    println!("{succeeded} succeeded, {failed} failed");

    // Individual scene failures do not fail a dataset run; an entirely
    // failed batch does.
    if report.all_failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
