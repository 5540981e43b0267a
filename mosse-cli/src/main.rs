use clap::Parser;
use mosse::image::io::load_gray_image;
use mosse::{
    DirectDft, FftEngine, MosseError, ParFftEngine, PngSink, Region, SpectralEngine, TrackReport,
    Tracker, TrackerConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "MOSSE tracker CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output (spans around init/update, peak events).
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum EngineConfig {
    #[default]
    Fft,
    Direct,
    Parallel,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct RegionJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<RegionJson> for Region {
    fn from(value: RegionJson) -> Self {
        Region::new(value.x, value.y, value.width, value.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct TrackerConfigJson {
    learning_rate: f64,
    reg_eps: f64,
    sigma_factor: f64,
    min_sigma: f64,
    min_region_size: usize,
    min_psr: f64,
    min_peak_to_mean: f64,
    sidelobe_radius: usize,
    init_perturbations: usize,
    perturbation_scale: f64,
    perturbation_seed: u64,
}

impl Default for TrackerConfigJson {
    fn default() -> Self {
        let cfg = TrackerConfig::default();
        Self {
            learning_rate: cfg.learning_rate,
            reg_eps: cfg.reg_eps,
            sigma_factor: cfg.sigma_factor,
            min_sigma: cfg.min_sigma,
            min_region_size: cfg.min_region_size,
            min_psr: cfg.min_psr,
            min_peak_to_mean: cfg.min_peak_to_mean,
            sidelobe_radius: cfg.sidelobe_radius,
            init_perturbations: cfg.init_perturbations,
            perturbation_scale: cfg.perturbation_scale,
            perturbation_seed: cfg.perturbation_seed,
        }
    }
}

impl From<TrackerConfigJson> for TrackerConfig {
    fn from(value: TrackerConfigJson) -> Self {
        Self {
            learning_rate: value.learning_rate,
            reg_eps: value.reg_eps,
            sigma_factor: value.sigma_factor,
            min_sigma: value.min_sigma,
            min_region_size: value.min_region_size,
            min_psr: value.min_psr,
            min_peak_to_mean: value.min_peak_to_mean,
            sidelobe_radius: value.sidelobe_radius,
            init_perturbations: value.init_perturbations,
            perturbation_scale: value.perturbation_scale,
            perturbation_seed: value.perturbation_seed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    frames: Vec<String>,
    region: Option<RegionJson>,
    engine: EngineConfig,
    output_path: Option<String>,
    dump_dir: Option<String>,
    tracker: TrackerConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            region: None,
            engine: EngineConfig::Fft,
            output_path: None,
            dump_dir: None,
            tracker: TrackerConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum FrameStatus {
    Init,
    Ok,
    Lost,
    Mismatch,
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: usize,
    status: FrameStatus,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    subpixel_dx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subpixel_dy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    psr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peak_to_mean: Option<f64>,
    near_boundary: bool,
}

impl FrameRecord {
    fn at(frame: usize, status: FrameStatus, region: Region) -> Self {
        Self {
            frame,
            status,
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            subpixel_dx: None,
            subpixel_dy: None,
            psr: None,
            peak_to_mean: None,
            near_boundary: false,
        }
    }

    fn tracked(frame: usize, report: &TrackReport) -> Self {
        Self {
            subpixel_dx: Some(report.subpixel_dx),
            subpixel_dy: Some(report.subpixel_dy),
            psr: Some(report.psr),
            peak_to_mean: Some(report.peak_to_mean),
            near_boundary: report.near_boundary,
            ..Self::at(frame, FrameStatus::Ok, report.region)
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    tracked: usize,
    lost: usize,
    frames: Vec<FrameRecord>,
}

fn run<E: SpectralEngine>(
    config: &Config,
    tracker_cfg: TrackerConfig,
    seed: Region,
) -> Result<Output, Box<dyn std::error::Error>> {
    let mut tracker: Tracker<E> = Tracker::new(tracker_cfg)?;
    let mut sink = config
        .dump_dir
        .as_ref()
        .map(|dir| PngSink::new(dir, "frame"));
    let mut records = Vec::with_capacity(config.frames.len());
    let eta = tracker.config().learning_rate;

    for (index, path) in config.frames.iter().enumerate() {
        let image = load_gray_image(path)?;
        let view = image.view();
        if index == 0 {
            tracker.init(view, seed)?;
            records.push(FrameRecord::at(index, FrameStatus::Init, seed));
        } else {
            let record = match tracker.update_with_report(view, eta) {
                Ok(report) => FrameRecord::tracked(index, &report),
                Err(MosseError::TrackingLost { .. }) => {
                    FrameRecord::at(index, FrameStatus::Lost, current_region(&tracker)?)
                }
                Err(MosseError::FrameMismatch { .. }) => {
                    FrameRecord::at(index, FrameStatus::Mismatch, current_region(&tracker)?)
                }
                Err(err) => return Err(err.into()),
            };
            records.push(record);
        }
        if let Some(sink) = sink.as_mut() {
            tracker.dump(sink)?;
        }
    }

    let tracked = records
        .iter()
        .filter(|r| matches!(r.status, FrameStatus::Ok))
        .count();
    let lost = records
        .iter()
        .filter(|r| matches!(r.status, FrameStatus::Lost))
        .count();
    Ok(Output {
        tracked,
        lost,
        frames: records,
    })
}

fn current_region<E: SpectralEngine>(tracker: &Tracker<E>) -> Result<Region, MosseError> {
    tracker.region().ok_or(MosseError::NotInitialized)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("mosse=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frames.is_empty() {
        return Err("frames must list at least one image".into());
    }
    let Some(seed) = config.region.map(Region::from) else {
        return Err("region must be set in the config".into());
    };
    let tracker_cfg = TrackerConfig::from(config.tracker.clone());

    let output = match config.engine {
        EngineConfig::Fft => run::<FftEngine>(&config, tracker_cfg, seed)?,
        EngineConfig::Direct => run::<DirectDft>(&config, tracker_cfg, seed)?,
        EngineConfig::Parallel => run::<ParFftEngine>(&config, tracker_cfg, seed)?,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match &config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
