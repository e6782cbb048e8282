use clap::Parser;
use ghmatch::io::{load_code_image, save_accumulator_png};
use ghmatch::{
    BuildConfig, IdealVotes, Match, Matcher, MatcherConfig, TableStrategy, VoteConfig, VoteMode,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Generalized Hough shape matcher (JSON config driven)")]
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
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyConfig {
    #[default]
    WeightedMerge,
    UnweightedList,
}

impl From<StrategyConfig> for TableStrategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::WeightedMerge => TableStrategy::WeightedMerge,
            StrategyConfig::UnweightedList => TableStrategy::UnweightedList,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum IdealConfig {
    #[default]
    SelfMatch,
    PixelCount,
}

impl From<IdealConfig> for IdealVotes {
    fn from(value: IdealConfig) -> Self {
        match value {
            IdealConfig::SelfMatch => IdealVotes::SelfMatch,
            IdealConfig::PixelCount => IdealVotes::PixelCount,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    AllPixels,
    Bounded,
}

impl From<ModeConfig> for VoteMode {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::AllPixels => VoteMode::AllPixels,
            ModeConfig::Bounded => VoteMode::Bounded,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BuildConfigJson {
    strategy: StrategyConfig,
    ideal: IdealConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct VoteConfigJson {
    step: usize,
    mode: ModeConfig,
    parallel: bool,
}

impl Default for VoteConfigJson {
    fn default() -> Self {
        let cfg = VoteConfig::default();
        Self {
            step: cfg.step,
            mode: ModeConfig::AllPixels,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    template_path: String,
    scene_paths: Vec<String>,
    output_path: Option<String>,
    accumulator_dir: Option<String>,
    min_confidence: f32,
    build: BuildConfigJson,
    vote: VoteConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_path: String::new(),
            scene_paths: Vec::new(),
            output_path: None,
            accumulator_dir: None,
            min_confidence: MatcherConfig::default().min_confidence,
            build: BuildConfigJson::default(),
            vote: VoteConfigJson::default(),
        }
    }
}

fn matcher_config(
    build: BuildConfigJson,
    vote: VoteConfigJson,
    min_confidence: f32,
) -> MatcherConfig {
    MatcherConfig {
        build: BuildConfig {
            strategy: build.strategy.into(),
            ideal: build.ideal.into(),
        },
        vote: VoteConfig {
            step: vote.step,
            mode: vote.mode.into(),
            parallel: vote.parallel,
        },
        min_confidence,
    }
}

#[derive(Debug, Serialize)]
struct TableSummary {
    width: usize,
    height: usize,
    codes: usize,
    offsets: usize,
    pixel_count: usize,
    ideal_votes: u32,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    scene: String,
    x: usize,
    y: usize,
    votes: u32,
    confidence: f32,
    accepted: bool,
    bbox: [i64; 4],
}

impl MatchRecord {
    fn new(scene: &str, found: Match, footprint: (usize, usize), min_confidence: f32) -> Self {
        let bbox = found.bbox(footprint);
        Self {
            scene: scene.to_owned(),
            x: found.x,
            y: found.y,
            votes: found.votes,
            confidence: found.confidence,
            accepted: found.is_accepted(min_confidence),
            bbox: [bbox.x, bbox.y, bbox.width as i64, bbox.height as i64],
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    table: TableSummary,
    matches: Vec<MatchRecord>,
}

fn accumulator_path(dir: &str, scene: &str) -> PathBuf {
    let stem = Path::new(scene)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scene");
    Path::new(dir).join(format!("{stem}_votes.png"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("ghmatch=info".parse()?))
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
    if config.template_path.is_empty() || config.scene_paths.is_empty() {
        return Err("template_path and scene_paths must be set in the config".into());
    }

    let min_confidence = config.min_confidence;
    let matcher_cfg = matcher_config(config.build, config.vote, min_confidence);

    let template = load_code_image(&config.template_path)?;
    let matcher = Matcher::from_template(template.view(), matcher_cfg)?;
    let table = matcher.table();
    tracing::info!(
        template = %config.template_path,
        offsets = table.len(),
        ideal_votes = table.ideal_votes(),
        "template loaded"
    );
    if table.ideal_votes() == 0 {
        tracing::warn!("template has no non-zero codes; every confidence will be 0");
    }

    if let Some(dir) = &config.accumulator_dir {
        fs::create_dir_all(dir)?;
    }

    let mut matches = Vec::with_capacity(config.scene_paths.len());
    for scene_path in &config.scene_paths {
        let scene = load_code_image(scene_path)?;
        let (found, acc) = matcher.find_with_accumulator(scene.view())?;
        if let Some(dir) = &config.accumulator_dir {
            save_accumulator_png(&acc, accumulator_path(dir, scene_path))?;
        }
        matches.push(MatchRecord::new(
            scene_path,
            found,
            table.footprint(),
            min_confidence,
        ));
    }

    let output = Output {
        table: TableSummary {
            width: table.width(),
            height: table.height(),
            codes: table.num_codes(),
            offsets: table.len(),
            pixel_count: table.pixel_count(),
            ideal_votes: table.ideal_votes(),
        },
        matches,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
