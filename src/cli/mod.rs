//! Command-line interface for cave level extraction.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{InputConfig, LevelConfig};
use crate::core::loaders::{self, PointSequence};
use crate::core::transforms::elevation_range;
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "cave-levels")]
#[command(about = "Cave level extraction from survey point sequences", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the elevation-class distribution of near-horizontal segments
    Analyze {
        /// Input point file (CSV or ASCII PLY)
        input: PathBuf,
        /// CSV column holding the elevation
        #[arg(short, long)]
        elevation_field: Option<String>,
        /// Maximum absolute slope in degrees
        #[arg(long)]
        slope: Option<f64>,
        /// Maximum horizontal segment length in meters
        #[arg(long)]
        radius: Option<f64>,
        /// Elevation class width in meters
        #[arg(long)]
        interval: Option<f64>,
        /// Rescale class lengths to 0-1
        #[arg(long, overrides_with = "no_normalize")]
        normalize: bool,
        /// Keep class lengths in meters even if the config normalizes
        #[arg(long, overrides_with = "normalize")]
        no_normalize: bool,
        /// Write a bar chart PNG
        #[arg(long)]
        chart: Option<PathBuf>,
        /// Write the distribution as tab-separated text
        #[arg(long)]
        export: Option<PathBuf>,
        /// Write per-pair segment diagnostics as CSV
        #[arg(long)]
        segments: Option<PathBuf>,
        /// Write the validation summary as YAML
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Chart title (defaults to the input file name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Report point count, elevation range and pair geometry without filtering
    Inspect {
        /// Input point file (CSV or ASCII PLY)
        input: PathBuf,
        /// CSV column holding the elevation
        #[arg(short, long)]
        elevation_field: Option<String>,
    },

    /// Write the default configuration as YAML
    InitConfig {
        /// Output YAML file
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Resolve an on/off flag pair against the configured value.
fn resolve_flag(on: bool, off: bool, configured: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        configured
    }
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                error!("Failed to load config from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };

    let result = match cli.command {
        Commands::Analyze {
            input,
            elevation_field,
            slope,
            radius,
            interval,
            normalize,
            no_normalize,
            chart,
            export,
            segments,
            summary,
            title,
        } => {
            let levels = LevelConfig {
                slope_threshold_degrees: slope.unwrap_or(config.levels.slope_threshold_degrees),
                radius_threshold_meters: radius.unwrap_or(config.levels.radius_threshold_meters),
                elevation_class_interval_meters: interval
                    .unwrap_or(config.levels.elevation_class_interval_meters),
                normalize: resolve_flag(normalize, no_normalize, config.levels.normalize),
            };
            let outputs = AnalyzeOutputs {
                chart,
                export,
                segments,
                summary,
                title,
            };
            cmd_analyze(&input, elevation_field, &levels, &outputs, &config)
        }
        Commands::Inspect {
            input,
            elevation_field,
        } => cmd_inspect(&input, elevation_field, &config),
        Commands::InitConfig { output, force } => cmd_init_config(&output, force, &config),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Optional output files for the `analyze` command.
struct AnalyzeOutputs {
    chart: Option<PathBuf>,
    export: Option<PathBuf>,
    segments: Option<PathBuf>,
    summary: Option<PathBuf>,
    title: Option<String>,
}

fn input_fields(elevation_field: Option<String>, config: &PipelineConfig) -> InputConfig {
    let mut fields = config.input.clone();
    if let Some(name) = elevation_field {
        fields.elevation_field = name;
    }
    fields
}

fn load_survey(input: &Path, fields: &InputConfig) -> Result<PointSequence> {
    let spinner = create_spinner("Loading survey points...");
    let result = loaders::load_points(input, fields);
    spinner.finish_and_clear();
    result.with_context(|| format!("failed to load points from {}", input.display()))
}

fn cmd_analyze(
    input: &Path,
    elevation_field: Option<String>,
    levels: &LevelConfig,
    outputs: &AnalyzeOutputs,
    config: &PipelineConfig,
) -> Result<()> {
    use crate::core::writers;
    use crate::processors::{analyze_levels, SegmentFilter};
    use crate::visualization;

    let start = Instant::now();

    // Reject bad parameters before touching the input
    levels.validate()?;

    let fields = input_fields(elevation_field, config);

    println!("Extracting cave levels...");
    println!("Input: {}", input.display());
    println!("Elevation field: {}", fields.elevation_field);
    println!("Parameters:");
    println!("  slope threshold: {} deg", levels.slope_threshold_degrees);
    println!("  radius threshold: {} m", levels.radius_threshold_meters);
    println!("  class interval: {} m", levels.elevation_class_interval_meters);
    println!("  normalize: {}", levels.normalize);

    let survey = load_survey(input, &fields)?;
    println!("Loaded {} points", survey.len());

    println!("Classifying segments and banding by elevation...");
    let analysis = analyze_levels(survey.as_slice(), levels)?;

    if let Some(path) = &outputs.export {
        writers::write_distribution_tsv(path, &analysis.series)?;
        info!("Distribution TSV -> {}", path.display());
    }

    if let Some(path) = &outputs.segments {
        let filter = SegmentFilter::from_config(levels);
        writers::write_segments_csv(path, survey.as_slice(), &filter)?;
        info!("Segments CSV -> {}", path.display());
    }

    if let Some(path) = &outputs.summary {
        writers::write_summary_yaml(path, &analysis.summary)?;
        info!("Summary YAML -> {}", path.display());
    }

    if let Some(path) = &outputs.chart {
        let title = outputs.title.clone().unwrap_or_else(|| {
            input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Cave levels".to_string())
        });

        let spinner = create_spinner("Rendering chart...");
        let result =
            visualization::plot_distribution(path, &analysis.series, &config.chart, &title);
        spinner.finish_and_clear();
        result.with_context(|| format!("failed to render chart to {}", path.display()))?;
        info!("Chart PNG -> {}", path.display());
    }

    println!();
    println!("{:<20} {:>18}", "Elevation class", analysis.series.value_axis_label());
    for entry in &analysis.series {
        println!("{:<20} {:>18.2}", entry.label(), entry.length);
    }

    let mut items = analysis.summary.items();
    items.push(("Classes", analysis.series.len().to_string()));
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Cave Level Extraction Complete", &items);

    Ok(())
}

fn cmd_inspect(
    input: &Path,
    elevation_field: Option<String>,
    config: &PipelineConfig,
) -> Result<()> {
    use crate::processors::segments;

    let start = Instant::now();
    let fields = input_fields(elevation_field, config);

    println!("Inspecting survey points...");
    println!("Input: {}", input.display());

    let survey = load_survey(input, &fields)?;

    let range = match elevation_range(survey.as_slice()) {
        Some((z_min, z_max)) => format!("{:.2} - {:.2} meters", z_min, z_max),
        None => "n/a".to_string(),
    };

    let mut total_distance = 0.0;
    let mut max_distance: f64 = 0.0;
    let mut max_slope: f64 = 0.0;
    for segment in segments(survey.as_slice()) {
        total_distance += segment.horizontal_distance;
        max_distance = max_distance.max(segment.horizontal_distance);
        max_slope = max_slope.max(segment.slope_degrees.abs());
    }
    let pairs = survey.pair_count();
    let mean_distance = if pairs > 0 {
        total_distance / pairs as f64
    } else {
        0.0
    };

    print_summary(
        "Survey Inspection",
        &[
            ("Input file", input.display().to_string()),
            ("Points", survey.len().to_string()),
            ("Skipped rows", survey.skipped_rows.to_string()),
            ("Elevation range", range),
            ("Point pairs", pairs.to_string()),
            ("Mean pair distance", format!("{:.2} m", mean_distance)),
            ("Max pair distance", format!("{:.2} m", max_distance)),
            ("Max abs slope", format!("{:.2} deg", max_slope)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_init_config(output: &Path, force: bool, config: &PipelineConfig) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    config
        .to_yaml(output)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    print_summary(
        "Configuration Written",
        &[
            ("Output file", output.display().to_string()),
            ("Elevation field", config.input.elevation_field.clone()),
            (
                "Class interval",
                format!("{} m", config.levels.elevation_class_interval_meters),
            ),
        ],
    );

    Ok(())
}
