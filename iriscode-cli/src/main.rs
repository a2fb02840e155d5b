use clap::{Parser, Subcommand};
use iriscode::io::load_gray_image;
use iriscode::{EnrollmentRecord, IrisPipeline, MatchDecision, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Iris enrollment and verification (JSON config driven)")]
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
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a template from an eye image and store it under a label.
    Enroll {
        /// Eye image to enroll.
        image: PathBuf,
        /// Identity label; the record is written to `<templates_dir>/<label>.json`.
        label: String,
    },
    /// Compare a live capture against the record stored for a label.
    Verify {
        /// Live eye image.
        image: PathBuf,
        /// Identity label to verify against.
        label: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    templates_dir: PathBuf,
    output_path: Option<String>,
    pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            output_path: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EnrollOutput {
    label: String,
    record_path: String,
    pupil_radius: f32,
    iris_radius: f32,
    masked_fraction: f32,
}

#[derive(Debug, Serialize)]
struct VerifyOutput {
    label: String,
    distance: f32,
    valid_bits: u64,
    threshold: f32,
    decision: &'static str,
}

fn record_path(dir: &Path, label: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let valid = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !label.starts_with('.');
    if !valid {
        return Err(format!("invalid label {label:?}: use letters, digits, '-', '_' or '.'").into());
    }
    Ok(dir.join(format!("{label}.json")))
}

fn emit<T: Serialize>(
    value: &T,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("iriscode=info".parse()?))
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

    let Some(command) = cli.command else {
        return Err("expected a subcommand: enroll or verify".into());
    };

    let config: Config = if cli.config.exists() {
        serde_json::from_str(&fs::read_to_string(&cli.config)?)?
    } else {
        Config::default()
    };
    let threshold = config.pipeline.matching.threshold;
    let pipeline = IrisPipeline::new(config.pipeline)?;

    match command {
        Command::Enroll { image, label } => {
            let path = record_path(&config.templates_dir, &label)?;
            let img = load_gray_image(&image)?;
            let extraction = pipeline.extract(img.view())?;
            let mask = extraction.record.mask();
            let masked_fraction = 1.0 - mask.valid_count() as f32 / mask.len() as f32;

            fs::create_dir_all(&config.templates_dir)?;
            fs::write(&path, serde_json::to_string(&extraction.record)?)?;
            tracing::info!(label = %label, path = %path.display(), "record stored");

            emit(
                &EnrollOutput {
                    label,
                    record_path: path.display().to_string(),
                    pupil_radius: extraction.boundaries.pupil.radius,
                    iris_radius: extraction.boundaries.iris.radius,
                    masked_fraction,
                },
                config.output_path.as_deref(),
            )
        }
        Command::Verify { image, label } => {
            let path = record_path(&config.templates_dir, &label)?;
            let stored = fs::read_to_string(&path)
                .map_err(|err| format!("no record for {label:?} at {}: {err}", path.display()))?;
            let enrolled: EnrollmentRecord = serde_json::from_str(&stored)?;
            let img = load_gray_image(&image)?;
            let result = pipeline.verify(img.view(), &enrolled)?;

            emit(
                &VerifyOutput {
                    label,
                    distance: result.details.distance,
                    valid_bits: result.details.valid_bits,
                    threshold,
                    decision: match result.decision {
                        MatchDecision::Match => "MATCH",
                        MatchDecision::NoMatch => "NO MATCH",
                    },
                },
                config.output_path.as_deref(),
            )
        }
    }
}
