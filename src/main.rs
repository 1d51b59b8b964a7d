use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};

use posetrack::config::{Assignment, IdentityModel, SmoothingConfig};
use posetrack::parts::PartGroup;
use posetrack::pipeline::run_batch;
use posetrack::{BodyPart, Channels, Config, Pipeline, RunSummary};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Identity {
    /// Person `i` is the `i`-th from the left in every frame
    Rank,
    /// Persons keep the slot the tracker gave them
    Track,
}

/// Tracks, repairs and smooths OpenPose keypoints into per-person CSV files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["input_json", "batch_folder"])))]
#[command(group(ArgGroup::new("parts").args(["body_parts", "upper_body_parts", "lower_body_parts"])))]
struct Cli {
    /// Directory of per-frame keypoint json files
    #[arg(short = 'j', long)]
    input_json: Option<PathBuf>,

    /// Directory of recordings, each holding an `output_json` directory
    #[arg(long)]
    batch_folder: Option<PathBuf>,

    /// Output directory; must be missing or empty
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Number of performers in the video [default: 1]
    #[arg(short, long)]
    number_of_people: Option<usize>,

    /// Keypoints below this confidence are held from the previous frame [default: 0.0]
    #[arg(short, long)]
    confidence_threshold: Option<f32>,

    /// Savitzky-Golay window length and polynomial order
    #[arg(short, long, num_args = 2, value_names = ["WINDOW", "POLYORDER"])]
    smoothing_parameters: Option<Vec<usize>>,

    /// Comma separated body parts to keep, e.g. `Nose,RWrist`
    #[arg(short, long)]
    body_parts: Option<String>,

    /// Keep upper body parts only
    #[arg(short, long)]
    upper_body_parts: bool,

    /// Keep lower body parts only
    #[arg(short, long)]
    lower_body_parts: bool,

    /// Write a single `<Part>_<Variable>` header row
    #[arg(short, long)]
    flatten: bool,

    /// Read `pose_keypoints_3d` (x, y, z, c)
    #[arg(long)]
    three_d: bool,

    /// Largest mean keypoint distance in pixels matched to the same person [default: 50]
    #[arg(long)]
    distance_threshold: Option<f32>,

    /// One-to-one identity matching instead of nearest skeleton
    #[arg(long)]
    hungarian: bool,

    /// Meaning of the person index in the output
    #[arg(long, value_enum)]
    identity: Option<Identity>,

    /// Appended to every output file name as `_trial_<name>`
    #[arg(long)]
    trial_name: Option<String>,

    /// Comma separated performer names used as file names, left to right
    #[arg(long)]
    performer_names: Option<String>,

    /// Also write each series as json
    #[arg(long)]
    json: bool,

    /// TOML configuration file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(n) = self.number_of_people {
            config.number_of_people = n;
        }

        if let Some(c) = self.confidence_threshold {
            config.confidence_threshold = c;
        }

        if let Some(params) = &self.smoothing_parameters {
            config.smoothing = Some(SmoothingConfig {
                window: params[0],
                polyorder: params[1],
            });
        }

        if let Some(list) = &self.body_parts {
            config.body_parts = Some(BodyPart::parse_list(list)?);
            config.part_group = None;
        } else if self.upper_body_parts {
            config.body_parts = None;
            config.part_group = Some(PartGroup::Upper);
        } else if self.lower_body_parts {
            config.body_parts = None;
            config.part_group = Some(PartGroup::Lower);
        }

        if self.three_d {
            config.channels = Channels::Xyzc;
        }

        if let Some(d) = self.distance_threshold {
            config.tracker.distance_threshold = d;
        }

        if self.hungarian {
            config.tracker.assignment = Assignment::Hungarian;
        }

        match self.identity {
            Some(Identity::Rank) => config.identity = IdentityModel::Rank,
            Some(Identity::Track) => config.identity = IdentityModel::Track,
            None => {}
        }

        if self.flatten {
            config.output.flatten = true;
        }

        if self.json {
            config.output.write_json = true;
        }

        if let Some(trial) = &self.trial_name {
            config.output.trial_name = Some(trial.clone());
        }

        if let Some(names) = &self.performer_names {
            config.output.performer_names = names
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config.validate()?;

        Ok(config)
    }
}

fn report(summary: &RunSummary, output: &Path) {
    log::info!(
        "{} frames, {} persons: wrote {} files to {}",
        summary.frames,
        summary.persons,
        summary.files.len(),
        output.display()
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.to_config()?;
    log::debug!("{:?}", config);

    if let Some(batch) = &cli.batch_folder {
        let output = posetrack::io::batch_output_dir(&cli.output_dir, &config);
        let runs = run_batch(batch, &cli.output_dir, &config)
            .with_context(|| format!("failed to process batch {}", batch.display()))?;

        for (name, summary) in &runs {
            report(summary, &output.join(name));
        }

        return Ok(());
    }

    if let Some(input) = &cli.input_json {
        let summary = Pipeline::new(config)?
            .run(input, &cli.output_dir)
            .with_context(|| format!("failed to process {}", input.display()))?;
        report(&summary, &cli.output_dir);
    }

    Ok(())
}
