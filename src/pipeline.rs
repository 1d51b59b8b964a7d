use std::path::{Path, PathBuf};

use crate::config::{Config, IdentityModel};
use crate::error::Error;
use crate::frame::FrameTable;
use crate::io::{self, BatchInput};
use crate::ordering::sort_by_x_position;
use crate::repair::repair_confidence;
use crate::series::{reshape, PersonSeries};
use crate::smoother::Smoother;
use crate::tracker::SkeletonTracker;
use crate::Tracking;

/// What a run over one input directory produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: usize,
    pub persons: usize,
    pub files: Vec<PathBuf>,
}

pub struct Pipeline<T: Tracking = SkeletonTracker> {
    config: Config,
    tracker: T,
    smoother: Option<Smoother>,
}

impl Pipeline<SkeletonTracker> {
    pub fn new(config: Config) -> Result<Self, Error> {
        let tracker = SkeletonTracker::new(config.tracker_config()).with_parts(config.parts());

        Self::with_tracker(config, tracker)
    }
}

impl<T: Tracking> Pipeline<T> {
    pub fn with_tracker(config: Config, tracker: T) -> Result<Self, Error> {
        config.validate()?;

        let smoother = config
            .smoothing
            .as_ref()
            .map(Smoother::from_config)
            .transpose()?;

        Ok(Self {
            config,
            tracker,
            smoother,
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tracks, repairs and orders every frame, in input order.
    ///
    /// The previously tracked frame is only replaced by frames that hold
    /// exactly `number_of_people` persons.
    pub fn process<I>(&self, frames: I) -> Vec<FrameTable>
    where
        I: IntoIterator<Item = FrameTable>,
    {
        let rank = self.config.identity == IdentityModel::Rank;
        let threshold = self.config.confidence_threshold;

        let mut previous: Option<FrameTable> = None;
        let mut tracked_frames = Vec::new();

        for (idx, frame) in frames.into_iter().enumerate() {
            let detected = frame.num_persons();
            let mut tracked = self.tracker.track(frame, previous.as_ref());

            if rank || previous.is_none() {
                tracked = sort_by_x_position(tracked);
            }

            if let Some(prev) = &previous {
                if repair_confidence(&mut tracked, prev, threshold) > 0 && rank {
                    tracked = sort_by_x_position(tracked);
                }
            }

            log::debug!(
                "frame {}: {} detected, {} tracked",
                idx,
                detected,
                tracked.num_persons()
            );

            if tracked.num_persons() == self.config.number_of_people {
                previous = Some(tracked.clone());
            }

            tracked_frames.push(tracked);
        }

        tracked_frames
    }

    /// Smooths the series when smoothing is configured.
    pub fn smooth(&self, series: &[PersonSeries]) -> Option<Vec<PersonSeries>> {
        self.smoother.as_ref().map(|s| s.smooth(series))
    }

    /// Processes the `*.json` files of `input_dir` and writes one CSV per
    /// person (plus smoothed and json variants when configured) into
    /// `output_dir`, which must be missing or empty. Nothing is created
    /// unless every input file parses.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<RunSummary, Error> {
        let output_dir = output_dir.as_ref();
        io::check_output_dir(output_dir)?;

        let records = io::load_records(input_dir)?;
        let tables = records
            .iter()
            .map(|(path, record)| {
                record.to_frame_table(self.config.channels).map_err(|err| {
                    log::error!("{}: {}", path.display(), err);
                    err
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let frames = self.process(tables);
        let series = reshape(&frames)?;
        log::info!("tracked {} persons over {} frames", series.len(), frames.len());

        std::fs::create_dir_all(output_dir)?;

        let mut summary = RunSummary {
            frames: frames.len(),
            persons: series.len(),
            files: Vec::new(),
        };

        self.write_series(output_dir, &series, false, &mut summary)?;

        if let Some(smoothed) = self.smooth(&series) {
            log::info!("smoothing {} series", smoothed.len());
            self.write_series(output_dir, &smoothed, true, &mut summary)?;
        }

        Ok(summary)
    }

    fn write_series(
        &self,
        dir: &Path,
        series: &[PersonSeries],
        smoothed: bool,
        summary: &mut RunSummary,
    ) -> Result<(), Error> {
        let output = &self.config.output;

        for (idx, s) in series.iter().enumerate() {
            let stem = io::series_file_stem(idx, output, smoothed);

            let path = dir.join(format!("{}.csv", stem));
            io::write_csv_file(&path, s, output.flatten)?;
            summary.files.push(path);

            if output.write_json {
                let path = dir.join(format!("{}.json", stem));
                io::write_json_file(&path, s)?;
                summary.files.push(path);
            }
        }

        Ok(())
    }
}

/// Runs every recording of `batch` into `<batch output dir>/<name>`, the
/// recording name becoming the trial name.
pub fn run_batch<P: AsRef<Path>, Q: AsRef<Path>>(
    batch: P,
    output: Q,
    config: &Config,
) -> Result<Vec<(String, RunSummary)>, Error> {
    let inputs = io::batch_inputs(batch)?;
    let output = io::batch_output_dir(output, config);

    inputs
        .into_iter()
        .map(|BatchInput { name, input }| {
            let mut config = config.clone();
            config.output.trial_name = Some(name.clone());

            log::info!("processing {}", input.display());
            let summary = Pipeline::new(config)?.run(&input, output.join(&name))?;

            Ok((name, summary))
        })
        .collect()
}
