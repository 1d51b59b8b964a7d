use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::keypoint::Channels;
use crate::parts::{BodyPart, PartGroup};

/// How previous identities are matched to detections of the current frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    /// Every identity takes its nearest detection; detections may be shared.
    Greedy,
    /// Minimum total distance one-to-one assignment.
    Hungarian,
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment::Greedy
    }
}

/// What a person slot of the output means.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityModel {
    /// Slot `i` is the `i`-th person from the left in each frame.
    Rank,
    /// Slots follow the tracker; only the seeding frame is sorted.
    Track,
}

impl Default for IdentityModel {
    fn default() -> Self {
        IdentityModel::Rank
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackerConfig {
    /// Largest mean keypoint distance, in pixels, accepted as the same person.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,
    /// Persons of the seeding frame with this many missing keypoints are dropped.
    #[serde(default = "default_min_missing_to_drop")]
    pub min_missing_to_drop: usize,
    #[serde(default)]
    pub assignment: Assignment,
    /// Match identities even when the person count did not change.
    #[serde(default)]
    pub match_every_frame: bool,
}

fn default_distance_threshold() -> f32 {
    50.0
}

fn default_min_missing_to_drop() -> usize {
    20
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            min_missing_to_drop: default_min_missing_to_drop(),
            assignment: Assignment::default(),
            match_every_frame: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothingConfig {
    pub window: usize,
    pub polyorder: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutputConfig {
    /// Single `<Part>_<Variable>` header row instead of two header rows.
    #[serde(default)]
    pub flatten: bool,
    #[serde(default)]
    pub trial_name: Option<String>,
    /// File name stems used instead of `person<i>`, left to right.
    #[serde(default)]
    pub performer_names: Vec<String>,
    #[serde(default)]
    pub write_json: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_number_of_people")]
    pub number_of_people: usize,
    /// Keypoints below this confidence are replaced by a more confident
    /// previous value. Zero disables repair.
    #[serde(default)]
    pub confidence_threshold: f32,
    #[serde(default)]
    pub smoothing: Option<SmoothingConfig>,
    #[serde(default)]
    pub body_parts: Option<Vec<BodyPart>>,
    #[serde(default)]
    pub part_group: Option<PartGroup>,
    #[serde(default)]
    pub channels: Channels,
    #[serde(default)]
    pub identity: IdentityModel,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_number_of_people() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_people: default_number_of_people(),
            confidence_threshold: 0.0,
            smoothing: None,
            body_parts: None,
            part_group: None,
            channels: Channels::default(),
            identity: IdentityModel::default(),
            tracker: TrackerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence threshold {} is outside [0, 1]",
                self.confidence_threshold
            )));
        }

        if self.body_parts.is_some() && self.part_group.is_some() {
            return Err(Error::Config(
                "body parts and part group are mutually exclusive".into(),
            ));
        }

        if !(self.tracker.distance_threshold > 0.0) {
            return Err(Error::Config(format!(
                "distance threshold {} must be positive",
                self.tracker.distance_threshold
            )));
        }

        if let Some(SmoothingConfig { window, polyorder }) = self.smoothing {
            if window == 0 || window % 2 == 0 || polyorder >= window {
                return Err(Error::InvalidSmoothing {
                    window,
                    order: polyorder,
                });
            }
        }

        Ok(())
    }

    /// Body parts kept in the output, `None` for all of them.
    pub fn parts(&self) -> Option<Vec<BodyPart>> {
        match (&self.body_parts, self.part_group) {
            (Some(parts), _) => {
                let mut parts = parts.clone();
                parts.sort_unstable();
                parts.dedup();
                Some(parts)
            }
            (None, Some(group)) => Some(group.parts().to_vec()),
            (None, None) => None,
        }
    }

    /// Tracker settings with the identity model applied.
    pub fn tracker_config(&self) -> TrackerConfig {
        let mut tracker = self.tracker.clone();
        if self.identity == IdentityModel::Track {
            tracker.match_every_frame = true;
        }

        tracker
    }
}
