use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::frame::FrameTable;
use crate::keypoint::{Channels, Keypoint};
use crate::parts::BodyPart;

/// One detected person as written by the pose detector.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PersonRecord {
    #[serde(default)]
    pub pose_keypoints_2d: Vec<f32>,
    #[serde(default)]
    pub pose_keypoints_3d: Vec<f32>,
}

impl PersonRecord {
    #[inline]
    pub fn keypoints(&self, channels: Channels) -> &[f32] {
        match channels {
            Channels::Xyc => &self.pose_keypoints_2d,
            Channels::Xyzc => &self.pose_keypoints_3d,
        }
    }
}

/// Contents of one per-frame json file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PoseRecord {
    #[serde(default)]
    pub people: Vec<PersonRecord>,
}

impl PoseRecord {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;

        Self::from_json(&content)
    }

    #[inline]
    pub fn from_json(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }

    #[inline]
    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    /// Reshapes every person into rows of the full BODY_25 enumeration.
    pub fn to_frame_table(&self, channels: Channels) -> Result<FrameTable, Error> {
        let expected = BodyPart::COUNT * channels.len();
        let mut table = FrameTable::new(BodyPart::ALL.to_vec(), channels, self.person_count());

        for (person, record) in self.people.iter().enumerate() {
            let raw = record.keypoints(channels);

            if raw.len() != expected {
                return Err(Error::MalformedRecord {
                    person,
                    expected,
                    found: raw.len(),
                });
            }

            for (row, chunk) in raw.chunks_exact(channels.len()).enumerate() {
                table.set_keypoint(row, person, Keypoint::from_raw(chunk, channels));
            }
        }

        Ok(table)
    }
}
