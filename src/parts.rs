use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// BODY_25 keypoints in the order the pose detector emits them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    Neck = 1,
    RShoulder = 2,
    RElbow = 3,
    RWrist = 4,
    LShoulder = 5,
    LElbow = 6,
    LWrist = 7,
    MidHip = 8,
    RHip = 9,
    RKnee = 10,
    RAnkle = 11,
    LHip = 12,
    LKnee = 13,
    LAnkle = 14,
    REye = 15,
    LEye = 16,
    REar = 17,
    LEar = 18,
    LBigToe = 19,
    LSmallToe = 20,
    LHeel = 21,
    RBigToe = 22,
    RSmallToe = 23,
    RHeel = 24,
}

impl BodyPart {
    pub const COUNT: usize = 25;

    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Nose,
        BodyPart::Neck,
        BodyPart::RShoulder,
        BodyPart::RElbow,
        BodyPart::RWrist,
        BodyPart::LShoulder,
        BodyPart::LElbow,
        BodyPart::LWrist,
        BodyPart::MidHip,
        BodyPart::RHip,
        BodyPart::RKnee,
        BodyPart::RAnkle,
        BodyPart::LHip,
        BodyPart::LKnee,
        BodyPart::LAnkle,
        BodyPart::REye,
        BodyPart::LEye,
        BodyPart::REar,
        BodyPart::LEar,
        BodyPart::LBigToe,
        BodyPart::LSmallToe,
        BodyPart::LHeel,
        BodyPart::RBigToe,
        BodyPart::RSmallToe,
        BodyPart::RHeel,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Nose => "Nose",
            BodyPart::Neck => "Neck",
            BodyPart::RShoulder => "RShoulder",
            BodyPart::RElbow => "RElbow",
            BodyPart::RWrist => "RWrist",
            BodyPart::LShoulder => "LShoulder",
            BodyPart::LElbow => "LElbow",
            BodyPart::LWrist => "LWrist",
            BodyPart::MidHip => "MidHip",
            BodyPart::RHip => "RHip",
            BodyPart::RKnee => "RKnee",
            BodyPart::RAnkle => "RAnkle",
            BodyPart::LHip => "LHip",
            BodyPart::LKnee => "LKnee",
            BodyPart::LAnkle => "LAnkle",
            BodyPart::REye => "REye",
            BodyPart::LEye => "LEye",
            BodyPart::REar => "REar",
            BodyPart::LEar => "LEar",
            BodyPart::LBigToe => "LBigToe",
            BodyPart::LSmallToe => "LSmallToe",
            BodyPart::LHeel => "LHeel",
            BodyPart::RBigToe => "RBigToe",
            BodyPart::RSmallToe => "RSmallToe",
            BodyPart::RHeel => "RHeel",
        }
    }

    /// Parses a comma separated list such as `"LEye,RElbow"`.
    ///
    /// The result is returned in enumeration order without duplicates,
    /// whatever order the names were given in.
    pub fn parse_list(list: &str) -> Result<Vec<BodyPart>, Error> {
        let mut parts = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<BodyPart>, _>>()?;

        parts.sort_unstable();
        parts.dedup();

        Ok(parts)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownBodyPart(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartGroup {
    Upper,
    Lower,
}

impl PartGroup {
    pub fn parts(self) -> &'static [BodyPart] {
        match self {
            PartGroup::Upper => &UPPER_BODY_PARTS,
            PartGroup::Lower => &LOWER_BODY_PARTS,
        }
    }
}

pub const UPPER_BODY_PARTS: [BodyPart; 12] = [
    BodyPart::Nose,
    BodyPart::Neck,
    BodyPart::RShoulder,
    BodyPart::RElbow,
    BodyPart::RWrist,
    BodyPart::LShoulder,
    BodyPart::LElbow,
    BodyPart::LWrist,
    BodyPart::REye,
    BodyPart::LEye,
    BodyPart::REar,
    BodyPart::LEar,
];

pub const LOWER_BODY_PARTS: [BodyPart; 13] = [
    BodyPart::MidHip,
    BodyPart::RHip,
    BodyPart::RKnee,
    BodyPart::RAnkle,
    BodyPart::LHip,
    BodyPart::LKnee,
    BodyPart::LAnkle,
    BodyPart::LBigToe,
    BodyPart::LSmallToe,
    BodyPart::LHeel,
    BodyPart::RBigToe,
    BodyPart::RSmallToe,
    BodyPart::RHeel,
];
