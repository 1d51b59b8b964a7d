use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Channel layout of a keypoint: `x,y,c` or `x,y,z,c`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channels {
    Xyc,
    Xyzc,
}

impl Default for Channels {
    fn default() -> Self {
        Channels::Xyc
    }
}

impl Channels {
    #[inline]
    pub fn len(self) -> usize {
        match self {
            Channels::Xyc => 3,
            Channels::Xyzc => 4,
        }
    }

    #[inline]
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Channels::Xyc => &["x", "y", "c"],
            Channels::Xyzc => &["x", "y", "z", "c"],
        }
    }

    #[inline(always)]
    pub fn x(self) -> usize {
        0
    }

    #[inline(always)]
    pub fn y(self) -> usize {
        1
    }

    #[inline(always)]
    pub fn z(self) -> Option<usize> {
        match self {
            Channels::Xyc => None,
            Channels::Xyzc => Some(2),
        }
    }

    #[inline(always)]
    pub fn confidence(self) -> usize {
        self.len() - 1
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Option<Self> {
        let labels: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();

        [Channels::Xyc, Channels::Xyzc]
            .into_iter()
            .find(|c| c.labels() == labels.as_slice())
    }
}

/// One detected body part: pixel position, optional depth and confidence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(rename = "c")]
    pub confidence: f32,
}

impl Keypoint {
    #[inline]
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            confidence,
        }
    }

    /// Reads a raw detector row; an all-zero row means "not detected".
    pub fn from_raw(raw: &[f32], channels: Channels) -> Option<Self> {
        if raw.iter().all(|&v| v == 0.0) {
            return None;
        }

        Some(Self {
            x: raw[channels.x()],
            y: raw[channels.y()],
            z: channels.z().map(|i| raw[i]),
            confidence: raw[channels.confidence()],
        })
    }

    #[inline(always)]
    pub fn point(&self) -> na::Point2<f32> {
        na::Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn distance(&self, other: &Keypoint) -> f32 {
        na::distance(&self.point(), &other.point())
    }
}
