pub mod config;
pub mod error;
pub mod frame;
pub mod io;
pub mod keypoint;
pub mod math;
pub mod ordering;
pub mod parts;
pub mod pipeline;
pub mod record;
pub mod repair;
pub mod series;
pub mod smoother;
pub mod tracker;

pub use config::Config;
pub use error::Error;
pub use frame::FrameTable;
pub use keypoint::{Channels, Keypoint};
pub use parts::BodyPart;
pub use pipeline::{Pipeline, RunSummary};
pub use record::PoseRecord;
pub use series::PersonSeries;
pub use smoother::Smoother;
pub use tracker::SkeletonTracker;

use nalgebra as na;
use std::fmt;

pub trait Float:
    num_traits::FromPrimitive + na::ComplexField + Copy + fmt::Debug + PartialEq + 'static
{
}

impl<T> Float for T where
    T: num_traits::FromPrimitive + na::ComplexField + Copy + fmt::Debug + PartialEq + 'static
{
}

/// Assigns the detections of one frame to the identities of the previously
/// tracked frame.
pub trait Tracking {
    /// Without a previous frame the detections seed the identities.
    fn track(&self, current: FrameTable, previous: Option<&FrameTable>) -> FrameTable;
}
