use ndarray::prelude::*;

use crate::error::Error;
use crate::frame::FrameTable;
use crate::keypoint::{Channels, Keypoint};
use crate::parts::BodyPart;

/// Time series of one tracked person: one row per frame, one column per
/// (body part, channel).
#[derive(Debug, Clone, PartialEq)]
pub struct PersonSeries {
    parts: Vec<BodyPart>,
    channels: Channels,
    data: Array2<Option<f32>>,
}

impl PersonSeries {
    /// A series of `frames` rows with every value absent.
    pub fn new(parts: Vec<BodyPart>, channels: Channels, frames: usize) -> Self {
        let data = Array2::from_elem((frames, parts.len() * channels.len()), None);

        Self {
            parts,
            channels,
            data,
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> ArrayView2<'_, Option<f32>> {
        self.data.view()
    }

    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut2<'_, Option<f32>> {
        self.data.view_mut()
    }

    #[inline]
    pub fn column_index(&self, row: usize, channel: usize) -> usize {
        row * self.channels.len() + channel
    }

    /// `(body part, channel label)` of every column, in column order.
    pub fn column_labels(&self) -> Vec<(BodyPart, &'static str)> {
        let labels = self.channels.labels();

        self.parts
            .iter()
            .flat_map(|&part| labels.iter().map(move |&l| (part, l)))
            .collect()
    }

    #[inline]
    pub fn value(&self, frame: usize, row: usize, channel: usize) -> Option<f32> {
        self.data[[frame, self.column_index(row, channel)]]
    }

    pub fn keypoint(&self, frame: usize, row: usize) -> Option<Keypoint> {
        let ch = self.channels;
        let z = match ch.z() {
            Some(idx) => Some(self.value(frame, row, idx)?),
            None => None,
        };

        Some(Keypoint {
            x: self.value(frame, row, ch.x())?,
            y: self.value(frame, row, ch.y())?,
            z,
            confidence: self.value(frame, row, ch.confidence())?,
        })
    }
}

fn describe(table: &FrameTable) -> String {
    let parts: Vec<&str> = table.parts().iter().map(|p| p.name()).collect();

    format!(
        "{} persons, parts [{}], channels {}",
        table.num_persons(),
        parts.join(","),
        table.channels().labels().concat()
    )
}

/// Pivots per-frame tables into one series per person slot.
///
/// Every frame must carry the same persons, parts and channels.
pub fn reshape(frames: &[FrameTable]) -> Result<Vec<PersonSeries>, Error> {
    let first = match frames.first() {
        Some(first) => first,
        None => return Ok(Vec::new()),
    };

    for (idx, frame) in frames.iter().enumerate().skip(1) {
        if frame.num_persons() != first.num_persons()
            || frame.parts() != first.parts()
            || frame.channels() != first.channels()
        {
            return Err(Error::InconsistentFrame {
                frame: idx,
                expected: describe(first),
                found: describe(frame),
            });
        }
    }

    let series = (0..first.num_persons())
        .map(|person| {
            let mut series =
                PersonSeries::new(first.parts().to_vec(), first.channels(), frames.len());

            for (mut row, frame) in series.data.rows_mut().into_iter().zip(frames) {
                for (dst, src) in row.iter_mut().zip(frame.person_view(person).iter()) {
                    *dst = *src;
                }
            }

            series
        })
        .collect();

    Ok(series)
}
