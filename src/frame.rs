use ndarray::prelude::*;

use crate::keypoint::{Channels, Keypoint};
use crate::parts::BodyPart;

/// Detections of one video frame.
///
/// Values are laid out as `(part, person, channel)`. An absent value is
/// `None`; nothing else is used as a missing sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    parts: Vec<BodyPart>,
    channels: Channels,
    data: Array3<Option<f32>>,
}

impl FrameTable {
    /// A table with `persons` slots and every value absent.
    pub fn new(parts: Vec<BodyPart>, channels: Channels, persons: usize) -> Self {
        let data = Array3::from_elem((parts.len(), persons, channels.len()), None);

        Self {
            parts,
            channels,
            data,
        }
    }

    #[inline]
    pub fn empty(parts: Vec<BodyPart>, channels: Channels) -> Self {
        Self::new(parts, channels, 0)
    }

    /// Builds a table from one keypoint list per person, each in `parts` order.
    pub fn from_keypoints(
        parts: Vec<BodyPart>,
        channels: Channels,
        persons: &[Vec<Option<Keypoint>>],
    ) -> Self {
        let mut table = Self::new(parts, channels, persons.len());

        for (person, keypoints) in persons.iter().enumerate() {
            for (row, kp) in keypoints.iter().enumerate().take(table.num_parts()) {
                table.set_keypoint(row, person, *kp);
            }
        }

        table
    }

    #[inline]
    pub fn num_persons(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    #[inline]
    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_persons() == 0
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
    pub fn data(&self) -> ArrayView3<'_, Option<f32>> {
        self.data.view()
    }

    #[inline]
    pub fn row_of(&self, part: BodyPart) -> Option<usize> {
        self.parts.iter().position(|&p| p == part)
    }

    #[inline]
    pub fn value(&self, row: usize, person: usize, channel: usize) -> Option<f32> {
        self.data[[row, person, channel]]
    }

    /// Values of one person as `(part, channel)`.
    #[inline]
    pub fn person_view(&self, person: usize) -> ArrayView2<'_, Option<f32>> {
        self.data.index_axis(Axis(1), person)
    }

    /// The keypoint at `row` for `person`, if x, y and confidence are all present.
    pub fn keypoint(&self, row: usize, person: usize) -> Option<Keypoint> {
        let ch = self.channels;
        let z = match ch.z() {
            Some(idx) => Some(self.value(row, person, idx)?),
            None => None,
        };

        Some(Keypoint {
            x: self.value(row, person, ch.x())?,
            y: self.value(row, person, ch.y())?,
            z,
            confidence: self.value(row, person, ch.confidence())?,
        })
    }

    pub fn set_keypoint(&mut self, row: usize, person: usize, kp: Option<Keypoint>) {
        let ch = self.channels;
        let mut cell = self.data.slice_mut(s![row, person, ..]);

        match kp {
            Some(kp) => {
                cell[ch.x()] = Some(kp.x);
                cell[ch.y()] = Some(kp.y);
                if let Some(z) = ch.z() {
                    cell[z] = kp.z;
                }
                cell[ch.confidence()] = Some(kp.confidence);
            }
            None => cell.fill(None),
        }
    }

    /// Copies every channel of one body-part row from `src`.
    pub fn copy_row(&mut self, row: usize, person: usize, src: &FrameTable, src_person: usize) {
        let values = src_row(src, self.parts[row], src_person);

        match values {
            Some(values) => self.data.slice_mut(s![row, person, ..]).assign(&values),
            None => self.data.slice_mut(s![row, person, ..]).fill(None),
        }
    }

    /// Copies a whole person slot from `src`, matching rows by body part.
    pub fn copy_person(&mut self, person: usize, src: &FrameTable, src_person: usize) {
        for row in 0..self.num_parts() {
            self.copy_row(row, person, src, src_person);
        }
    }

    /// Column labels `x0,y0,c0,x1,...` (with `z{i}` for 3D tables).
    pub fn column_names(&self) -> Vec<String> {
        (0..self.num_persons())
            .flat_map(|p| {
                self.channels
                    .labels()
                    .iter()
                    .map(move |label| format!("{}{}", label, p))
            })
            .collect()
    }

    /// A new table holding the given person slots in the given order.
    pub fn select_persons(&self, persons: &[usize]) -> FrameTable {
        let mut table = FrameTable::new(self.parts.clone(), self.channels, persons.len());

        for (dst, &src) in persons.iter().enumerate() {
            table
                .data
                .slice_mut(s![.., dst, ..])
                .assign(&self.data.slice(s![.., src, ..]));
        }

        table
    }

    /// Restricts rows to `parts`, keeping enumeration order.
    ///
    /// Parts the table does not carry are skipped.
    pub fn select_parts(&self, parts: &[BodyPart]) -> FrameTable {
        let rows: Vec<usize> = self
            .parts
            .iter()
            .enumerate()
            .filter(|(_, p)| parts.contains(p))
            .map(|(row, _)| row)
            .collect();

        FrameTable {
            parts: rows.iter().map(|&r| self.parts[r]).collect(),
            channels: self.channels,
            data: self.data.select(Axis(0), &rows),
        }
    }

    /// Keypoints of one person, or `None` when the slot is out of range.
    pub fn person(&self, index: usize, parts: Option<&[BodyPart]>) -> Option<FrameTable> {
        if index >= self.num_persons() {
            return None;
        }

        Some(self.persons(&[index], parts))
    }

    /// Keypoints of several persons, renumbered `0..k`.
    ///
    /// Out-of-range indices are skipped rather than reported.
    pub fn persons(&self, indices: &[usize], parts: Option<&[BodyPart]>) -> FrameTable {
        let present: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.num_persons())
            .collect();

        let table = self.select_persons(&present);

        match parts {
            Some(parts) => table.select_parts(parts),
            None => table,
        }
    }

    /// Number of body parts of `person` with no usable keypoint.
    pub fn missing_count(&self, person: usize) -> usize {
        (0..self.num_parts())
            .filter(|&row| self.keypoint(row, person).is_none())
            .count()
    }

    /// Mean x-position over the present keypoints of `person`.
    pub fn mean_x(&self, person: usize) -> Option<f32> {
        let x = self.channels.x();
        let (sum, n) = self
            .data
            .slice(s![.., person, x])
            .iter()
            .flatten()
            .fold((0.0f32, 0usize), |(s, n), &v| (s + v, n + 1));

        if n == 0 {
            None
        } else {
            Some(sum / n as f32)
        }
    }
}

fn src_row(src: &FrameTable, part: BodyPart, person: usize) -> Option<Array1<Option<f32>>> {
    let row = src.row_of(part)?;

    Some(src.data.slice(s![row, person, ..]).to_owned())
}
