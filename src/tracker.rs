use munkres::{solve_assignment, WeightMatrix};

use crate::config::{Assignment, TrackerConfig};
use crate::frame::FrameTable;
use crate::parts::BodyPart;
use crate::Tracking;

const UNMATCHED_COST: f64 = 1.0e6;

/// Matches skeletons of the current frame to the identities of the previous
/// tracked frame by mean keypoint distance.
#[derive(Debug, Clone, Default)]
pub struct SkeletonTracker {
    config: TrackerConfig,
    parts: Option<Vec<BodyPart>>,
}

impl SkeletonTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            parts: None,
        }
    }

    /// Restricts tracked tables to `parts`.
    pub fn with_parts(mut self, parts: Option<Vec<BodyPart>>) -> Self {
        self.parts = parts;
        self
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn filter_parts(&self, table: FrameTable) -> FrameTable {
        match &self.parts {
            Some(parts) => table.select_parts(parts),
            None => table,
        }
    }

    /// First frame: drops persons too incomplete to start a track.
    fn seed(&self, current: FrameTable) -> FrameTable {
        let keep: Vec<usize> = (0..current.num_persons())
            .filter(|&p| {
                let missing = current.missing_count(p);
                if missing >= self.config.min_missing_to_drop {
                    log::debug!("dropping person {}: {} keypoints missing", p, missing);
                    false
                } else {
                    true
                }
            })
            .collect();

        self.filter_parts(current.select_persons(&keep))
    }

    fn assignment(&self, distances: &[Vec<Option<f32>>], detected: usize) -> Vec<Option<usize>> {
        match self.config.assignment {
            Assignment::Greedy => greedy_assignment(distances),
            Assignment::Hungarian => optimal_assignment(distances, detected),
        }
    }

    fn match_previous(&self, current: &FrameTable, previous: &FrameTable) -> FrameTable {
        let distances: Vec<Vec<Option<f32>>> = (0..previous.num_persons())
            .map(|p| {
                (0..current.num_persons())
                    .map(|q| mean_skeleton_distance(previous, p, current, q))
                    .collect()
            })
            .collect();

        let assignments = self.assignment(&distances, current.num_persons());
        let mut tracked = FrameTable::new(
            previous.parts().to_vec(),
            previous.channels(),
            previous.num_persons(),
        );

        for (p, assigned) in assignments.into_iter().enumerate() {
            let matched = assigned.filter(|&q| {
                distances[p][q].map_or(false, |d| d < self.config.distance_threshold)
            });

            match matched {
                Some(q) => tracked.copy_person(p, current, q),
                None => {
                    log::debug!("no skeleton near identity {}, holding last pose", p);
                    tracked.copy_person(p, previous, p);
                }
            }
        }

        tracked
    }
}

impl Tracking for SkeletonTracker {
    fn track(&self, current: FrameTable, previous: Option<&FrameTable>) -> FrameTable {
        let previous = match previous {
            Some(previous) => previous,
            None => return self.seed(current),
        };

        let current = self.filter_parts(current);

        if current.num_persons() == previous.num_persons() && !self.config.match_every_frame {
            return current;
        }

        self.match_previous(&current, previous)
    }
}

/// Mean x/y distance between two skeletons over the parts present in both.
pub fn mean_skeleton_distance(
    a: &FrameTable,
    a_person: usize,
    b: &FrameTable,
    b_person: usize,
) -> Option<f32> {
    let (sum, n) = a
        .parts()
        .iter()
        .enumerate()
        .filter_map(|(row, &part)| {
            let ka = a.keypoint(row, a_person)?;
            let kb = b.keypoint(b.row_of(part)?, b_person)?;

            Some(ka.distance(&kb))
        })
        .fold((0.0f32, 0usize), |(s, n), d| (s + d, n + 1));

    if n == 0 {
        None
    } else {
        Some(sum / n as f32)
    }
}

/// Each previous identity independently takes its nearest detection.
///
/// Two identities may pick the same detection.
pub fn greedy_assignment(distances: &[Vec<Option<f32>>]) -> Vec<Option<usize>> {
    distances
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter_map(|(q, d)| d.map(|d| (q, d)))
                .fold(None, |best: Option<(usize, f32)>, (q, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((q, d)),
                })
                .map(|(q, _)| q)
        })
        .collect()
}

/// Minimum total distance one-to-one assignment.
pub fn optimal_assignment(distances: &[Vec<Option<f32>>], detected: usize) -> Vec<Option<usize>> {
    let identities = distances.len();
    let mut assignments = vec![None; identities];

    if identities == 0 || detected == 0 {
        return assignments;
    }

    let n = identities.max(detected);
    let cost = |(r, c): (usize, usize)| -> f64 {
        if r < identities && c < detected {
            distances[r][c].map_or(UNMATCHED_COST, f64::from)
        } else {
            UNMATCHED_COST
        }
    };

    let mut mat = WeightMatrix::from_fn(n, &cost);

    match solve_assignment(&mut mat) {
        Ok(positions) => {
            for pos in positions {
                if cost((pos.row, pos.column)) < UNMATCHED_COST {
                    assignments[pos.row] = Some(pos.column);
                }
            }

            assignments
        }
        Err(_) => {
            log::warn!("assignment could not be solved, falling back to greedy matching");
            greedy_assignment(distances)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{Channels, Keypoint};

    const PARTS: [BodyPart; 3] = [BodyPart::Nose, BodyPart::Neck, BodyPart::MidHip];

    fn skeleton(x: f32) -> Vec<Option<Keypoint>> {
        vec![
            Some(Keypoint::new(x, 100.0, 0.9)),
            Some(Keypoint::new(x, 150.0, 0.9)),
            Some(Keypoint::new(x, 300.0, 0.9)),
        ]
    }

    fn table(xs: &[f32]) -> FrameTable {
        let persons: Vec<_> = xs.iter().map(|&x| skeleton(x)).collect();
        FrameTable::from_keypoints(PARTS.to_vec(), Channels::Xyc, &persons)
    }

    fn tracker(assignment: Assignment) -> SkeletonTracker {
        SkeletonTracker::new(TrackerConfig {
            assignment,
            ..Default::default()
        })
    }

    #[test]
    fn test_nearest_skeleton_keeps_identity() {
        let previous = table(&[220.0, 500.0]);
        let current = table(&[510.0, 900.0, 210.0]);

        let tracked = tracker(Assignment::Greedy).track(current, Some(&previous));
        assert_eq!(tracked.num_persons(), 2);
        assert_eq!(tracked.mean_x(0), Some(210.0));
        assert_eq!(tracked.mean_x(1), Some(510.0));
    }

    #[test]
    fn test_no_detections_holds_last_pose() {
        let previous = table(&[220.0, 500.0]);
        let current = FrameTable::empty(PARTS.to_vec(), Channels::Xyc);

        let tracked = tracker(Assignment::Greedy).track(current, Some(&previous));
        assert_eq!(tracked, previous);
    }

    #[test]
    fn test_far_detection_holds_last_pose() {
        let previous = table(&[220.0, 500.0]);
        let current = table(&[221.0, 800.0, 1200.0]);

        let tracked = tracker(Assignment::Greedy).track(current, Some(&previous));
        assert_eq!(tracked.mean_x(0), Some(221.0));
        assert_eq!(tracked.mean_x(1), Some(500.0));
    }

    #[test]
    fn test_equal_count_passes_through() {
        let previous = table(&[220.0, 500.0]);
        let current = table(&[510.0, 210.0]);

        let tracked = tracker(Assignment::Greedy).track(current.clone(), Some(&previous));
        assert_eq!(tracked, current);

        let every_frame = SkeletonTracker::new(TrackerConfig {
            match_every_frame: true,
            ..Default::default()
        });
        let tracked = every_frame.track(current, Some(&previous));
        assert_eq!(tracked.mean_x(0), Some(210.0));
        assert_eq!(tracked.mean_x(1), Some(510.0));
    }

    #[test]
    fn test_greedy_may_reuse_detection() {
        let previous = table(&[200.0, 230.0]);
        let current = table(&[215.0]);

        let tracked = tracker(Assignment::Greedy).track(current, Some(&previous));
        assert_eq!(tracked.mean_x(0), Some(215.0));
        assert_eq!(tracked.mean_x(1), Some(215.0));
    }

    #[test]
    fn test_hungarian_is_one_to_one() {
        let previous = table(&[200.0, 230.0]);
        let current = table(&[215.0]);

        let tracked = tracker(Assignment::Hungarian).track(current, Some(&previous));
        let xs = [tracked.mean_x(0).unwrap(), tracked.mean_x(1).unwrap()];
        assert_eq!(xs.iter().filter(|&&x| x == 215.0).count(), 1);
        assert!(xs.contains(&200.0) || xs.contains(&230.0));
    }

    #[test]
    fn test_seed_drops_incomplete_persons() {
        let mut persons = vec![vec![Some(Keypoint::new(10.0, 10.0, 0.9)); BodyPart::COUNT]; 2];
        for kp in persons[0].iter_mut().take(20) {
            *kp = None;
        }
        for kp in persons[1].iter_mut().take(19) {
            *kp = None;
        }
        let current = FrameTable::from_keypoints(BodyPart::ALL.to_vec(), Channels::Xyc, &persons);

        let tracked = tracker(Assignment::Greedy)
            .with_parts(Some(vec![BodyPart::LHeel, BodyPart::RHeel]))
            .track(current, None);
        assert_eq!(tracked.num_persons(), 1);
        assert_eq!(tracked.parts(), &[BodyPart::LHeel, BodyPart::RHeel]);
        assert_eq!(tracked.keypoint(0, 0), Some(Keypoint::new(10.0, 10.0, 0.9)));
    }

    #[test]
    fn test_distance_ignores_missing_parts() {
        let a = table(&[0.0]);
        let mut b = table(&[3.0]);
        b.set_keypoint(0, 0, None);
        assert_eq!(mean_skeleton_distance(&a, 0, &b, 0), Some(3.0));

        let blank = FrameTable::new(PARTS.to_vec(), Channels::Xyc, 1);
        assert_eq!(mean_skeleton_distance(&a, 0, &blank, 0), None);
    }

    #[test]
    fn test_greedy_first_minimum_wins() {
        let d = vec![vec![Some(5.0), Some(5.0), None]];
        assert_eq!(greedy_assignment(&d), vec![Some(0)]);
        assert_eq!(greedy_assignment(&[vec![None]]), vec![None]);
    }
}
