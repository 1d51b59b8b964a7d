use crate::frame::FrameTable;

/// Replaces unreliable keypoints of `current` with the previous frame's.
///
/// A keypoint is replaced when its confidence is below `threshold` and below
/// the confidence the same identity had for the same part in `previous`.
/// Undetected keypoints are never filled in, and an absent previous keypoint
/// never replaces anything. Returns the number of replaced keypoints.
pub fn repair_confidence(current: &mut FrameTable, previous: &FrameTable, threshold: f32) -> usize {
    if threshold <= 0.0 || previous.is_empty() {
        return 0;
    }

    let persons = current.num_persons().min(previous.num_persons());
    let mut replaced = 0;

    for row in 0..current.num_parts() {
        let prev_row = match previous.row_of(current.parts()[row]) {
            Some(r) => r,
            None => continue,
        };

        for person in 0..persons {
            let prev_conf = match previous.keypoint(prev_row, person) {
                Some(kp) => kp.confidence,
                None => continue,
            };

            let conf = match current.keypoint(row, person) {
                Some(kp) => kp.confidence,
                None => continue,
            };

            if conf < threshold && conf < prev_conf {
                current.copy_row(row, person, previous, person);
                replaced += 1;
            }
        }
    }

    if replaced > 0 {
        log::trace!("confidence repair replaced {} keypoints", replaced);
    }

    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{Channels, Keypoint};
    use crate::parts::BodyPart;

    fn table(points: &[Option<Keypoint>]) -> FrameTable {
        FrameTable::from_keypoints(
            vec![BodyPart::Nose, BodyPart::Neck, BodyPart::RWrist],
            Channels::Xyc,
            &[points.to_vec()],
        )
    }

    #[test]
    fn test_low_confidence_replaced_by_better_previous() {
        let previous = table(&[
            Some(Keypoint::new(1.0, 1.0, 0.9)),
            Some(Keypoint::new(2.0, 2.0, 0.2)),
            Some(Keypoint::new(3.0, 3.0, 0.9)),
        ]);
        let mut current = table(&[
            Some(Keypoint::new(10.0, 10.0, 0.3)),
            Some(Keypoint::new(20.0, 20.0, 0.3)),
            Some(Keypoint::new(30.0, 30.0, 0.8)),
        ]);

        let replaced = repair_confidence(&mut current, &previous, 0.5);
        assert_eq!(replaced, 1);
        // worse than threshold and previous better: replaced
        assert_eq!(current.keypoint(0, 0), Some(Keypoint::new(1.0, 1.0, 0.9)));
        // below threshold but previous worse: kept
        assert_eq!(current.keypoint(1, 0), Some(Keypoint::new(20.0, 20.0, 0.3)));
        // above threshold: kept even though previous is better
        assert_eq!(current.keypoint(2, 0), Some(Keypoint::new(30.0, 30.0, 0.8)));
    }

    #[test]
    fn test_undetected_keypoint_stays_missing() {
        let previous = table(&[Some(Keypoint::new(1.0, 1.0, 0.9)), None, None]);
        let mut current = table(&[None, None, Some(Keypoint::new(3.0, 3.0, 0.1))]);

        assert_eq!(repair_confidence(&mut current, &previous, 0.5), 0);
        assert_eq!(current.keypoint(0, 0), None);
        assert_eq!(current.keypoint(1, 0), None);
        assert_eq!(current.keypoint(2, 0), Some(Keypoint::new(3.0, 3.0, 0.1)));
    }

    #[test]
    fn test_zero_threshold_disables_repair() {
        let previous = table(&[Some(Keypoint::new(1.0, 1.0, 0.9)), None, None]);
        let mut current = table(&[Some(Keypoint::new(5.0, 5.0, 0.0)), None, None]);
        let before = current.clone();

        assert_eq!(repair_confidence(&mut current, &previous, 0.0), 0);
        assert_eq!(current, before);
    }

    #[test]
    fn test_repair_is_monotonic() {
        let confs = [0.0f32, 0.1, 0.4, 0.6, 0.95];
        for &a in &confs {
            for &b in &confs {
                let previous = table(&[Some(Keypoint::new(1.0, 1.0, b)), None, None]);
                let mut current = table(&[Some(Keypoint::new(2.0, 2.0, a)), None, None]);

                repair_confidence(&mut current, &previous, 0.5);
                let after = current.keypoint(0, 0).unwrap().confidence;
                assert!(after >= a.min(b));
            }
        }
    }
}
