use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use posetrack::config::SmoothingConfig;
use posetrack::io::read_csv;
use posetrack::{BodyPart, Channels, Config, Error, Pipeline};

/// One BODY_25 person with every part at `x`, except the parts listed in
/// `missing` which are written as zeros.
fn person(x: f32, conf: f32, missing: &[BodyPart]) -> serde_json::Value {
    let mut raw = Vec::with_capacity(BodyPart::COUNT * 3);
    for part in BodyPart::ALL.iter() {
        if missing.contains(part) {
            raw.extend_from_slice(&[0.0, 0.0, 0.0]);
        } else {
            raw.extend_from_slice(&[x, 100.0 + part.index() as f32 * 10.0, conf]);
        }
    }

    serde_json::json!({ "pose_keypoints_2d": raw })
}

fn write_frames(dir: &Path, frames: &[Vec<serde_json::Value>]) {
    for (idx, people) in frames.iter().enumerate() {
        let record = serde_json::json!({ "version": 1.3, "people": people });
        let path = dir.join(format!("video_{:012}_keypoints.json", idx));
        fs::write(path, record.to_string()).unwrap();
    }
}

fn config(number_of_people: usize) -> Config {
    Config {
        number_of_people,
        ..Default::default()
    }
}

#[test]
fn test_run_writes_one_csv_per_person() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("csv");

    write_frames(
        input.path(),
        &[
            vec![person(220.0, 0.9, &[]), person(500.0, 0.9, &[])],
            vec![person(510.0, 0.9, &[]), person(210.0, 0.9, &[])],
            vec![person(205.0, 0.9, &[]), person(515.0, 0.9, &[])],
        ],
    );

    let summary = Pipeline::new(config(2))
        .unwrap()
        .run(input.path(), &out_dir)
        .unwrap();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.persons, 2);
    assert_eq!(summary.files.len(), 2);
    assert!(out_dir.join("person0.csv").is_file());
    assert!(out_dir.join("person1.csv").is_file());

    let left = read_csv(out_dir.join("person0.csv")).unwrap();
    let right = read_csv(out_dir.join("person1.csv")).unwrap();
    assert_eq!(left.num_frames(), 3);
    assert_eq!(left.parts(), &BodyPart::ALL[..]);
    assert_eq!(left.channels(), Channels::Xyc);

    let xs: Vec<f32> = (0..3).map(|f| left.value(f, 0, 0).unwrap()).collect();
    assert_eq!(xs, vec![220.0, 210.0, 205.0]);
    let xs: Vec<f32> = (0..3).map(|f| right.value(f, 0, 0).unwrap()).collect();
    assert_eq!(xs, vec![500.0, 510.0, 515.0]);
}

#[test]
fn test_zero_rows_read_back_as_missing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_frames(
        input.path(),
        &[
            vec![person(300.0, 0.8, &[BodyPart::LEye])],
            vec![person(301.0, 0.8, &[BodyPart::LEye, BodyPart::RHeel])],
        ],
    );

    let mut config = config(1);
    config.output.flatten = true;
    Pipeline::new(config)
        .unwrap()
        .run(input.path(), output.path())
        .unwrap();

    let header = fs::read_to_string(output.path().join("person0.csv")).unwrap();
    assert!(header.starts_with(",Nose_x,Nose_y,Nose_c,Neck_x"));

    let series = read_csv(output.path().join("person0.csv")).unwrap();
    let leye = BodyPart::LEye.index();
    let rheel = BodyPart::RHeel.index();
    assert_eq!(series.keypoint(0, leye), None);
    assert_eq!(series.keypoint(1, leye), None);
    assert!(series.keypoint(0, rheel).is_some());
    assert_eq!(series.keypoint(1, rheel), None);
}

#[test]
fn test_no_people_holds_last_pose() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_frames(
        input.path(),
        &[
            vec![person(220.0, 0.9, &[]), person(500.0, 0.9, &[])],
            vec![],
            vec![],
        ],
    );

    Pipeline::new(config(2))
        .unwrap()
        .run(input.path(), output.path())
        .unwrap();

    for idx in 0..2 {
        let series = read_csv(output.path().join(format!("person{}.csv", idx))).unwrap();
        for frame in 1..3 {
            assert_eq!(series.data().row(frame), series.data().row(0));
        }
    }
}

#[test]
fn test_smoothed_and_named_outputs() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let frames: Vec<_> = (0..12).map(|_| vec![person(250.0, 0.7, &[])]).collect();
    write_frames(input.path(), &frames);

    let mut config = config(1);
    config.smoothing = Some(SmoothingConfig {
        window: 5,
        polyorder: 2,
    });
    config.body_parts = Some(vec![BodyPart::RWrist, BodyPart::Nose]);
    config.output.trial_name = Some("2".into());
    config.output.performer_names = vec!["violin".into()];
    config.output.write_json = true;

    let summary = Pipeline::new(config)
        .unwrap()
        .run(input.path(), output.path())
        .unwrap();
    assert_eq!(summary.files.len(), 4);

    for name in [
        "violin_trial_2.csv",
        "violin_trial_2.json",
        "violin_trial_2_smoothed.csv",
        "violin_trial_2_smoothed.json",
    ] {
        assert!(output.path().join(name).is_file(), "{} missing", name);
    }

    let raw = read_csv(output.path().join("violin_trial_2.csv")).unwrap();
    let smoothed = read_csv(output.path().join("violin_trial_2_smoothed.csv")).unwrap();
    assert_eq!(smoothed.parts(), &[BodyPart::Nose, BodyPart::RWrist]);

    for (a, b) in raw.data().iter().zip(smoothed.data().iter()) {
        assert_abs_diff_eq!(a.unwrap(), b.unwrap(), epsilon = 1e-3);
    }
}

#[test]
fn test_refuses_non_empty_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_frames(input.path(), &[vec![person(220.0, 0.9, &[])]]);
    fs::write(output.path().join("keep.txt"), "x").unwrap();

    let result = Pipeline::new(config(1))
        .unwrap()
        .run(input.path(), output.path());
    assert!(matches!(result, Err(Error::OutputNotEmpty(_))));
    assert!(!output.path().join("person0.csv").exists());
}

#[test]
fn test_refuses_empty_input() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("notes.txt"), "no keypoints").unwrap();
    let out_dir = output.path().join("csv");

    let result = Pipeline::new(config(1)).unwrap().run(input.path(), &out_dir);
    assert!(matches!(result, Err(Error::EmptyInput(_))));
    assert!(!out_dir.exists());
}

#[test]
fn test_malformed_record_writes_nothing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_frames(input.path(), &[vec![person(220.0, 0.9, &[])]]);
    fs::write(
        input.path().join("video_999999999999_keypoints.json"),
        r#"{"people": [{"pose_keypoints_2d": [1.0, 2.0, 0.5]}]}"#,
    )
    .unwrap();

    let out_dir = output.path().join("csv");

    let result = Pipeline::new(config(1)).unwrap().run(input.path(), &out_dir);
    assert!(matches!(
        result,
        Err(Error::MalformedRecord { expected: 75, found: 3, .. })
    ));
    assert!(!out_dir.exists());
}

#[test]
fn test_repair_keeps_undetected_parts_missing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_frames(
        input.path(),
        &[
            vec![person(300.0, 0.9, &[])],
            vec![person(301.0, 0.2, &[BodyPart::LWrist])],
            vec![person(302.0, 0.9, &[BodyPart::LWrist])],
        ],
    );

    let mut config = config(1);
    config.confidence_threshold = 0.5;
    Pipeline::new(config)
        .unwrap()
        .run(input.path(), output.path())
        .unwrap();

    let series = read_csv(output.path().join("person0.csv")).unwrap();
    let nose = BodyPart::Nose.index();
    let lwrist = BodyPart::LWrist.index();

    // detected but unreliable: held from the previous frame
    assert_eq!(series.value(1, nose, 0), Some(300.0));
    assert_eq!(series.value(1, nose, 2), Some(0.9));
    // not detected at all: stays a gap
    assert_eq!(series.keypoint(1, lwrist), None);
    assert_eq!(series.keypoint(2, lwrist), None);
}
