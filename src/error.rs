use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Toml Error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("malformed record for person {person}: expected {expected} values, got {found}")]
    MalformedRecord {
        person: usize,
        expected: usize,
        found: usize,
    },

    #[error("no keypoint json files found in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("output directory {} exists and is not empty", .0.display())]
    OutputNotEmpty(PathBuf),

    #[error("frame {frame}: expected {expected}, found {found}")]
    InconsistentFrame {
        frame: usize,
        expected: String,
        found: String,
    },

    #[error("invalid smoothing parameters: window {window}, polyorder {order} (window must be odd and greater than polyorder)")]
    InvalidSmoothing { window: usize, order: usize },

    #[error("unknown body part `{0}`")]
    UnknownBodyPart(String),

    #[error("csv line {line}: {msg}")]
    Csv { line: usize, msg: String },

    #[error("Config Error: {0}")]
    Config(String),
}
