use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_derive::Serialize;

use crate::config::{Config, OutputConfig, SmoothingConfig};
use crate::error::Error;
use crate::keypoint::Channels;
use crate::parts::BodyPart;
use crate::record::PoseRecord;
use crate::series::PersonSeries;

const PART_HEADER: &str = "Body Part";
const VARIABLE_HEADER: &str = "Variable";

/// Parses every `*.json` file of `dir`, in file name order.
pub fn load_records<P: AsRef<Path>>(dir: P) -> Result<Vec<(PathBuf, PoseRecord)>, Error> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(Error::EmptyInput(dir.to_path_buf()));
    }

    paths.sort();
    log::info!("reading {} keypoint files from {}", paths.len(), dir.display());

    paths
        .into_iter()
        .map(|path| {
            let record = PoseRecord::from_path(&path)?;
            Ok((path, record))
        })
        .collect()
}

/// Fails unless `path` is missing or an empty directory. Creates nothing.
pub fn check_output_dir<P: AsRef<Path>>(path: P) -> Result<(), Error> {
    let path = path.as_ref();

    if path.exists() && std::fs::read_dir(path)?.next().is_some() {
        return Err(Error::OutputNotEmpty(path.to_path_buf()));
    }

    Ok(())
}

/// One recording of a batch folder: `<batch>/<name>/output_json`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInput {
    pub name: String,
    pub input: PathBuf,
}

/// Recordings of `batch`, in name order.
///
/// Hidden entries are ignored; folders without an `output_json` directory
/// are skipped with a warning.
pub fn batch_inputs<P: AsRef<Path>>(batch: P) -> Result<Vec<BatchInput>, Error> {
    let batch = batch.as_ref();
    let mut inputs = Vec::new();

    for entry in std::fs::read_dir(batch)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if !name.starts_with('.') => name.to_string(),
            _ => continue,
        };

        let input = path.join("output_json");
        if !input.is_dir() {
            log::warn!("skipping {}: no output_json directory", path.display());
            continue;
        }

        inputs.push(BatchInput { name, input });
    }

    if inputs.is_empty() {
        return Err(Error::EmptyInput(batch.to_path_buf()));
    }

    inputs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(inputs)
}

/// `<output>_c<conf>[_s<window>_<polyorder>]`, naming a batch run after its
/// settings. `<conf>` is the first three characters of the threshold, so
/// `0.0` stays `0.0`.
pub fn batch_output_dir<P: AsRef<Path>>(output: P, config: &Config) -> PathBuf {
    let conf: String = format!("{:?}", config.confidence_threshold)
        .chars()
        .take(3)
        .collect();
    let mut name = output.as_ref().as_os_str().to_os_string();

    name.push(format!("_c{}", conf));
    if let Some(SmoothingConfig { window, polyorder }) = config.smoothing {
        name.push(format!("_s{}_{}", window, polyorder));
    }

    PathBuf::from(name)
}

/// `<name>[_trial_<trial>][_smoothed]` for the person at slot `index`.
pub fn series_file_stem(index: usize, output: &OutputConfig, smoothed: bool) -> String {
    let mut stem = match output.performer_names.get(index) {
        Some(name) => name.clone(),
        None => format!("person{}", index),
    };

    if let Some(trial) = &output.trial_name {
        stem.push_str("_trial_");
        stem.push_str(trial);
    }

    if smoothed {
        stem.push_str("_smoothed");
    }

    stem
}

fn format_value(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => String::new(),
    }
}

pub fn write_csv<W: Write>(mut w: W, series: &PersonSeries, flatten: bool) -> Result<(), Error> {
    let labels = series.column_labels();

    if flatten {
        let header: Vec<String> = labels
            .iter()
            .map(|(part, var)| format!("{}_{}", part.name(), var))
            .collect();
        writeln!(w, ",{}", header.join(","))?;
    } else {
        let parts: Vec<&str> = labels.iter().map(|(part, _)| part.name()).collect();
        let vars: Vec<&str> = labels.iter().map(|(_, var)| *var).collect();
        writeln!(w, "{},{}", PART_HEADER, parts.join(","))?;
        writeln!(w, "{},{}", VARIABLE_HEADER, vars.join(","))?;
    }

    for (frame, row) in series.data().rows().into_iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|v| format_value(*v)).collect();
        writeln!(w, "{},{}", frame, cells.join(","))?;
    }

    w.flush()?;

    Ok(())
}

pub fn write_csv_file<P: AsRef<Path>>(
    path: P,
    series: &PersonSeries,
    flatten: bool,
) -> Result<(), Error> {
    let file = File::create(path.as_ref())?;
    log::debug!("writing {}", path.as_ref().display());

    write_csv(BufWriter::new(file), series, flatten)
}

fn csv_error(line: usize, msg: impl Into<String>) -> Error {
    Error::Csv {
        line,
        msg: msg.into(),
    }
}

/// Recovers part and channel layout from the `(part, variable)` columns.
fn layout(line: usize, columns: &[(&str, &str)]) -> Result<(Vec<BodyPart>, Channels), Error> {
    let first = columns
        .first()
        .ok_or_else(|| csv_error(line, "no value columns"))?
        .0;

    let labels: Vec<&str> = columns
        .iter()
        .take_while(|(part, _)| *part == first)
        .map(|(_, var)| *var)
        .collect();

    let channels = Channels::from_labels(&labels)
        .ok_or_else(|| csv_error(line, format!("unknown variables {:?}", labels)))?;

    if columns.len() % channels.len() != 0 {
        return Err(csv_error(line, "incomplete body part columns"));
    }

    let parts = columns
        .chunks(channels.len())
        .map(|chunk| {
            let part: BodyPart = chunk[0].0.parse()?;

            for (idx, (name, var)) in chunk.iter().enumerate() {
                if *name != chunk[0].0 || *var != channels.labels()[idx] {
                    return Err(csv_error(line, format!("unexpected column {}_{}", name, var)));
                }
            }

            Ok(part)
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok((parts, channels))
}

/// Parses a per-person CSV in either header form.
pub fn parse_csv(content: &str) -> Result<PersonSeries, Error> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (line, header) = lines.next().ok_or_else(|| csv_error(1, "missing header"))?;
    let header: Vec<&str> = header.split(',').map(str::trim).collect();

    let (parts, channels) = if header[0] == PART_HEADER {
        let (var_line, vars) = lines
            .next()
            .ok_or_else(|| csv_error(line + 2, "missing variable header"))?;
        let vars: Vec<&str> = vars.split(',').map(str::trim).collect();

        if vars[0] != VARIABLE_HEADER || vars.len() != header.len() {
            return Err(csv_error(var_line + 1, "malformed variable header"));
        }

        let columns: Vec<(&str, &str)> = header[1..]
            .iter()
            .copied()
            .zip(vars[1..].iter().copied())
            .collect();

        layout(var_line + 1, &columns)?
    } else {
        let columns = header[1..]
            .iter()
            .map(|col| {
                col.rsplit_once('_')
                    .ok_or_else(|| csv_error(line + 1, format!("malformed column {}", col)))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        layout(line + 1, &columns)?
    };

    let width = parts.len() * channels.len();
    let rows = lines
        .map(|(line, text)| {
            let cells: Vec<&str> = text.split(',').collect();
            if cells.len() != width + 1 {
                return Err(csv_error(
                    line + 1,
                    format!("expected {} cells, got {}", width + 1, cells.len()),
                ));
            }

            cells[1..]
                .iter()
                .map(|cell| match cell.trim() {
                    "" => Ok(None),
                    v => v
                        .parse::<f32>()
                        .map(Some)
                        .map_err(|e| csv_error(line + 1, format!("{}: {}", v, e))),
                })
                .collect::<Result<Vec<_>, Error>>()
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut series = PersonSeries::new(parts, channels, rows.len());
    for (mut dst, src) in series.data_mut().rows_mut().into_iter().zip(rows) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s;
        }
    }

    Ok(series)
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<PersonSeries, Error> {
    let content = std::fs::read_to_string(path)?;

    parse_csv(&content)
}

#[derive(Serialize)]
struct SeriesDump<'a> {
    parts: Vec<&'static str>,
    channels: &'a [&'static str],
    frames: Vec<Vec<Option<f32>>>,
}

/// Writes `{"parts": [...], "channels": [...], "frames": [[...], ...]}`,
/// `null` standing for missing values.
pub fn write_json<W: Write>(w: W, series: &PersonSeries) -> Result<(), Error> {
    let dump = SeriesDump {
        parts: series.parts().iter().map(|p| p.name()).collect(),
        channels: series.channels().labels(),
        frames: series
            .data()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect(),
    };

    serde_json::to_writer(w, &dump)?;

    Ok(())
}

pub fn write_json_file<P: AsRef<Path>>(path: P, series: &PersonSeries) -> Result<(), Error> {
    let file = File::create(path.as_ref())?;
    log::debug!("writing {}", path.as_ref().display());

    let mut w = BufWriter::new(file);
    write_json(&mut w, series)?;
    w.flush()?;

    Ok(())
}
